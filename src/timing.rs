// Stdlib imports
use std::time::{Duration, Instant};

/// Runs `f` and logs how long it took, labelled with `section`
///
/// Purely advisory. The log level is `debug`, so release renders stay quiet
///   unless the user opts in
pub fn time_section< T >( section : &str, f : impl FnOnce( ) -> T ) -> T {
  let start = Instant::now( );
  let result = f( );
  log::debug!( "{}: {}", section, pretty_duration( start.elapsed( ) ) );
  result
}

/// Formats a duration with the largest unit that keeps the number above one
pub fn pretty_duration( duration : Duration ) -> String {
  let seconds = duration.as_secs_f64( );

  let hours = seconds / ( 60.0 * 60.0 );
  if hours > 1.0 {
    return format!( "{:.2}h", hours );
  }

  let minutes = seconds / 60.0;
  if minutes > 1.0 {
    return format!( "{:.2}m", minutes );
  }

  if seconds > 1.0 {
    return format!( "{:.2}s", seconds );
  }

  let milliseconds = seconds * 1000.0;
  if milliseconds > 1.0 {
    return format!( "{:.2}ms", milliseconds );
  }

  let microseconds = milliseconds * 1000.0;
  if microseconds > 1.0 {
    return format!( "{:.2}us", microseconds );
  }

  format!( "{:.0}ns", microseconds * 1000.0 )
}
