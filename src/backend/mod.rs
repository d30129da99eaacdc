// Stdlib imports
use std::sync::Arc;
// External imports
use thiserror::Error;
// Local imports
use crate::camera::Camera;
use crate::scene::Scene;
use crate::viewport::Viewport;

mod cpu;

pub use cpu::{CpuBackend, Hitpoint};

#[derive(Debug, Error)]
pub enum RenderError {
  #[error( "render called before prepare" )]
  NotPrepared,
  #[error( "viewport dimensions must be at least 2x2, got {width}x{height}" )]
  EmptyViewport { width : usize, height : usize },
  #[error( "viewport is {width}x{height}, but the backend was prepared for {expected_width}x{expected_height}" )]
  ViewportSizeMismatch {
    width           : usize,
    height          : usize,
    expected_width  : usize,
    expected_height : usize
  }
}

/// A rendering backend turns a camera pose into pixel radiance
///
/// This is the seam where GPU implementations would slot in; the CPU
///   backend is the reference. `prepare` binds a backend to a scene and a
///   viewport size; `render` may then be called any number of times, with
///   the same or different cameras
pub trait RenderingBackend {
  fn prepare( &mut self
            , scene           : Arc< Scene >
            , viewport_width  : usize
            , viewport_height : usize
            ) -> Result< ( ), RenderError >;

  fn render( &mut self
           , camera   : &Camera
           , viewport : &mut Viewport
           ) -> Result< ( ), RenderError >;
}
