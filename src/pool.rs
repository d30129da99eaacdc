// Stdlib imports
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

// A fixed pool of worker threads over one FIFO task queue, and the
// parallel-for adaptors the renderer expresses its loops with.
//
// There is deliberately no work stealing and no rebalancing: render work is
// embarrassingly parallel over rows or hitpoints, so contiguous ranges
// handed out once are enough

type Task = Box< dyn FnOnce( ) + Send >;

struct Queue {
  tasks     : Mutex< VecDeque< Task > >,
  available : Condvar,
  close     : AtomicBool
}

/// A fixed set of worker threads consuming a shared task queue
///
/// Workers are spawned at construction and joined when the pool is dropped.
/// Dropping wakes every worker; each exits as soon as its current task (if
///   any) completes
pub struct TaskPool {
  workers : Vec< JoinHandle< ( ) > >,
  queue   : Arc< Queue >
}

enum TaskResult< T > {
  Pending,
  Finished( T ),
  Panicked( Box< dyn Any + Send > )
}

/// The pending result of an enqueued task
///
/// `wait` blocks until the task has run. A panic inside the task is caught
///   on the worker and resumed on the waiting thread
pub struct TaskHandle< T > {
  result : Arc< ( Mutex< TaskResult< T > >, Condvar ) >
}

impl< T > TaskHandle< T > {
  pub fn wait( self ) -> T {
    match self.join( ) {
      Ok( value ) => value,
      Err( payload ) => panic::resume_unwind( payload )
    }
  }

  fn join( self ) -> Result< T, Box< dyn Any + Send > > {
    let ( lock, signal ) = &*self.result;
    let mut slot = lock.lock( ).unwrap( );
    loop {
      match std::mem::replace( &mut *slot, TaskResult::Pending ) {
        TaskResult::Pending => { slot = signal.wait( slot ).unwrap( ); },
        TaskResult::Finished( value ) => return Ok( value ),
        TaskResult::Panicked( payload ) => return Err( payload )
      }
    }
  }
}

fn worker_loop( queue : &Queue ) {
  loop {
    let task;
    {
      let mut tasks = queue.tasks.lock( ).unwrap( );
      loop {
        if queue.close.load( Ordering::Acquire ) {
          return;
        }
        if let Some( t ) = tasks.pop_front( ) {
          task = t;
          break;
        }
        tasks = queue.available.wait( tasks ).unwrap( );
      }
    }
    task( );
  }
}

impl TaskPool {
  /// Constructs a pool with one worker per available hardware thread
  pub fn new( ) -> TaskPool {
    let worker_count = std::thread::available_parallelism( ).map( | n | n.get( ) ).unwrap_or( 1 );
    TaskPool::with_workers( worker_count )
  }

  pub fn with_workers( worker_count : usize ) -> TaskPool {
    assert!( worker_count > 0 );

    let queue = Arc::new( Queue {
      tasks:     Mutex::new( VecDeque::new( ) ),
      available: Condvar::new( ),
      close:     AtomicBool::new( false )
    } );

    let mut workers = Vec::with_capacity( worker_count );
    for _i in 0..worker_count {
      let queue = queue.clone( );
      workers.push( std::thread::spawn( move | | worker_loop( &queue ) ) );
    }

    TaskPool { workers, queue }
  }

  pub fn worker_count( &self ) -> usize {
    self.workers.len( )
  }

  /// Enqueues a task and returns a handle resolving to its result
  ///
  /// Wakes a single waiting worker
  pub fn enqueue< T, F >( &self, task : F ) -> TaskHandle< T >
    where F : FnOnce( ) -> T + Send + 'static
        , T : Send + 'static
  {
    let result = Arc::new( ( Mutex::new( TaskResult::Pending ), Condvar::new( ) ) );

    let task_result = result.clone( );
    let task : Task = Box::new( move | | {
      let outcome = panic::catch_unwind( AssertUnwindSafe( task ) );
      let ( lock, signal ) = &*task_result;
      let mut slot = lock.lock( ).unwrap( );
      *slot = match outcome {
        Ok( value ) => TaskResult::Finished( value ),
        Err( payload ) => TaskResult::Panicked( payload )
      };
      signal.notify_all( );
    } );

    {
      let mut tasks = self.queue.tasks.lock( ).unwrap( );
      tasks.push_back( task );
    }
    self.queue.available.notify_one( );

    TaskHandle { result }
  }

  /// Invokes `function` once for every index in `[begin,end)`, spread over
  ///   the workers, and returns once every invocation has completed
  ///
  /// The range is cut into one contiguous sub-range per worker, with the
  ///   remainder spread one-per-range from the front. There is no ordering
  ///   between sub-ranges; `function` must be thread-safe for the state it
  ///   touches
  pub fn parallel_for< F >( &self, begin : usize, end : usize, function : F )
    where F : Fn( usize ) + Sync
  {
    if end <= begin {
      return;
    }

    // The workers only take 'static tasks. Every sub-task is joined below
    // before this frame returns, so the erased borrow outlives all of them
    let task : &( dyn Fn( usize ) + Sync ) = &function;
    let task : &'static ( dyn Fn( usize ) + Sync ) = unsafe { std::mem::transmute( task ) };

    let worker_count = self.worker_count( );
    let distance = end - begin;
    let elements_per_worker = distance / worker_count;
    let mut remaining = distance - elements_per_worker * worker_count;

    let mut handles = Vec::with_capacity( worker_count );
    let mut range_begin = begin;
    for _i in 0..worker_count {
      let mut range_end = range_begin + elements_per_worker;
      if remaining > 0 {
        range_end += 1;
        remaining -= 1;
      }
      if range_begin == range_end {
        continue;
      }
      handles.push( self.enqueue( move | | {
        for index in range_begin..range_end {
          task( index );
        }
      } ) );
      range_begin = range_end;
    }

    join_all( handles );
  }

  /// Invokes `function` on every element of `items`, spread over the
  ///   workers, and returns once every invocation has completed
  ///
  /// The slice is cut into one contiguous chunk per worker, so the mutable
  ///   borrows handed to the tasks are disjoint
  pub fn parallel_for_each_mut< T, F >( &self, items : &mut [T], function : F )
    where T : Send + 'static
        , F : Fn( &mut T ) + Sync
  {
    if items.is_empty( ) {
      return;
    }

    // Same lifetime erasure as `parallel_for`; sound for the same reason
    let task : &( dyn Fn( &mut T ) + Sync ) = &function;
    let task : &'static ( dyn Fn( &mut T ) + Sync ) = unsafe { std::mem::transmute( task ) };

    let worker_count = self.worker_count( );
    let elements_per_worker = items.len( ) / worker_count;
    let mut remaining = items.len( ) - elements_per_worker * worker_count;

    let mut handles = Vec::with_capacity( worker_count );
    let mut rest = items;
    for _i in 0..worker_count {
      let mut chunk_size = elements_per_worker;
      if remaining > 0 {
        chunk_size += 1;
        remaining -= 1;
      }
      if chunk_size == 0 {
        break;
      }
      let ( chunk, tail ) = std::mem::take( &mut rest ).split_at_mut( chunk_size );
      rest = tail;

      let chunk : &'static mut [T] = unsafe { std::mem::transmute( chunk ) };
      handles.push( self.enqueue( move | | {
        for item in chunk.iter_mut( ) {
          task( item );
        }
      } ) );
    }

    join_all( handles );
  }
}

// Waits for every handle, and only then resumes the first captured panic.
// Bailing out early would drop the join guarantee the lifetime erasure in
// the parallel adaptors relies on
fn join_all( handles : Vec< TaskHandle< ( ) > > ) {
  let mut first_panic = None;
  for handle in handles {
    if let Err( payload ) = handle.join( ) {
      first_panic.get_or_insert( payload );
    }
  }
  if let Some( payload ) = first_panic {
    panic::resume_unwind( payload );
  }
}

impl Drop for TaskPool {
  fn drop( &mut self ) {
    self.queue.close.store( true, Ordering::Release );
    self.queue.available.notify_all( );
    for worker in self.workers.drain( .. ) {
      let _ = worker.join( );
    }
  }
}

#[cfg(test)]
mod test {
  use super::TaskPool;
  use std::sync::atomic::{AtomicUsize, Ordering};

  #[test]
  fn enqueue_returns_the_task_result( ) {
    let pool = TaskPool::with_workers( 2 );
    let handle = pool.enqueue( | | 21 * 2 );
    assert_eq!( handle.wait( ), 42 );
  }

  #[test]
  fn a_panicking_task_panics_the_waiter( ) {
    let pool = TaskPool::with_workers( 2 );
    let handle = pool.enqueue( | | -> ( ) { panic!( "boom" ) } );
    let outcome = std::panic::catch_unwind( move | | handle.wait( ) );
    assert!( outcome.is_err( ) );
  }

  #[test]
  fn parallel_for_visits_every_index_once( ) {
    let pool = TaskPool::with_workers( 4 );
    let n = 100000;
    let cells : Vec< AtomicUsize > = ( 0..n ).map( | _i | AtomicUsize::new( 0 ) ).collect( );

    pool.parallel_for( 0, n, | i | {
      cells[ i ].fetch_add( i + 1, Ordering::Relaxed );
    } );

    for i in 0..n {
      assert_eq!( cells[ i ].load( Ordering::Relaxed ), i + 1 );
    }
  }

  #[test]
  fn parallel_for_covers_partial_ranges( ) {
    // Fewer elements than workers, and a range not starting at zero
    let pool = TaskPool::with_workers( 8 );
    let visited = AtomicUsize::new( 0 );
    pool.parallel_for( 10, 13, | i | {
      visited.fetch_add( i, Ordering::Relaxed );
    } );
    assert_eq!( visited.load( Ordering::Relaxed ), 10 + 11 + 12 );
  }

  #[test]
  fn parallel_for_each_mut_touches_every_element( ) {
    let pool = TaskPool::with_workers( 4 );
    let mut items : Vec< usize > = ( 0..1000 ).collect( );

    pool.parallel_for_each_mut( &mut items, | item | {
      *item *= 2;
    } );

    for ( i, item ) in items.iter( ).enumerate( ) {
      assert_eq!( *item, i * 2 );
    }
  }

  #[test]
  fn dropping_the_pool_joins_the_workers( ) {
    let pool = TaskPool::with_workers( 4 );
    let handle = pool.enqueue( | | 1 );
    assert_eq!( handle.wait( ), 1 );
    drop( pool );
  }
}
