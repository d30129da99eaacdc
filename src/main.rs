// Stdlib imports
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
// External imports
use clap::Parser;
// Local imports
use glimmer::math::{clamp, Vec4};
use glimmer::timing::time_section;
use glimmer::{Camera, CpuBackend, RenderError, RenderingBackend, Scene, Viewport};

/// Renders a triangle-mesh scene with progressive photon mapping
#[derive(Parser)]
#[command( name = "glimmer", version )]
struct Options {
  /// The scene file to render (OBJ). Without one, an empty scene is used
  scene : Option< PathBuf >,

  /// Width of the rendered image, in pixels
  #[arg( long, default_value_t = 512 )]
  width : usize,

  /// Height of the rendered image, in pixels
  #[arg( long, default_value_t = 512 )]
  height : usize,

  /// Where the rendered image is written (PNG)
  #[arg( long, short, default_value = "render.png" )]
  output : PathBuf,

  /// How many photons are emitted for the render pass
  #[arg( long, default_value_t = 1000000 )]
  photons : usize,

  /// Seed for the random number engine, for reproducible renders
  #[arg( long )]
  seed : Option< u64 >
}

fn main( ) {
  env_logger::init( );
  let options = Options::parse( );

  // A scene that fails to load is reported, not fatal; the render then
  // shows the empty scene
  let scene = match &options.scene {
    Some( path ) => {
      match Scene::load( path ) {
        Ok( scene ) => scene,
        Err( error ) => {
          log::error!( "failed to load scene `{}`: {}", path.display( ), error );
          Scene::empty( )
        }
      }
    },
    None => Scene::empty( )
  };

  let mut backend = match options.seed {
    Some( seed ) => CpuBackend::with_seed( seed ),
    None => CpuBackend::new( )
  };
  backend.set_emitted_photon_count( options.photons );

  let camera = Camera::new( );
  let mut viewport = Viewport::new( options.width, options.height );

  if let Err( error ) = render( &mut backend, Arc::new( scene ), &camera, &mut viewport ) {
    eprintln!( "render failed: {}", error );
    process::exit( 1 );
  }

  if let Err( error ) = write_image( &viewport, &options.output ) {
    eprintln!( "failed to write `{}`: {}", options.output.display( ), error );
    process::exit( 1 );
  }
  log::info!( "wrote {}", options.output.display( ) );
}

fn render( backend  : &mut CpuBackend
         , scene    : Arc< Scene >
         , camera   : &Camera
         , viewport : &mut Viewport
         ) -> Result< ( ), RenderError > {
  backend.prepare( scene, viewport.width( ), viewport.height( ) )?;
  viewport.clear( Vec4::ZERO );
  time_section( "render", | | backend.render( camera, viewport ) )
}

fn write_image( viewport : &Viewport, path : &PathBuf ) -> Result< ( ), image::ImageError > {
  let mut image = image::RgbaImage::new( viewport.width( ) as u32, viewport.height( ) as u32 );
  for y in 0..viewport.height( ) {
    for x in 0..viewport.width( ) {
      let color = viewport.get_pixel( x, y );
      image.put_pixel( x as u32, y as u32, image::Rgba(
        [ to_byte( color.x ), to_byte( color.y ), to_byte( color.z ), 255 ] ) );
    }
  }
  image.save( path )
}

fn to_byte( channel : f32 ) -> u8 {
  ( clamp( channel, 0.0, 1.0 ) * 255.0 ) as u8
}
