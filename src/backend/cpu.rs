// Stdlib imports
use std::f32::consts::{FRAC_1_PI, PI};
use std::sync::{Arc, Mutex};
// Local imports
use crate::backend::{RenderError, RenderingBackend};
use crate::camera::Camera;
use crate::data::{Photon, PhotonMap};
use crate::graphics::ray::Ray;
use crate::graphics::sampling::sample_hemisphere_cosine_weighted;
use crate::math::{Vec3, Vec4, EPSILON};
use crate::pool::TaskPool;
use crate::rng::Rng;
use crate::scene::Scene;
use crate::timing::time_section;
use crate::viewport::Viewport;

/// How many photons the scene emits per render pass
const DEFAULT_EMITTED_PHOTON_COUNT : usize = 1000000;
/// How often a photon may bounce off a diffuse surface
const MAX_PHOTON_BOUNCES : usize = 5;
/// How many nearby photons back one radiance estimate
const RADIANCE_PHOTON_COUNT : usize = 200;
/// Leaf capacity of the photon map
const PHOTON_MAP_LEAF_SIZE : usize = 100;

/// A surface sample behind one camera pixel
///
/// The radiance estimate and the gather radius are filled in by the
///   photon-density pass
#[derive(Copy,Clone,Debug)]
pub struct Hitpoint {
  pub position           : Vec3,
  pub normal             : Vec3,
  pub incoming_direction : Vec3,
  pub radiance_estimate  : Vec4,
  pub pixel_x            : u32,
  pub pixel_y            : u32,
  pub material_index     : u32,
  pub radius             : f32
}

/// The CPU rendering backend: progressive photon mapping, one full pass
///   per `render` call
///
/// All working buffers live here and are reused across frames. A seeded
///   backend restarts its random sequence on every render, so the same
///   scene and camera always produce the same image
pub struct CpuBackend {
  scene                : Option< Arc< Scene > >,
  viewport_width       : usize,
  viewport_height      : usize,
  emitted_photon_count : usize,
  seed                 : Option< u64 >,
  pool                 : TaskPool,

  hitpoints       : Mutex< Vec< Hitpoint > >,
  emitted_photons : Vec< Photon >,
  photons         : Vec< Photon >,
  photon_map      : PhotonMap
}

impl CpuBackend {
  pub fn new( ) -> CpuBackend {
    CpuBackend {
      scene:                None,
      viewport_width:       0,
      viewport_height:      0,
      emitted_photon_count: DEFAULT_EMITTED_PHOTON_COUNT,
      seed:                 None,
      pool:                 TaskPool::new( ),
      hitpoints:            Mutex::new( Vec::new( ) ),
      emitted_photons:      Vec::new( ),
      photons:              Vec::new( ),
      photon_map:           PhotonMap::new( )
    }
  }

  /// A backend whose renders are reproducible for the given seed
  pub fn with_seed( seed : u64 ) -> CpuBackend {
    let mut backend = CpuBackend::new( );
    backend.seed = Some( seed );
    backend
  }

  pub fn set_emitted_photon_count( &mut self, count : usize ) {
    self.emitted_photon_count = count;
  }

  // One eye ray per pixel; every ray that lands on a surface becomes a
  // hitpoint. Parallel over rows, with a single lock guarding the
  // shared hitpoint array
  fn generate_hitpoints( &mut self, scene : &Scene, camera : &Camera ) {
    let ( right, up, forward ) = camera.axis_vectors( );
    let origin = camera.position( );
    let width = self.viewport_width;
    let height = self.viewport_height;

    {
      let hitpoints = self.hitpoints.get_mut( ).unwrap( );
      hitpoints.clear( );
      hitpoints.reserve( width * height );
    }

    let hitpoints = &self.hitpoints;
    self.pool.parallel_for( 0, height, | y | {
      // Screen y grows downward, world up grows upward
      let y_normalized = -( y as f32 / ( height - 1 ) as f32 - 0.5 );
      for x in 0..width {
        let x_normalized = x as f32 / ( width - 1 ) as f32 - 0.5;
        let direction = ( right * x_normalized + up * y_normalized + forward ).normalize( );

        if let Some( hit ) = scene.shoot_ray( &Ray::new( origin, direction ) ) {
          let mut hitpoints = hitpoints.lock( ).unwrap( );
          hitpoints.push( Hitpoint {
            position:           hit.position,
            normal:             hit.normal,
            incoming_direction: direction,
            radiance_estimate:  Vec4::ZERO,
            pixel_x:            x as u32,
            pixel_y:            y as u32,
            material_index:     hit.material_index,
            radius:             1.0
          } );
        }
      }
    } );
  }

  // Bounces every emitted photon through the scene, depositing a copy of
  // it at each diffuse surface it lands on
  fn trace_photons( &mut self, scene : &Scene, rng : &mut Rng ) {
    self.photons.clear( );
    self.photons.reserve( self.emitted_photons.len( ) * ( MAX_PHOTON_BOUNCES + 1 ) );

    for i in 0..self.emitted_photons.len( ) {
      let mut photon = self.emitted_photons[ i ];
      let mut intersection = scene.shoot_ray(
        &Ray::new( photon.position + photon.direction * EPSILON, photon.direction ) );

      let mut bounces = 0;
      while bounces < MAX_PHOTON_BOUNCES {
        let hit = match intersection {
          Some( hit ) => hit,
          None => break
        };

        // Deposit the photon with the throughput it arrived with
        photon.position = hit.position;
        self.photons.push( photon );

        // Then bounce it diffusely off the surface
        let frame_z = hit.normal;
        let frame_x = frame_z.orthogonal( );
        let frame_y = frame_x.cross( frame_z );
        let local = sample_hemisphere_cosine_weighted( rng.next( ), rng.next( ) );

        photon.direction = frame_x * local.x + frame_y * local.y + frame_z * local.z;
        photon.color = photon.color * scene.material( hit.material_index ).diffuse_color;

        intersection = scene.shoot_ray(
          &Ray::new( photon.position + photon.direction * EPSILON, photon.direction ) );
        bounces += 1;
      }
    }
  }

  // For every hitpoint, gathers its nearest photons and turns their
  // density into a radiance estimate. Parallel over hitpoint chunks; the
  // photon map is only read here
  fn estimate_radiance( &mut self, scene : &Scene ) {
    let photon_map = &self.photon_map;
    let photons = &self.photons;
    let hitpoints = self.hitpoints.get_mut( ).unwrap( );

    self.pool.parallel_for_each_mut( hitpoints, | hitpoint | {
      let mut nearest = Vec::new( );
      photon_map.k_nearest_neighbors( photons, hitpoint.position, RADIANCE_PHOTON_COUNT, &mut nearest );

      hitpoint.radiance_estimate = Vec4::ZERO;
      if let Some( farthest ) = nearest.last( ) {
        hitpoint.radius = ( farthest.position - hitpoint.position ).len( );
      }

      let material = scene.material( hitpoint.material_index );
      for photon in &nearest {
        // Photons store the direction they were travelling, so the light
        // direction at the surface is its opposite
        let n_dot_l = hitpoint.normal.dot( -photon.direction ).max( 0.0 );
        hitpoint.radiance_estimate += material.diffuse_color * photon.color * ( n_dot_l * FRAC_1_PI );
      }
    } );
  }

  // Rescales each estimate by the gathered disk area and the scene flux,
  // and writes it to the hitpoint's pixel. Pixels without a hitpoint keep
  // the viewport's clear color
  fn evaluate_radiance( &mut self, scene : &Scene, viewport : &mut Viewport ) {
    let total_flux = scene.total_flux( );
    let photon_count = self.emitted_photon_count as f32;

    let hitpoints = self.hitpoints.get_mut( ).unwrap( );
    for hitpoint in hitpoints.iter( ) {
      let radiance = ( hitpoint.radiance_estimate * total_flux )
                   / ( PI * hitpoint.radius * hitpoint.radius * photon_count );
      viewport.set_pixel( hitpoint.pixel_x as usize, hitpoint.pixel_y as usize, radiance );
    }
  }
}

impl RenderingBackend for CpuBackend {
  fn prepare( &mut self
            , scene           : Arc< Scene >
            , viewport_width  : usize
            , viewport_height : usize
            ) -> Result< ( ), RenderError > {
    // The view-ray formula divides by width-1 and height-1, so anything
    // below 2x2 cannot produce a ray
    if viewport_width < 2 || viewport_height < 2 {
      return Err( RenderError::EmptyViewport { width: viewport_width, height: viewport_height } );
    }

    self.viewport_width = viewport_width;
    self.viewport_height = viewport_height;
    self.hitpoints.get_mut( ).unwrap( ).reserve( viewport_width * viewport_height );
    self.scene = Some( scene );
    Ok( ( ) )
  }

  fn render( &mut self
           , camera   : &Camera
           , viewport : &mut Viewport
           ) -> Result< ( ), RenderError > {
    let scene = self.scene.clone( ).ok_or( RenderError::NotPrepared )?;
    if viewport.width( ) != self.viewport_width || viewport.height( ) != self.viewport_height {
      return Err( RenderError::ViewportSizeMismatch {
        width:           viewport.width( ),
        height:          viewport.height( ),
        expected_width:  self.viewport_width,
        expected_height: self.viewport_height
      } );
    }

    let mut rng = match self.seed {
      Some( seed ) => Rng::seeded( seed ),
      None => Rng::new( )
    };

    time_section( "hitpoint generation", | | self.generate_hitpoints( &scene, camera ) );

    let emitted_photon_count = self.emitted_photon_count;
    time_section( "photon generation", | | {
      scene.generate_photons( emitted_photon_count, &mut rng, &mut self.emitted_photons )
    } );

    time_section( "photon tracing", | | self.trace_photons( &scene, &mut rng ) );
    log::debug!( "{} photons stored", self.photons.len( ) );

    if self.photons.is_empty( ) {
      // No lights anywhere; the viewport keeps its clear color
      return Ok( ( ) );
    }

    time_section( "build photon map", | | {
      self.photon_map.build( &mut self.photons, PHOTON_MAP_LEAF_SIZE );
    } );

    time_section( "estimate radiance", | | self.estimate_radiance( &scene ) );
    time_section( "evaluate radiance", | | self.evaluate_radiance( &scene, viewport ) );

    Ok( ( ) )
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::scene::test_scenes::cornell_box;

  fn cornell_scene( ) -> Arc< Scene > {
    Arc::new( Scene::from_data( cornell_box( ) ) )
  }

  #[test]
  fn render_before_prepare_is_rejected( ) {
    let mut backend = CpuBackend::new( );
    let mut viewport = Viewport::new( 8, 8 );
    assert!( matches!(
      backend.render( &Camera::new( ), &mut viewport ),
      Err( RenderError::NotPrepared ) ) );
  }

  #[test]
  fn degenerate_viewports_are_rejected( ) {
    let mut backend = CpuBackend::new( );
    assert!( matches!(
      backend.prepare( cornell_scene( ), 1, 8 ),
      Err( RenderError::EmptyViewport { .. } ) ) );
    assert!( matches!(
      backend.prepare( cornell_scene( ), 8, 0 ),
      Err( RenderError::EmptyViewport { .. } ) ) );
  }

  #[test]
  fn mismatched_viewports_are_rejected( ) {
    let mut backend = CpuBackend::new( );
    backend.prepare( cornell_scene( ), 8, 8 ).unwrap( );

    let mut viewport = Viewport::new( 16, 16 );
    assert!( matches!(
      backend.render( &Camera::new( ), &mut viewport ),
      Err( RenderError::ViewportSizeMismatch { .. } ) ) );
  }

  #[test]
  fn seeded_renders_are_bitwise_identical( ) {
    let scene = cornell_scene( );
    let camera = Camera::new( );

    let mut backend = CpuBackend::with_seed( 7 );
    backend.set_emitted_photon_count( 2000 );
    backend.prepare( scene, 24, 24 ).unwrap( );

    let mut first = Viewport::new( 24, 24 );
    backend.render( &camera, &mut first ).unwrap( );

    let mut second = Viewport::new( 24, 24 );
    backend.render( &camera, &mut second ).unwrap( );

    assert_eq!( first.pixels( ), second.pixels( ) );
  }

  #[test]
  fn a_lit_scene_produces_radiance( ) {
    let mut backend = CpuBackend::with_seed( 3 );
    backend.set_emitted_photon_count( 2000 );
    backend.prepare( cornell_scene( ), 16, 16 ).unwrap( );

    let mut viewport = Viewport::new( 16, 16 );
    backend.render( &Camera::new( ), &mut viewport ).unwrap( );

    let lit_pixels = viewport.pixels( ).iter( )
      .filter( | p | p.x > 0.0 || p.y > 0.0 || p.z > 0.0 )
      .count( );
    assert!( lit_pixels > 0 );
  }

  #[test]
  fn an_unlit_scene_keeps_the_clear_color( ) {
    let mut data = cornell_box( );
    data.materials[ 3 ] = crate::graphics::Material::diffuse( Vec4::ONE );

    let mut backend = CpuBackend::with_seed( 3 );
    backend.set_emitted_photon_count( 1000 );
    backend.prepare( Arc::new( Scene::from_data( data ) ), 8, 8 ).unwrap( );

    let clear = Vec4::new( 0.25, 0.5, 0.75, 1.0 );
    let mut viewport = Viewport::new( 8, 8 );
    viewport.clear( clear );
    backend.render( &Camera::new( ), &mut viewport ).unwrap( );

    for pixel in viewport.pixels( ) {
      assert_eq!( *pixel, clear );
    }
  }
}
