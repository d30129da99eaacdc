// Stdlib imports
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};
// Local imports
use crate::math::{Vec2, Vec3};

// Mappings from uniform [0,1) pairs onto disks, spheres and hemispheres.
// All directions returned are of unit length

/// Maps `(u,v)` uniformly onto the unit disk, with the concentric mapping
///
/// The concentric mapping preserves relative areas, so a uniform input
///   yields a uniform point on the disk
pub fn sample_disk_uniformly( u : f32, v : f32 ) -> Vec2 {
  let u = 2.0 * u - 1.0;
  let v = 2.0 * v - 1.0;

  if u == 0.0 && v == 0.0 {
    return Vec2::ZERO;
  }

  let theta;
  let radius;
  if u.abs( ) > v.abs( ) {
    radius = u;
    theta = FRAC_PI_4 * ( v / u );
  } else {
    radius = v;
    theta = FRAC_PI_2 - FRAC_PI_4 * ( u / v );
  }
  Vec2::new( radius * theta.cos( ), radius * theta.sin( ) )
}

/// Maps `(u,v)` uniformly onto the unit sphere
pub fn sample_sphere_uniformly( u : f32, v : f32 ) -> Vec3 {
  let phi = 2.0 * PI * u;

  let z = 1.0 - 2.0 * v;
  let radius = ( 1.0 - z * z ).max( 0.0 ).sqrt( );
  Vec3::new( radius * phi.cos( ), radius * phi.sin( ), z )
}

/// Maps `(u,v)` uniformly onto the hemisphere around +z
pub fn sample_hemisphere_uniformly( u : f32, v : f32 ) -> Vec3 {
  let phi = 2.0 * PI * u;

  let z = v;
  let radius = ( 1.0 - z * z ).max( 0.0 ).sqrt( );
  Vec3::new( radius * phi.cos( ), radius * phi.sin( ), z )
}

/// Maps `(u,v)` onto the hemisphere around +z with density `cos(theta) / pi`
///
/// Projecting a uniform disk sample up onto the hemisphere gives exactly the
///   cosine weighting. The max guards the square root against rounding just
///   outside the disk rim
pub fn sample_hemisphere_cosine_weighted( u : f32, v : f32 ) -> Vec3 {
  let disk_sample = sample_disk_uniformly( u, v );
  let z = ( 1.0 - disk_sample.len_sq( ) ).max( 0.0 ).sqrt( );
  Vec3::new( disk_sample.x, disk_sample.y, z )
}
