// Local imports
use crate::math::Vec3;

// A module with the `Ray` and `Hit` structures that the tracing code passes
// around
//
// Exports:
// * Ray
// * Hit

/// A half-line in 3-dimensional space
///
/// Conceptually, it "shoots" from an origin into a direction
/// The direction should be of unit length
#[derive(Clone,Copy,Debug)]
pub struct Ray {
  pub origin : Vec3,
  pub dir    : Vec3
}

impl Ray {
  /// Constructs a new `Ray`
  /// The direction should be of unit length
  pub fn new( origin : Vec3, dir : Vec3 ) -> Ray {
    Ray { origin, dir }
  }

  /// Evaluates the ray at the provided distance from its origin
  pub fn at( self, distance : f32 ) -> Vec3 {
    self.origin + self.dir * distance
  }
}

/// The nearest surface found along a ray
///
/// The normal is the shading normal: the barycentric mix of the triangle's
///   vertex normals at the intersection point, normalized
#[derive(Clone,Copy,Debug)]
pub struct Hit {
  /// The distance from the ray origin to the surface. Always positive
  pub distance       : f32,
  pub position       : Vec3,
  pub normal         : Vec3,
  pub material_index : u32
}
