// Local imports
use crate::graphics::ray::Ray;
use crate::graphics::{Aabb, Triangle};
use crate::math::Vec3;

// The two geometric tests everything else is built on: ray/triangle
// intersection for tracing, and triangle/AABB overlap for the octree

/// A ray/triangle intersection
///
/// The barycentric coordinates are `(u, v, w)` where `u` weighs the second
///   vertex, `v` the third, and `w = 1 - u - v` the first
#[derive(Copy,Clone,Debug)]
pub struct RayTriangleIntersection {
  pub position    : Vec3,
  pub barycentric : Vec3,
  pub distance    : f32
}

/// Intersects a ray with a triangle (Moeller-Trumbore)
///
/// Returns only hits at a strictly positive distance. A near-zero
///   determinant means the ray runs parallel to the triangle's plane, which
///   counts as a miss
pub fn ray_triangle_intersection( ray : &Ray, triangle : &Triangle ) -> Option< RayTriangleIntersection > {
  let v0v1 = triangle.vertices[ 1 ] - triangle.vertices[ 0 ];
  let v0v2 = triangle.vertices[ 2 ] - triangle.vertices[ 0 ];

  let p_vector = ray.dir.cross( v0v2 );
  let determinant = v0v1.dot( p_vector );
  if determinant.abs( ) <= f32::EPSILON {
    return None;
  }
  let inverse_determinant = 1.0 / determinant;

  let t_vector = ray.origin - triangle.vertices[ 0 ];
  let u = inverse_determinant * t_vector.dot( p_vector );
  if u < 0.0 || u > 1.0 {
    return None;
  }

  let q_vector = t_vector.cross( v0v1 );
  let v = inverse_determinant * ray.dir.dot( q_vector );
  if v < 0.0 || u + v > 1.0 {
    return None;
  }

  let t = inverse_determinant * v0v2.dot( q_vector );
  if t <= 0.0 {
    return None;
  }

  Some( RayTriangleIntersection {
    position:    ray.at( t ),
    barycentric: Vec3::new( u, v, 1.0 - u - v ),
    distance:    t
  } )
}

// Projects points onto an axis and returns the covered interval
fn project( points : &[Vec3], axis : Vec3 ) -> (f32, f32) {
  let mut min = f32::INFINITY;
  let mut max = -f32::INFINITY;
  for p in points {
    let axis_dot_p = axis.dot( *p );
    min = min.min( axis_dot_p );
    max = max.max( axis_dot_p );
  }
  (min, max)
}

/// Tests a triangle and an AABB for overlap, by the separating axis theorem
///
/// 13 candidate axes: the three box normals, the triangle normal, and the
///   nine cross products of triangle edges with box normals. The shapes
///   overlap exactly when no axis separates their projections
pub fn triangle_aabb_intersection( triangle : &Triangle, aabb : &Aabb ) -> bool {
  let aabb_normals = [Vec3::POSITIVE_X, Vec3::POSITIVE_Y, Vec3::POSITIVE_Z];

  // The box normals. The box's own projection onto these is just its
  // min/max component
  for i in 0..3 {
    let (triangle_min, triangle_max) = project( &triangle.vertices, aabb_normals[ i ] );
    if triangle_max < aabb.min[ i ] || triangle_min > aabb.max[ i ] {
      return false;
    }
  }

  let aabb_vertices = aabb.corners( );

  // The triangle normal. The triangle projects onto it as a single point
  let triangle_normal = triangle.normal( );
  let triangle_offset = triangle_normal.dot( triangle.vertices[ 0 ] );
  {
    let (aabb_min, aabb_max) = project( &aabb_vertices, triangle_normal );
    if aabb_max < triangle_offset || aabb_min > triangle_offset {
      return false;
    }
  }

  // The nine edge cross products. The box normals double as its edge
  // tangents
  let triangle_edges =
    [ triangle.vertices[ 0 ] - triangle.vertices[ 1 ]
    , triangle.vertices[ 1 ] - triangle.vertices[ 2 ]
    , triangle.vertices[ 2 ] - triangle.vertices[ 0 ]
    ];
  for edge in &triangle_edges {
    for normal in &aabb_normals {
      let axis = edge.cross( *normal );

      let (aabb_min, aabb_max) = project( &aabb_vertices, axis );
      let (triangle_min, triangle_max) = project( &triangle.vertices, axis );

      if aabb_max < triangle_min || aabb_min > triangle_max {
        return false;
      }
    }
  }

  // No separating axis found
  true
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::graphics::ray::Ray;

  fn unit_triangle( ) -> Triangle {
    Triangle::new(
      Vec3::new( 0.0, 0.0, 0.0 ),
      Vec3::new( 1.0, 0.0, 0.0 ),
      Vec3::new( 0.0, 1.0, 0.0 ) )
  }

  #[test]
  fn hits_the_triangle_interior( ) {
    let ray = Ray::new( Vec3::new( 0.25, 0.25, 1.0 ), Vec3::new( 0.0, 0.0, -1.0 ) );
    let hit = ray_triangle_intersection( &ray, &unit_triangle( ) ).unwrap( );

    assert!( ( hit.distance - 1.0 ).abs( ) < 1e-6 );
    assert!( ( hit.position - Vec3::new( 0.25, 0.25, 0.0 ) ).len( ) < 1e-6 );
    assert!( ( hit.barycentric - Vec3::new( 0.25, 0.25, 0.5 ) ).len( ) < 1e-6 );
  }

  #[test]
  fn misses_when_parallel( ) {
    let ray = Ray::new( Vec3::new( 0.25, 0.25, 1.0 ), Vec3::new( 1.0, 0.0, 0.0 ) );
    assert!( ray_triangle_intersection( &ray, &unit_triangle( ) ).is_none( ) );
  }

  #[test]
  fn misses_when_pointing_away( ) {
    let ray = Ray::new( Vec3::new( 0.25, 0.25, 1.0 ), Vec3::new( 0.0, 0.0, 1.0 ) );
    assert!( ray_triangle_intersection( &ray, &unit_triangle( ) ).is_none( ) );
  }

  #[test]
  fn misses_outside_the_edges( ) {
    let ray = Ray::new( Vec3::new( 0.9, 0.9, 1.0 ), Vec3::new( 0.0, 0.0, -1.0 ) );
    assert!( ray_triangle_intersection( &ray, &unit_triangle( ) ).is_none( ) );
  }

  #[test]
  fn overlap_with_containing_box( ) {
    let aabb = Aabb::new( Vec3::new( -1.0, -1.0, -1.0 ), Vec3::new( 2.0, 2.0, 2.0 ) );
    assert!( triangle_aabb_intersection( &unit_triangle( ), &aabb ) );
  }

  #[test]
  fn overlap_with_pierced_box( ) {
    // The box straddles the triangle's plane around its centroid
    let aabb = Aabb::new( Vec3::new( 0.2, 0.2, -0.1 ), Vec3::new( 0.4, 0.4, 0.1 ) );
    assert!( triangle_aabb_intersection( &unit_triangle( ), &aabb ) );
  }

  #[test]
  fn no_overlap_behind_the_plane( ) {
    let aabb = Aabb::new( Vec3::new( 0.0, 0.0, 0.5 ), Vec3::new( 1.0, 1.0, 1.5 ) );
    assert!( !triangle_aabb_intersection( &unit_triangle( ), &aabb ) );
  }

  #[test]
  fn no_overlap_past_the_diagonal_edge( ) {
    // Near the triangle's AABB, but separated by the hypotenuse edge
    let aabb = Aabb::new( Vec3::new( 0.8, 0.8, -0.1 ), Vec3::new( 1.0, 1.0, 0.1 ) );
    assert!( !triangle_aabb_intersection( &unit_triangle( ), &aabb ) );
  }
}
