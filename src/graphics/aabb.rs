// Local imports
use crate::math::Vec3;

/// An axis-aligned bounding box
///
/// `min` is componentwise less than or equal to `max`, except for the empty
///   box produced by `Aabb::negative( )` before any point is included
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct Aabb {
  pub min : Vec3,
  pub max : Vec3
}

impl Aabb {
  /// Constructs a new AABB with the provided minimum and maximum corners
  pub fn new( min : Vec3, max : Vec3 ) -> Aabb {
    Aabb { min, max }
  }

  /// The inverted infinite box. Including any point into it yields that
  ///   point's degenerate box, so it is the identity for `include`
  pub fn negative( ) -> Aabb {
    Aabb {
      min: Vec3::new( f32::INFINITY, f32::INFINITY, f32::INFINITY ),
      max: Vec3::new( -f32::INFINITY, -f32::INFINITY, -f32::INFINITY )
    }
  }

  /// Returns the smallest AABB containing all of `points`
  pub fn around< 'a >( points : impl Iterator< Item = &'a Vec3 > ) -> Aabb {
    let mut aabb = Aabb::negative( );
    for p in points {
      aabb = aabb.include( *p );
    }
    aabb
  }

  /// Returns the center point of the AABB
  pub fn center( &self ) -> Vec3 {
    ( self.min + self.max ) * 0.5
  }

  /// Returns the size of the AABB along each axis
  pub fn extend( &self ) -> Vec3 {
    self.max - self.min
  }

  pub fn half_extend( &self ) -> Vec3 {
    self.extend( ) * 0.5
  }

  /// Returns the 8 corner points of the AABB
  pub fn corners( &self ) -> [Vec3; 8] {
    let center = self.center( );
    let h = self.half_extend( );

    [ center + Vec3::new( -h.x, -h.y, -h.z )
    , center + Vec3::new( -h.x, -h.y,  h.z )
    , center + Vec3::new( -h.x,  h.y, -h.z )
    , center + Vec3::new( -h.x,  h.y,  h.z )
    , center + Vec3::new(  h.x, -h.y, -h.z )
    , center + Vec3::new(  h.x, -h.y,  h.z )
    , center + Vec3::new(  h.x,  h.y, -h.z )
    , center + Vec3::new(  h.x,  h.y,  h.z )
    ]
  }

  /// Grows the box such that it contains the point `v`
  pub fn include( self, v : Vec3 ) -> Aabb {
    Aabb {
      min: Vec3::new( self.min.x.min( v.x ), self.min.y.min( v.y ), self.min.z.min( v.z ) ),
      max: Vec3::new( self.max.x.max( v.x ), self.max.y.max( v.y ), self.max.z.max( v.z ) )
    }
  }

  /// True if this box contains the point
  pub fn contains_point( &self, v : Vec3 ) -> bool {
    self.min.x <= v.x && self.min.y <= v.y && self.min.z <= v.z &&
      self.max.x >= v.x && self.max.y >= v.y && self.max.z >= v.z
  }
}
