
use std::ops;

/// A 3-component float vector
///
/// It is padded to 16 bytes so that arrays of positions share the layout a
/// GPU backend would expect for an upload
#[repr(C, align(16))]
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct Vec3 {
  pub x : f32,
  pub y : f32,
  pub z : f32
}

const _: () = assert!( std::mem::size_of::< Vec3 >( ) == 16 );

impl Vec3 {
  pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

  pub const POSITIVE_X: Vec3 = Vec3 { x: 1.0, y: 0.0, z: 0.0 };
  pub const POSITIVE_Y: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };
  pub const POSITIVE_Z: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

  pub fn new( x : f32, y : f32, z : f32 ) -> Vec3 {
    Vec3 { x, y, z }
  }

  pub fn normalize( self ) -> Vec3 {
    self * ( 1.0 / self.len( ) )
  }

  pub fn dot( self, rhs : Vec3 ) -> f32 {
    self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
  }

  pub fn cross( self, t : Vec3 ) -> Vec3 {
    Vec3::new(
      self.y * t.z - self.z * t.y,
      self.z * t.x - self.x * t.z,
      self.x * t.y - self.y * t.x )
  }

  pub fn len( self ) -> f32 {
    self.len_sq( ).sqrt( )
  }

  pub fn len_sq( self ) -> f32 {
    self.dot( self )
  }

  /// The distance between `self` and `t`
  pub fn dis( self, t : Vec3 ) -> f32 {
    ( self - t ).len( )
  }

  /// Constructs a unit vector perpendicular to `self`
  /// `self` should be of unit length
  ///
  /// The larger of the x- and y-components picks which axis plane the result
  ///   lies in, which keeps the division well away from zero
  pub fn orthogonal( self ) -> Vec3 {
    if self.x.abs( ) > self.y.abs( ) {
      Vec3::new( -self.z, 0.0, self.x ) * ( 1.0 / ( self.x * self.x + self.z * self.z ).sqrt( ) )
    } else {
      Vec3::new( 0.0, self.z, -self.y ) * ( 1.0 / ( self.y * self.y + self.z * self.z ).sqrt( ) )
    }
  }
}

impl ops::Index< usize > for Vec3 {
  type Output = f32;

  fn index( &self, index : usize ) -> &f32 {
    match index {
      0 => &self.x,
      1 => &self.y,
      2 => &self.z,
      _ => panic!( "Vector component out of range" )
    }
  }
}

impl ops::Neg for Vec3 {
  type Output = Vec3;

  fn neg( self ) -> Vec3 {
    Vec3::new( -self.x, -self.y, -self.z )
  }
}

impl ops::Add< Vec3 > for Vec3 {
  type Output = Vec3;

  fn add( self, addend : Vec3 ) -> Vec3 {
    Vec3::new( self.x + addend.x, self.y + addend.y, self.z + addend.z )
  }
}

impl ops::AddAssign< Vec3 > for Vec3 {
  fn add_assign( &mut self, addend : Vec3 ) {
    self.x += addend.x;
    self.y += addend.y;
    self.z += addend.z;
  }
}

impl ops::Sub< Vec3 > for Vec3 {
  type Output = Vec3;

  fn sub( self, subtrahend : Vec3 ) -> Vec3 {
    Vec3::new( self.x - subtrahend.x, self.y - subtrahend.y, self.z - subtrahend.z )
  }
}

impl ops::Mul< f32 > for Vec3 {
  type Output = Vec3;

  fn mul( self, multiplier : f32 ) -> Vec3 {
    Vec3::new( multiplier * self.x, multiplier * self.y, multiplier * self.z )
  }
}

impl ops::Mul< Vec3 > for f32 {
  type Output = Vec3;

  fn mul( self, v : Vec3 ) -> Vec3 {
    Vec3::new( self * v.x, self * v.y, self * v.z )
  }
}

/// Componentwise product
impl ops::Mul< Vec3 > for Vec3 {
  type Output = Vec3;

  fn mul( self, rhs : Vec3 ) -> Vec3 {
    Vec3::new( self.x * rhs.x, self.y * rhs.y, self.z * rhs.z )
  }
}

impl ops::Div< f32 > for Vec3 {
  type Output = Vec3;

  fn div( self, divisor : f32 ) -> Vec3 {
    Vec3::new( self.x / divisor, self.y / divisor, self.z / divisor )
  }
}
