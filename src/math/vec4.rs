
use std::ops;

/// A 4-component float vector. Used for RGBA colors and radiance values
#[repr(C, align(16))]
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct Vec4 {
  pub x : f32,
  pub y : f32,
  pub z : f32,
  pub w : f32
}

const _: () = assert!( std::mem::size_of::< Vec4 >( ) == 16 );

impl Vec4 {
  pub const ZERO: Vec4 = Vec4 { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };
  pub const ONE:  Vec4 = Vec4 { x: 1.0, y: 1.0, z: 1.0, w: 1.0 };

  pub fn new( x : f32, y : f32, z : f32, w : f32 ) -> Vec4 {
    Vec4 { x, y, z, w }
  }
}

impl ops::Index< usize > for Vec4 {
  type Output = f32;

  fn index( &self, index : usize ) -> &f32 {
    match index {
      0 => &self.x,
      1 => &self.y,
      2 => &self.z,
      3 => &self.w,
      _ => panic!( "Vector component out of range" )
    }
  }
}

impl ops::Add< Vec4 > for Vec4 {
  type Output = Vec4;

  fn add( self, addend : Vec4 ) -> Vec4 {
    Vec4::new( self.x + addend.x, self.y + addend.y, self.z + addend.z, self.w + addend.w )
  }
}

impl ops::AddAssign< Vec4 > for Vec4 {
  fn add_assign( &mut self, addend : Vec4 ) {
    self.x += addend.x;
    self.y += addend.y;
    self.z += addend.z;
    self.w += addend.w;
  }
}

impl ops::Mul< f32 > for Vec4 {
  type Output = Vec4;

  fn mul( self, multiplier : f32 ) -> Vec4 {
    Vec4::new( multiplier * self.x, multiplier * self.y, multiplier * self.z, multiplier * self.w )
  }
}

impl ops::Mul< Vec4 > for f32 {
  type Output = Vec4;

  fn mul( self, v : Vec4 ) -> Vec4 {
    Vec4::new( self * v.x, self * v.y, self * v.z, self * v.w )
  }
}

/// Componentwise product. This is how color throughput attenuates
impl ops::Mul< Vec4 > for Vec4 {
  type Output = Vec4;

  fn mul( self, rhs : Vec4 ) -> Vec4 {
    Vec4::new( self.x * rhs.x, self.y * rhs.y, self.z * rhs.z, self.w * rhs.w )
  }
}

impl ops::Div< f32 > for Vec4 {
  type Output = Vec4;

  fn div( self, divisor : f32 ) -> Vec4 {
    let inverse = 1.0 / divisor;
    Vec4::new( self.x * inverse, self.y * inverse, self.z * inverse, self.w * inverse )
  }
}
