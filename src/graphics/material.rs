// Local imports
use crate::math::Vec4;

/// A surface material. All surfaces are diffuse; a material with any
///   positive emissive channel additionally acts as a light source
#[repr(C)]
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct Material {
  pub diffuse_color  : Vec4,
  pub emissive_color : Vec4
}

const _: () = assert!( std::mem::size_of::< Material >( ) == 32 );

impl Material {
  pub fn new( diffuse_color : Vec4, emissive_color : Vec4 ) -> Material {
    Material { diffuse_color, emissive_color }
  }

  /// Constructs a material that only reflects
  pub fn diffuse( diffuse_color : Vec4 ) -> Material {
    Material { diffuse_color, emissive_color: Vec4::ZERO }
  }

  /// True when any emissive channel is positive
  pub fn is_emissive( &self ) -> bool {
    self.emissive_color.x > 0.0
      || self.emissive_color.y > 0.0
      || self.emissive_color.z > 0.0
  }

  /// The summed RGB emission. Weighs a triangle's contribution to the
  ///   scene's total flux
  pub fn emissive_intensity( &self ) -> f32 {
    self.emissive_color.x + self.emissive_color.y + self.emissive_color.z
  }
}
