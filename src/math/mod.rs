mod vec2;
mod vec3;
mod vec4;

pub use vec2::Vec2;
pub use vec3::Vec3;
pub use vec4::Vec4;

// Some arbitrary math utilities

/// The distance by which secondary rays are pushed off their surface, to
/// avoid re-intersecting it
pub static EPSILON : f32 = 1e-6;

pub fn clamp( x : f32, min_val : f32, max_val : f32 ) -> f32 {
  max_val.min( min_val.max( x ) )
}
