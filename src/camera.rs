// Stdlib imports
use std::f32::consts::{FRAC_PI_2, PI};
// Local imports
use crate::math::Vec3;

/// The scene camera: a position plus a yaw/pitch orientation
///
/// The defaults place it at (0, 1, 10) looking down the negative z-axis,
///   which frames the usual test scenes
pub struct Camera {
  position : Vec3,
  yaw      : f32,
  pitch    : f32,

  vertical_field_of_view   : f32,
  // Reserved; derived from the vertical field of view when it ever gets used
  horizontal_field_of_view : f32
}

impl Default for Camera {
  fn default( ) -> Camera {
    Camera::new( )
  }
}

impl Camera {
  pub fn new( ) -> Camera {
    Camera {
      position: Vec3::new( 0.0, 1.0, 10.0 ),
      yaw:      PI,
      pitch:    0.0,
      vertical_field_of_view:   FRAC_PI_2,
      horizontal_field_of_view: f32::NAN
    }
  }

  pub fn position( &self ) -> Vec3 {
    self.position
  }

  pub fn vertical_field_of_view( &self ) -> f32 {
    self.vertical_field_of_view
  }

  pub fn horizontal_field_of_view( &self ) -> f32 {
    self.horizontal_field_of_view
  }

  /// Translates the camera by `offset`, in world space
  pub fn move_by( &mut self, offset : Vec3 ) {
    self.position += offset;
  }

  /// Turns the camera. The angles accumulate without clamping
  pub fn rotate( &mut self, yaw : f32, pitch : f32 ) {
    self.yaw += yaw;
    self.pitch += pitch;
  }

  /// Returns the camera's `(right, up, forward)` basis
  ///
  /// These are the columns of the yaw-pitch-roll rotation matrix with a
  ///   roll of zero, written out directly
  pub fn axis_vectors( &self ) -> (Vec3, Vec3, Vec3) {
    let ( sin_yaw, cos_yaw ) = self.yaw.sin_cos( );
    let ( sin_pitch, cos_pitch ) = self.pitch.sin_cos( );

    let right   = Vec3::new( cos_yaw, 0.0, -sin_yaw );
    let up      = Vec3::new( sin_yaw * sin_pitch, cos_pitch, cos_yaw * sin_pitch );
    let forward = Vec3::new( sin_yaw * cos_pitch, -sin_pitch, cos_yaw * cos_pitch );

    ( right, up, forward )
  }
}

#[cfg(test)]
mod test {
  use super::Camera;
  use crate::math::Vec3;

  fn assert_close( a : Vec3, b : Vec3 ) {
    assert!( ( a - b ).len( ) < 1e-5, "{:?} != {:?}", a, b );
  }

  #[test]
  fn default_pose_looks_down_negative_z( ) {
    let ( right, up, forward ) = Camera::new( ).axis_vectors( );
    assert_close( right, Vec3::new( -1.0, 0.0, 0.0 ) );
    assert_close( up, Vec3::new( 0.0, 1.0, 0.0 ) );
    assert_close( forward, Vec3::new( 0.0, 0.0, -1.0 ) );
  }

  #[test]
  fn basis_stays_orthonormal_under_rotation( ) {
    let mut camera = Camera::new( );
    camera.rotate( 0.7, -0.3 );
    camera.rotate( -1.9, 0.8 );

    let ( right, up, forward ) = camera.axis_vectors( );
    for v in &[right, up, forward] {
      assert!( ( v.len( ) - 1.0 ).abs( ) < 1e-5 );
    }
    assert!( right.dot( up ).abs( ) < 1e-5 );
    assert!( right.dot( forward ).abs( ) < 1e-5 );
    assert!( up.dot( forward ).abs( ) < 1e-5 );
  }

  #[test]
  fn move_by_accumulates( ) {
    let mut camera = Camera::new( );
    camera.move_by( Vec3::new( 1.0, 0.0, 0.0 ) );
    camera.move_by( Vec3::new( 0.0, 2.0, 0.0 ) );
    assert_eq!( camera.position( ), Vec3::new( 1.0, 3.0, 10.0 ) );
  }
}
