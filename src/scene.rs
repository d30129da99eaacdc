// Stdlib imports
use std::path::Path;
// External imports
use thiserror::Error;
// Local imports
use crate::data::Photon;
use crate::graphics::ray::{Hit, Ray};
use crate::graphics::sampling::sample_hemisphere_cosine_weighted;
use crate::graphics::{ray_triangle_intersection, Material, Octree, Triangle, TriangleReference};
use crate::import;
use crate::math::Vec3;
use crate::rng::Rng;

// The octree subdivides until a cell holds this many triangles, or until it
// reaches this depth
const OCTREE_MAX_DEPTH          : usize = 6;
const OCTREE_TRIANGLES_PER_CELL : usize = 200;

#[derive(Debug, Error)]
pub enum SceneError {
  #[error( "failed to import the scene file: {0}" )]
  Import( #[from] tobj::LoadError ),
  #[error( "the scene file contains no meshes" )]
  NoMeshes
}

/// The raw scene tables an importer produces
///
/// `vertex_positions` and `vertex_normals` are parallel arrays; every
///   triangle is referentially valid against them and the material table
pub struct SceneData {
  pub materials        : Vec< Material >,
  pub vertex_positions : Vec< Vec3 >,
  pub vertex_normals   : Vec< Vec3 >,
  pub triangles        : Vec< TriangleReference >
}

/// A loaded scene: the mesh and material tables, the emissive subset that
///   photons are shot from, and the octree over all triangles
///
/// Everything is populated once at load time and read-only afterwards, so
///   the render workers can share it freely
pub struct Scene {
  materials          : Vec< Material >,
  vertex_positions   : Vec< Vec3 >,
  vertex_normals     : Vec< Vec3 >,
  triangles          : Vec< TriangleReference >,
  emissive_triangles : Vec< TriangleReference >,
  total_flux         : f32,
  octree             : Octree
}

impl Scene {
  /// A scene with no geometry at all. Rays miss and no photons are emitted
  pub fn empty( ) -> Scene {
    Scene::from_data( SceneData {
      materials:        Vec::new( ),
      vertex_positions: Vec::new( ),
      vertex_normals:   Vec::new( ),
      triangles:        Vec::new( )
    } )
  }

  /// Imports a scene file and builds the derived tables
  pub fn load( path : &Path ) -> Result< Scene, SceneError > {
    let data = import::load_scene_from_file( path )?;
    Ok( Scene::from_data( data ) )
  }

  /// Builds a scene from importer output: records the emissive triangles
  ///   and their summed flux, and builds the octree
  pub fn from_data( data : SceneData ) -> Scene {
    let SceneData { materials, vertex_positions, vertex_normals, triangles } = data;

    let mut emissive_triangles = Vec::new( );
    let mut total_flux = 0.0;
    for reference in &triangles {
      let material = &materials[ reference.material_index as usize ];
      if material.is_emissive( ) {
        let triangle = Triangle::resolve( reference, &vertex_positions );
        total_flux += material.emissive_intensity( ) * triangle.area( );
        emissive_triangles.push( *reference );
      }
    }

    let mut octree = Octree::new( &vertex_positions, OCTREE_MAX_DEPTH, OCTREE_TRIANGLES_PER_CELL );
    for reference in &triangles {
      octree.insert_triangle( *reference, &vertex_positions );
    }
    octree.build( );

    log::info!( "scene: {} triangles, {} vertices, {} emissive triangles, total flux {}",
                triangles.len( ), vertex_positions.len( ), emissive_triangles.len( ), total_flux );
    log::debug!( "octree: {} cells, {} triangle slots",
                 octree.cells( ).len( ), octree.triangle_refs( ).len( ) );

    Scene { materials, vertex_positions, vertex_normals, triangles, emissive_triangles, total_flux, octree }
  }

  /// Finds the nearest triangle along the ray
  ///
  /// This walks the full triangle table; the octree serves the other
  ///   consumers (and a GPU upload), not this loop
  pub fn shoot_ray( &self, ray : &Ray ) -> Option< Hit > {
    let mut nearest : Option< ( f32, Vec3, Vec3, &TriangleReference ) > = None;

    for reference in &self.triangles {
      let triangle = Triangle::resolve( reference, &self.vertex_positions );
      if let Some( intersection ) = ray_triangle_intersection( ray, &triangle ) {
        let is_nearer = match &nearest {
          Some( ( distance, _, _, _ ) ) => intersection.distance < *distance,
          None => true
        };
        if is_nearer {
          nearest = Some( ( intersection.distance, intersection.position,
                            intersection.barycentric, reference ) );
        }
      }
    }

    nearest.map( | ( distance, position, barycentric, reference ) | {
      Hit {
        distance,
        position,
        normal: self.interpolated_normal( reference, barycentric ),
        material_index: reference.material_index
      }
    } )
  }

  /// Emits exactly `count` photons from the emissive triangles, or none at
  ///   all when the scene has no lights
  ///
  /// Each photon starts on a uniformly sampled point of a uniformly chosen
  ///   emissive triangle, leaves along a cosine-weighted direction in the
  ///   surface's upper hemisphere, and carries the material's emissive
  ///   color
  pub fn generate_photons( &self, count : usize, rng : &mut Rng, dst : &mut Vec< Photon > ) {
    dst.clear( );
    if self.emissive_triangles.is_empty( ) {
      return;
    }
    dst.reserve( count );

    for _i in 0..count {
      let reference = &self.emissive_triangles[ rng.next_in_range( 0, self.emissive_triangles.len( ) ) ];
      let triangle = Triangle::resolve( reference, &self.vertex_positions );

      let u = rng.next( );
      let v = ( 1.0 - u ) * rng.next( );
      let w = 1.0 - u - v;
      let barycentric = Vec3::new( v, w, u );

      let position = triangle.vertices[ 0 ] * u
                   + triangle.vertices[ 1 ] * v
                   + triangle.vertices[ 2 ] * w;

      let frame_z = self.interpolated_normal( reference, barycentric );
      let frame_x = frame_z.orthogonal( );
      let frame_y = frame_x.cross( frame_z );

      let local = sample_hemisphere_cosine_weighted( rng.next( ), rng.next( ) );
      let direction = frame_x * local.x + frame_y * local.y + frame_z * local.z;

      dst.push( Photon {
        position,
        direction,
        color: self.materials[ reference.material_index as usize ].emissive_color
      } );
    }
  }

  // The barycentric mix of the triangle's vertex normals, normalized.
  // `barycentric` is (u, v, w) with u weighing the second vertex, v the
  // third, and w the first
  fn interpolated_normal( &self, reference : &TriangleReference, barycentric : Vec3 ) -> Vec3 {
    let n0 = self.vertex_normals[ reference.vertex_indices[ 0 ] as usize ];
    let n1 = self.vertex_normals[ reference.vertex_indices[ 1 ] as usize ];
    let n2 = self.vertex_normals[ reference.vertex_indices[ 2 ] as usize ];
    ( n0 * barycentric.z + n1 * barycentric.x + n2 * barycentric.y ).normalize( )
  }

  pub fn material( &self, index : u32 ) -> &Material {
    &self.materials[ index as usize ]
  }

  pub fn materials( &self ) -> &[Material] {
    &self.materials
  }

  pub fn vertex_positions( &self ) -> &[Vec3] {
    &self.vertex_positions
  }

  pub fn vertex_normals( &self ) -> &[Vec3] {
    &self.vertex_normals
  }

  pub fn triangles( &self ) -> &[TriangleReference] {
    &self.triangles
  }

  pub fn emissive_triangles( &self ) -> &[TriangleReference] {
    &self.emissive_triangles
  }

  /// The summed emissive power of the scene, weighted by triangle area
  pub fn total_flux( &self ) -> f32 {
    self.total_flux
  }

  pub fn octree( &self ) -> &Octree {
    &self.octree
  }

  pub fn triangle( &self, reference : &TriangleReference ) -> Triangle {
    Triangle::resolve( reference, &self.vertex_positions )
  }
}

#[cfg(test)]
pub(crate) mod test_scenes {
  use super::*;
  use crate::math::Vec4;

  pub const CORNELL_LIGHT_HEIGHT : f32 = 1.99;

  // Pushes a quad as two triangles, with the face normal on every vertex
  fn push_quad( data     : &mut SceneData
              , corners  : [Vec3; 4]
              , normal   : Vec3
              , material : u32
              ) {
    let base = data.vertex_positions.len( ) as u32;
    for corner in &corners {
      data.vertex_positions.push( *corner );
      data.vertex_normals.push( normal );
    }
    data.triangles.push( TriangleReference::new( [base, base + 1, base + 2], material ) );
    data.triangles.push( TriangleReference::new( [base, base + 2, base + 3], material ) );
  }

  /// A Cornell box spanning [-1;1] in x and z and [0;2] in y, with a
  ///   square light just below the ceiling
  pub fn cornell_box( ) -> SceneData {
    let mut data = SceneData {
      materials: vec!
        [ Material::diffuse( Vec4::new( 0.8, 0.8, 0.8, 1.0 ) )   // white
        , Material::diffuse( Vec4::new( 0.8, 0.1, 0.1, 1.0 ) )   // red
        , Material::diffuse( Vec4::new( 0.1, 0.8, 0.1, 1.0 ) )   // green
        , Material::new( Vec4::new( 0.8, 0.8, 0.8, 1.0 ),        // light
                         Vec4::new( 10.0, 10.0, 10.0, 1.0 ) )
        ],
      vertex_positions: Vec::new( ),
      vertex_normals:   Vec::new( ),
      triangles:        Vec::new( )
    };

    // floor
    push_quad( &mut data,
      [ Vec3::new( -1.0, 0.0, -1.0 ), Vec3::new( 1.0, 0.0, -1.0 )
      , Vec3::new( 1.0, 0.0, 1.0 ), Vec3::new( -1.0, 0.0, 1.0 ) ],
      Vec3::POSITIVE_Y, 0 );
    // ceiling
    push_quad( &mut data,
      [ Vec3::new( -1.0, 2.0, -1.0 ), Vec3::new( -1.0, 2.0, 1.0 )
      , Vec3::new( 1.0, 2.0, 1.0 ), Vec3::new( 1.0, 2.0, -1.0 ) ],
      Vec3::new( 0.0, -1.0, 0.0 ), 0 );
    // back wall
    push_quad( &mut data,
      [ Vec3::new( -1.0, 0.0, -1.0 ), Vec3::new( -1.0, 2.0, -1.0 )
      , Vec3::new( 1.0, 2.0, -1.0 ), Vec3::new( 1.0, 0.0, -1.0 ) ],
      Vec3::POSITIVE_Z, 0 );
    // left wall (red)
    push_quad( &mut data,
      [ Vec3::new( -1.0, 0.0, -1.0 ), Vec3::new( -1.0, 0.0, 1.0 )
      , Vec3::new( -1.0, 2.0, 1.0 ), Vec3::new( -1.0, 2.0, -1.0 ) ],
      Vec3::POSITIVE_X, 1 );
    // right wall (green)
    push_quad( &mut data,
      [ Vec3::new( 1.0, 0.0, -1.0 ), Vec3::new( 1.0, 2.0, -1.0 )
      , Vec3::new( 1.0, 2.0, 1.0 ), Vec3::new( 1.0, 0.0, 1.0 ) ],
      Vec3::new( -1.0, 0.0, 0.0 ), 2 );
    // the light, just below the ceiling, pointing down
    let h = CORNELL_LIGHT_HEIGHT;
    push_quad( &mut data,
      [ Vec3::new( -0.5, h, -0.5 ), Vec3::new( -0.5, h, 0.5 )
      , Vec3::new( 0.5, h, 0.5 ), Vec3::new( 0.5, h, -0.5 ) ],
      Vec3::new( 0.0, -1.0, 0.0 ), 3 );

    data
  }
}
