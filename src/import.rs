// Stdlib imports
use std::path::Path;
// Local imports
use crate::graphics::{Material, Triangle, TriangleReference};
use crate::math::{Vec3, Vec4};
use crate::scene::{SceneData, SceneError};

// The asset-import collaborator. It turns an OBJ/MTL file pair into the
// in-memory scene tables; everything downstream assumes triangulated faces
// and smooth per-vertex normals, so both are established here

/// Loads a scene file into the raw scene tables
///
/// Faces are triangulated and indices unified during the load. Materials
///   map `Kd` onto the diffuse color and `Ke` onto the emissive color; a
///   gray fallback material covers meshes without one. Fails when the file
///   cannot be read or holds no triangles
pub fn load_scene_from_file( path : &Path ) -> Result< SceneData, SceneError > {
  let ( models, materials ) = tobj::load_obj( path, &tobj::GPU_LOAD_OPTIONS )?;
  if models.is_empty( ) {
    return Err( SceneError::NoMeshes );
  }

  // A missing or broken MTL file leaves every mesh on the fallback material
  let materials = materials.unwrap_or_default( );

  let mut data = SceneData {
    materials:        materials.iter( ).map( convert_material ).collect( ),
    vertex_positions: Vec::new( ),
    vertex_normals:   Vec::new( ),
    triangles:        Vec::new( )
  };
  let fallback_material = data.materials.len( ) as u32;
  data.materials.push( Material::diffuse( Vec4::new( 0.8, 0.8, 0.8, 1.0 ) ) );

  for model in &models {
    let mesh = &model.mesh;
    let vertex_offset = data.vertex_positions.len( ) as u32;

    for position in mesh.positions.chunks_exact( 3 ) {
      data.vertex_positions.push( Vec3::new( position[ 0 ], position[ 1 ], position[ 2 ] ) );
    }
    if mesh.normals.len( ) == mesh.positions.len( ) {
      for normal in mesh.normals.chunks_exact( 3 ) {
        data.vertex_normals.push( Vec3::new( normal[ 0 ], normal[ 1 ], normal[ 2 ] ) );
      }
    } else {
      // Filled in by `generate_missing_normals` below
      data.vertex_normals.resize( data.vertex_positions.len( ), Vec3::ZERO );
    }

    let material_index = mesh.material_id.map( | id | id as u32 ).unwrap_or( fallback_material );
    for indices in mesh.indices.chunks_exact( 3 ) {
      data.triangles.push( TriangleReference::new(
        [ vertex_offset + indices[ 0 ]
        , vertex_offset + indices[ 1 ]
        , vertex_offset + indices[ 2 ]
        ], material_index ) );
    }
  }

  if data.triangles.is_empty( ) {
    return Err( SceneError::NoMeshes );
  }

  generate_missing_normals( &mut data );
  Ok( data )
}

fn convert_material( material : &tobj::Material ) -> Material {
  let diffuse = material.diffuse;
  // `Ke` has no dedicated field; it comes through as an unparsed statement
  let emissive = material.unknown_param.get( "Ke" )
    .map( | value | parse_color( value ) )
    .unwrap_or( [0.0, 0.0, 0.0] );

  Material::new(
    Vec4::new( diffuse[ 0 ], diffuse[ 1 ], diffuse[ 2 ], 1.0 ),
    Vec4::new( emissive[ 0 ], emissive[ 1 ], emissive[ 2 ], 1.0 ) )
}

fn parse_color( value : &str ) -> [f32; 3] {
  let mut color = [0.0; 3];
  for ( i, component ) in value.split_whitespace( ).take( 3 ).enumerate( ) {
    color[ i ] = component.parse( ).unwrap_or( 0.0 );
  }
  color
}

// Smooth per-vertex normals for vertices the file did not provide any:
// every face adds its area-weighted normal onto its (missing) vertices,
// which then get normalized
fn generate_missing_normals( data : &mut SceneData ) {
  let missing : Vec< bool > = data.vertex_normals.iter( )
    .map( | n | n.len_sq( ) < 1e-12 )
    .collect( );
  if !missing.iter( ).any( | m | *m ) {
    return;
  }

  for reference in &data.triangles {
    let triangle = Triangle::resolve( reference, &data.vertex_positions );
    let weighted_normal = ( triangle.vertices[ 1 ] - triangle.vertices[ 0 ] )
      .cross( triangle.vertices[ 2 ] - triangle.vertices[ 0 ] );
    for &vertex_index in &reference.vertex_indices {
      if missing[ vertex_index as usize ] {
        data.vertex_normals[ vertex_index as usize ] += weighted_normal;
      }
    }
  }

  for ( normal, was_missing ) in data.vertex_normals.iter_mut( ).zip( missing ) {
    if was_missing {
      *normal = if normal.len_sq( ) > 0.0 {
        normal.normalize( )
      } else {
        // A vertex no triangle references
        Vec3::POSITIVE_Z
      };
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn parses_color_statements( ) {
    assert_eq!( parse_color( "1.0 0.5 0.25" ), [1.0, 0.5, 0.25] );
    assert_eq!( parse_color( "3" ), [3.0, 0.0, 0.0] );
    assert_eq!( parse_color( "" ), [0.0, 0.0, 0.0] );
  }

  #[test]
  fn generates_smooth_normals_where_missing( ) {
    let mut data = SceneData {
      materials: vec![ Material::diffuse( Vec4::ONE ) ],
      vertex_positions: vec!
        [ Vec3::new( 0.0, 0.0, 0.0 )
        , Vec3::new( 1.0, 0.0, 0.0 )
        , Vec3::new( 0.0, 1.0, 0.0 )
        ],
      vertex_normals: vec![ Vec3::ZERO; 3 ],
      triangles: vec![ TriangleReference::new( [0, 1, 2], 0 ) ]
    };

    generate_missing_normals( &mut data );

    for normal in &data.vertex_normals {
      assert!( ( *normal - Vec3::POSITIVE_Z ).len( ) < 1e-6 );
    }
  }

  #[test]
  fn keeps_normals_the_file_provided( ) {
    let provided = Vec3::new( 0.0, 0.6, 0.8 );
    let mut data = SceneData {
      materials: vec![ Material::diffuse( Vec4::ONE ) ],
      vertex_positions: vec!
        [ Vec3::new( 0.0, 0.0, 0.0 )
        , Vec3::new( 1.0, 0.0, 0.0 )
        , Vec3::new( 0.0, 1.0, 0.0 )
        ],
      vertex_normals: vec![ provided; 3 ],
      triangles: vec![ TriangleReference::new( [0, 1, 2], 0 ) ]
    };

    generate_missing_normals( &mut data );

    for normal in &data.vertex_normals {
      assert_eq!( *normal, provided );
    }
  }

  #[test]
  fn missing_files_fail_the_import( ) {
    assert!( load_scene_from_file( Path::new( "does-not-exist.obj" ) ).is_err( ) );
  }
}
