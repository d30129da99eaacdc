// Local imports
use crate::graphics::Aabb;
use crate::math::Vec3;

/// A triangle stored as indices into the scene's vertex and material tables
///
/// This is the form the scene tables, the octree, and a GPU upload all share
#[repr(C)]
#[derive(Copy,Clone,Debug,PartialEq)]
pub struct TriangleReference {
  pub vertex_indices : [u32; 3],
  pub material_index : u32
}

const _: () = assert!( std::mem::size_of::< TriangleReference >( ) == 16 );

impl TriangleReference {
  pub fn new( vertex_indices : [u32; 3], material_index : u32 ) -> TriangleReference {
    TriangleReference { vertex_indices, material_index }
  }
}

/// A triangle in 3-dimensional space, resolved to its vertex positions
///
/// Computed on demand from a `TriangleReference` and a vertex table
#[derive(Copy,Clone,Debug)]
pub struct Triangle {
  pub vertices : [Vec3; 3]
}

impl Triangle {
  pub fn new( v0 : Vec3, v1 : Vec3, v2 : Vec3 ) -> Triangle {
    Triangle { vertices: [v0, v1, v2] }
  }

  /// Resolves a reference against a vertex table
  pub fn resolve( reference : &TriangleReference, vertices : &[Vec3] ) -> Triangle {
    Triangle {
      vertices:
        [ vertices[ reference.vertex_indices[ 0 ] as usize ]
        , vertices[ reference.vertex_indices[ 1 ] as usize ]
        , vertices[ reference.vertex_indices[ 2 ] as usize ]
        ]
    }
  }

  pub fn center( &self ) -> Vec3 {
    ( self.vertices[ 0 ] + self.vertices[ 1 ] + self.vertices[ 2 ] ) * ( 1.0 / 3.0 )
  }

  /// Returns the geometric normal of the triangle. Counter-clockwise
  ///   vertex order yields the front side
  pub fn normal( &self ) -> Vec3 {
    ( self.vertices[ 1 ] - self.vertices[ 0 ] )
      .cross( self.vertices[ 2 ] - self.vertices[ 0 ] )
      .normalize( )
  }

  pub fn area( &self ) -> f32 {
    ( self.vertices[ 1 ] - self.vertices[ 0 ] )
      .cross( self.vertices[ 2 ] - self.vertices[ 0 ] )
      .len( ) * 0.5
  }

  pub fn aabb( &self ) -> Aabb {
    Aabb::around( self.vertices.iter( ) )
  }
}
