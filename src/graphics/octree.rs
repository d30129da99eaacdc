// Local imports
use crate::graphics::{triangle_aabb_intersection, Aabb, Triangle, TriangleReference};
use crate::math::Vec3;

/// A flattened octree cell
///
/// The whole tree is stored as one array of these, with one shared triangle
///   array that each cell addresses by range. That form iterates without
///   pointer chasing and uploads to a GPU buffer as-is
#[repr(C)]
#[derive(Copy,Clone,Debug)]
pub struct OctreeData {
  pub aabb_min        : Vec3,
  pub aabb_max        : Vec3,
  pub triangles_begin : u32,
  pub triangles_end   : u32,
  pub parent_index    : i32,
  pub child_indices   : [i32; 8]
}

const _: () = assert!( std::mem::size_of::< OctreeData >( ) == 80 );

impl OctreeData {
  pub fn is_leaf( &self ) -> bool {
    self.child_indices[ 0 ] < 0
  }
}

// The transient build form. Triangles live only in leaves; splitting a cell
// redistributes its triangles into the 8 new children
struct OctreeCell {
  depth     : usize,
  aabb      : Aabb,
  triangles : Vec< TriangleReference >,
  children  : Vec< OctreeCell >
}

/// An octree over the scene's triangles
///
/// Built once per scene load: triangles are inserted one by one, then
///   `build( )` flattens the cell tree into the `OctreeData` array
pub struct Octree {
  max_depth          : usize,
  triangles_per_cell : usize,
  root               : OctreeCell,
  data               : Vec< OctreeData >,
  triangles          : Vec< TriangleReference >
}

impl Octree {
  /// Constructs an empty octree whose root spans all of `vertex_positions`
  pub fn new( vertex_positions : &[Vec3], max_depth : usize, triangles_per_cell : usize ) -> Octree {
    Octree {
      max_depth,
      triangles_per_cell,
      root: OctreeCell {
        depth:     0,
        aabb:      Aabb::around( vertex_positions.iter( ) ),
        triangles: Vec::new( ),
        children:  Vec::new( )
      },
      data:      Vec::new( ),
      triangles: Vec::new( )
    }
  }

  /// Inserts one triangle, splitting any leaf that runs over capacity
  pub fn insert_triangle( &mut self, reference : TriangleReference, vertex_positions : &[Vec3] ) {
    let triangle = Triangle::resolve( &reference, vertex_positions );
    insert( &mut self.root, reference, &triangle, vertex_positions,
            self.max_depth, self.triangles_per_cell );
  }

  /// Flattens the cell tree into the cell and triangle arrays
  ///
  /// Cells are laid out in preorder, so the root is cell 0 and every cell
  ///   comes after its parent
  pub fn build( &mut self ) {
    self.data.clear( );
    self.triangles.clear( );

    self.data.reserve( count_cells( &self.root ) );
    self.triangles.reserve( count_triangles( &self.root ) );

    flatten( &self.root, -1, &mut self.data, &mut self.triangles );
  }

  /// The flattened cells. Empty before `build( )`
  pub fn cells( &self ) -> &[OctreeData] {
    &self.data
  }

  /// The shared triangle array the flattened cells address into
  pub fn triangle_refs( &self ) -> &[TriangleReference] {
    &self.triangles
  }
}

fn insert( cell               : &mut OctreeCell
         , reference          : TriangleReference
         , triangle           : &Triangle
         , vertex_positions   : &[Vec3]
         , max_depth          : usize
         , triangles_per_cell : usize
         ) {
  if !cell.children.is_empty( ) {
    for child in cell.children.iter_mut( ) {
      if triangle_aabb_intersection( triangle, &child.aabb ) {
        insert( child, reference, triangle, vertex_positions, max_depth, triangles_per_cell );
      }
    }
  } else if triangle_aabb_intersection( triangle, &cell.aabb ) {
    cell.triangles.push( reference );
    if cell.triangles.len( ) > triangles_per_cell && cell.depth < max_depth {
      split( cell, vertex_positions, max_depth, triangles_per_cell );
    }
  }
}

// Splits a leaf into 8 equal children by halving along each axis, and
// redistributes its triangles into them. A triangle may land in several
// children
fn split( cell               : &mut OctreeCell
        , vertex_positions   : &[Vec3]
        , max_depth          : usize
        , triangles_per_cell : usize
        ) {
  let center = cell.aabb.center( );
  let children_half_extend = cell.aabb.half_extend( ) * 0.5;
  let directions =
    [ Vec3::new(  1.0,  1.0,  1.0 ), Vec3::new( -1.0,  1.0,  1.0 )
    , Vec3::new(  1.0, -1.0,  1.0 ), Vec3::new( -1.0, -1.0,  1.0 )
    , Vec3::new(  1.0,  1.0, -1.0 ), Vec3::new( -1.0,  1.0, -1.0 )
    , Vec3::new(  1.0, -1.0, -1.0 ), Vec3::new( -1.0, -1.0, -1.0 )
    ];

  let parent_triangles = std::mem::take( &mut cell.triangles );

  cell.children.reserve( 8 );
  for direction in directions.iter( ) {
    let child_center = center + children_half_extend * *direction;
    let mut child = OctreeCell {
      depth:     cell.depth + 1,
      aabb:      Aabb::new( child_center - children_half_extend,
                            child_center + children_half_extend ),
      triangles: Vec::new( ),
      children:  Vec::new( )
    };
    for reference in parent_triangles.iter( ) {
      let triangle = Triangle::resolve( reference, vertex_positions );
      insert( &mut child, *reference, &triangle, vertex_positions, max_depth, triangles_per_cell );
    }
    cell.children.push( child );
  }
}

fn count_cells( cell : &OctreeCell ) -> usize {
  1 + cell.children.iter( ).map( count_cells ).sum::< usize >( )
}

fn count_triangles( cell : &OctreeCell ) -> usize {
  cell.triangles.len( ) + cell.children.iter( ).map( count_triangles ).sum::< usize >( )
}

// Writes `cell` and (recursively) its subtree into the flat arrays, and
// returns the index the cell ended up at
fn flatten( cell         : &OctreeCell
          , parent_index : i32
          , data         : &mut Vec< OctreeData >
          , triangles    : &mut Vec< TriangleReference >
          ) -> i32 {
  let index = data.len( ) as i32;
  let triangles_begin = triangles.len( ) as u32;
  triangles.extend_from_slice( &cell.triangles );

  data.push( OctreeData {
    aabb_min:        cell.aabb.min,
    aabb_max:        cell.aabb.max,
    triangles_begin,
    triangles_end:   triangles.len( ) as u32,
    parent_index,
    child_indices:   [-1; 8]
  } );

  for ( i, child ) in cell.children.iter( ).enumerate( ) {
    let child_index = flatten( child, index, data, triangles );
    data[ index as usize ].child_indices[ i ] = child_index;
  }

  index
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::rng::Rng;

  // A cloud of small random triangles in [-3;3]^3
  fn triangle_cloud( n : usize ) -> ( Vec< Vec3 >, Vec< TriangleReference > ) {
    let mut rng = Rng::seeded( 99 );
    let mut positions = Vec::with_capacity( n * 3 );
    let mut references = Vec::with_capacity( n );
    for i in 0..n {
      let center = Vec3::new( rng.next( ), rng.next( ), rng.next( ) ) * 6.0
                 - Vec3::new( 3.0, 3.0, 3.0 );
      for _j in 0..3 {
        let offset = Vec3::new( rng.next( ), rng.next( ), rng.next( ) ) * 0.5;
        positions.push( center + offset );
      }
      let v = ( i * 3 ) as u32;
      references.push( TriangleReference::new( [v, v + 1, v + 2], 0 ) );
    }
    ( positions, references )
  }

  fn build_octree( positions : &[Vec3], references : &[TriangleReference]
                 , max_depth : usize, triangles_per_cell : usize ) -> Octree {
    let mut octree = Octree::new( positions, max_depth, triangles_per_cell );
    for reference in references {
      octree.insert_triangle( *reference, positions );
    }
    octree.build( );
    octree
  }

  #[test]
  fn leaves_contain_only_overlapping_triangles( ) {
    let ( positions, references ) = triangle_cloud( 64 );
    let octree = build_octree( &positions, &references, 4, 4 );

    assert!( octree.cells( ).len( ) > 1 );
    for cell in octree.cells( ) {
      let aabb = Aabb::new( cell.aabb_min, cell.aabb_max );
      let range = cell.triangles_begin as usize..cell.triangles_end as usize;
      if cell.is_leaf( ) {
        for reference in &octree.triangle_refs( )[ range ] {
          let triangle = Triangle::resolve( reference, &positions );
          assert!( triangle_aabb_intersection( &triangle, &aabb ) );
        }
      } else {
        // Triangles live only in leaves
        assert!( range.is_empty( ) );
      }
    }
  }

  #[test]
  fn every_triangle_reaches_a_leaf( ) {
    let ( positions, references ) = triangle_cloud( 64 );
    let octree = build_octree( &positions, &references, 4, 4 );

    for reference in &references {
      assert!( octree.triangle_refs( ).contains( reference ) );
    }
  }

  #[test]
  fn never_splits_below_capacity( ) {
    let ( positions, references ) = triangle_cloud( 32 );
    let octree = build_octree( &positions, &references, 6, 32 );

    assert_eq!( octree.cells( ).len( ), 1 );
    assert_eq!( octree.triangle_refs( ).len( ), 32 );
  }

  #[test]
  fn depth_is_capped( ) {
    // Coincident triangles overflow every cell they reach, so the tree
    // splits until the depth cap stops it
    let ( positions, mut references ) = triangle_cloud( 1 );
    references = vec![ references[ 0 ]; 8 ];
    let max_depth = 3;
    let octree = build_octree( &positions, &references, max_depth, 1 );

    for ( index, _cell ) in octree.cells( ).iter( ).enumerate( ) {
      let mut depth = 0;
      let mut parent = octree.cells( )[ index ].parent_index;
      while parent >= 0 {
        depth += 1;
        parent = octree.cells( )[ parent as usize ].parent_index;
      }
      assert!( depth <= max_depth );
    }
  }

  #[test]
  fn parent_and_child_indices_are_consistent( ) {
    let ( positions, references ) = triangle_cloud( 64 );
    let octree = build_octree( &positions, &references, 4, 4 );

    assert_eq!( octree.cells( )[ 0 ].parent_index, -1 );
    for ( index, cell ) in octree.cells( ).iter( ).enumerate( ) {
      for &child in &cell.child_indices {
        if child >= 0 {
          assert_eq!( octree.cells( )[ child as usize ].parent_index, index as i32 );
        }
      }
    }
  }
}
