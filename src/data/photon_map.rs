// Local imports
use crate::math::{Vec3, Vec4};

/// A packet of light energy deposited on a surface
///
/// The direction is the direction the photon was travelling when it hit,
///   and the color is its accumulated throughput
#[derive(Copy,Clone,Debug)]
pub struct Photon {
  pub position  : Vec3,
  pub direction : Vec3,
  pub color     : Vec4
}

// One slot of the implicit heap. The tree is complete down to its last
// level, so children live at 2i+1 and 2i+2 and slots past the built part
// stay vacant
#[derive(Clone)]
enum Node {
  Vacant,
  Leaf  { begin : usize, end : usize },
  Split { plane_axis : usize, plane_position : f32 }
}

/// A balanced k-d tree over photons, for k-nearest-neighbour queries
///
/// `build` recursively median-splits a photon slice in place, cycling the
///   split axis, until a slice fits in a leaf. The tree only stores index
///   ranges into that slice; queries take the same (now partially sorted)
///   slice again
pub struct PhotonMap {
  max_children : usize,
  nodes        : Vec< Node >
}

fn left_child( index : usize ) -> usize {
  2 * index + 1
}

fn right_child( index : usize ) -> usize {
  2 * index + 2
}

impl PhotonMap {
  pub fn new( ) -> PhotonMap {
    PhotonMap { max_children: 0, nodes: Vec::new( ) }
  }

  /// Builds the tree over `photons`, reordering them in place
  ///
  /// Leaves hold at most `max_children` photons. The node array is sized
  ///   upfront for the complete tree of the resulting depth
  pub fn build( &mut self, photons : &mut [Photon], max_children : usize ) {
    self.max_children = max_children;

    let minimum_leaf_count = photons.len( ) as f64 / max_children as f64;
    let tree_depth = minimum_leaf_count.max( 1.0 ).log2( ).ceil( );
    let node_count = ( 2.0_f64.powf( tree_depth + 1.0 ) - 1.0 ) as usize;

    self.nodes.clear( );
    self.nodes.resize( node_count, Node::Vacant );
    self.insert_into_node( 0, 0, photons, 0, photons.len( ) );
  }

  fn insert_into_node( &mut self
                     , node_index : usize
                     , plane_axis : usize
                     , photons    : &mut [Photon]
                     , begin      : usize
                     , end        : usize
                     ) {
    let photon_count = end - begin;
    if photon_count <= self.max_children {
      self.nodes[ node_index ] = Node::Leaf { begin, end };
    } else {
      photons[ begin..end ].sort_unstable_by( | lhs, rhs |
        lhs.position[ plane_axis ].partial_cmp( &rhs.position[ plane_axis ] ).unwrap( ) );

      let median_index = begin + photon_count / 2;
      let plane_position = photons[ median_index ].position[ plane_axis ];
      self.nodes[ node_index ] = Node::Split { plane_axis, plane_position };

      let next_plane_axis = ( plane_axis + 1 ) % 3;
      self.insert_into_node( left_child( node_index ), next_plane_axis, photons, begin, median_index );
      self.insert_into_node( right_child( node_index ), next_plane_axis, photons, median_index, end );
    }
  }

  /// Collects the `k` photons nearest to `position` into `dst`, ordered by
  ///   ascending distance
  ///
  /// `photons` must be the slice that `build` reordered. Fewer than `k`
  ///   photons are returned only when the map holds fewer than `k`
  pub fn k_nearest_neighbors( &self
                            , photons  : &[Photon]
                            , position : Vec3
                            , k        : usize
                            , dst      : &mut Vec< Photon >
                            ) {
    dst.clear( );
    if self.nodes.is_empty( ) {
      return;
    }
    dst.reserve( 3 * self.max_children );
    self.query_node( 0, photons, position, k, dst );
  }

  fn query_node( &self
               , node_index : usize
               , photons    : &[Photon]
               , position   : Vec3
               , k          : usize
               , dst        : &mut Vec< Photon >
               ) {
    match self.nodes[ node_index ] {
      Node::Vacant => { },
      Node::Leaf { begin, end } => {
        dst.extend_from_slice( &photons[ begin..end ] );
      },
      Node::Split { plane_axis, plane_position } => {
        let signed_distance_to_plane = position[ plane_axis ] - plane_position;
        let distance_to_plane_sq = signed_distance_to_plane * signed_distance_to_plane;

        let ( near, far ) =
          if position[ plane_axis ] < plane_position {
            ( left_child( node_index ), right_child( node_index ) )
          } else {
            ( right_child( node_index ), left_child( node_index ) )
          };

        self.query_node( near, photons, position, k, dst );

        // The far side can only contribute when the result is not full
        // yet, or when the farthest accepted photon is farther away than
        // the splitting plane itself
        let max_photon_distance_sq =
          if let Some( photon ) = dst.last( ) {
            ( photon.position - position ).len_sq( )
          } else {
            f32::INFINITY
          };
        if dst.len( ) < k || max_photon_distance_sq > distance_to_plane_sq {
          self.query_node( far, photons, position, k, dst );
        }
      }
    }

    dst.sort_unstable_by( | lhs, rhs |
      ( lhs.position - position ).len_sq( )
        .partial_cmp( &( rhs.position - position ).len_sq( ) ).unwrap( ) );
    if dst.len( ) > k {
      dst.truncate( k );
    }
  }
}
