mod photon_map;

pub use photon_map::{Photon, PhotonMap};
