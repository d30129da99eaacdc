// A CPU renderer for triangle-mesh scenes, built around progressive photon
// mapping. Eye rays are traced from the camera to find the surface behind
// each pixel; photons are shot from the emissive surfaces and bounced
// diffusely through the scene; the density of nearby photons at each surface
// point then yields its radiance.
//
// Exports:
// * `math`     - small fixed-size float vectors
// * `graphics` - rays, triangles, bounding boxes, intersection tests, octree
// * `data`     - the photon map (a k-d tree over photons)
// * `pool`     - the task pool driving all render-time parallelism
// * `scene`    - the scene tables and ray/photon sources
// * `backend`  - the rendering backends (currently only the CPU one)

pub mod math;
pub mod rng;
pub mod timing;
pub mod graphics;
pub mod data;
pub mod pool;
pub mod camera;
pub mod viewport;
pub mod scene;
pub mod import;
pub mod backend;

pub use backend::{CpuBackend, RenderError, RenderingBackend};
pub use camera::Camera;
pub use scene::{Scene, SceneData, SceneError};
pub use viewport::Viewport;
