//! Scene data: models, textures, scene graphs, instances and procedural geometry.
//!
//! - `model` contains mesh and material definitions, GPU resources for 3D models
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `instance` holds per-instance transformation data
//! - `scene_graph` enables hierarchical scene organization
//! - `geometry` builds the primitive meshes (plane, box, cylinder, cone, sphere)
//! - `shape` extrudes Bézier outlines into solid meshes
//! - `color` and `environment` cover colors, fog and backgrounds

pub mod color;
pub mod environment;
pub mod geometry;
pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod shape;
pub mod texture;
