//! pagoda-garden
//!
//! A small garden of instanced pagodas around a rotating centerpiece, lit by a
//! hemisphere, a directional and a shadow-casting spot light, under a skybox
//! and fog. The pagoda orbs show a second scene of spinning hearts that is
//! rendered to a texture every frame. Runs natively and in the browser.
//!
//! High-level modules
//! - `app`: event loop, asset delivery and the per-frame passes
//! - `camera`: orbit camera, projection and their uniforms
//! - `config`: start-up configuration
//! - `context`: window surface, device, queue and shared pipelines
//! - `data_structures`: meshes, materials, instances, scene graph, geometry
//! - `frame`: time-driven animation pose and run loop control
//! - `gui`: keyboard driven debug panel for the lights
//! - `lights`: the light rig and its GPU uniform
//! - `offscreen`: the render-to-texture heart scene
//! - `pipelines`: Phong, shadow, sky and overlay pipelines
//! - `resources`: asset loading and progress tracking
//! - `render`: batching of scene nodes into draw calls
//! - `world`: placement of everything in the garden
//!

pub mod app;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod frame;
pub mod gui;
pub mod lights;
pub mod offscreen;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod world;

pub use app::{run, run_until_stopped};
pub use config::Config;
pub use frame::StopHandle;
