//! wgpu renderer shared by the web and native front-ends.
//!
//! The scene is drawn into an HDR target as instanced sprites plus the wave
//! mesh, then run through bright-pass, separable blur and a composite that
//! adds bloom and film noise.

mod gpu;
mod helpers;
pub mod pack;
mod post;
mod scene;
mod targets;

pub use gpu::GpuRenderer;
pub use post::PostUniforms;

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");
pub static POST_WGSL: &str = include_str!("../shaders/post.wgsl");
