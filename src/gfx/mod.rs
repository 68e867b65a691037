//! # Graphics Module
//!
//! Everything that turns scene and camera state into pixels:
//!
//! - **Camera** ([`camera`]) - free-fly camera with mouse-look, scroll
//!   zoom, and frame-rate-independent movement
//! - **Shaders** ([`shader`]) - two-stage program lifecycle with host-side
//!   compile/link diagnostics and a by-name uniform interface
//! - **Rendering** ([`rendering`]) - the per-frame draw orchestration
//! - **Scene data** ([`scene`], [`geometry`], [`lighting`]) - fixed cube
//!   transforms, mesh data, and the light rig
//! - **Textures** ([`texture`]) - decoded-pixel upload and samplers

pub mod camera;
pub mod geometry;
pub mod lighting;
pub mod rendering;
pub mod scene;
pub mod shader;
pub mod texture;

// Re-export commonly used types
pub use camera::{CameraController, FlyCamera};
pub use rendering::FrameRenderer;
pub use shader::ShaderProgram;
