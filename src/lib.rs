// src/lib.rs
//! Lantern
//!
//! An interactive lighting demo built on wgpu and winit: a grid of
//! textured cubes lit by a directional light, four point lights, and a
//! camera-mounted spotlight, explored with a free-fly camera.

pub mod app;
pub mod gfx;

// Re-export main types for convenience
pub use app::LanternApp;

/// Creates an application instance with the built-in fallback textures.
pub fn default() -> anyhow::Result<LanternApp> {
    LanternApp::new(
        gfx::texture::PixelData::fallback(),
        gfx::texture::PixelData::fallback(),
    )
}
