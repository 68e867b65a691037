pub mod frame_renderer;
pub mod vertex;

// Re-export main types
pub use frame_renderer::FrameRenderer;
pub use vertex::Vertex3D;
