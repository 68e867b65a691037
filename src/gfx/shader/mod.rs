pub mod gpu;
pub mod program;
pub mod reflect;

// Re-export main types
pub use gpu::RealizeParams;
pub use program::{BuildState, ShaderError, ShaderProgram};
pub use reflect::{UniformBlock, UniformSlot, UniformType};
