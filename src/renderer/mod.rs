//! WebGPU rendering module
//!
//! Frames are tessellated on the CPU into vertex-colored triangles and drawn
//! with a single alpha-blended pipeline.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, pixel_to_ndc};
pub use shapes::frame_vertices;
pub use vertex::Vertex;
