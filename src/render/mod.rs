//! Window drawing: a single instanced quad pipeline fed from gameplay snapshots.

pub mod context;
pub mod quad;
pub mod renderer;
pub mod scene;

pub use renderer::Renderer;
