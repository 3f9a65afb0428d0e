//! Convenience wrappers around OpenGL for rendering user interfaces.
//!
//! The crate provides two independent building blocks on top of [`glow`]:
//!
//! - [`ShaderProgram`] compiles and links GLSL stages, owns a vertex array object and a registry
//!   of named, versioned attribute buffers, and issues draw calls.
//! - [`Framebuffer`] is an off-screen render target with optional multisampling that can be
//!   blitted onto the window.
//!
//! Both are generic over the [`Device`] trait and default to [`glow::Context`]. All calls must
//! happen on the thread that owns the current GL context.

pub mod abs;
pub mod asset;
pub mod error;

pub use abs::*;
pub use asset::{ShaderManifest, ShaderManifests};
pub use error::{GlError, Result};
