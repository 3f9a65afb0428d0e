//! This module contains the GL resource wrappers: the device call surface,
//! shader programs with their attribute buffers, and framebuffers.

#[cfg(feature = "demo")]
pub mod app;
pub mod device;
pub mod framebuffer;
pub mod shader;
#[cfg(test)]
pub(crate) mod testing;

#[cfg(feature = "demo")]
pub use app::*;
pub use device::*;
pub use framebuffer::*;
pub use shader::*;
