//! Error types for the GL wrappers.
//!
//! Every hard failure surfaces as a [`GlError`]. Soft conditions, such as an optional shader
//! input that the linker optimized away, are only logged.

use std::path::PathBuf;

use thiserror::Error;

/// Shorthand for results produced by this crate.
pub type Result<T> = std::result::Result<T, GlError>;

/// Everything that can go wrong while setting up or using GL resources.
#[derive(Error, Debug)]
pub enum GlError {
    /// A shader stage failed to compile.
    #[error("failed to compile {stage} shader \"{name}\": {log}")]
    Compile {
        stage: &'static str,
        name: String,
        log: String,
    },

    /// The program failed to link.
    #[error("failed to link shader program \"{name}\": {log}")]
    Link { name: String, log: String },

    /// A required stage (vertex or fragment) had no source.
    #[error("shader program \"{name}\" is missing a {stage} stage")]
    MissingStage { stage: &'static str, name: String },

    /// A shader source file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A shader manifest could not be parsed.
    #[error("invalid shader manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// The driver refused to create an object.
    #[error("GL object creation failed: {0}")]
    Device(String),

    /// No attribute buffer is registered under the name.
    #[error("attribute buffer \"{name}\" not found in shader program \"{program}\"")]
    AttributeNotFound { program: String, name: String },

    /// The attribute is an alias whose owning program released the buffer.
    #[error("attribute buffer \"{name}\" in shader program \"{program}\" refers to a freed buffer")]
    ExpiredAlias { program: String, name: String },

    /// Uploads to an aliased attribute are not allowed.
    #[error("attribute buffer \"{name}\" in shader program \"{program}\" is shared and read-only")]
    SharedAttribute { program: String, name: String },

    /// The data does not match the declared or stored buffer size.
    #[error("size mismatch for attribute buffer \"{name}\": expected {expected} bytes, got {actual}")]
    SizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// The typed download target does not match the stored component type.
    #[error("type mismatch for attribute buffer \"{name}\": stored {stored:?}, requested {requested:?}")]
    TypeMismatch {
        name: String,
        stored: crate::abs::ElementType,
        requested: crate::abs::ElementType,
    },

    /// An indexed draw was issued before any index buffer was uploaded.
    #[error("shader program \"{0}\" has no index buffer")]
    MissingIndices(String),

    /// An indexed draw range does not fit the device's signed 32-bit arguments.
    #[error("draw range of {count} at offset {offset} is too large for shader program \"{program}\"")]
    DrawRange {
        program: String,
        offset: u32,
        count: u32,
    },

    /// The operation needs a linked program.
    #[error("shader program \"{0}\" is not initialized")]
    NotInitialized(String),

    /// The framebuffer attachments were rejected by the driver.
    #[error("could not create framebuffer object: {0}")]
    IncompleteFramebuffer(&'static str),

    /// A framebuffer was requested with a non-positive size.
    #[error("invalid framebuffer size {0}x{1}")]
    InvalidSize(i32, i32),
}
