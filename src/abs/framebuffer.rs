//! Module to work with OpenGL framebuffers.
//!
//! This module provides an off-screen render target backed by a color and a depth/stencil
//! renderbuffer, optionally multisampled, that can be blitted onto the default framebuffer.

use std::sync::Arc;

use glam::IVec2;

use crate::abs::Device;
use crate::error::{GlError, Result};

/// Represents an OpenGL framebuffer with its renderbuffer attachments.
pub struct Framebuffer<D: Device = glow::Context> {
    gl: Arc<D>,
    fbo: Option<D::Framebuffer>,
    depth: Option<D::Renderbuffer>,
    color: Option<D::Renderbuffer>,
    size: IVec2,
    samples: u32,
}

impl<D: Device> Framebuffer<D> {
    /// Creates a framebuffer that is not backed by any GL objects yet.
    pub fn new(gl: &Arc<D>) -> Self {
        Self {
            gl: Arc::clone(gl),
            fbo: None,
            depth: None,
            color: None,
            size: IVec2::ZERO,
            samples: 0,
        }
    }

    /// Allocates the framebuffer and its attachments. `samples == 0` disables multisampling.
    pub fn init(&mut self, size: IVec2, samples: u32) -> Result<()> {
        self.free();
        if size.x <= 0 || size.y <= 0 {
            return Err(GlError::InvalidSize(size.x, size.y));
        }
        self.size = size;
        self.samples = samples;

        let (fbo, depth, color) = self.create_objects()?;
        self.fbo = Some(fbo);
        self.depth = Some(depth);
        self.color = Some(color);

        let status = unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
            self.attach(glow::COLOR_ATTACHMENT0, color);
            self.attach(glow::DEPTH_ATTACHMENT, depth);
            self.attach(glow::STENCIL_ATTACHMENT, depth);
            self.gl.draw_buffer(glow::COLOR_ATTACHMENT0);
            self.gl.read_buffer(glow::COLOR_ATTACHMENT0);
            let status = self.gl.check_framebuffer_status(glow::FRAMEBUFFER);
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            status
        };

        if status != glow::FRAMEBUFFER_COMPLETE {
            self.free();
            let reason = describe_status(status);
            log::error!("Could not create framebuffer object: {reason}");
            return Err(GlError::IncompleteFramebuffer(reason));
        }

        log::debug!(
            "Created {}x{} framebuffer with {} samples",
            size.x,
            size.y,
            samples
        );
        Ok(())
    }

    /// Binds the framebuffer for rendering.
    pub fn bind(&self) {
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, self.fbo);
            if self.samples > 0 {
                self.gl.enable(glow::MULTISAMPLE);
            }
        }
    }

    /// Unbinds the framebuffer, reverting to the default framebuffer.
    pub fn release(&self) {
        unsafe {
            if self.samples > 0 {
                self.gl.disable(glow::MULTISAMPLE);
            }
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
    }

    /// Copies the color contents onto the default framebuffer, resolving multisampling.
    pub fn blit(&self) {
        let Some(fbo) = self.fbo else {
            return;
        };
        unsafe {
            self.gl.bind_framebuffer(glow::READ_FRAMEBUFFER, Some(fbo));
            self.gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, None);
            self.gl.draw_buffer(glow::BACK);
            self.gl.blit_framebuffer(
                0,
                0,
                self.size.x,
                self.size.y,
                0,
                0,
                self.size.x,
                self.size.y,
                glow::COLOR_BUFFER_BIT,
                glow::NEAREST,
            );
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
    }

    /// Releases the framebuffer and both renderbuffers. Does nothing when not ready.
    pub fn free(&mut self) {
        unsafe {
            if let Some(fbo) = self.fbo.take() {
                self.gl.delete_framebuffer(fbo);
            }
            if let Some(depth) = self.depth.take() {
                self.gl.delete_renderbuffer(depth);
            }
            if let Some(color) = self.color.take() {
                self.gl.delete_renderbuffer(color);
            }
        }
    }

    /// Returns whether the framebuffer has been initialized and not freed since.
    pub fn ready(&self) -> bool {
        self.fbo.is_some()
    }

    /// Returns the number of MSAA samples, 0 if multisampling is disabled.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn size(&self) -> IVec2 {
        self.size
    }

    fn create_objects(&self) -> Result<(D::Framebuffer, D::Renderbuffer, D::Renderbuffer)> {
        unsafe {
            let color = self.gl.create_renderbuffer().map_err(GlError::Device)?;
            self.storage(color, glow::RGBA8);

            let depth = match self.gl.create_renderbuffer() {
                Ok(depth) => depth,
                Err(err) => {
                    self.gl.delete_renderbuffer(color);
                    return Err(GlError::Device(err));
                }
            };
            self.storage(depth, glow::DEPTH24_STENCIL8);

            match self.gl.create_framebuffer() {
                Ok(fbo) => Ok((fbo, depth, color)),
                Err(err) => {
                    self.gl.delete_renderbuffer(depth);
                    self.gl.delete_renderbuffer(color);
                    Err(GlError::Device(err))
                }
            }
        }
    }

    fn storage(&self, renderbuffer: D::Renderbuffer, format: u32) {
        unsafe {
            self.gl
                .bind_renderbuffer(glow::RENDERBUFFER, Some(renderbuffer));
            if self.samples > 0 {
                self.gl.renderbuffer_storage_multisample(
                    glow::RENDERBUFFER,
                    self.samples as i32,
                    format,
                    self.size.x,
                    self.size.y,
                );
            } else {
                self.gl
                    .renderbuffer_storage(glow::RENDERBUFFER, format, self.size.x, self.size.y);
            }
            self.gl.bind_renderbuffer(glow::RENDERBUFFER, None);
        }
    }

    unsafe fn attach(&self, attachment: u32, renderbuffer: D::Renderbuffer) {
        unsafe {
            self.gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                attachment,
                glow::RENDERBUFFER,
                Some(renderbuffer),
            );
        }
    }
}

impl<D: Device> Drop for Framebuffer<D> {
    fn drop(&mut self) {
        self.free();
    }
}

fn describe_status(status: u32) -> &'static str {
    match status {
        glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => "incomplete attachment",
        glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => "missing attachment",
        glow::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => "incomplete draw buffer",
        glow::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => "incomplete read buffer",
        glow::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => "incomplete multisample configuration",
        glow::FRAMEBUFFER_UNSUPPORTED => "unsupported attachment combination",
        _ => "unknown status",
    }
}
