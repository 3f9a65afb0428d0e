//! Window and GL context for the demo binary.

use std::sync::Arc;

use sdl2::video::{FullscreenType, GLContext, GLProfile, Window};

/// A window with a current GL 3.3 core context.
///
/// The SDL handles that only need to outlive the window are kept private.
pub struct App {
    pub window: Window,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
    _gl_context: GLContext,
    _video: sdl2::VideoSubsystem,
    _sdl: sdl2::Sdl,
}

impl App {
    /// Opens a resizable window. In fullscreen mode the desktop resolution replaces
    /// `width` and `height`.
    pub fn new(title: &str, width: u32, height: u32, fullscreen: bool) -> Result<Self, String> {
        let sdl = sdl2::init()?;
        let video = sdl.video()?;
        {
            let attr = video.gl_attr();
            attr.set_context_profile(GLProfile::Core);
            attr.set_context_version(3, 3);
        }

        let (width, height) = if fullscreen {
            let mode = video.current_display_mode(0)?;
            (mode.w.max(1) as u32, mode.h.max(1) as u32)
        } else {
            (width, height)
        };
        let window = open_window(&video, title, width, height, fullscreen)?;

        let gl_context = window.gl_create_context()?;
        window.gl_make_current(&gl_context)?;
        let gl = unsafe {
            glow::Context::from_loader_function(|s| video.gl_get_proc_address(s) as *const _)
        };

        log::info!("Created {}x{} window \"{}\"", width, height, title);

        Ok(Self {
            window,
            gl: Arc::new(gl),
            event_pump: sdl.event_pump()?,
            _gl_context: gl_context,
            _video: video,
            _sdl: sdl,
        })
    }
}

fn open_window(
    video: &sdl2::VideoSubsystem,
    title: &str,
    width: u32,
    height: u32,
    fullscreen: bool,
) -> Result<Window, String> {
    let mut window = video
        .window(title, width, height)
        .opengl()
        .resizable()
        .build()
        .map_err(|e| e.to_string())?;
    if fullscreen {
        window.set_fullscreen(FullscreenType::Desktop)?;
    }
    Ok(window)
}
