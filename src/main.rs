use std::path::Path;

use glam::{IVec2, Mat4};
use glow::HasContext;
use mp3d_glutil::{App, Framebuffer, ShaderProgram};
use serde::Deserialize;

const VERTEX_SHADER: &str = r#"#version 330 core
in vec3 position;
in vec3 color;
uniform mat4 mvp;
out vec3 frag_color;

void main() {
    frag_color = color * TINT;
    gl_Position = mvp * vec4(position, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 330 core
in vec3 frag_color;
out vec4 out_color;

void main() {
    out_color = vec4(frag_color, 1.0);
}
"#;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DemoConfig {
    width: u32,
    height: u32,
    samples: u32,
    fullscreen: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            samples: 4,
            fullscreen: false,
        }
    }
}

impl DemoConfig {
    fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&s)?)
    }
}

fn setup_logger() -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

fn main() {
    if let Err(e) = setup_logger() {
        eprintln!("Failed to set up logging: {e}");
    }

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => DemoConfig::load(Path::new(&path))?,
        None => DemoConfig::default(),
    };

    let mut app = App::new(
        "mp3d-glutil demo",
        config.width,
        config.height,
        config.fullscreen,
    )?;
    let (width, height) = app.window.size();

    let mut shader = ShaderProgram::new(&app.gl);
    shader.define("TINT", "vec3(1.0, 0.9, 0.8)");
    shader.init("triangle", VERTEX_SHADER, FRAGMENT_SHADER, None)?;
    shader.bind();

    let positions: [f32; 9] = [-0.6, -0.5, 0.0, 0.6, -0.5, 0.0, 0.0, 0.6, 0.0];
    let colors: [f32; 9] = [1.0, 0.2, 0.2, 0.2, 1.0, 0.2, 0.2, 0.2, 1.0];
    let indices: [u32; 3] = [0, 1, 2];

    let mut framebuffer = Framebuffer::new(&app.gl);
    framebuffer.init(IVec2::new(width as i32, height as i32), config.samples)?;

    let start = std::time::Instant::now();

    'running: loop {
        for event in app.event_pump.poll_iter() {
            match event {
                sdl2::event::Event::Quit { .. } => break 'running,
                sdl2::event::Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(width, height),
                    ..
                } => {
                    unsafe {
                        app.gl.viewport(0, 0, width, height);
                    }
                    framebuffer.init(IVec2::new(width, height), config.samples)?;
                }
                _ => {}
            }
        }

        // Unchanged data keeps its version, so only the first frame transfers anything.
        shader.upload_attrib("position", &positions, 3, 0)?;
        shader.upload_attrib("color", &colors, 3, 0)?;
        shader.upload_indices(&indices, 0)?;

        framebuffer.bind();
        unsafe {
            app.gl.clear_color(0.1, 0.1, 0.12, 1.0);
            app.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let angle = start.elapsed().as_secs_f32();
        shader.bind();
        shader.set_uniform("mvp", Mat4::from_rotation_z(angle), true);
        shader.draw_indexed(glow::TRIANGLES, 0, 1)?;

        framebuffer.release();
        framebuffer.blit();
        app.window.gl_swap_window();
    }

    log::info!(
        "Shutting down, {} bytes of attribute data in use",
        shader.buffer_size()
    );
    shader.free();
    framebuffer.free();
    Ok(())
}
