use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{ error, info };

use beamtrace::camera::Camera;
use beamtrace::config;
use beamtrace::consts::{ FRAME_HEIGHT, FRAME_WIDTH, OUT_FILE };
use beamtrace::scene::Scene;

/// Renders a scene of spheres and triangles lit by a single
/// directional light, writing the frame out as a plain PPM image.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Frame width in pixels.
    #[clap(long, default_value_t = FRAME_WIDTH)]
    width: usize,

    /// Frame height in pixels.
    #[clap(long, default_value_t = FRAME_HEIGHT)]
    height: usize,

    /// JSON scene description to render instead of the built-in scene.
    #[clap(long)]
    scene: Option<PathBuf>,

    /// Path the rendered PPM image is written to.
    #[clap(long, default_value = OUT_FILE)]
    output: PathBuf,

    /// Rotation steps to apply about the scene pivot before rendering.
    /// Positive turns counterclockwise, negative clockwise.
    #[clap(long, default_value_t = 0, allow_hyphen_values = true)]
    turns: i32,

    /// Show the frame in a window instead of writing a file. The left
    /// and right arrow keys rotate the scene; escape quits.
    #[cfg(feature = "preview")]
    #[clap(long)]
    preview: bool,
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(error) = run(&args) {
        error!("{}", error);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let (mut scene, eye) = match &args.scene {
        Some(path) => {
            let file = config::load_scene(path)?;
            (file.scene, file.eye)
        },
        None => (Scene::default(), Camera::DEFAULT_EYE),
    };

    if args.turns >= 0 {
        for _ in 0..args.turns {
            scene.rotate_positive();
        }
    } else {
        for _ in args.turns..0 {
            scene.rotate_negative();
        }
    }

    let camera = Camera::new(args.width, args.height, eye);

    #[cfg(feature = "preview")]
    if args.preview {
        return preview(&camera, &mut scene);
    }

    let canvas = camera.render(&scene);
    canvas.save(&args.output)?;
    info!("wrote {}x{} frame to {}", args.width, args.height,
        args.output.display());

    Ok(())
}

#[cfg(feature = "preview")]
fn preview(camera: &Camera, scene: &mut Scene) -> Result<(), Box<dyn Error>> {
    use minifb::{ Key, KeyRepeat, Window, WindowOptions };

    let mut window = Window::new("beamtrace", camera.width, camera.height,
        WindowOptions::default())?;
    // Limit to max ~60 fps update rate
    window.limit_update_rate(Some(std::time::Duration::from_micros(16666)));

    let mut buffer = camera.render(scene).to_argb();
    while window.is_open() && !window.is_key_pressed(Key::Escape, KeyRepeat::No) {
        let mut dirty = false;
        if window.is_key_pressed(Key::Left, KeyRepeat::Yes) {
            scene.rotate_negative();
            dirty = true;
        }
        if window.is_key_pressed(Key::Right, KeyRepeat::Yes) {
            scene.rotate_positive();
            dirty = true;
        }
        if dirty {
            buffer = camera.render(scene).to_argb();
        }

        window.update_with_buffer(&buffer, camera.width, camera.height)?;
    }

    Ok(())
}
