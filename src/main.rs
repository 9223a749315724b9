//! threelib preview: desktop stand-in for the 1-bit handheld display
//!
//! Usage: threelib-preview [--config file.ron] [--snapshot out.png] [model.kw3d]
//!
//! Without a model a few spinning demo triangles are shown. `P` saves a PNG
//! of the current frame, `Esc` quits.

use std::path::{Path, PathBuf};

use macroquad::prelude::{
    clear_background, draw_text, draw_texture_ex, get_time, is_key_pressed, next_frame,
    screen_height, screen_width, vec2, Color, DrawTextureParams, FilterMode, KeyCode, Texture2D,
};
use macroquad::window::Conf;
use threelib::model::{load_model_with, ParseOptions, TriangleLayout};
use threelib::rasterizer::{PackedDisplay, Vec3, HEIGHT, WIDTH};
use threelib::scene::load_config;
use threelib::{RenderConfig, Renderer};
use tracing_subscriber::EnvFilter;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const SCALE: i32 = 2;
const DEMO_TRIANGLES: usize = 6;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    model: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = Some(it.next().ok_or("--config needs a path")?.into()),
            "--snapshot" => args.snapshot = Some(it.next().ok_or("--snapshot needs a path")?.into()),
            _ if arg.starts_with("--") => return Err(format!("unknown option {}", arg)),
            _ => args.model = Some(arg.into()),
        }
    }
    Ok(args)
}

fn window_conf() -> Conf {
    Conf {
        window_title: format!("threelib preview v{}", VERSION),
        window_width: WIDTH as i32 * SCALE,
        window_height: HEIGHT as i32 * SCALE,
        window_resizable: true,
        ..Default::default()
    }
}

/// Triangle `i` of the demo fan, spun by `t` seconds
fn demo_triangle(i: usize, t: f32) -> (Vec3, Vec3, Vec3, i8) {
    let angle = t * 0.6 + i as f32 * std::f32::consts::TAU / DEMO_TRIANGLES as f32;
    let spread = std::f32::consts::TAU / DEMO_TRIANGLES as f32 * 0.45;
    let centre = Vec3::new(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0, 40.0);
    let radius = 7.0;
    let corner = |a: f32, depth: f32| {
        centre + Vec3::new(a.cos() * radius, a.sin() * radius, depth)
    };
    let shade = (i * 127 / (DEMO_TRIANGLES - 1)) as i8;
    (
        centre,
        corner(angle - spread, (t + i as f32).sin() * 4.0),
        corner(angle + spread, (t + i as f32).cos() * 4.0),
        shade,
    )
}

fn populate(renderer: &mut Renderer, model: Option<&Path>) {
    let Some(path) = model else {
        for i in 0..DEMO_TRIANGLES {
            let (p0, p1, p2, shade) = demo_triangle(i, 0.0);
            renderer.add(p0, p1, p2, shade);
        }
        return;
    };

    let options = ParseOptions {
        triangles: TriangleLayout::Indexed,
        ..Default::default()
    };
    match load_model_with(path, options) {
        Ok(model) => {
            for mesh in &model.meshes {
                renderer.add_mesh(mesh, &model.materials);
            }
            println!(
                "Loaded {}: {} meshes, {} triangles",
                path.display(),
                model.meshes.len(),
                renderer.len()
            );
        }
        Err(e) => eprintln!("Failed to load {}: {}", path.display(), e),
    }
}

/// Expand the packed display to RGBA for macroquad
fn display_rgba(display: &PackedDisplay) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(display.width * display.height * 4);
    for y in 0..display.height {
        for x in 0..display.width {
            let v: u8 = if display.is_white(x, y) { 0xB0 } else { 0x32 };
            rgba.extend_from_slice(&[v, v, v.saturating_sub(8), 255]);
        }
    }
    rgba
}

fn save_snapshot(display: &PackedDisplay, path: &Path) -> Result<(), image::ImageError> {
    let img = image::GrayImage::from_fn(display.width as u32, display.height as u32, |x, y| {
        image::Luma([if display.is_white(x as usize, y as usize) { 255 } else { 0 }])
    });
    img.save(path)
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };

    let config = match &args.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}, using defaults", path.display(), e);
                RenderConfig::default()
            }
        },
        None => RenderConfig::default(),
    };

    let display_cfg = config.display;
    let mut renderer = Renderer::with_config(config);
    let mut display = PackedDisplay::new(display_cfg.width, display_cfg.height, display_cfg.row_stride);
    populate(&mut renderer, args.model.as_deref());
    let demo = args.model.is_none();

    if let Some(path) = &args.snapshot {
        renderer.draw(&mut display);
        match save_snapshot(&display, path) {
            Ok(()) => println!("Saved {}", path.display()),
            Err(e) => eprintln!("Failed to save {}: {}", path.display(), e),
        }
        return;
    }

    println!("=== threelib preview ===");

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        if demo {
            let t = get_time() as f32;
            for i in 0..DEMO_TRIANGLES {
                let (p0, p1, p2, shade) = demo_triangle(i, t);
                renderer.update(i as i64 + 1, p0, p1, p2, shade);
            }
        }

        let stats = renderer.draw(&mut display);

        if is_key_pressed(KeyCode::P) {
            let path = PathBuf::from(format!("threelib-{}.png", (get_time() * 1000.0) as u64));
            match save_snapshot(&display, &path) {
                Ok(()) => println!("Saved {}", path.display()),
                Err(e) => eprintln!("Failed to save {}: {}", path.display(), e),
            }
        }

        clear_background(Color::from_rgba(30, 30, 35, 255));

        let texture = Texture2D::from_rgba8(
            display.width as u16,
            display.height as u16,
            &display_rgba(&display),
        );
        texture.set_filter(FilterMode::Nearest);

        // Largest integer scale that fits the window
        let sw = screen_width();
        let sh = screen_height();
        let scale = (sw / display.width as f32)
            .min(sh / display.height as f32)
            .floor()
            .max(1.0);
        let w = display.width as f32 * scale;
        let h = display.height as f32 * scale;
        draw_texture_ex(
            &texture,
            ((sw - w) / 2.0).floor(),
            ((sh - h) / 2.0).floor(),
            macroquad::prelude::WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(w, h)),
                ..Default::default()
            },
        );

        draw_text(
            &format!(
                "{} tris  {} stalled  raster {:.2}ms  dither {:.2}ms",
                stats.triangles,
                stats.stalled,
                stats.raster_time.as_secs_f64() * 1000.0,
                stats.dither_time.as_secs_f64() * 1000.0,
            ),
            8.0,
            16.0,
            16.0,
            Color::from_rgba(200, 200, 200, 255),
        );

        next_frame().await;
    }
}
