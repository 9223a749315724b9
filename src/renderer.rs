//! Host-facing render object
//!
//! Mirrors the scripting binding: triangles are addressed 1-based here and
//! converted to the store's 0-based indices before anything else sees them.

use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::model::{Material, Mesh};
use crate::rasterizer::{
    dither_atkinson, present, project_triangles, render_triangles, DisplaySurface, Framebuffer,
    ScreenPoint, Triangle, Vec3, WHITE,
};
use crate::scene::{DisplayConfig, RenderConfig, Scene};

/// Outcome of one `draw`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub triangles: usize,
    /// Triangles abandoned by the edge-walk cap
    pub stalled: usize,
    pub project_time: Duration,
    pub raster_time: Duration,
    pub dither_time: Duration,
    pub present_time: Duration,
}

/// A scene plus the framebuffer it renders into.
#[derive(Debug)]
pub struct Renderer {
    scene: Scene,
    fb: Framebuffer,
    display: DisplayConfig,
    max_edge_steps: usize,
    /// Projected points, three per triangle, reused across frames
    points: Vec<ScreenPoint>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::with_config(RenderConfig::default())
    }

    pub fn with_config(config: RenderConfig) -> Self {
        let mut scene = Scene::with_camera(config.camera);
        scene.set_background(config.background);
        debug!(
            width = config.display.width,
            height = config.display.height,
            "renderer created"
        );
        Self {
            scene,
            fb: Framebuffer::new(config.display.width, config.display.height),
            display: config.display,
            max_edge_steps: config.max_edge_steps,
            points: Vec::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    pub fn len(&self) -> usize {
        self.scene.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scene.is_empty()
    }

    pub fn set_background(&mut self, shade: i8) {
        self.scene.set_background(shade);
    }

    pub fn add(&mut self, p0: Vec3, p1: Vec3, p2: Vec3, shade: i8) {
        self.scene.push(Triangle::new(p0, p1, p2, shade));
    }

    /// Replace triangle `index` (1-based). Invalid indices are ignored.
    pub fn update(&mut self, index: i64, p0: Vec3, p1: Vec3, p2: Vec3, shade: i8) {
        if let Some(idx) = to_store_index(index) {
            self.scene.update(idx, Triangle::new(p0, p1, p2, shade));
        }
    }

    /// Remove triangle `index` (1-based). Invalid indices are ignored.
    pub fn remove(&mut self, index: i64) {
        if let Some(idx) = to_store_index(index) {
            self.scene.remove(idx);
        }
    }

    /// Append every indexed triangle of a parsed mesh, shaded with its
    /// material. Returns how many triangles were added.
    pub fn add_mesh(&mut self, mesh: &Mesh, materials: &[Material]) -> usize {
        let shade = materials
            .get(mesh.material_index as usize)
            .map_or(WHITE, |m| m.shade.min(127) as i8);

        let mut added = 0;
        for (idx, record) in mesh.triangles.iter().enumerate() {
            let [a, b, c] = record.vertices;
            let corners = (
                mesh.vertices.get(a as usize),
                mesh.vertices.get(b as usize),
                mesh.vertices.get(c as usize),
            );
            match corners {
                (Some(&p0), Some(&p1), Some(&p2)) => {
                    self.scene.push(Triangle::new(p0, p1, p2, shade));
                    added += 1;
                }
                _ => warn!(
                    triangle = idx,
                    indices = ?record.vertices,
                    vertices = mesh.vertices.len(),
                    "triangle references a missing vertex, skipped"
                ),
            }
        }
        added
    }

    /// Render the scene into the framebuffer without presenting it.
    pub fn render(&mut self) -> FrameStats {
        let mut stats = FrameStats {
            triangles: self.scene.len(),
            ..Default::default()
        };

        self.fb.clear(self.scene.background());

        let start = Instant::now();
        project_triangles(
            self.scene.triangles(),
            self.scene.camera(),
            self.fb.width,
            self.fb.height,
            &mut self.points,
        );
        stats.project_time = start.elapsed();

        let start = Instant::now();
        stats.stalled = render_triangles(
            &mut self.fb,
            self.scene.triangles(),
            &self.points,
            self.max_edge_steps,
        );
        stats.raster_time = start.elapsed();

        let start = Instant::now();
        dither_atkinson(&mut self.fb);
        stats.dither_time = start.elapsed();

        stats
    }

    /// Render and pack the frame into the host display, marking all rows
    /// updated.
    pub fn draw<S: DisplaySurface + ?Sized>(&mut self, surface: &mut S) -> FrameStats {
        let mut stats = self.render();

        let start = Instant::now();
        present(&self.fb, surface);
        stats.present_time = start.elapsed();

        trace!(
            triangles = stats.triangles,
            stalled = stats.stalled,
            project_us = stats.project_time.as_micros() as u64,
            raster_us = stats.raster_time.as_micros() as u64,
            dither_us = stats.dither_time.as_micros() as u64,
            present_us = stats.present_time.as_micros() as u64,
            "frame drawn"
        );
        stats
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// 1-based host index to 0-based store index
fn to_store_index(index: i64) -> Option<usize> {
    usize::try_from(index.checked_sub(1)?).ok()
}
