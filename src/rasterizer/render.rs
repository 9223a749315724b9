//! Core rendering functions
//! Scanline triangle fill into a greyscale framebuffer

use thiserror::Error;
use tracing::warn;

use super::math::ScreenPoint;
use super::types::Triangle;

/// Default cap on edge-walk iterations per triangle
pub const DEFAULT_MAX_EDGE_STEPS: usize = 4096;

/// Greyscale framebuffer, one signed cell per pixel, row-major.
///
/// Holds shades in `0..=127` after rasterization and only `0` / `127` after
/// dithering.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    pub pixels: Vec<i8>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
        }
    }

    pub fn clear(&mut self, shade: i8) {
        self.pixels.fill(shade);
    }

    pub fn get(&self, x: usize, y: usize) -> Option<i8> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, shade: i8) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = shade;
        }
    }

    /// Fill the inclusive span between `x0` and `x1` on row `y`, in either
    /// order, clipped to the buffer. Rows off the buffer are ignored.
    pub fn fill_span(&mut self, y: i64, x0: i64, x1: i64, shade: i8) {
        if y < 0 || y >= self.height as i64 || self.width == 0 {
            return;
        }
        let lo = x0.min(x1).max(0);
        let hi = x0.max(x1).min(self.width as i64 - 1);
        if lo > hi {
            return;
        }
        let row = y as usize * self.width;
        self.pixels[row + lo as usize..=row + hi as usize].fill(shade);
    }
}

/// A triangle whose edge walk ran past the iteration cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("edge walk exceeded {limit} steps")]
pub struct RasterStall {
    pub limit: usize,
}

/// Sort three points top to bottom. Equal rows keep their argument order.
pub fn sort_by_y(a: ScreenPoint, b: ScreenPoint, c: ScreenPoint) -> [ScreenPoint; 3] {
    let mut p = [a, b, c];
    if p[1].y < p[0].y {
        p.swap(0, 1);
    }
    if p[2].y < p[1].y {
        p.swap(1, 2);
        if p[1].y < p[0].y {
            p.swap(0, 1);
        }
    }
    p
}

/// Integer line walker running from an upper point to a lower one.
#[derive(Debug, Clone, Copy)]
struct Edge {
    x: i64,
    y: i64,
    dx: i64,
    /// Always <= 0 since edges run downwards
    dy: i64,
    sx: i64,
    err: i64,
}

impl Edge {
    fn new(from: ScreenPoint, to: ScreenPoint) -> Self {
        let (fx, fy) = (i64::from(from.x), i64::from(from.y));
        let (tx, ty) = (i64::from(to.x), i64::from(to.y));
        let dx = (tx - fx).abs();
        let dy = fy - ty;
        Self {
            x: fx,
            y: fy,
            dx,
            dy,
            sx: if fx <= tx { 1 } else { -1 },
            err: dx + dy,
        }
    }

    /// One Bresenham step. Returns true when the walker moved down a row.
    fn step(&mut self) -> bool {
        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.y += 1;
            return true;
        }
        false
    }
}

const LONG: u8 = 1 << 0;
const SHORT: u8 = 1 << 1;
const BOTH: u8 = LONG | SHORT;

/// Scan-convert one projected triangle.
///
/// ```text
///   A
///  ....
///  ......B
/// .....
/// C.
/// ```
///
/// The long edge runs A to C. The short edge runs A to B, then B to C once it
/// reaches B's row. Both walkers advance one row at a time in lockstep and the
/// span between them is filled each time both have arrived on a new row.
pub fn fill_triangle(
    fb: &mut Framebuffer,
    p0: ScreenPoint,
    p1: ScreenPoint,
    p2: ScreenPoint,
    shade: i8,
    max_steps: usize,
) -> Result<(), RasterStall> {
    let [a, b, c] = sort_by_y(p0, p1, p2);

    // Entirely above or below the screen
    if c.y < 0 || a.y as i64 >= fb.height as i64 {
        return Ok(());
    }

    let bottom = i64::from(c.y);
    let mut long = Edge::new(a, c);
    let mut short = Edge::new(a, b);
    let mut switched = false;
    let mut arrived = BOTH;
    let mut steps = 0usize;

    loop {
        if arrived == BOTH {
            if !switched && short.y == i64::from(b.y) {
                short = Edge::new(b, c);
                switched = true;
            }
            fb.fill_span(long.y, long.x, short.x, shade);
            arrived = 0;
        }

        if long.y >= bottom && short.y >= bottom {
            return Ok(());
        }

        steps += 1;
        if steps > max_steps {
            return Err(RasterStall { limit: max_steps });
        }

        if arrived & LONG == 0 && long.step() {
            arrived |= LONG;
        }
        if arrived & SHORT == 0 && short.step() {
            arrived |= SHORT;
        }
    }
}

/// Rasterize a scene's triangles in order. `points` holds three projected
/// points per triangle. Stalled triangles are skipped and counted.
pub fn render_triangles(
    fb: &mut Framebuffer,
    triangles: &[Triangle],
    points: &[ScreenPoint],
    max_steps: usize,
) -> usize {
    let mut stalls = 0;
    for (idx, (t, p)) in triangles.iter().zip(points.chunks_exact(3)).enumerate() {
        if let Err(stall) = fill_triangle(fb, p[0], p[1], p[2], t.shade, max_steps) {
            warn!(triangle = idx, points = ?p, "{stall}, triangle skipped");
            stalls += 1;
        }
    }
    stalls
}
