//! Atkinson error diffusion
//!
//! ```text
//!   * 1 1
//! 1 1 1
//!   1
//! ```
//!
//! Each neighbour receives 1/8 of the quantization error, the remaining 2/8
//! are dropped.

use super::render::Framebuffer;
use super::types::{BLACK, THRESHOLD, WHITE};

/// Threshold one cell. Returns the output level and the per-neighbour error.
#[inline]
pub fn quantize(v: i8) -> (i8, i8) {
    let out = if v > THRESHOLD { WHITE } else { BLACK };
    // Arithmetic shift: negative errors round towards -inf
    let err = ((i16::from(v) - i16::from(out)) >> 3) as i8;
    (out, err)
}

/// Dither the framebuffer in place, leaving only `BLACK` and `WHITE` cells.
pub fn dither_atkinson(fb: &mut Framebuffer) {
    let (w, h) = (fb.width, fb.height);
    let px = &mut fb.pixels;

    let mut idx = 0;
    for y in 0..h {
        for x in 0..w {
            let (out, err) = quantize(px[idx]);
            px[idx] = out;

            if err != 0 {
                if x + 1 < w {
                    px[idx + 1] = px[idx + 1].saturating_add(err);
                    if x + 2 < w {
                        px[idx + 2] = px[idx + 2].saturating_add(err);
                    }
                }
                if y + 1 < h {
                    if x > 0 {
                        px[idx + w - 1] = px[idx + w - 1].saturating_add(err);
                    }
                    px[idx + w] = px[idx + w].saturating_add(err);
                    if x + 1 < w {
                        px[idx + w + 1] = px[idx + w + 1].saturating_add(err);
                    }
                    if y + 2 < h {
                        px[idx + 2 * w] = px[idx + 2 * w].saturating_add(err);
                    }
                }
            }

            idx += 1;
        }
    }
}
