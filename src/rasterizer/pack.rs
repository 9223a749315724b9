//! Bit packing into the host's 1-bit display

use super::render::Framebuffer;

/// A writable 1-bit display owned by the host.
///
/// Rows are `row_stride()` bytes apart, pixels MSB-first within each byte.
pub trait DisplaySurface {
    fn frame_mut(&mut self) -> &mut [u8];
    fn row_stride(&self) -> usize;
    /// Mark rows `start..end` as needing a refresh
    fn mark_rows_updated(&mut self, start: usize, end: usize);
}

/// Pack a bilevel framebuffer into `frame`, one bit per pixel, set when the
/// cell is non-zero. Bytes past the end of each packed row are left alone.
pub fn pack_bits(fb: &Framebuffer, frame: &mut [u8], row_stride: usize) {
    if fb.width == 0 || row_stride == 0 {
        return;
    }
    for (cells, row) in fb
        .pixels
        .chunks_exact(fb.width)
        .zip(frame.chunks_mut(row_stride))
    {
        let mut bitpos: u8 = 0x80;
        let mut chunk: u8 = 0x00; // black
        for (x, &cell) in cells.iter().enumerate() {
            if cell != 0 {
                chunk ^= bitpos;
            }
            bitpos >>= 1;
            if bitpos == 0 {
                if let Some(byte) = row.get_mut(x >> 3) {
                    *byte = chunk;
                }
                bitpos = 0x80;
                chunk = 0x00;
            }
        }
        // Zero-padded tail when the width is not a multiple of 8
        if bitpos != 0x80 {
            if let Some(byte) = row.get_mut(fb.width >> 3) {
                *byte = chunk;
            }
        }
    }
}

/// Pack the framebuffer into a display surface and mark every row dirty.
pub fn present<S: DisplaySurface + ?Sized>(fb: &Framebuffer, surface: &mut S) {
    let stride = surface.row_stride();
    pack_bits(fb, surface.frame_mut(), stride);
    surface.mark_rows_updated(0, fb.height);
}

/// In-memory display surface
#[derive(Debug, Clone)]
pub struct PackedDisplay {
    pub width: usize,
    pub height: usize,
    pub stride: usize,
    pub bytes: Vec<u8>,
    /// Rows marked since the last `take_dirty`
    pub dirty: Option<(usize, usize)>,
}

impl PackedDisplay {
    /// Create a display; the stride is raised to fit `width` if too small.
    pub fn new(width: usize, height: usize, stride: usize) -> Self {
        let stride = stride.max(width.div_ceil(8));
        Self {
            width,
            height,
            stride,
            bytes: vec![0; stride * height],
            dirty: None,
        }
    }

    pub fn is_white(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.bytes[y * self.stride + (x >> 3)] & (0x80 >> (x & 7)) != 0
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.bytes[y * self.stride..(y + 1) * self.stride]
    }

    pub fn take_dirty(&mut self) -> Option<(usize, usize)> {
        self.dirty.take()
    }
}

impl DisplaySurface for PackedDisplay {
    fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    fn row_stride(&self) -> usize {
        self.stride
    }

    fn mark_rows_updated(&mut self, start: usize, end: usize) {
        let end = end.min(self.height);
        self.dirty = Some(match self.dirty {
            Some((s, e)) => (s.min(start), e.max(end)),
            None => (start, end),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{BLACK, WHITE};

    #[test]
    fn test_msb_first() {
        let mut fb = Framebuffer::new(16, 1);
        fb.set_pixel(0, 0, WHITE);
        fb.set_pixel(9, 0, WHITE);
        fb.set_pixel(15, 0, WHITE);
        let mut frame = [0u8; 2];
        pack_bits(&fb, &mut frame, 2);
        assert_eq!(frame, [0b1000_0000, 0b0100_0001]);
    }

    #[test]
    fn test_respects_wide_stride() {
        let mut fb = Framebuffer::new(8, 3);
        fb.clear(WHITE);
        fb.set_pixel(7, 1, BLACK);
        let mut frame = [0xAAu8; 12];
        pack_bits(&fb, &mut frame, 4);
        assert_eq!(frame, [
            0xFF, 0xAA, 0xAA, 0xAA,
            0xFE, 0xAA, 0xAA, 0xAA,
            0xFF, 0xAA, 0xAA, 0xAA,
        ]);
    }

    #[test]
    fn test_partial_tail_byte() {
        let mut fb = Framebuffer::new(10, 1);
        fb.clear(WHITE);
        let mut frame = [0u8; 2];
        pack_bits(&fb, &mut frame, 2);
        assert_eq!(frame, [0xFF, 0b1100_0000]);
    }

    #[test]
    fn test_present_marks_all_rows() {
        let mut fb = Framebuffer::new(400, 240);
        fb.clear(WHITE);
        fb.set_pixel(3, 200, BLACK);
        let mut display = PackedDisplay::new(400, 240, 52);
        present(&fb, &mut display);
        assert_eq!(display.take_dirty(), Some((0, 240)));
        assert!(display.is_white(0, 0));
        assert!(!display.is_white(3, 200));
        assert_eq!(display.row(0)[..50], [0xFF; 50]);
        assert_eq!(display.row(0)[50..], [0x00; 2]);
    }

    #[test]
    fn test_stride_is_raised_to_fit() {
        let display = PackedDisplay::new(20, 2, 1);
        assert_eq!(display.stride, 3);
        assert_eq!(display.bytes.len(), 6);
    }
}
