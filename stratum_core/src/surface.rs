// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel buffer abstraction.
//!
//! A [`Surface`] is a mutable `width × height` grid of [`Color`] values. The
//! [`Rasterizer`](crate::raster::Rasterizer) is the only caller that writes to
//! surfaces during normal operation, and it clips every request against the
//! surface bounds first, so implementations may assume in-bounds coordinates.
//!
//! [`Bitmap`] is the heap-backed implementation used for screens, offscreen
//! buffers, and blit sources.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::color::Color;
use crate::rect::Rect;

/// A mutable pixel buffer.
///
/// Only [`width`](Self::width), [`height`](Self::height),
/// [`pixel`](Self::pixel), and [`set_pixel`](Self::set_pixel) are required;
/// the span operations have per-pixel default implementations that hardware
/// surfaces override with bulk fills and DMA copies.
///
/// All coordinates passed by the crate are in bounds.
pub trait Surface {
    /// Surface width in pixels.
    fn width(&self) -> u16;

    /// Surface height in pixels.
    fn height(&self) -> u16;

    /// Reads one pixel.
    fn pixel(&self, x: u16, y: u16) -> Color;

    /// Writes one pixel.
    fn set_pixel(&mut self, x: u16, y: u16, color: Color);

    /// Fills `len` pixels of row `y` starting at `x`.
    fn fill_span(&mut self, x: u16, y: u16, len: u16, color: Color) {
        for i in 0..len {
            self.set_pixel(x + i, y, color);
        }
    }

    /// Copies `len` pixels from `(src_x, src_y)` to `(dst_x, dst_y)`.
    ///
    /// Behaves like a forward DMA transfer: the result is unspecified when the
    /// source and destination spans overlap on the same row.
    fn copy_span(&mut self, src_x: u16, src_y: u16, dst_x: u16, dst_y: u16, len: u16) {
        for i in 0..len {
            let c = self.pixel(src_x + i, src_y);
            self.set_pixel(dst_x + i, dst_y, c);
        }
    }

    /// Reads `out.len()` pixels of row `y` starting at `x`.
    fn read_span(&self, x: u16, y: u16, out: &mut [Color]) {
        for (i, slot) in (0..).zip(out.iter_mut()) {
            *slot = self.pixel(x + i, y);
        }
    }

    /// Writes `src` into row `y` starting at `x`.
    fn write_span(&mut self, x: u16, y: u16, src: &[Color]) {
        for (i, &c) in (0..).zip(src.iter()) {
            self.set_pixel(x + i, y, c);
        }
    }

    /// The surface extent as a rectangle at the origin.
    fn bounds(&self) -> Rect {
        Rect::from_i32(0, 0, i32::from(self.width()), i32::from(self.height()))
    }
}

// ---------------------------------------------------------------------------
// Bitmap
// ---------------------------------------------------------------------------

/// A heap-allocated, row-major [`Surface`].
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u16,
    height: u16,
    pixels: Vec<Color>,
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Bitmap {
    /// Creates a bitmap filled with `color`.
    #[must_use]
    pub fn filled(width: u16, height: u16, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; usize::from(width) * usize::from(height)],
        }
    }

    /// Creates a transparent-black bitmap.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self::filled(width, height, Color::default())
    }

    /// Wraps existing row-major pixel data.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len() != width * height`.
    #[must_use]
    pub fn from_pixels(width: u16, height: u16, pixels: Vec<Color>) -> Self {
        assert_eq!(
            pixels.len(),
            usize::from(width) * usize::from(height),
            "pixel data does not match bitmap size"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// All pixels in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// One row of pixels.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[must_use]
    pub fn row(&self, y: u16) -> &[Color] {
        let start = self.index(0, y);
        &self.pixels[start..start + usize::from(self.width)]
    }

    /// The raw pixel bytes, suitable for uploading to a framebuffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }
}

impl Surface for Bitmap {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn pixel(&self, x: u16, y: u16) -> Color {
        self.pixels[self.index(x, y)]
    }

    fn set_pixel(&mut self, x: u16, y: u16, color: Color) {
        let i = self.index(x, y);
        self.pixels[i] = color;
    }

    fn fill_span(&mut self, x: u16, y: u16, len: u16, color: Color) {
        let start = self.index(x, y);
        self.pixels[start..start + usize::from(len)].fill(color);
    }

    fn copy_span(&mut self, src_x: u16, src_y: u16, dst_x: u16, dst_y: u16, len: u16) {
        let src = self.index(src_x, src_y);
        let dst = self.index(dst_x, dst_y);
        self.pixels.copy_within(src..src + usize::from(len), dst);
    }

    fn read_span(&self, x: u16, y: u16, out: &mut [Color]) {
        let start = self.index(x, y);
        out.copy_from_slice(&self.pixels[start..start + out.len()]);
    }

    fn write_span(&mut self, x: u16, y: u16, src: &[Color]) {
        let start = self.index(x, y);
        self.pixels[start..start + src.len()].copy_from_slice(src);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_and_read_back() {
        let mut bmp = Bitmap::new(8, 4);
        bmp.fill_span(2, 1, 3, Color::RED);
        assert_eq!(bmp.pixel(1, 1), Color::default());
        assert_eq!(bmp.pixel(2, 1), Color::RED);
        assert_eq!(bmp.pixel(4, 1), Color::RED);
        assert_eq!(bmp.pixel(5, 1), Color::default());
        assert_eq!(bmp.row(1)[2..5], [Color::RED; 3]);
    }

    #[test]
    fn spans_round_trip_through_staging() {
        let mut bmp = Bitmap::new(6, 2);
        bmp.write_span(1, 0, &[Color::RED, Color::GREEN, Color::BLUE]);
        let mut row = [Color::default(); 3];
        bmp.read_span(1, 0, &mut row);
        assert_eq!(row, [Color::RED, Color::GREEN, Color::BLUE]);
        bmp.copy_span(1, 0, 2, 1, 3);
        assert_eq!(bmp.row(1)[2..5], row);
    }

    #[test]
    fn bounds_at_origin() {
        assert_eq!(Bitmap::new(256, 192).bounds(), Rect::new(0, 0, 256, 192));
    }

    #[test]
    fn byte_view_length() {
        let bmp = Bitmap::filled(4, 4, Color::WHITE);
        assert_eq!(bmp.as_bytes().len(), 32);
    }

    #[test]
    #[should_panic(expected = "pixel data does not match bitmap size")]
    fn from_pixels_checks_size() {
        let _ = Bitmap::from_pixels(2, 2, alloc::vec![Color::BLACK; 3]);
    }
}
