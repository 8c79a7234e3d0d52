// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Block transfers, colour transforms, and bitmap blits.

use alloc::vec;

use crate::color::Color;
use crate::rect::{Fragments, Rect};
use crate::surface::{Bitmap, Surface};

use super::{Rasterizer, ucoord};

impl<S: Surface + ?Sized> Rasterizer<'_, S> {
    // -- Copy and scroll --

    /// Copies the pixels of `src` so its top-left lands on `(dst_x, dst_y)`.
    ///
    /// Both the source and the destination are reduced to the clip, so the
    /// copy never reads or writes outside it. Returns the destination rect
    /// actually written.
    pub fn copy(&mut self, src: Rect, dst_x: i32, dst_y: i32) -> Rect {
        let dx = dst_x.saturating_sub(src.left());
        let dy = dst_y.saturating_sub(src.top());
        let src = src.intersect(self.clip);
        let dst = src.translate(dx, dy).intersect(self.clip);
        if dst.is_empty() {
            return Rect::EMPTY;
        }
        self.copy_rows(dst.translate(dx.saturating_neg(), dy.saturating_neg()), dst);
        dst
    }

    /// Shifts the contents of `area` by `(dx, dy)` within the clip.
    ///
    /// Returns the revealed rects: the parts of the clipped area that no
    /// longer hold valid content and must be repainted by the caller. If no
    /// source pixels survive the shift, the whole clipped area is revealed.
    pub fn scroll(&mut self, area: Rect, dx: i32, dy: i32) -> Fragments {
        let region = area.intersect(self.clip);
        if region.is_empty() {
            return Fragments::empty();
        }
        if dx == 0 && dy == 0 {
            return Fragments::empty();
        }
        let src = region
            .translate(dx.saturating_neg(), dy.saturating_neg())
            .intersect(region);
        if src.is_empty() {
            return Fragments::one(region);
        }
        let dst = src.translate(dx, dy);
        self.copy_rows(src, dst);
        region.subtract(dst)
    }

    /// Moves equal-sized `src` to `dst`, both already inside the clip.
    ///
    /// Same-row overlapping moves are staged through a one-row buffer since
    /// the surface span copy is not overlap-safe. Other moves pick the row
    /// order that never reads a row after it was overwritten.
    fn copy_rows(&mut self, src: Rect, dst: Rect) {
        let dy = dst.top() - src.top();
        let (sx, dx) = (ucoord(src.left()), ucoord(dst.left()));
        let width = dst.width;
        if dy == 0 && src.left() == dst.left() {
            return;
        }
        let overlaps_in_row = src.left() < dst.right_edge() && dst.left() < src.right_edge();
        if dy == 0 && overlaps_in_row {
            let mut row = vec![Color::default(); usize::from(width)];
            for y in dst.top()..dst.bottom_edge() {
                let y = ucoord(y);
                self.surface.read_span(sx, y, &mut row);
                self.surface.write_span(dx, y, &row);
            }
        } else if dy > 0 {
            for y in (dst.top()..dst.bottom_edge()).rev() {
                self.surface.copy_span(sx, ucoord(y - dy), dx, ucoord(y), width);
            }
        } else {
            for y in dst.top()..dst.bottom_edge() {
                self.surface.copy_span(sx, ucoord(y - dy), dx, ucoord(y), width);
            }
        }
    }

    // -- Colour transforms --

    /// Halves the brightness of every pixel in `r`.
    pub fn dim(&mut self, r: Rect) {
        self.transform(r, Color::dimmed);
    }

    /// Converts every pixel in `r` to greyscale.
    pub fn grey_scale(&mut self, r: Rect) {
        self.transform(r, Color::greyscale);
    }

    fn transform(&mut self, r: Rect, f: impl Fn(Color) -> Color) {
        let r = r.intersect(self.clip);
        for y in r.top()..r.bottom_edge() {
            for x in r.left()..r.right_edge() {
                let (ux, uy) = (ucoord(x), ucoord(y));
                let c = self.surface.pixel(ux, uy);
                self.surface.set_pixel(ux, uy, f(c));
            }
        }
    }

    // -- Bitmaps --

    /// Copies the `width × height` block of `bitmap` at `(bx, by)` to
    /// `(x, y)`.
    pub fn draw_bitmap(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        bitmap: &Bitmap,
        bx: i32,
        by: i32,
    ) {
        let Some((dst, sx, sy)) = self.blit_bounds(x, y, width, height, bitmap, bx, by) else {
            return;
        };
        let w = usize::from(dst.width);
        for row in 0..dst.height {
            let src_row = &bitmap.row(sy + row)[usize::from(sx)..usize::from(sx) + w];
            self.surface
                .write_span(ucoord(dst.left()), ucoord(dst.top()) + row, src_row);
        }
    }

    /// Like [`draw_bitmap`](Self::draw_bitmap) but skips pixels equal to
    /// `key`.
    pub fn draw_bitmap_transparent(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        bitmap: &Bitmap,
        bx: i32,
        by: i32,
        key: Color,
    ) {
        self.blit_with(x, y, width, height, bitmap, bx, by, |c| {
            (c != key).then_some(c)
        });
    }

    /// Like [`draw_bitmap`](Self::draw_bitmap) but converts each pixel to
    /// greyscale.
    pub fn draw_bitmap_greyscale(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        bitmap: &Bitmap,
        bx: i32,
        by: i32,
    ) {
        self.blit_with(x, y, width, height, bitmap, bx, by, |c| {
            Some(c.greyscale())
        });
    }

    /// Draws a rect outline lit from the top-left: `light` on the top and
    /// left edges, `shadow` on the bottom and right.
    pub fn draw_bevelled_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        light: Color,
        shadow: Color,
    ) {
        if width <= 0 || height <= 0 {
            return;
        }
        let (x0, y0) = (i64::from(x), i64::from(y));
        let (x1, y1) = (x0 + i64::from(width) - 1, y0 + i64::from(height) - 1);
        self.fill_box(x0, y0, x1, y0, light);
        self.fill_box(x0, y0 + 1, x0, y1, light);
        if y1 > y0 {
            self.fill_box(x0 + 1, y1, x1, y1, shadow);
        }
        if x1 > x0 {
            self.fill_box(x1, y0 + 1, x1, y1 - 1, shadow);
        }
    }

    fn blit_with(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        bitmap: &Bitmap,
        bx: i32,
        by: i32,
        f: impl Fn(Color) -> Option<Color>,
    ) {
        let Some((dst, sx, sy)) = self.blit_bounds(x, y, width, height, bitmap, bx, by) else {
            return;
        };
        for row in 0..dst.height {
            let src_row = bitmap.row(sy + row);
            for col in 0..dst.width {
                if let Some(c) = f(src_row[usize::from(sx + col)]) {
                    self.surface.set_pixel(
                        ucoord(dst.left()) + col,
                        ucoord(dst.top()) + row,
                        c,
                    );
                }
            }
        }
    }

    /// Resolves a blit to the destination rect and the matching source
    /// origin.
    ///
    /// The destination is reduced by the clip and by the extent of the source
    /// bitmap as positioned, so the source block never leaves the bitmap.
    fn blit_bounds(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        bitmap: &Bitmap,
        bx: i32,
        by: i32,
    ) -> Option<(Rect, u16, u16)> {
        let placed = Rect::from_i32(
            x.saturating_sub(bx),
            y.saturating_sub(by),
            i32::from(bitmap.width()),
            i32::from(bitmap.height()),
        );
        let dst = Rect::from_i32(x, y, width, height)
            .intersect(placed)
            .intersect(self.clip);
        if dst.is_empty() {
            return None;
        }
        let sx = i64::from(dst.left()) - i64::from(x) + i64::from(bx);
        let sy = i64::from(dst.top()) - i64::from(y) + i64::from(by);
        let (sx, sy) = (u16::try_from(sx).ok()?, u16::try_from(sy).ok()?);
        Some((dst, sx, sy))
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use core::cell::Cell;

    use super::super::testing::*;
    use super::*;

    /// Counts span operations so tests can see which copy path ran.
    struct Recording {
        inner: Bitmap,
        reads: Cell<usize>,
        copies: usize,
    }

    impl Surface for Recording {
        fn width(&self) -> u16 {
            self.inner.width()
        }
        fn height(&self) -> u16 {
            self.inner.height()
        }
        fn pixel(&self, x: u16, y: u16) -> Color {
            self.inner.pixel(x, y)
        }
        fn set_pixel(&mut self, x: u16, y: u16, color: Color) {
            self.inner.set_pixel(x, y, color);
        }
        fn copy_span(&mut self, sx: u16, sy: u16, dx: u16, dy: u16, len: u16) {
            self.copies += 1;
            self.inner.copy_span(sx, sy, dx, dy, len);
        }
        fn read_span(&self, x: u16, y: u16, out: &mut [Color]) {
            self.reads.set(self.reads.get() + 1);
            self.inner.read_span(x, y, out);
        }
    }

    /// A 16×10 canvas whose pixel at column `x` has red channel `x`.
    fn gradient() -> Bitmap {
        let mut bmp = Bitmap::new(16, 10);
        for y in 0..10 {
            for x in 0..16 {
                bmp.set_pixel(x, y, Color::rgb(u8::try_from(x).unwrap(), 0, 0));
            }
        }
        bmp
    }

    #[test]
    fn scroll_right_uses_staging_and_reveals_left_strip() {
        let mut surface = Recording {
            inner: gradient(),
            reads: Cell::new(0),
            copies: 0,
        };
        let revealed: Vec<Rect> = Rasterizer::unclipped(&mut surface)
            .scroll(Rect::new(0, 0, 10, 10), 3, 0)
            .collect();
        assert_eq!(revealed, [Rect::new(0, 0, 3, 10)]);
        assert_eq!(surface.reads.get(), 10, "one staged read per row");
        assert_eq!(surface.copies, 0, "overlapping row move must not use span copy");
        for x in 3..10 {
            assert_eq!(surface.inner.pixel(x, 4).red(), u8::try_from(x - 3).unwrap());
        }
        assert_eq!(surface.inner.pixel(10, 4).red(), 10, "outside area untouched");
    }

    #[test]
    fn scroll_down_copies_bottom_up() {
        let mut bmp = Bitmap::new(4, 6);
        for y in 0..6 {
            bmp.fill_span(0, y, 4, Color::rgb(0, u8::try_from(y).unwrap(), 0));
        }
        let revealed: Vec<Rect> = Rasterizer::unclipped(&mut bmp)
            .scroll(Rect::new(0, 0, 4, 6), 0, 2)
            .collect();
        assert_eq!(revealed, [Rect::new(0, 0, 4, 2)]);
        for y in 2..6 {
            assert_eq!(bmp.pixel(1, y).green(), u8::try_from(y - 2).unwrap());
        }
    }

    #[test]
    fn scroll_diagonal_reveals_two_strips() {
        let mut bmp = gradient();
        let revealed: Vec<Rect> = Rasterizer::unclipped(&mut bmp)
            .scroll(Rect::new(0, 0, 10, 10), -2, 3)
            .collect();
        assert_eq!(revealed, [Rect::new(0, 0, 10, 3), Rect::new(8, 3, 2, 7)]);
    }

    #[test]
    fn scroll_past_extent_reveals_whole_region() {
        let mut bmp = gradient();
        let before = bmp.clone();
        let clip = Rect::new(2, 2, 4, 4);
        let revealed: Vec<Rect> = Rasterizer::new(&mut bmp, clip)
            .scroll(Rect::new(0, 0, 16, 10), 9, 0)
            .collect();
        assert_eq!(revealed, [clip]);
        assert_eq!(bmp, before, "nothing survives, so nothing is copied");
    }

    #[test]
    fn copy_never_reads_outside_clip() {
        let mut bmp = canvas(16, 16);
        {
            let mut r = Rasterizer::unclipped(&mut bmp);
            r.draw_filled_rect(0, 0, 4, 4, Color::RED);
        }
        let clip = Rect::new(2, 0, 14, 16);
        let dst = Rasterizer::new(&mut bmp, clip).copy(Rect::new(0, 0, 4, 4), 8, 8);
        assert_eq!(dst, Rect::new(10, 8, 2, 4));
        assert_eq!(bmp.pixel(9, 8), SENTINEL);
        assert_eq!(bmp.pixel(10, 8), Color::RED);
    }

    #[test]
    fn dim_and_grey_are_clipped() {
        let mut bmp = Bitmap::filled(4, 4, Color::rgb(20, 10, 0));
        let mut r = Rasterizer::new(&mut bmp, Rect::new(0, 0, 2, 4));
        r.dim(Rect::new(0, 0, 4, 1));
        r.grey_scale(Rect::new(0, 3, 4, 1));
        assert_eq!(bmp.pixel(1, 0), Color::rgb(10, 5, 0));
        assert_eq!(bmp.pixel(2, 0), Color::rgb(20, 10, 0));
        assert_eq!(bmp.pixel(0, 3), Color::rgb(10, 10, 10));
        assert_eq!(bmp.pixel(3, 3), Color::rgb(20, 10, 0));
    }

    #[test]
    fn partially_offscreen_blit_samples_inside_source() {
        let src = Bitmap::filled(4, 4, Color::BLUE);
        let mut bmp = canvas(8, 8);
        // Asks for a 6×6 block starting one pixel before the source.
        Rasterizer::unclipped(&mut bmp).draw_bitmap(-2, 5, 6, 6, &src, -1, 0);
        let px = written(&bmp);
        assert!(px.iter().all(|&(x, y)| (0..3).contains(&x) && (5..8).contains(&y)));
        assert_eq!(px.len(), 9);
    }

    #[test]
    fn blits_outside_clip_write_nothing() {
        let src = Bitmap::filled(4, 4, Color::BLUE);
        let mut bmp = canvas(16, 16);
        let mut r = Rasterizer::new(&mut bmp, Rect::new(0, 0, 8, 8));
        r.draw_bitmap(10, 2, 4, 4, &src, 0, 0);
        r.draw_bitmap_transparent(2, -6, 4, 4, &src, 0, 0, Color::WHITE);
        r.draw_bitmap_greyscale(-4, -4, 4, 4, &src, 0, 0);
        r.draw_bitmap(i32::MIN, 0, i32::MAX, 4, &src, i32::MAX, 0);
        r.draw_bevelled_rect(9, 9, 3, 3, Color::WHITE, Color::BLACK);
        r.draw_bevelled_rect(i32::MAX, i32::MAX, i32::MAX, i32::MAX, Color::WHITE, Color::BLACK);
        assert!(r.copy(Rect::new(0, 0, 4, 4), i32::MAX, i32::MIN).is_empty());
        assert!(written(&bmp).is_empty());
    }

    #[test]
    fn transparent_blit_skips_key() {
        let mut src = Bitmap::filled(3, 1, Color::RED);
        src.set_pixel(1, 0, Color::WHITE);
        let mut bmp = canvas(4, 1);
        Rasterizer::unclipped(&mut bmp).draw_bitmap_transparent(
            0,
            0,
            3,
            1,
            &src,
            0,
            0,
            Color::WHITE,
        );
        assert_eq!(written(&bmp), [(0, 0), (2, 0)]);
    }

    #[test]
    fn greyscale_blit() {
        let src = Bitmap::filled(2, 2, Color::rgb(30, 0, 0));
        let mut bmp = canvas(2, 2);
        Rasterizer::unclipped(&mut bmp).draw_bitmap_greyscale(0, 0, 2, 2, &src, 0, 0);
        assert!(bmp.pixels().iter().all(|&c| c == Color::rgb(10, 10, 10)));
    }

    #[test]
    fn bevel_edges() {
        let mut bmp = canvas(5, 4);
        Rasterizer::unclipped(&mut bmp).draw_bevelled_rect(0, 0, 5, 4, Color::WHITE, Color::BLACK);
        assert_eq!(bmp.pixel(4, 0), Color::WHITE);
        assert_eq!(bmp.pixel(0, 3), Color::WHITE);
        assert_eq!(bmp.pixel(1, 3), Color::BLACK);
        assert_eq!(bmp.pixel(4, 2), Color::BLACK);
        assert_eq!(bmp.pixel(2, 2), SENTINEL);
        assert_eq!(written(&bmp).len(), 14);
    }
}
