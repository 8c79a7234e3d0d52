// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clip-aware drawing primitives.
//!
//! A [`Rasterizer`] binds one [`Surface`] to one active clip rect. Every
//! primitive intersects its own bounds with the clip before touching the
//! surface; when that intersection is empty the call writes nothing.
//!
//! Primitives are grouped by family:
//!
//! - spans and rects (this module)
//! - [`line`](Rasterizer::draw_line): outcode clipping plus Bresenham
//! - circles and ellipses: midpoint and decision-variable algorithms
//! - [`flood_fill`](Rasterizer::flood_fill): explicit-stack scanline fill
//! - copy, scroll, colour transforms, and bitmap blits
//!
//! Coordinates are surface coordinates in `i32`; anything outside the clip is
//! simply dropped.

mod blit;
mod ellipse;
mod fill;
mod line;

use crate::color::Color;
use crate::rect::Rect;
use crate::surface::Surface;

/// Drawing primitives against one surface through one clip rect.
pub struct Rasterizer<'s, S: Surface + ?Sized = dyn Surface> {
    surface: &'s mut S,
    clip: Rect,
}

impl<S: Surface + ?Sized> core::fmt::Debug for Rasterizer<'_, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("clip", &self.clip)
            .finish_non_exhaustive()
    }
}

impl<'s, S: Surface + ?Sized> Rasterizer<'s, S> {
    /// Binds a surface and a clip rect. The clip is reduced to the surface
    /// bounds.
    pub fn new(surface: &'s mut S, clip: Rect) -> Self {
        let clip = clip.intersect(surface.bounds());
        Self { surface, clip }
    }

    /// Binds a surface with its full bounds as the clip.
    pub fn unclipped(surface: &'s mut S) -> Self {
        let clip = surface.bounds();
        Self { surface, clip }
    }

    /// The active clip rect.
    #[must_use]
    pub fn clip(&self) -> Rect {
        self.clip
    }

    /// Replaces the active clip rect.
    pub fn set_clip(&mut self, clip: Rect) {
        self.clip = clip.intersect(self.surface.bounds());
    }

    /// Shared access to the underlying surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &*self.surface
    }

    // -- Spans and rects --

    /// Writes a single pixel.
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        if self.clip.contains(x, y) {
            self.surface.set_pixel(ucoord(x), ucoord(y), color);
        }
    }

    /// Draws a horizontal run of `width` pixels starting at `(x, y)`.
    pub fn draw_horiz_line(&mut self, x: i32, y: i32, width: i32, color: Color) {
        self.fill(Rect::from_i32(x, y, width, 1), color);
    }

    /// Draws a vertical run of `height` pixels starting at `(x, y)`.
    pub fn draw_vert_line(&mut self, x: i32, y: i32, height: i32, color: Color) {
        self.fill(Rect::from_i32(x, y, 1, height), color);
    }

    /// Fills a rectangle.
    pub fn draw_filled_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        self.fill(Rect::from_i32(x, y, width, height), color);
    }

    /// Draws a one-pixel rectangle outline.
    pub fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        if width <= 0 || height <= 0 {
            return;
        }
        let (x0, y0) = (i64::from(x), i64::from(y));
        let (x1, y1) = (x0 + i64::from(width) - 1, y0 + i64::from(height) - 1);
        self.fill_box(x0, y0, x1, y0, color);
        self.fill_box(x0, y1, x1, y1, color);
        self.fill_box(x0, y0 + 1, x0, y1 - 1, color);
        self.fill_box(x1, y0 + 1, x1, y1 - 1, color);
    }

    /// Fills the whole clip rect.
    pub fn clear(&mut self, color: Color) {
        self.fill(self.clip, color);
    }

    /// Fills `r ∩ clip` one row at a time.
    fn fill(&mut self, r: Rect, color: Color) {
        let r = r.intersect(self.clip);
        if r.is_empty() {
            return;
        }
        let x = ucoord(r.left());
        for y in r.top()..r.bottom_edge() {
            self.surface.fill_span(x, ucoord(y), r.width, color);
        }
    }

    /// The part of the inclusive box `[x0, x1] × [y0, y1]` inside the clip.
    ///
    /// Primitives call this on their own bounds before any other arithmetic,
    /// so geometry far outside the surface costs nothing and cannot overflow.
    fn clip_box(&self, x0: i64, y0: i64, x1: i64, y1: i64) -> Rect {
        let c = self.clip;
        if c.is_empty() {
            return Rect::EMPTY;
        }
        let left = x0.max(i64::from(c.left()));
        let top = y0.max(i64::from(c.top()));
        let right = x1.min(i64::from(c.right()));
        let bottom = y1.min(i64::from(c.bottom()));
        if left > right || top > bottom {
            return Rect::EMPTY;
        }
        Rect::from_edges(
            narrow(left),
            narrow(top),
            narrow(right) + 1,
            narrow(bottom) + 1,
        )
    }

    /// Fills the inclusive box `[x0, x1] × [y0, y1]`.
    fn fill_box(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color) {
        let r = self.clip_box(x0, y0, x1, y1);
        self.fill(r, color);
    }

    /// Writes one pixel given in wide coordinates.
    fn plot(&mut self, x: i64, y: i64, color: Color) {
        let r = self.clip_box(x, y, x, y);
        if !r.is_empty() {
            self.surface.set_pixel(ucoord(r.left()), ucoord(r.top()), color);
        }
    }

    /// Reads a pixel the caller has already checked against the clip.
    #[inline]
    fn get(&self, x: i32, y: i32) -> Color {
        self.surface.pixel(ucoord(x), ucoord(y))
    }
}

/// Narrows a clipped surface coordinate.
///
/// The clip is always inside the surface bounds, so in-clip values fit.
#[inline]
fn ucoord(v: i32) -> u16 {
    u16::try_from(v).unwrap_or(0)
}

/// Narrows a value already reduced to the clip.
#[inline]
fn narrow(v: i64) -> i32 {
    i32::try_from(v).unwrap_or(0)
}
