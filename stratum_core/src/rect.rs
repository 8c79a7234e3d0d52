// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer rectangles and disjoint rectangle-set algebra.
//!
//! [`Rect`] is the unit of every clip, region, and damage computation. A rect
//! with zero width or height is *empty*; every operation treats the empty rect
//! as "nothing to do" and callers drop it before use.
//!
//! Region lists (`Vec<Rect>`) are kept pairwise disjoint. [`subtract_all`] and
//! [`intersect_all`] preserve that property.

use alloc::vec::Vec;
use core::fmt;

/// An axis-aligned integer rectangle.
///
/// Inclusive pixel bounds are `[x, x + width - 1] × [y, y + height - 1]`.
/// All arithmetic is carried out in `i32` and saturated back into range, so
/// no operation can overflow.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: i16,
    /// Top edge.
    pub y: i16,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect({}, {}, {}x{})",
            self.x, self.y, self.width, self.height
        )
    }
}

impl Rect {
    /// The canonical empty rectangle.
    pub const EMPTY: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    /// Creates a rectangle from its origin and size.
    #[inline]
    #[must_use]
    pub const fn new(x: i16, y: i16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from `i32` components, saturating into range.
    ///
    /// A negative width or height yields an empty rectangle.
    #[must_use]
    pub fn from_i32(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::from_edges(
            x,
            y,
            x.saturating_add(width.max(0)),
            y.saturating_add(height.max(0)),
        )
    }

    /// Creates a rectangle from inclusive-left/top and exclusive-right/bottom
    /// edges, saturating into range.
    #[must_use]
    pub fn from_edges(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let (x, width) = clamp_span(x0, x1);
        let (y, height) = clamp_span(y0, y1);
        if width == 0 || height == 0 {
            return Self::EMPTY;
        }
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Left edge (inclusive).
    #[inline]
    #[must_use]
    pub const fn left(self) -> i32 {
        self.x as i32
    }

    /// Top edge (inclusive).
    #[inline]
    #[must_use]
    pub const fn top(self) -> i32 {
        self.y as i32
    }

    /// Right edge (inclusive). Meaningless for an empty rect.
    #[inline]
    #[must_use]
    pub const fn right(self) -> i32 {
        self.x as i32 + self.width as i32 - 1
    }

    /// Bottom edge (inclusive). Meaningless for an empty rect.
    #[inline]
    #[must_use]
    pub const fn bottom(self) -> i32 {
        self.y as i32 + self.height as i32 - 1
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right_edge(self) -> i32 {
        self.x as i32 + self.width as i32
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom_edge(self) -> i32 {
        self.y as i32 + self.height as i32
    }

    /// Number of pixels covered.
    #[inline]
    #[must_use]
    pub const fn area(self) -> u32 {
        self.width as u32 * self.height as u32
    }

    /// Returns `true` if the pixel `(x, y)` lies inside the rectangle.
    #[inline]
    #[must_use]
    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.left() && x < self.right_edge() && y >= self.top() && y < self.bottom_edge()
    }

    /// Returns `true` if the two rectangles share at least one pixel.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left() < other.right_edge()
            && other.left() < self.right_edge()
            && self.top() < other.bottom_edge()
            && other.top() < self.bottom_edge()
    }

    /// Returns the overlap of the two rectangles, or [`Rect::EMPTY`].
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        if !self.intersects(other) {
            return Self::EMPTY;
        }
        Self::from_edges(
            self.left().max(other.left()),
            self.top().max(other.top()),
            self.right_edge().min(other.right_edge()),
            self.bottom_edge().min(other.bottom_edge()),
        )
    }

    /// Returns the smallest rectangle containing both inputs.
    ///
    /// An empty input contributes nothing.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self::from_edges(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right_edge().max(other.right_edge()),
            self.bottom_edge().max(other.bottom_edge()),
        )
    }

    /// Returns the rectangle offset by `(dx, dy)`.
    #[must_use]
    pub fn translate(self, dx: i32, dy: i32) -> Self {
        if self.is_empty() {
            return Self::EMPTY;
        }
        Self::from_edges(
            self.left().saturating_add(dx),
            self.top().saturating_add(dy),
            self.right_edge().saturating_add(dx),
            self.bottom_edge().saturating_add(dy),
        )
    }

    /// Returns the rectangle shrunk by the given amount on each side.
    #[must_use]
    pub fn inset(self, left: u16, top: u16, right: u16, bottom: u16) -> Self {
        if self.is_empty() {
            return Self::EMPTY;
        }
        Self::from_edges(
            self.left() + i32::from(left),
            self.top() + i32::from(top),
            self.right_edge() - i32::from(right),
            self.bottom_edge() - i32::from(bottom),
        )
    }

    /// Returns the parts of `self` not covered by `other`.
    ///
    /// At most four disjoint fragments are produced, in scanline order: a
    /// full-width strip above the overlap, the strips to its left and right,
    /// and a full-width strip below. Empty fragments are dropped. The
    /// fragments together with `self.intersect(other)` tile `self` exactly.
    #[must_use]
    pub fn subtract(self, other: Self) -> Fragments {
        if self.is_empty() {
            return Fragments::empty();
        }
        let i = self.intersect(other);
        if i.is_empty() {
            return Fragments::one(self);
        }

        let mut out = Fragments::empty();
        out.push(Self::from_edges(
            self.left(),
            self.top(),
            self.right_edge(),
            i.top(),
        ));
        out.push(Self::from_edges(
            self.left(),
            i.top(),
            i.left(),
            i.bottom_edge(),
        ));
        out.push(Self::from_edges(
            i.right_edge(),
            i.top(),
            self.right_edge(),
            i.bottom_edge(),
        ));
        out.push(Self::from_edges(
            self.left(),
            i.bottom_edge(),
            self.right_edge(),
            self.bottom_edge(),
        ));
        out
    }

    /// Converts to a floating-point [`kurbo::Rect`].
    #[must_use]
    pub fn to_kurbo(self) -> kurbo::Rect {
        kurbo::Rect::new(
            f64::from(self.left()),
            f64::from(self.top()),
            f64::from(self.right_edge()),
            f64::from(self.bottom_edge()),
        )
    }

    /// Converts a [`kurbo::Rect`] to the smallest integer rectangle that
    /// covers it.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "float-to-int casts saturate and from_edges clamps into range"
    )]
    pub fn from_kurbo(r: kurbo::Rect) -> Self {
        let r = r.abs().expand();
        Self::from_edges(r.x0 as i32, r.y0 as i32, r.x1 as i32, r.y1 as i32)
    }
}

/// Clamps the half-open span `[a, b)` into an `i16` origin and `u16` length.
fn clamp_span(a: i32, b: i32) -> (i16, u16) {
    let lo = a.clamp(i32::from(i16::MIN), i32::from(i16::MAX));
    let hi = b.clamp(lo, lo + i32::from(u16::MAX));
    let origin = i16::try_from(lo).unwrap_or(i16::MAX);
    let len = u16::try_from(hi - lo).unwrap_or(u16::MAX);
    (origin, len)
}

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

/// Up to four disjoint rectangles produced by [`Rect::subtract`] or a scroll.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fragments {
    rects: [Rect; 4],
    len: u8,
    pos: u8,
}

impl Fragments {
    pub(crate) const fn empty() -> Self {
        Self {
            rects: [Rect::EMPTY; 4],
            len: 0,
            pos: 0,
        }
    }

    pub(crate) const fn one(r: Rect) -> Self {
        let mut out = Self::empty();
        if !r.is_empty() {
            out.rects[0] = r;
            out.len = 1;
        }
        out
    }

    fn push(&mut self, r: Rect) {
        if !r.is_empty() && (self.len as usize) < self.rects.len() {
            self.rects[self.len as usize] = r;
            self.len += 1;
        }
    }

    /// Returns the remaining fragments as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Rect] {
        &self.rects[self.pos as usize..self.len as usize]
    }
}

impl Iterator for Fragments {
    type Item = Rect;

    fn next(&mut self) -> Option<Rect> {
        if self.pos >= self.len {
            return None;
        }
        let r = self.rects[self.pos as usize];
        self.pos += 1;
        Some(r)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::from(self.len - self.pos);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Fragments {}

// ---------------------------------------------------------------------------
// Region helpers
// ---------------------------------------------------------------------------

/// Removes `cut` from every rectangle of a disjoint region, in place.
///
/// Rectangles that do not touch `cut` keep their position in the list; those
/// that do are replaced by their fragments.
pub fn subtract_all(region: &mut Vec<Rect>, cut: Rect) {
    if cut.is_empty() || !region.iter().any(|r| r.intersects(cut)) {
        return;
    }
    let old = core::mem::take(region);
    for r in old {
        if r.intersects(cut) {
            region.extend(r.subtract(cut));
        } else {
            region.push(r);
        }
    }
}

/// Returns the parts of a disjoint region that lie inside `clip`.
#[must_use]
pub fn intersect_all(region: &[Rect], clip: Rect) -> Vec<Rect> {
    region
        .iter()
        .map(|r| r.intersect(clip))
        .filter(|r| !r.is_empty())
        .collect()
}

/// Total pixel area of a region.
#[must_use]
pub fn region_area(region: &[Rect]) -> u32 {
    region.iter().map(|r| r.area()).sum()
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn covers(rects: &[Rect], x: i32, y: i32) -> usize {
        rects.iter().filter(|r| r.contains(x, y)).count()
    }

    #[test]
    fn empty_rects() {
        assert!(Rect::new(0, 0, 0, 5).is_empty());
        assert!(Rect::new(0, 0, 5, 0).is_empty());
        assert!(!Rect::new(-3, -3, 1, 1).is_empty());
        assert!(Rect::from_i32(5, 5, -2, 4).is_empty());
    }

    #[test]
    fn inclusive_edges() {
        let r = Rect::new(2, 3, 4, 5);
        assert_eq!(r.right(), 5);
        assert_eq!(r.bottom(), 7);
        assert!(r.contains(5, 7));
        assert!(!r.contains(6, 7));
        assert!(!r.contains(5, 8));
    }

    #[test]
    fn intersect_is_contained_in_both() {
        let samples = [
            Rect::new(0, 0, 10, 10),
            Rect::new(5, 5, 10, 10),
            Rect::new(-4, 2, 6, 3),
            Rect::new(9, 9, 1, 1),
            Rect::new(10, 0, 4, 4),
            Rect::new(0, 0, 0, 0),
        ];
        for a in samples {
            for b in samples {
                let i = a.intersect(b);
                assert_eq!(i.is_empty(), !a.intersects(b), "{a:?} {b:?}");
                if !i.is_empty() {
                    assert_eq!(i.union(a), a, "{i:?} not inside {a:?}");
                    assert_eq!(i.union(b), b, "{i:?} not inside {b:?}");
                }
            }
        }
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(!a.intersects(b));
        assert_eq!(a.intersect(b), Rect::EMPTY);
    }

    #[test]
    fn subtract_tiles_the_source() {
        let a = Rect::new(0, 0, 12, 9);
        let cuts = [
            Rect::new(3, 2, 4, 4),
            Rect::new(-5, -5, 8, 8),
            Rect::new(0, 0, 12, 9),
            Rect::new(20, 20, 2, 2),
            Rect::new(4, -1, 2, 20),
        ];
        for b in cuts {
            let mut pieces: Vec<Rect> = a.subtract(b).collect();
            pieces.push(a.intersect(b));
            for y in -2..12 {
                for x in -2..15 {
                    let expected = usize::from(a.contains(x, y));
                    assert_eq!(covers(&pieces, x, y), expected, "({x},{y}) cut {b:?}");
                }
            }
        }
    }

    #[test]
    fn subtract_is_scanline_ordered() {
        let a = Rect::new(5, 5, 10, 10);
        let b = Rect::new(0, 0, 10, 10);
        let pieces: Vec<Rect> = a.subtract(b).collect();
        assert_eq!(pieces, vec![Rect::new(10, 5, 5, 5), Rect::new(5, 10, 10, 5)]);
    }

    #[test]
    fn subtract_center_yields_four() {
        let a = Rect::new(0, 0, 9, 9);
        let b = Rect::new(3, 3, 3, 3);
        let pieces = a.subtract(b);
        assert_eq!(pieces.len(), 4);
        assert_eq!(
            pieces.as_slice(),
            &[
                Rect::new(0, 0, 9, 3),
                Rect::new(0, 3, 3, 3),
                Rect::new(6, 3, 3, 3),
                Rect::new(0, 6, 9, 3),
            ]
        );
    }

    #[test]
    fn subtract_all_keeps_region_disjoint() {
        let mut region = vec![Rect::new(0, 0, 10, 10), Rect::new(10, 0, 10, 10)];
        subtract_all(&mut region, Rect::new(5, 5, 10, 2));
        assert_eq!(region_area(&region), 200 - 20);
        for y in 0..10 {
            for x in 0..20 {
                let inside_cut = (5..15).contains(&x) && (5..7).contains(&y);
                assert_eq!(covers(&region, x, y), usize::from(!inside_cut), "({x},{y})");
            }
        }
    }

    #[test]
    fn intersect_all_drops_empty() {
        let region = vec![Rect::new(0, 0, 4, 4), Rect::new(10, 10, 4, 4)];
        let clipped = intersect_all(&region, Rect::new(2, 2, 4, 4));
        assert_eq!(clipped, vec![Rect::new(2, 2, 2, 2)]);
    }

    #[test]
    fn from_i32_saturates() {
        let r = Rect::from_i32(40_000, 0, 10, 10);
        assert_eq!(r.left(), i32::from(i16::MAX));
        let r = Rect::from_i32(-40_000, 0, 40_010, 10);
        assert_eq!(r.left(), i32::from(i16::MIN));
        assert_eq!(r.right_edge(), 10);
    }

    #[test]
    fn translate_and_inset() {
        let r = Rect::new(1, 2, 10, 8).translate(-3, 4);
        assert_eq!(r, Rect::new(-2, 6, 10, 8));
        assert_eq!(r.inset(1, 1, 1, 1), Rect::new(-1, 7, 8, 6));
        assert!(Rect::new(0, 0, 2, 2).inset(1, 1, 1, 1).is_empty());
    }

    #[test]
    fn kurbo_conversion_rounds_outward() {
        let r = Rect::from_kurbo(kurbo::Rect::new(0.5, 1.2, 9.1, 4.0));
        assert_eq!(r, Rect::new(0, 1, 10, 3));
        assert_eq!(Rect::from_kurbo(r.to_kurbo()), r);
    }
}
