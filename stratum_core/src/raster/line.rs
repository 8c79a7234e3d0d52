// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbitrary lines: outcode clipping followed by integer Bresenham.

use crate::color::Color;
use crate::rect::Rect;
use crate::surface::Surface;

use super::{Rasterizer, narrow};

const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const TOP: u8 = 4;
const BOTTOM: u8 = 8;

/// Which sides of `clip` the point lies beyond.
fn outcode(x: i64, y: i64, clip: Rect) -> u8 {
    let mut code = 0;
    if x < i64::from(clip.left()) {
        code |= LEFT;
    } else if x > i64::from(clip.right()) {
        code |= RIGHT;
    }
    if y < i64::from(clip.top()) {
        code |= TOP;
    } else if y > i64::from(clip.bottom()) {
        code |= BOTTOM;
    }
    code
}

/// Shortens the segment to the part inside `clip`, or `None` if nothing is
/// left.
///
/// Each pass moves the outside endpoint onto the boundary it crosses, which
/// clears that outcode bit; two passes per endpoint always suffice.
fn clip_segment(
    mut x1: i64,
    mut y1: i64,
    mut x2: i64,
    mut y2: i64,
    clip: Rect,
) -> Option<(i64, i64, i64, i64)> {
    let mut c1 = outcode(x1, y1, clip);
    let mut c2 = outcode(x2, y2, clip);
    for _ in 0..4 {
        if c1 | c2 == 0 {
            return Some((x1, y1, x2, y2));
        }
        if c1 & c2 != 0 {
            return None;
        }
        let out = if c1 != 0 { c1 } else { c2 };
        let (x, y);
        if out & TOP != 0 {
            y = i64::from(clip.top());
            x = x1 + mul_div(x2 - x1, y - y1, y2 - y1);
        } else if out & BOTTOM != 0 {
            y = i64::from(clip.bottom());
            x = x1 + mul_div(x2 - x1, y - y1, y2 - y1);
        } else if out & RIGHT != 0 {
            x = i64::from(clip.right());
            y = y1 + mul_div(y2 - y1, x - x1, x2 - x1);
        } else {
            x = i64::from(clip.left());
            y = y1 + mul_div(y2 - y1, x - x1, x2 - x1);
        }
        if out == c1 {
            (x1, y1) = (x, y);
            c1 = outcode(x1, y1, clip);
        } else {
            (x2, y2) = (x, y);
            c2 = outcode(x2, y2, clip);
        }
    }
    (c1 | c2 == 0).then_some((x1, y1, x2, y2))
}

/// `a * b / c` without intermediate overflow. The quotient is an offset
/// along the segment, so it never exceeds `a` in magnitude.
fn mul_div(a: i64, b: i64, c: i64) -> i64 {
    let q = i128::from(a) * i128::from(b) / i128::from(c);
    i64::try_from(q).unwrap_or(a)
}

impl<S: Surface + ?Sized> Rasterizer<'_, S> {
    /// Draws a line between two inclusive endpoints.
    ///
    /// Horizontal and vertical lines use the span fast paths. Other lines are
    /// clipped to the active clip first, so the stepping loop only visits
    /// pixels that will be written.
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
        let (lx, ly) = (i64::from(x1.min(x2)), i64::from(y1.min(y2)));
        let (hx, hy) = (i64::from(x1.max(x2)), i64::from(y1.max(y2)));
        if self.clip_box(lx, ly, hx, hy).is_empty() {
            return;
        }
        if y1 == y2 || x1 == x2 {
            self.fill_box(lx, ly, hx, hy, color);
            return;
        }
        let Some((x1, y1, x2, y2)) = clip_segment(
            i64::from(x1),
            i64::from(y1),
            i64::from(x2),
            i64::from(y2),
            self.clip,
        ) else {
            return;
        };

        // Endpoints are inside the clip, which lies inside i16 range.
        let (mut x, mut y) = (narrow(x1), narrow(y1));
        let (x2, y2) = (narrow(x2), narrow(y2));
        let dx = (x2 - x).abs();
        let dy = -(y2 - y).abs();
        let sx = if x < x2 { 1 } else { -1 };
        let sy = if y < y2 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.draw_pixel(x, y, color);
            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::super::testing::*;
    use super::*;

    #[test]
    fn degenerate_line_is_a_pixel() {
        let mut a = canvas(8, 8);
        let mut b = canvas(8, 8);
        Rasterizer::unclipped(&mut a).draw_line(3, 4, 3, 4, Color::RED);
        Rasterizer::unclipped(&mut b).draw_pixel(3, 4, Color::RED);
        assert_eq!(a, b);
        assert_eq!(written(&a), vec![(3, 4)]);
    }

    #[test]
    fn horizontal_line_respects_clip() {
        let mut bmp = canvas(16, 4);
        let mut r = Rasterizer::new(&mut bmp, Rect::new(2, 0, 10, 4));
        r.draw_line(0, 0, 5, 0, Color::WHITE);
        assert_eq!(written(&bmp), vec![(2, 0), (3, 0), (4, 0), (5, 0)]);
    }

    #[test]
    fn reversed_endpoints_match() {
        let mut a = canvas(16, 16);
        let mut b = canvas(16, 16);
        Rasterizer::unclipped(&mut a).draw_line(1, 2, 13, 2, Color::RED);
        Rasterizer::unclipped(&mut b).draw_line(13, 2, 1, 2, Color::RED);
        assert_eq!(a, b);
    }

    #[test]
    fn diagonal_is_connected() {
        let mut bmp = canvas(16, 16);
        Rasterizer::unclipped(&mut bmp).draw_line(0, 0, 9, 4, Color::RED);
        let px = written(&bmp);
        assert_eq!(px.len(), 10, "one pixel per column on an x-major line");
        assert!(px.contains(&(0, 0)));
        assert!(px.contains(&(9, 4)));
    }

    #[test]
    fn diagonal_clipped_stays_inside() {
        let mut bmp = canvas(32, 32);
        let clip = Rect::new(5, 5, 10, 10);
        Rasterizer::new(&mut bmp, clip).draw_line(-20, -20, 40, 40, Color::GREEN);
        assert_inside(&bmp, clip);
        let px = written(&bmp);
        let expected: Vec<_> = (5..15).map(|i| (i, i)).collect();
        assert_eq!(px, expected);
    }

    #[test]
    fn line_missing_clip_writes_nothing() {
        let mut bmp = canvas(32, 32);
        let mut r = Rasterizer::new(&mut bmp, Rect::new(10, 10, 5, 5));
        r.draw_line(0, 0, 30, 3, Color::GREEN);
        r.draw_line(0, 20, 5, 31, Color::GREEN);
        assert!(written(&bmp).is_empty());
    }

    #[test]
    fn extreme_endpoints_do_not_overflow() {
        let mut bmp = canvas(8, 8);
        let mut r = Rasterizer::unclipped(&mut bmp);
        r.draw_line(i32::MIN, 2, i32::MAX, 2, Color::RED);
        r.draw_line(5, i32::MIN, 5, i32::MAX, Color::RED);
        r.draw_line(i32::MIN, i32::MIN, i32::MAX, i32::MAX, Color::BLUE);
        let px = written(&bmp);
        // Row 2 and column 5 share one pixel; the diagonal adds six more.
        assert_eq!(px.len(), 21);
        for i in 0..8 {
            assert_eq!(bmp.pixel(i, i), Color::BLUE, "diagonal at {i}");
        }
    }

    #[test]
    fn outcode_bits() {
        let clip = Rect::new(0, 0, 10, 10);
        assert_eq!(outcode(5, 5, clip), 0);
        assert_eq!(outcode(-1, 5, clip), LEFT);
        assert_eq!(outcode(10, -1, clip), RIGHT | TOP);
        assert_eq!(outcode(3, 10, clip), BOTTOM);
    }
}
