// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Circles and axis-aligned ellipses.
//!
//! Circles use the midpoint algorithm with eight-way symmetry. Ellipses use
//! the two-region decision-variable walk, plotting all four quadrants from
//! each step. Ellipses with equal radii delegate to the circle routines so
//! both produce the same pixels.

use alloc::vec;

use crate::color::Color;
use crate::surface::Surface;

use super::Rasterizer;

impl<S: Surface + ?Sized> Rasterizer<'_, S> {
    /// Draws a circle outline centred on `(cx, cy)`.
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color) {
        if radius < 0 {
            return;
        }
        let (cx, cy, r) = (i64::from(cx), i64::from(cy), i64::from(radius));
        if self.clip_box(cx - r, cy - r, cx + r, cy + r).is_empty() {
            return;
        }
        let mut f = 1 - r;
        let mut dd_x = 1;
        let mut dd_y = -2 * r;
        let mut x = 0;
        let mut y = r;

        self.plot(cx, cy + r, color);
        self.plot(cx, cy - r, color);
        self.plot(cx + r, cy, color);
        self.plot(cx - r, cy, color);

        while x < y {
            if f >= 0 {
                y -= 1;
                dd_y += 2;
                f += dd_y;
            }
            x += 1;
            dd_x += 2;
            f += dd_x;

            self.plot(cx + x, cy + y, color);
            self.plot(cx - x, cy + y, color);
            self.plot(cx + x, cy - y, color);
            self.plot(cx - x, cy - y, color);
            self.plot(cx + y, cy + x, color);
            self.plot(cx - y, cy + x, color);
            self.plot(cx + y, cy - x, color);
            self.plot(cx - y, cy - x, color);
        }
    }

    /// Draws a filled circle centred on `(cx, cy)`.
    pub fn draw_filled_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color) {
        if radius < 0 {
            return;
        }
        let (cx, cy, r) = (i64::from(cx), i64::from(cy), i64::from(radius));
        if self.clip_box(cx - r, cy - r, cx + r, cy + r).is_empty() {
            return;
        }
        let mut f = 1 - r;
        let mut dd_x = 1;
        let mut dd_y = -2 * r;
        let mut x = 0;
        let mut y = r;

        self.fill_box(cx - r, cy, cx + r, cy, color);
        self.plot(cx, cy + r, color);
        self.plot(cx, cy - r, color);

        while x < y {
            if f >= 0 {
                y -= 1;
                dd_y += 2;
                f += dd_y;
            }
            x += 1;
            dd_x += 2;
            f += dd_x;

            self.fill_box(cx - x, cy + y, cx + x, cy + y, color);
            self.fill_box(cx - x, cy - y, cx + x, cy - y, color);
            self.fill_box(cx - y, cy + x, cx + y, cy + x, color);
            self.fill_box(cx - y, cy - x, cx + y, cy - x, color);
        }
    }

    /// Draws an ellipse outline centred on `(cx, cy)`.
    pub fn draw_ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, color: Color) {
        if rx < 0 || ry < 0 {
            return;
        }
        if rx == ry {
            self.draw_circle(cx, cy, rx, color);
            return;
        }
        let (cx, cy, rx, ry) = (i64::from(cx), i64::from(cy), i64::from(rx), i64::from(ry));
        if self.clip_box(cx - rx, cy - ry, cx + rx, cy + ry).is_empty() {
            return;
        }
        if rx == 0 || ry == 0 {
            self.fill_box(cx - rx, cy - ry, cx + rx, cy + ry, color);
            return;
        }
        walk_ellipse(rx, ry, |x, y| {
            self.plot(cx + x, cy + y, color);
            self.plot(cx - x, cy + y, color);
            self.plot(cx - x, cy - y, color);
            self.plot(cx + x, cy - y, color);
        });
    }

    /// Draws a filled ellipse centred on `(cx, cy)`.
    ///
    /// Consecutive rows that share a half-width are gathered into one run,
    /// emitted as a filled rect below the centre and its mirror above. Only
    /// row offsets that reach the clip are tracked.
    pub fn draw_filled_ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, color: Color) {
        if rx < 0 || ry < 0 {
            return;
        }
        if rx == ry {
            self.draw_filled_circle(cx, cy, rx, color);
            return;
        }
        let (cx, cy, rx, ry) = (i64::from(cx), i64::from(cy), i64::from(rx), i64::from(ry));
        if self.clip_box(cx - rx, cy - ry, cx + rx, cy + ry).is_empty() {
            return;
        }
        if rx == 0 || ry == 0 {
            self.fill_box(cx - rx, cy - ry, cx + rx, cy + ry, color);
            return;
        }

        // Row offsets whose row below or above the centre meets the clip.
        let (top, bottom) = (i64::from(self.clip.top()), i64::from(self.clip.bottom()));
        let below = ((top - cy).max(0), (bottom - cy).min(ry));
        let above = ((cy - bottom).max(0), (cy - top).min(ry));
        let Some((lo, hi)) = [below, above]
            .into_iter()
            .filter(|&(lo, hi)| lo <= hi)
            .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1)))
        else {
            return;
        };

        // Widest half-width plotted on each tracked row offset.
        let rows = usize::try_from(hi - lo + 1).unwrap_or(0);
        let mut half = vec![-1_i64; rows];
        walk_ellipse(rx, ry, |x, y| {
            if let Some(h) = usize::try_from(y - lo).ok().and_then(|i| half.get_mut(i)) {
                *h = (*h).max(x);
            }
        });

        let mut run: Option<Run> = None;
        for (y, &h) in (lo..).zip(&half) {
            if let Some(r) = run.as_mut().filter(|r| r.half_width == h) {
                r.last = y;
                continue;
            }
            if let Some(done) = run.take() {
                self.emit_run(cx, cy, done, color);
            }
            run = Some(Run {
                half_width: h,
                first: y,
                last: y,
            });
        }
        if let Some(done) = run {
            self.emit_run(cx, cy, done, color);
        }
    }

    /// Fills the mirrored row band described by `run`.
    fn emit_run(&mut self, cx: i64, cy: i64, run: Run, color: Color) {
        if run.half_width < 0 {
            return;
        }
        let (x0, x1) = (cx - run.half_width, cx + run.half_width);
        self.fill_box(x0, cy + run.first, x1, cy + run.last, color);
        // Row offset zero is shared by both halves.
        let top_first = run.first.max(1);
        if top_first <= run.last {
            self.fill_box(x0, cy - run.last, x1, cy - top_first, color);
        }
    }
}

/// A band of consecutive row offsets sharing one half-width.
#[derive(Clone, Copy, Debug)]
struct Run {
    half_width: i64,
    first: i64,
    last: i64,
}

/// Visits every first-quadrant point `(x, y)` of the ellipse outline.
///
/// The first region steps `y` every iteration while the slope is shallow;
/// the second steps `x` every iteration from the top of the ellipse down to
/// where the first region stopped. Points may repeat across the boundary.
/// The decision terms grow with the cube of the radii, hence `i128`.
fn walk_ellipse(rx: i64, ry: i64, mut plot: impl FnMut(i64, i64)) {
    let (rx, ry) = (i128::from(rx), i128::from(ry));
    let two_a_sq = 2 * rx * rx;
    let two_b_sq = 2 * ry * ry;

    let mut x = rx;
    let mut y = 0;
    let mut x_change = ry * ry * (1 - 2 * rx);
    let mut y_change = rx * rx;
    let mut error = 0;
    let mut stopping_x = two_b_sq * rx;
    let mut stopping_y = 0;
    while stopping_x >= stopping_y {
        plot(wide(x), wide(y));
        y += 1;
        stopping_y += two_a_sq;
        error += y_change;
        y_change += two_a_sq;
        if 2 * error + x_change > 0 {
            x -= 1;
            stopping_x -= two_b_sq;
            error += x_change;
            x_change += two_b_sq;
        }
    }

    x = 0;
    y = ry;
    x_change = ry * ry;
    y_change = rx * rx * (1 - 2 * ry);
    error = 0;
    stopping_x = 0;
    stopping_y = two_a_sq * ry;
    while stopping_x <= stopping_y {
        plot(wide(x), wide(y));
        x += 1;
        stopping_x += two_b_sq;
        error += x_change;
        x_change += two_b_sq;
        if 2 * error + y_change > 0 {
            y -= 1;
            stopping_y -= two_a_sq;
            error += y_change;
            y_change += two_a_sq;
        }
    }
}

/// Outline coordinates never exceed the radii, which came from `i32`.
fn wide(v: i128) -> i64 {
    i64::try_from(v).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::super::testing::*;
    use super::*;
    use crate::rect::Rect;

    #[test]
    fn filled_ellipse_with_equal_radii_matches_circle() {
        for r in 0..12 {
            let mut a = canvas(32, 32);
            let mut b = canvas(32, 32);
            Rasterizer::unclipped(&mut a).draw_filled_ellipse(16, 16, r, r, Color::RED);
            Rasterizer::unclipped(&mut b).draw_filled_circle(16, 16, r, Color::RED);
            assert_eq!(written(&a), written(&b), "radius {r}");
        }
    }

    #[test]
    fn circle_is_symmetric() {
        let mut bmp = canvas(32, 32);
        Rasterizer::unclipped(&mut bmp).draw_circle(16, 16, 9, Color::WHITE);
        let px = written(&bmp);
        for &(x, y) in &px {
            let mirrored = (32 - x, y);
            let transposed = (y, x);
            assert!(px.contains(&mirrored), "missing mirror of ({x},{y})");
            assert!(px.contains(&transposed), "missing transpose of ({x},{y})");
        }
        assert!(px.contains(&(16, 7)));
        assert!(px.contains(&(25, 16)));
    }

    #[test]
    fn circle_clipped_stays_inside() {
        let mut bmp = canvas(32, 32);
        let clip = Rect::new(0, 0, 16, 16);
        Rasterizer::new(&mut bmp, clip).draw_filled_circle(16, 16, 10, Color::GREEN);
        assert_inside(&bmp, clip);
        assert!(!written(&bmp).is_empty());
    }

    #[test]
    fn filled_circle_covers_outline() {
        let mut outline = canvas(32, 32);
        let mut filled = canvas(32, 32);
        Rasterizer::unclipped(&mut outline).draw_circle(15, 15, 8, Color::RED);
        Rasterizer::unclipped(&mut filled).draw_filled_circle(15, 15, 8, Color::RED);
        let fill_px = written(&filled);
        for p in written(&outline) {
            assert!(fill_px.contains(&p), "outline pixel {p:?} not filled");
        }
    }

    #[test]
    fn ellipse_extremes() {
        let mut bmp = canvas(40, 20);
        Rasterizer::unclipped(&mut bmp).draw_ellipse(20, 10, 12, 5, Color::BLUE);
        let px = written(&bmp);
        for p in [(8, 10), (32, 10), (20, 5), (20, 15)] {
            assert!(px.contains(&p), "missing extreme {p:?}");
        }
        assert!(!px.contains(&(20, 10)), "outline must not touch the centre");
    }

    #[test]
    fn filled_ellipse_fills_outline_rows() {
        let mut outline = canvas(40, 20);
        let mut filled = canvas(40, 20);
        Rasterizer::unclipped(&mut outline).draw_ellipse(20, 10, 12, 5, Color::BLUE);
        Rasterizer::unclipped(&mut filled).draw_filled_ellipse(20, 10, 12, 5, Color::BLUE);
        let out_px = written(&outline);
        let fill_px = written(&filled);
        for y in 0..20 {
            let row: Vec<i32> = out_px.iter().filter(|p| p.1 == y).map(|p| p.0).collect();
            let (Some(lo), Some(hi)) = (row.iter().min(), row.iter().max()) else {
                assert!(
                    fill_px.iter().all(|p| p.1 != y),
                    "row {y} filled beyond outline"
                );
                continue;
            };
            let filled_row: Vec<i32> = fill_px.iter().filter(|p| p.1 == y).map(|p| p.0).collect();
            let expected: Vec<i32> = (*lo..=*hi).collect();
            assert_eq!(filled_row, expected, "row {y}");
        }
    }

    #[test]
    fn shapes_outside_clip_write_nothing() {
        let mut bmp = canvas(16, 16);
        let mut r = Rasterizer::new(&mut bmp, Rect::new(0, 0, 8, 8));
        r.draw_circle(30, 30, 5, Color::RED);
        r.draw_filled_circle(-20, 4, 10, Color::RED);
        r.draw_ellipse(4, 40, 6, 3, Color::RED);
        r.draw_filled_ellipse(12, 12, 2, 3, Color::RED);
        r.draw_filled_ellipse(4, -9, 0, 5, Color::RED);
        assert!(written(&bmp).is_empty());
    }

    #[test]
    fn extreme_geometry_is_rejected() {
        let mut bmp = canvas(8, 8);
        let mut r = Rasterizer::unclipped(&mut bmp);
        r.draw_filled_circle(-2_000_000_000, 0, 1 << 30, Color::RED);
        r.draw_circle(i32::MAX, i32::MIN, i32::MAX, Color::RED);
        r.draw_filled_ellipse(0, 100_000, 1 << 30, 3, Color::RED);
        r.draw_ellipse(i32::MIN, 0, 5, i32::MAX, Color::RED);
        assert!(written(&bmp).is_empty());
    }

    #[test]
    fn tall_ellipse_fills_only_clipped_rows() {
        let mut bmp = canvas(8, 8);
        Rasterizer::unclipped(&mut bmp).draw_filled_ellipse(4, 4, 3, 100_000, Color::GREEN);
        let px = written(&bmp);
        assert_eq!(px.len(), 56, "seven columns on each of eight rows");
        assert!(px.iter().all(|&(x, _)| (1..=7).contains(&x)));
    }

    #[test]
    fn degenerate_ellipse_is_a_line() {
        let mut bmp = canvas(20, 20);
        Rasterizer::unclipped(&mut bmp).draw_filled_ellipse(10, 10, 4, 0, Color::RED);
        assert_eq!(written(&bmp).len(), 9);
    }
}
