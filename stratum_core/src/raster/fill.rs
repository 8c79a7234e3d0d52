// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scanline flood fill.

use alloc::vec::Vec;

use crate::color::Color;
use crate::surface::Surface;

use super::{Rasterizer, ucoord};

impl<S: Surface + ?Sized> Rasterizer<'_, S> {
    /// Replaces the 4-connected region of same-coloured pixels containing
    /// `(x, y)` with `color`, without leaving the clip.
    ///
    /// Uses an explicit seed stack: each popped seed is widened to its full
    /// horizontal span, the span is filled in one write, and one new seed is
    /// pushed per contiguous matching run in the rows directly above and
    /// below. Does nothing if the seed lies outside the clip or already has
    /// the fill colour. Returns the number of pixels written.
    pub fn flood_fill(&mut self, x: i32, y: i32, color: Color) -> u32 {
        if !self.clip.contains(x, y) {
            return 0;
        }
        let target = self.get(x, y);
        if target == color {
            return 0;
        }

        let (left_bound, right_bound) = (self.clip.left(), self.clip.right());
        let (top_bound, bottom_bound) = (self.clip.top(), self.clip.bottom());
        let mut written = 0_u32;
        let mut stack: Vec<(i32, i32)> = Vec::new();
        stack.push((x, y));

        while let Some((sx, sy)) = stack.pop() {
            if self.get(sx, sy) != target {
                continue;
            }
            let mut left = sx;
            while left > left_bound && self.get(left - 1, sy) == target {
                left -= 1;
            }
            let mut right = sx;
            while right < right_bound && self.get(right + 1, sy) == target {
                right += 1;
            }

            let len = ucoord(right - left + 1);
            self.surface.fill_span(ucoord(left), ucoord(sy), len, color);
            written += u32::from(len);

            for ny in [sy - 1, sy + 1] {
                if ny < top_bound || ny > bottom_bound {
                    continue;
                }
                let mut in_run = false;
                for nx in left..=right {
                    let matches = self.get(nx, ny) == target;
                    if matches && !in_run {
                        stack.push((nx, ny));
                    }
                    in_run = matches;
                }
            }
        }
        written
    }
}
