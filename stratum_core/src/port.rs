// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Widget-local drawing through a list of clip rects.
//!
//! A [`DrawPort`] is built for one paint of one widget. It carries the
//! widget's absolute origin, the rects the widget may touch (a foreground,
//! background, or damage list, all in unified display coordinates), and
//! whether drawing is enabled for the widget.
//!
//! Every primitive is reissued once per clip rect and per surface that rect
//! reaches: the rect is split at the display threshold, a [`Rasterizer`] is
//! bound to the surface part, and the call's widget-local coordinates are
//! offset into that surface.

use alloc::vec::Vec;

use crate::color::Color;
use crate::display::Display;
use crate::raster::Rasterizer;
use crate::rect::Rect;
use crate::surface::Bitmap;

/// Per-paint drawing façade for one widget.
pub struct DrawPort<'a> {
    display: &'a mut Display,
    origin_x: i32,
    origin_y: i32,
    width: u16,
    height: u16,
    clips: &'a [Rect],
    enabled: bool,
}

impl core::fmt::Debug for DrawPort<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DrawPort")
            .field("origin", &(self.origin_x, self.origin_y))
            .field("size", &(self.width, self.height))
            .field("clips", &self.clips)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl<'a> DrawPort<'a> {
    /// Creates a port for a widget whose absolute bounds are `bounds`.
    ///
    /// `clips` are in unified display coordinates and should already be
    /// disjoint.
    pub fn new(display: &'a mut Display, bounds: Rect, clips: &'a [Rect]) -> Self {
        Self {
            display,
            origin_x: bounds.left(),
            origin_y: bounds.top(),
            width: bounds.width,
            height: bounds.height,
            clips,
            enabled: true,
        }
    }

    /// Turns every primitive into a no-op when `enabled` is false.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Widget width.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Widget height.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The widget's bounds in its own coordinates.
    #[must_use]
    pub fn local_bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// The display background colour.
    #[must_use]
    pub fn background(&self) -> Color {
        self.display.background()
    }

    /// Runs `f` once per surface part of every clip rect, passing the offset
    /// from widget-local to surface coordinates.
    fn each(&mut self, mut f: impl FnMut(&mut Rasterizer<'_>, i32, i32)) {
        if !self.enabled {
            return;
        }
        let clips = self.clips;
        for &clip in clips {
            for part in self.display.split(clip) {
                let mut r = Rasterizer::new(self.display.surface_mut(part.screen), part.clip);
                f(&mut r, self.origin_x, self.origin_y - part.y_offset);
            }
        }
    }

    /// Writes a single pixel.
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.each(|r, dx, dy| r.draw_pixel(x + dx, y + dy, color));
    }

    /// Draws a horizontal run.
    pub fn draw_horiz_line(&mut self, x: i32, y: i32, width: i32, color: Color) {
        self.each(|r, dx, dy| r.draw_horiz_line(x + dx, y + dy, width, color));
    }

    /// Draws a vertical run.
    pub fn draw_vert_line(&mut self, x: i32, y: i32, height: i32, color: Color) {
        self.each(|r, dx, dy| r.draw_vert_line(x + dx, y + dy, height, color));
    }

    /// Draws a line between two inclusive endpoints.
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
        self.each(|r, dx, dy| r.draw_line(x1 + dx, y1 + dy, x2 + dx, y2 + dy, color));
    }

    /// Draws a one-pixel rectangle outline.
    pub fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        self.each(|r, dx, dy| r.draw_rect(x + dx, y + dy, width, height, color));
    }

    /// Fills a rectangle.
    pub fn draw_filled_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Color) {
        self.each(|r, dx, dy| r.draw_filled_rect(x + dx, y + dy, width, height, color));
    }

    /// Draws a rect outline lit from the top-left.
    pub fn draw_bevelled_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        light: Color,
        shadow: Color,
    ) {
        self.each(|r, dx, dy| r.draw_bevelled_rect(x + dx, y + dy, width, height, light, shadow));
    }

    /// Draws a circle outline.
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color) {
        self.each(|r, dx, dy| r.draw_circle(cx + dx, cy + dy, radius, color));
    }

    /// Draws a filled circle.
    pub fn draw_filled_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color) {
        self.each(|r, dx, dy| r.draw_filled_circle(cx + dx, cy + dy, radius, color));
    }

    /// Draws an ellipse outline.
    pub fn draw_ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, color: Color) {
        self.each(|r, dx, dy| r.draw_ellipse(cx + dx, cy + dy, rx, ry, color));
    }

    /// Draws a filled ellipse.
    pub fn draw_filled_ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, color: Color) {
        self.each(|r, dx, dy| r.draw_filled_ellipse(cx + dx, cy + dy, rx, ry, color));
    }

    /// Flood fills from `(x, y)` within each clip rect separately. Returns
    /// the total number of pixels written.
    pub fn flood_fill(&mut self, x: i32, y: i32, color: Color) -> u32 {
        let mut total = 0;
        self.each(|r, dx, dy| total += r.flood_fill(x + dx, y + dy, color));
        total
    }

    /// Copies a block of the bitmap to `(x, y)`.
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
        self.each(|r, dx, dy| r.draw_bitmap(x + dx, y + dy, width, height, bitmap, bx, by));
    }

    /// Copies a block of the bitmap, skipping pixels equal to `key`.
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
        self.each(|r, dx, dy| {
            r.draw_bitmap_transparent(x + dx, y + dy, width, height, bitmap, bx, by, key);
        });
    }

    /// Copies a block of the bitmap in greyscale.
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
        self.each(|r, dx, dy| {
            r.draw_bitmap_greyscale(x + dx, y + dy, width, height, bitmap, bx, by);
        });
    }

    /// Halves the brightness of a local rect.
    pub fn dim(&mut self, area: Rect) {
        self.each(|r, dx, dy| r.dim(area.translate(dx, dy)));
    }

    /// Converts a local rect to greyscale.
    pub fn grey_scale(&mut self, area: Rect) {
        self.each(|r, dx, dy| r.grey_scale(area.translate(dx, dy)));
    }

    /// Fills every clip rect with `color`.
    pub fn clear(&mut self, color: Color) {
        self.each(|r, _, _| r.clear(color));
    }

    /// Copies a local block so its top-left lands on `(x, y)`.
    pub fn copy(&mut self, src: Rect, x: i32, y: i32) {
        self.each(|r, dx, dy| {
            r.copy(src.translate(dx, dy), x + dx, y + dy);
        });
    }

    /// Shifts the contents of a local area by `(sx, sy)`.
    ///
    /// Returns the revealed rects in widget-local coordinates; the caller
    /// repaints them. Content is only moved within each clip rect, so pixels
    /// whose source lies in a different clip rect are reported as revealed.
    pub fn scroll(&mut self, area: Rect, sx: i32, sy: i32) -> Vec<Rect> {
        let mut revealed = Vec::new();
        self.each(|r, dx, dy| {
            let fragments = r.scroll(area.translate(dx, dy), sx, sy);
            revealed.extend(fragments.map(|f| f.translate(-dx, -dy)));
        });
        revealed
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::display::DisplayConfig;

    fn dual() -> Display {
        Display::new(&DisplayConfig::dual_screen().with_background(Color::BLACK))
    }

    #[test]
    fn local_coordinates_are_offset() {
        let mut display = dual();
        let bounds = Rect::new(10, 20, 30, 30);
        let clips = [bounds];
        DrawPort::new(&mut display, bounds, &clips).draw_pixel(2, 3, Color::RED);
        assert_eq!(display.pixel(12, 23), Some(Color::RED));
    }

    #[test]
    fn clips_limit_every_primitive() {
        let mut display = dual();
        let bounds = Rect::new(0, 0, 40, 40);
        let clips = [Rect::new(0, 0, 10, 40), Rect::new(30, 0, 10, 40)];
        DrawPort::new(&mut display, bounds, &clips).draw_filled_rect(0, 5, 40, 1, Color::GREEN);
        assert_eq!(display.pixel(5, 5), Some(Color::GREEN));
        assert_eq!(display.pixel(20, 5), Some(Color::BLACK));
        assert_eq!(display.pixel(35, 5), Some(Color::GREEN));
    }

    #[test]
    fn primitives_cross_the_screen_threshold() {
        let mut display = dual();
        let bounds = Rect::new(0, 180, 50, 30);
        let clips = [bounds];
        DrawPort::new(&mut display, bounds, &clips).draw_vert_line(4, 0, 30, Color::WHITE);
        assert_eq!(display.pixel(4, 191), Some(Color::WHITE));
        assert_eq!(display.pixel(4, 192), Some(Color::WHITE));
        assert_eq!(display.pixel(4, 209), Some(Color::WHITE));
        assert_eq!(display.pixel(4, 210), Some(Color::BLACK));
        assert_eq!(display.surface(1).pixel(4, 0), Color::WHITE);
    }

    #[test]
    fn disabled_port_draws_nothing() {
        let mut display = dual();
        let bounds = Rect::new(0, 0, 10, 10);
        let clips = [bounds];
        let mut port = DrawPort::new(&mut display, bounds, &clips).with_enabled(false);
        port.clear(Color::RED);
        assert_eq!(port.flood_fill(1, 1, Color::RED), 0);
        assert!(port.scroll(Rect::new(0, 0, 10, 10), 2, 0).is_empty());
        assert_eq!(display.pixel(1, 1), Some(Color::BLACK));
    }

    #[test]
    fn scroll_reports_local_rects() {
        let mut display = dual();
        let bounds = Rect::new(100, 100, 20, 20);
        let clips = [bounds];
        let revealed =
            DrawPort::new(&mut display, bounds, &clips).scroll(Rect::new(0, 0, 20, 20), 0, -4);
        assert_eq!(revealed, vec![Rect::new(0, 16, 20, 4)]);
    }
}
