// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One or two surfaces behind a single vertical coordinate space.
//!
//! Dual-screen hardware exposes two framebuffers. The widget tree lays both
//! out as one tall canvas: rows below the *threshold* address the top surface
//! directly, rows at or above it address the bottom surface at
//! `y - threshold`. [`Display::split`] performs that remap for a clip rect.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::color::Color;
use crate::rect::Rect;
use crate::surface::{Bitmap, Surface};

/// Display geometry and background colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Width of every surface.
    pub width: u16,
    /// Height of the top surface; also the threshold for the bottom surface.
    pub top_height: u16,
    /// Height of the bottom surface, if there is one.
    pub bottom_height: Option<u16>,
    /// Colour used to clear damage no widget claims.
    pub background: Color,
}

impl DisplayConfig {
    /// Two stacked 256×192 screens, as on a dual-screen handheld.
    #[must_use]
    pub const fn dual_screen() -> Self {
        Self {
            width: 256,
            top_height: 192,
            bottom_height: Some(192),
            background: Color::BLACK,
        }
    }

    /// A single screen of the given size.
    #[must_use]
    pub const fn single(width: u16, height: u16) -> Self {
        Self {
            width,
            top_height: height,
            bottom_height: None,
            background: Color::BLACK,
        }
    }

    /// Returns the config with a different background colour.
    #[must_use]
    pub const fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::dual_screen()
    }
}

/// A clip rect resolved to one physical surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenClip {
    /// Index of the surface (0 = top, 1 = bottom).
    pub screen: usize,
    /// The clip in that surface's own coordinates.
    pub clip: Rect,
    /// Amount subtracted from unified `y` to reach surface `y`.
    pub y_offset: i32,
}

/// The set of physical surfaces drawn to.
pub struct Display {
    screens: Vec<Box<dyn Surface>>,
    threshold: u16,
    background: Color,
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("screens", &self.screens.len())
            .field("threshold", &self.threshold)
            .field("background", &self.background)
            .finish()
    }
}

impl Display {
    /// Allocates bitmaps for the configured screens, cleared to the
    /// background colour.
    #[must_use]
    pub fn new(config: &DisplayConfig) -> Self {
        let top = Box::new(Bitmap::filled(
            config.width,
            config.top_height,
            config.background,
        ));
        let bottom = config.bottom_height.map(|h| {
            Box::new(Bitmap::filled(config.width, h, config.background)) as Box<dyn Surface>
        });
        Self::from_surfaces(top, bottom, config.background)
    }

    /// Wraps caller-provided surfaces. The threshold is the top surface's
    /// height.
    #[must_use]
    pub fn from_surfaces(
        top: Box<dyn Surface>,
        bottom: Option<Box<dyn Surface>>,
        background: Color,
    ) -> Self {
        let threshold = top.height();
        let mut screens = Vec::with_capacity(2);
        screens.push(top);
        screens.extend(bottom);
        Self {
            screens,
            threshold,
            background,
        }
    }

    /// Number of physical surfaces (1 or 2).
    #[must_use]
    pub fn screen_count(&self) -> usize {
        self.screens.len()
    }

    /// Unified `y` at which the bottom surface begins.
    #[must_use]
    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Background colour.
    #[must_use]
    pub fn background(&self) -> Color {
        self.background
    }

    /// The unified canvas extent.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let width = self.screens.iter().map(|s| s.width()).max().unwrap_or(0);
        let height = i32::from(self.threshold)
            + self
                .screens
                .get(1)
                .map_or(0, |s| i32::from(s.height()));
        Rect::from_i32(0, 0, i32::from(width), height)
    }

    /// Shared access to one surface.
    ///
    /// # Panics
    ///
    /// Panics if `screen` is out of range.
    #[must_use]
    pub fn surface(&self, screen: usize) -> &dyn Surface {
        &*self.screens[screen]
    }

    /// Mutable access to one surface.
    ///
    /// # Panics
    ///
    /// Panics if `screen` is out of range.
    pub fn surface_mut(&mut self, screen: usize) -> &mut (dyn Surface + 'static) {
        &mut *self.screens[screen]
    }

    /// Reads a pixel in unified coordinates, or `None` if off-canvas.
    #[must_use]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let c = self.split(Rect::from_i32(x, y, 1, 1)).next()?;
        let sx = u16::try_from(c.clip.left()).ok()?;
        let sy = u16::try_from(c.clip.top()).ok()?;
        Some(self.screens[c.screen].pixel(sx, sy))
    }

    /// Resolves a unified clip rect into per-surface clips.
    ///
    /// Yields at most one [`ScreenClip`] per surface; parts of `clip` outside
    /// every surface are dropped.
    pub fn split(&self, clip: Rect) -> impl Iterator<Item = ScreenClip> + use<> {
        let mut out = [None, None];
        let threshold = i32::from(self.threshold);
        for (screen, surface) in self.screens.iter().enumerate() {
            let y_offset = if screen == 0 { 0 } else { threshold };
            let local = clip.translate(0, -y_offset).intersect(surface.bounds());
            if !local.is_empty() && screen < out.len() {
                out[screen] = Some(ScreenClip {
                    screen,
                    clip: local,
                    y_offset,
                });
            }
        }
        out.into_iter().flatten()
    }

    /// Fills the given unified rects with the background colour.
    pub fn clear(&mut self, rects: &[Rect]) {
        let color = self.background;
        for &r in rects {
            for part in self.split(r) {
                crate::raster::Rasterizer::new(self.surface_mut(part.screen), part.clip)
                    .clear(color);
            }
        }
    }
}
