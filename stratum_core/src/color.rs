// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 15-bit BGR pixel values.

use core::fmt;

use bytemuck::{Pod, Zeroable};

/// A 15-bit BGR pixel with an opaque bit, as stored in a [`Surface`].
///
/// Layout (LSB first): 5 bits red, 5 bits green, 5 bits blue, 1 opaque bit.
/// The zero value is fully transparent black.
///
/// [`Surface`]: crate::surface::Surface
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Color(pub u16);

impl Color {
    /// The opaque bit.
    pub const OPAQUE_BIT: u16 = 0x8000;

    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(31, 31, 31);
    /// Opaque mid grey.
    pub const GREY: Self = Self::rgb(16, 16, 16);
    /// Opaque red.
    pub const RED: Self = Self::rgb(31, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 31, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 31);

    /// Creates an opaque colour from 5-bit channels. Higher bits are ignored.
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(
            Self::OPAQUE_BIT
                | ((b as u16 & 0x1F) << 10)
                | ((g as u16 & 0x1F) << 5)
                | (r as u16 & 0x1F),
        )
    }

    /// Red channel (0–31).
    #[inline]
    #[must_use]
    pub const fn red(self) -> u8 {
        (self.0 & 0x1F) as u8
    }

    /// Green channel (0–31).
    #[inline]
    #[must_use]
    pub const fn green(self) -> u8 {
        ((self.0 >> 5) & 0x1F) as u8
    }

    /// Blue channel (0–31).
    #[inline]
    #[must_use]
    pub const fn blue(self) -> u8 {
        ((self.0 >> 10) & 0x1F) as u8
    }

    /// Returns `true` if the opaque bit is set.
    #[inline]
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.0 & Self::OPAQUE_BIT != 0
    }

    /// Halves every channel, keeping the opaque bit.
    #[inline]
    #[must_use]
    pub const fn dimmed(self) -> Self {
        Self(((self.0 & 0x7BDE) >> 1) | (self.0 & Self::OPAQUE_BIT))
    }

    /// Replaces every channel by the channel average, keeping the opaque bit.
    #[inline]
    #[must_use]
    pub const fn greyscale(self) -> Self {
        let sum = self.red() as u16 + self.green() as u16 + self.blue() as u16;
        let l = sum / 3;
        Self((self.0 & Self::OPAQUE_BIT) | (l << 10) | (l << 5) | l)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Color(r{} g{} b{}{})",
            self.red(),
            self.green(),
            self.blue(),
            if self.is_opaque() { "" } else { " transparent" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels() {
        let c = Color::rgb(1, 2, 3);
        assert_eq!((c.red(), c.green(), c.blue()), (1, 2, 3));
        assert!(c.is_opaque());
        assert!(!Color(0).is_opaque());
    }

    #[test]
    fn dim_halves_channels() {
        let c = Color::rgb(31, 10, 3).dimmed();
        assert_eq!((c.red(), c.green(), c.blue()), (15, 5, 1));
        assert!(c.is_opaque());
        assert_eq!(Color(0x0001).dimmed(), Color(0));
    }

    #[test]
    fn greyscale_averages() {
        let g = Color::rgb(30, 0, 3).greyscale();
        assert_eq!((g.red(), g.green(), g.blue()), (11, 11, 11));
        assert_eq!(Color::WHITE.greyscale(), Color::WHITE);
    }

    #[test]
    fn bytes_view_is_native_u16() {
        let px = [Color::rgb(31, 0, 0)];
        let bytes: &[u8] = bytemuck::cast_slice(&px);
        assert_eq!(u16::from_ne_bytes([bytes[0], bytes[1]]), 0x801F);
    }
}
