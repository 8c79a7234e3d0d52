// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! How a widget paints its own area.
//!
//! Every widget carries one [`Skin`]. The built-in variants cover the common
//! flat, bevelled, framed, and picture looks; anything else plugs in through
//! [`DrawContents`].

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;

use crate::color::Color;
use crate::port::DrawPort;
use crate::surface::Bitmap;

/// Custom painting for a widget.
///
/// `draw` receives a port already clipped to the rects being repainted; it
/// should paint the whole widget in local coordinates and let the port drop
/// what falls outside.
pub trait DrawContents {
    /// Paints the widget.
    fn draw(&self, port: &mut DrawPort<'_>);
}

/// The look of a widget, chosen when it is built.
#[derive(Default)]
pub enum Skin {
    /// Draws nothing of its own: the display background shows through.
    #[default]
    None,
    /// A flat fill.
    Solid(Color),
    /// A fill with a one-pixel raised edge.
    Bevelled {
        /// Fill colour.
        face: Color,
        /// Top and left edge.
        light: Color,
        /// Bottom and right edge.
        shadow: Color,
    },
    /// A fill with a one-pixel outline.
    Framed {
        /// Fill colour.
        face: Color,
        /// Outline colour.
        frame: Color,
    },
    /// A bitmap drawn at the widget's top-left, over the display background.
    Picture(Arc<Bitmap>),
    /// Caller-provided painting.
    Custom(Box<dyn DrawContents>),
}

impl fmt::Debug for Skin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Solid(c) => f.debug_tuple("Solid").field(c).finish(),
            Self::Bevelled {
                face,
                light,
                shadow,
            } => f
                .debug_struct("Bevelled")
                .field("face", face)
                .field("light", light)
                .field("shadow", shadow)
                .finish(),
            Self::Framed { face, frame } => f
                .debug_struct("Framed")
                .field("face", face)
                .field("frame", frame)
                .finish(),
            Self::Picture(bmp) => f.debug_tuple("Picture").field(bmp).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Skin {
    /// Paints the widget through `port`.
    pub fn draw(&self, port: &mut DrawPort<'_>) {
        let (w, h) = (i32::from(port.width()), i32::from(port.height()));
        match self {
            Self::None => {
                let bg = port.background();
                port.clear(bg);
            }
            Self::Solid(face) => port.clear(*face),
            Self::Bevelled {
                face,
                light,
                shadow,
            } => {
                port.clear(*face);
                port.draw_bevelled_rect(0, 0, w, h, *light, *shadow);
            }
            Self::Framed { face, frame } => {
                port.clear(*face);
                port.draw_rect(0, 0, w, h, *frame);
            }
            Self::Picture(bmp) => {
                let bg = port.background();
                port.clear(bg);
                port.draw_bitmap(0, 0, w, h, bmp, 0, 0);
            }
            Self::Custom(contents) => contents.draw(port),
        }
    }

    /// Whether the skin paints nothing of its own.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{Display, DisplayConfig};
    use crate::rect::Rect;

    struct Cross;

    impl DrawContents for Cross {
        fn draw(&self, port: &mut DrawPort<'_>) {
            let (w, h) = (i32::from(port.width()), i32::from(port.height()));
            port.draw_line(0, 0, w - 1, h - 1, Color::RED);
        }
    }

    fn paint(skin: &Skin, bounds: Rect, clip: Rect) -> Display {
        let mut display = Display::new(&DisplayConfig::single(32, 32));
        let clips = [clip];
        skin.draw(&mut DrawPort::new(&mut display, bounds, &clips));
        display
    }

    #[test]
    fn bevelled_edges_and_face() {
        let skin = Skin::Bevelled {
            face: Color::GREY,
            light: Color::WHITE,
            shadow: Color::BLUE,
        };
        let bounds = Rect::new(4, 4, 8, 8);
        let d = paint(&skin, bounds, bounds);
        assert_eq!(d.pixel(4, 4), Some(Color::WHITE));
        assert_eq!(d.pixel(11, 11), Some(Color::BLUE));
        assert_eq!(d.pixel(7, 7), Some(Color::GREY));
        assert_eq!(d.pixel(12, 12), Some(Color::BLACK));
    }

    #[test]
    fn framed_respects_clip() {
        let skin = Skin::Framed {
            face: Color::WHITE,
            frame: Color::RED,
        };
        let bounds = Rect::new(0, 0, 10, 10);
        let d = paint(&skin, bounds, Rect::new(5, 0, 5, 10));
        assert_eq!(d.pixel(0, 0), Some(Color::BLACK), "outside the clip");
        assert_eq!(d.pixel(9, 0), Some(Color::RED));
        assert_eq!(d.pixel(6, 5), Some(Color::WHITE));
    }

    #[test]
    fn picture_blits_at_origin() {
        let bmp = Arc::new(Bitmap::filled(4, 4, Color::GREEN));
        let bounds = Rect::new(2, 2, 6, 6);
        let d = paint(&Skin::Picture(bmp), bounds, bounds);
        assert_eq!(d.pixel(2, 2), Some(Color::GREEN));
        assert_eq!(d.pixel(5, 5), Some(Color::GREEN));
        assert_eq!(d.pixel(6, 6), Some(Color::BLACK), "beyond the bitmap");
    }

    #[test]
    fn custom_contents_draw_locally() {
        let bounds = Rect::new(10, 10, 5, 5);
        let d = paint(&Skin::Custom(Box::new(Cross)), bounds, bounds);
        assert_eq!(d.pixel(10, 10), Some(Color::RED));
        assert_eq!(d.pixel(14, 14), Some(Color::RED));
        assert_eq!(d.pixel(14, 10), Some(Color::BLACK));
    }
}
