// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle notifications queued by the [`Context`](crate::context::Context).

use crate::rect::Rect;
use crate::widget::WidgetId;

/// What happened to a widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Added to a parent.
    Attached,
    /// Closed; the handle stays valid until the end of the tick.
    Closed,
    /// Taken off its parent temporarily.
    Shelved,
    /// Returned to its parent.
    Unshelved,
    /// Hidden with its subtree.
    Hidden,
    /// Shown again.
    Shown,
    /// Moved within its parent. Rects are parent-relative.
    Moved {
        /// Previous rect.
        from: Rect,
        /// New rect.
        to: Rect,
    },
    /// Resized. Rects are parent-relative.
    Resized {
        /// Previous rect.
        from: Rect,
        /// New rect.
        to: Rect,
    },
    /// Brought to the top of its siblings.
    Raised,
    /// Sent to the bottom of its siblings.
    Lowered,
    /// A modal loop started for the widget.
    ModalStarted,
    /// The widget's modal loop returned.
    ModalEnded,
}

/// A notification about one widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WidgetEvent {
    /// The widget the event is about.
    pub source: WidgetId,
    /// What happened.
    pub kind: EventKind,
}

impl WidgetEvent {
    /// Creates an event.
    #[must_use]
    pub const fn new(source: WidgetId, kind: EventKind) -> Self {
        Self { source, kind }
    }
}
