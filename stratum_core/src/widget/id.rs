// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Widget identity.

use core::fmt;

/// Sentinel for "no widget" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a widget in a [`WidgetTree`](super::WidgetTree).
///
/// Pairs a slot index with the slot's generation, so a handle to a widget
/// that has been freed no longer matches once the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl WidgetId {
    /// The raw slot index (for diagnostics and trace events).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// The slot generation this handle was issued for.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WidgetId({}@gen{})", self.idx, self.generation)
    }
}
