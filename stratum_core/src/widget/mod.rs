// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Widget tree data model.
//!
//! A *widget* is a rectangular node in a z-ordered tree. Each widget has:
//!
//! - An identity ([`WidgetId`]): a generational handle that becomes stale
//!   when the widget is freed.
//! - Topology: parent, first-child, and sibling links. Siblings are ordered
//!   bottom to top; decorations always sit below ordinary children.
//! - Geometry: a rect relative to its parent's top-left corner and client
//!   [`Insets`].
//! - [`WidgetFlags`], a [`Lifecycle`] state, and a [`Skin`](crate::skin::Skin).
//! - Cached visible regions ([`RegionCache`]): the *foreground* (what can be
//!   seen) and the *background* (what the widget paints itself).
//!
//! Widgets are stored in struct-of-arrays layout with index-based handles.
//!
//! # Invalidation
//!
//! Structural mutations mark the region channels (see [`dirty`](crate::dirty))
//! and regions are recomputed lazily on read. Exposed area is handed to the
//! widgets below by the [`DamageEngine`].

mod damage;
mod id;
mod region;
mod traverse;
mod tree;

pub use damage::{DamageEngine, DamageReport, Repaint};
pub use id::{INVALID, WidgetId};
pub use region::RegionCache;
pub use traverse::Children;
pub use tree::{Insets, Lifecycle, WidgetFlags, WidgetTree};
