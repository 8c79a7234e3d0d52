// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Region-invalidation channel constants.
//!
//! Every widget's [`RegionCache`](crate::widget::RegionCache) holds two
//! independently invalidated lists, one per channel. Both channels carry a
//! dependency edge from each child to its parent in an
//! [`understory_dirty`] tracker, so marking a widget with
//! [`EagerPolicy`](understory_dirty::EagerPolicy) reaches its whole subtree.
//!
//! # Propagation
//!
//! A structural change to a widget (attach, detach, move, resize, z-reorder,
//! hide, show, shelve) can change what any widget under the same parent
//! sees, so the tree marks **every** child subtree of that parent on both
//! channels. The parent itself only loses its [`BACKGROUND`]: its children
//! changed, but nothing that occludes it did.
//!
//! # Consumption
//!
//! The tree drains both channels right after marking and clears the
//! matching validity flag on each drained widget's cache. Recomputation is
//! lazy and happens on the next read of the list.

use understory_dirty::Channel;

/// The widget's visible area changed.
pub const FOREGROUND: Channel = Channel::new(0);

/// The area the widget paints itself changed (foreground minus children).
pub const BACKGROUND: Channel = Channel::new(1);
