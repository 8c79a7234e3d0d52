// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child iteration.

use super::id::{INVALID, WidgetId};
use super::tree::WidgetTree;

/// The direct children of a widget, bottom of the z-order first.
///
/// Reverse it to walk topmost first. Created by [`WidgetTree::children`].
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a WidgetTree,
    front: u32,
    back: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a WidgetTree, first: u32, last: u32) -> Self {
        Self {
            tree,
            front: first,
            back: last,
        }
    }

    fn handle(&self, idx: u32) -> WidgetId {
        WidgetId {
            idx,
            generation: self.tree.generation[idx as usize],
        }
    }
}

impl Iterator for Children<'_> {
    type Item = WidgetId;

    fn next(&mut self) -> Option<WidgetId> {
        if self.front == INVALID {
            return None;
        }
        let idx = self.front;
        if idx == self.back {
            self.front = INVALID;
            self.back = INVALID;
        } else {
            self.front = self.tree.next_sibling[idx as usize];
        }
        Some(self.handle(idx))
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<WidgetId> {
        if self.back == INVALID {
            return None;
        }
        let idx = self.back;
        if idx == self.front {
            self.front = INVALID;
            self.back = INVALID;
        } else {
            self.back = self.tree.prev_sibling[idx as usize];
        }
        Some(self.handle(idx))
    }
}
