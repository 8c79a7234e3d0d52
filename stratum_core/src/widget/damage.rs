// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Distribution of exposed screen area to the widgets underneath.
//!
//! When a widget is removed, hidden, moved, shrunk, or lowered, the area it
//! no longer covers becomes *damage* under its parent. [`DamageEngine`]
//! walks the parent's children topmost first; each visible child claims the
//! part of the damage inside its clipped rect and hands that on to its own
//! children the same way. What a widget keeps after its children have taken
//! their share is its repaint.
//!
//! Repaints come out children-first, so a widget never paints over a
//! descendant that has already been repainted in the same pass.

use alloc::vec::Vec;

use crate::rect::{Rect, intersect_all, region_area, subtract_all};

use super::id::{INVALID, WidgetId};
use super::tree::{Lifecycle, WidgetTree};

/// One widget's share of the damage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Repaint {
    /// The widget to repaint.
    pub widget: WidgetId,
    /// Disjoint absolute rects it must repaint.
    pub rects: Vec<Rect>,
}

/// The outcome of distributing damage below one parent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DamageReport {
    /// Repaints in the order they must be performed.
    pub repaints: Vec<Repaint>,
    /// Damage no child claimed. It belongs to the parent's own background,
    /// or to the display background where the parent does not reach.
    pub leftover: Vec<Rect>,
}

impl DamageReport {
    /// Whether there is nothing to repaint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repaints.is_empty() && self.leftover.is_empty()
    }

    /// Pixels claimed by widgets.
    #[must_use]
    pub fn repainted_area(&self) -> u32 {
        self.repaints.iter().map(|r| region_area(&r.rects)).sum()
    }
}

/// Read-only damage distribution over a [`WidgetTree`].
#[derive(Debug)]
pub struct DamageEngine<'t> {
    tree: &'t WidgetTree,
}

impl<'t> DamageEngine<'t> {
    /// Creates an engine over the tree's current state.
    #[must_use]
    pub fn new(tree: &'t WidgetTree) -> Self {
        Self { tree }
    }

    /// Hands `damage` (disjoint, absolute) to the children of `parent`.
    ///
    /// `skip` excludes one child, typically the widget whose change caused
    /// the damage while it is still linked.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is stale.
    #[must_use]
    pub fn distribute(
        &self,
        parent: WidgetId,
        damage: Vec<Rect>,
        skip: Option<WidgetId>,
    ) -> DamageReport {
        self.tree.validate(parent);
        let skip = skip.map_or(INVALID, |s| s.idx);
        let mut report = DamageReport::default();
        let mut remaining = damage;
        self.claim_children(parent.idx, &mut remaining, skip, &mut report.repaints);
        report.leftover = remaining;
        report
    }

    /// Lets each visible child of `idx`, topmost first, take its share of
    /// `damage`.
    fn claim_children(
        &self,
        idx: u32,
        damage: &mut Vec<Rect>,
        skip: u32,
        out: &mut Vec<Repaint>,
    ) {
        let t = self.tree;
        let mut c = t.last_child(idx);
        while c != INVALID && !damage.is_empty() {
            let i = c as usize;
            if c != skip && t.state[i] == Lifecycle::Attached && !t.flags[i].hidden {
                self.claim(c, damage, skip, out);
            }
            c = t.prev_sibling[i];
        }
    }

    fn claim(&self, idx: u32, damage: &mut Vec<Rect>, skip: u32, out: &mut Vec<Repaint>) {
        let t = self.tree;
        if t.flags[idx as usize].permeable {
            // Children may lie outside; they take from the shared damage.
            self.claim_children(idx, damage, skip, out);
        }
        let clip = t.clipped(idx);
        let mut mine = intersect_all(damage, clip);
        if mine.is_empty() {
            return;
        }
        subtract_all_region(damage, &mine);
        if !t.flags[idx as usize].permeable {
            self.claim_children(idx, &mut mine, skip, out);
        }
        if !mine.is_empty() {
            out.push(Repaint {
                widget: t.handle(idx),
                rects: mine,
            });
        }
    }
}

fn subtract_all_region(region: &mut Vec<Rect>, cut: &[Rect]) {
    for &r in cut {
        subtract_all(region, r);
    }
}
