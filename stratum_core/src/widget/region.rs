// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visible-region computation and hit testing.
//!
//! A widget's **clipped rect** is its absolute rect cut down by the client
//! area of every non-permeable ancestor (the full bounds, for the ancestor
//! directly holding a decoration). Its **foreground** is the clipped rect
//! minus everything stacked above it: higher siblings at every level up to
//! the root, recursing into permeable occluders whose children may escape.
//! Its **background** is the foreground minus its own visible children.
//!
//! Both lists are disjoint, cached per widget, and recomputed on read after
//! invalidation.

use alloc::vec;
use alloc::vec::Vec;

use understory_dirty::Channel;

use crate::dirty;
use crate::rect::{Rect, subtract_all};

use super::id::{INVALID, WidgetId};
use super::tree::{Lifecycle, WidgetTree};

/// Cached foreground and background lists for one widget.
#[derive(Clone, Debug, Default)]
pub struct RegionCache {
    foreground: Vec<Rect>,
    background: Vec<Rect>,
    foreground_valid: bool,
    background_valid: bool,
}

impl RegionCache {
    /// Whether the list for `channel` is up to date.
    #[must_use]
    pub fn is_valid(&self, channel: Channel) -> bool {
        if channel == dirty::FOREGROUND {
            self.foreground_valid
        } else {
            self.background_valid
        }
    }

    pub(crate) fn invalidate(&mut self, channel: Channel) {
        if channel == dirty::FOREGROUND {
            self.foreground_valid = false;
        } else {
            self.background_valid = false;
        }
    }
}

impl WidgetTree {
    /// The widget's visible area: disjoint rects in absolute coordinates.
    ///
    /// Empty for any widget that is not visible.
    pub fn foreground(&mut self, id: WidgetId) -> &[Rect] {
        self.validate(id);
        let i = id.idx as usize;
        if !self.regions[i].foreground_valid {
            let rects = self.compute_foreground(id.idx);
            let cache = &mut self.regions[i];
            cache.foreground = rects;
            cache.foreground_valid = true;
        }
        &self.regions[i].foreground
    }

    /// The part of the foreground the widget paints itself: the foreground
    /// minus the clipped rects of its visible children.
    pub fn background(&mut self, id: WidgetId) -> &[Rect] {
        self.validate(id);
        let i = id.idx as usize;
        if !self.regions[i].background_valid {
            let mut rects = self.foreground(id).to_vec();
            let mut c = self.first_child[i];
            while c != INVALID && !rects.is_empty() {
                self.subtract_occluder(&mut rects, c);
                c = self.next_sibling[c as usize];
            }
            let cache = &mut self.regions[i];
            cache.background = rects;
            cache.background_valid = true;
        }
        &self.regions[i].background
    }

    /// The foreground plus, for a permeable widget, the foregrounds of the
    /// visible descendants that may lie outside it. Disjoint.
    pub(crate) fn footprint(&mut self, id: WidgetId) -> Vec<Rect> {
        let mut rects = self.foreground(id).to_vec();
        if !self.flags[id.idx as usize].permeable {
            return rects;
        }
        let mut escaping = Vec::new();
        self.collect_escaping(id.idx, &mut escaping);
        for idx in escaping {
            let handle = self.handle(idx);
            for &r in self.foreground(handle) {
                subtract_all(&mut rects, r);
                rects.push(r);
            }
        }
        rects
    }

    /// The widget's cache, for inspecting validity.
    #[must_use]
    pub fn region_cache(&self, id: WidgetId) -> &RegionCache {
        self.validate(id);
        &self.regions[id.idx as usize]
    }

    /// The absolute rect after ancestor clipping, or [`Rect::EMPTY`] if the
    /// widget is not visible.
    #[must_use]
    pub fn clipped_rect(&self, id: WidgetId) -> Rect {
        self.validate(id);
        if self.visible(id.idx) {
            self.clipped(id.idx)
        } else {
            Rect::EMPTY
        }
    }

    /// The topmost visible widget containing the pixel, searching from the
    /// root down.
    #[must_use]
    pub fn widget_at(&self, x: i32, y: i32) -> Option<WidgetId> {
        let root = self.root;
        if !self.visible(root) || !self.clipped(root).contains(x, y) {
            return None;
        }
        Some(self.handle(self.hit(root, x, y)))
    }

    /// [`widget_at`](Self::widget_at) for a floating-point position.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "float-to-int casts saturate; positions are floored to the containing pixel"
    )]
    pub fn widget_at_point(&self, p: kurbo::Point) -> Option<WidgetId> {
        self.widget_at(p.x.floor() as i32, p.y.floor() as i32)
    }

    pub(crate) fn clipped(&self, idx: u32) -> Rect {
        let mut r = self.abs_rect(idx);
        let mut child = idx;
        let mut p = self.parent[idx as usize];
        while p != INVALID {
            if !self.flags[p as usize].permeable {
                let bound = if self.flags[child as usize].decoration {
                    self.abs_rect(p)
                } else {
                    self.client_abs(p)
                };
                r = r.intersect(bound);
                if r.is_empty() {
                    return Rect::EMPTY;
                }
            }
            child = p;
            p = self.parent[p as usize];
        }
        r
    }

    fn compute_foreground(&self, idx: u32) -> Vec<Rect> {
        if !self.visible(idx) {
            return Vec::new();
        }
        let r = self.clipped(idx);
        if r.is_empty() {
            return Vec::new();
        }
        let mut rects = vec![r];
        let mut node = idx;
        while node != self.root && !rects.is_empty() {
            let mut s = self.next_sibling[node as usize];
            while s != INVALID && !rects.is_empty() {
                self.subtract_occluder(&mut rects, s);
                s = self.next_sibling[s as usize];
            }
            node = self.parent[node as usize];
        }
        rects
    }

    /// Removes what a visible widget covers. Children of a permeable widget
    /// may lie outside it, so they are removed too.
    fn subtract_occluder(&self, rects: &mut Vec<Rect>, idx: u32) {
        let i = idx as usize;
        if self.state[i] != Lifecycle::Attached || self.flags[i].hidden {
            return;
        }
        subtract_all(rects, self.clipped(idx));
        if self.flags[i].permeable {
            let mut c = self.first_child[i];
            while c != INVALID {
                self.subtract_occluder(rects, c);
                c = self.next_sibling[c as usize];
            }
        }
    }

    /// Visible children of a permeable `idx`, descending through those that
    /// are permeable too.
    fn collect_escaping(&self, idx: u32, out: &mut Vec<u32>) {
        let mut c = self.first_child[idx as usize];
        while c != INVALID {
            let i = c as usize;
            if self.state[i] == Lifecycle::Attached && !self.flags[i].hidden {
                out.push(c);
                if self.flags[i].permeable {
                    self.collect_escaping(c, out);
                }
            }
            c = self.next_sibling[i];
        }
    }

    fn hit(&self, idx: u32, x: i32, y: i32) -> u32 {
        let mut c = self.last_child(idx);
        while c != INVALID {
            let i = c as usize;
            if self.state[i] == Lifecycle::Attached && !self.flags[i].hidden {
                let inside = self.clipped(c).contains(x, y);
                if inside || self.flags[i].permeable {
                    let h = self.hit(c, x, y);
                    if inside || h != c {
                        return h;
                    }
                }
            }
            c = self.prev_sibling[i];
        }
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::tree::{Insets, WidgetFlags};

    /// Borderless root (0,0,20,20) holding B at (5,5,10,10) with A at
    /// (0,0,10,10) stacked on top.
    fn overlapping() -> (WidgetTree, WidgetId, WidgetId) {
        let mut t = WidgetTree::new(Rect::new(0, 0, 20, 20));
        let root = t.root();
        let b = t.create_widget(Rect::new(5, 5, 10, 10));
        let a = t.create_widget(Rect::new(0, 0, 10, 10));
        t.add_child(root, b);
        t.add_child(root, a);
        (t, a, b)
    }

    #[test]
    fn higher_sibling_occludes() {
        let (mut t, a, b) = overlapping();
        assert_eq!(t.foreground(a), &[Rect::new(0, 0, 10, 10)]);
        assert_eq!(
            t.foreground(b),
            &[Rect::new(10, 5, 5, 5), Rect::new(5, 10, 10, 5)]
        );
    }

    #[test]
    fn raising_invalidates_and_recomputes() {
        let (mut t, a, b) = overlapping();
        let _ = t.foreground(a);
        let _ = t.foreground(b);
        assert!(t.raise_to_top(b));
        assert!(!t.region_cache(a).is_valid(dirty::FOREGROUND));
        assert_eq!(t.foreground(b), &[Rect::new(5, 5, 10, 10)]);
        assert_eq!(
            t.foreground(a),
            &[Rect::new(0, 0, 10, 5), Rect::new(0, 5, 5, 5)]
        );
    }

    #[test]
    fn background_excludes_children() {
        let mut t = WidgetTree::new(Rect::new(0, 0, 20, 20));
        let win = t.create_widget(Rect::new(0, 0, 20, 20));
        t.add_child(t.root(), win);
        let child = t.create_widget(Rect::new(1, 1, 18, 4));
        t.add_child(win, child);
        assert_eq!(
            t.background(win),
            &[
                Rect::new(0, 0, 20, 1),
                Rect::new(0, 1, 1, 4),
                Rect::new(19, 1, 1, 4),
                Rect::new(0, 5, 20, 15),
            ]
        );
        assert!(t.region_cache(win).is_valid(dirty::BACKGROUND));
    }

    #[test]
    fn children_clip_to_client_area() {
        let mut t = WidgetTree::new(Rect::new(0, 0, 50, 50));
        let win = t.create_widget(Rect::new(10, 10, 20, 20));
        t.add_child(t.root(), win);
        let wide = t.create_widget(Rect::new(-5, 0, 40, 5));
        t.add_child(win, wide);
        assert_eq!(t.clipped_rect(wide), Rect::new(11, 11, 18, 4));

        let deco = t.create_widget(Rect::new(-5, 0, 40, 1));
        t.set_flags(
            deco,
            WidgetFlags {
                decoration: true,
                ..WidgetFlags::default()
            },
        );
        t.add_child(win, deco);
        assert_eq!(
            t.clipped_rect(deco),
            Rect::new(10, 10, 20, 1),
            "decorations clip to the full bounds"
        );
    }

    #[test]
    fn permeable_children_escape_and_occlude() {
        let mut t = WidgetTree::new(Rect::new(0, 0, 40, 40));
        let root = t.root();
        let low = t.create_widget(Rect::new(0, 0, 40, 40));
        t.add_child(root, low);
        let group = t.create_widget(Rect::new(0, 0, 10, 10));
        t.set_flags(
            group,
            WidgetFlags {
                permeable: true,
                ..WidgetFlags::default()
            },
        );
        t.add_child(root, group);
        let stray = t.create_widget(Rect::new(20, 20, 5, 5));
        t.add_child(group, stray);

        assert_eq!(t.clipped_rect(stray), Rect::new(20, 20, 5, 5));
        let fg = t.foreground(low).to_vec();
        assert!(!fg.iter().any(|r| r.contains(22, 22)));
        assert!(!fg.iter().any(|r| r.contains(5, 5)));
        assert_eq!(t.widget_at(22, 22), Some(stray));

        assert_eq!(
            t.footprint(group),
            vec![Rect::new(0, 0, 10, 10), Rect::new(20, 20, 5, 5)]
        );
        assert_eq!(t.footprint(low), t.foreground(low).to_vec());
    }

    #[test]
    fn hidden_and_detached_widgets_have_no_regions() {
        let (mut t, a, b) = overlapping();
        t.set_hidden(a, true);
        assert!(t.foreground(a).is_empty());
        assert_eq!(t.foreground(b), &[Rect::new(5, 5, 10, 10)]);
        let loose = t.create_widget(Rect::new(0, 0, 5, 5));
        assert!(t.foreground(loose).is_empty());
        assert!(t.background(loose).is_empty());
    }

    #[test]
    fn insets_change_invalidates_children() {
        let mut t = WidgetTree::new(Rect::new(0, 0, 20, 20));
        let win = t.create_widget(Rect::new(0, 0, 20, 20));
        t.add_child(t.root(), win);
        let child = t.create_widget(Rect::new(0, 0, 20, 20));
        t.add_child(win, child);
        assert_eq!(t.foreground(child), &[Rect::new(1, 1, 18, 18)]);
        t.set_insets(win, Insets::uniform(2));
        assert_eq!(t.foreground(child), &[Rect::new(2, 2, 16, 16)]);
    }

    #[test]
    fn hit_testing_prefers_topmost() {
        let (t, a, b) = overlapping();
        assert_eq!(t.widget_at(7, 7), Some(a));
        assert_eq!(t.widget_at(12, 12), Some(b));
        assert_eq!(t.widget_at(18, 2), Some(t.root()));
        assert_eq!(t.widget_at(30, 30), None);
        assert_eq!(t.widget_at_point(kurbo::Point::new(12.9, 12.1)), Some(b));
    }
}
