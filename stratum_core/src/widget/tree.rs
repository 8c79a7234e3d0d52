// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays widget storage with allocation, topology, geometry, and
//! lifecycle management.

use alloc::vec::Vec;

use understory_dirty::{Channel, CycleHandling, DirtyTracker, EagerPolicy};

use crate::dirty;
use crate::rect::Rect;
use crate::skin::Skin;

use super::id::{INVALID, WidgetId};
use super::region::RegionCache;
use super::traverse::Children;

/// Distance from a widget's edges to its client area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Insets {
    /// Left inset.
    pub left: u16,
    /// Top inset.
    pub top: u16,
    /// Right inset.
    pub right: u16,
    /// Bottom inset.
    pub bottom: u16,
}

impl Insets {
    /// No inset.
    pub const ZERO: Self = Self::uniform(0);

    /// A one-pixel border on every side; the default for new widgets.
    pub const BORDER: Self = Self::uniform(1);

    /// The same inset on every side.
    #[must_use]
    pub const fn uniform(n: u16) -> Self {
        Self {
            left: n,
            top: n,
            right: n,
            bottom: n,
        }
    }
}

/// Per-widget boolean flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WidgetFlags {
    /// Part of the parent's frame (title bar, border piece). Clipped by the
    /// parent's full bounds instead of its client area, kept below ordinary
    /// siblings, and never reordered.
    pub decoration: bool,
    /// Does not clip its children, which may extend past its bounds.
    pub permeable: bool,
    /// Has no border: the client area is the full bounds.
    pub borderless: bool,
    /// Hidden along with its whole subtree.
    pub hidden: bool,
    /// Ignores input. Has no effect on regions or drawing.
    pub disabled: bool,
    /// Every draw call for the widget is a no-op.
    pub drawing_disabled: bool,
    /// Currently running a modal loop.
    pub modal: bool,
}

/// Where a widget is in its lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Created but not in any child list.
    #[default]
    Detached,
    /// In its parent's child list.
    Attached,
    /// Temporarily removed from its parent, remembering where to return.
    Shelved,
    /// Closed and waiting for [`WidgetTree::flush_deleted`].
    Closed,
}

/// Struct-of-arrays storage for a widget tree.
///
/// Widgets are addressed by [`WidgetId`] handles. Slots of freed widgets are
/// recycled through a free list and generation counters make stale handles
/// panic instead of aliasing a newer widget.
///
/// The tree always has a root, created with it, that can be neither attached
/// nor closed. Every structural change invalidates the region caches it can
/// affect (see [`dirty`](crate::dirty)).
#[derive(Debug)]
pub struct WidgetTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Geometry --
    pub(crate) rect: Vec<Rect>,
    pub(crate) insets: Vec<Insets>,

    // -- State --
    pub(crate) flags: Vec<WidgetFlags>,
    pub(crate) state: Vec<Lifecycle>,
    pub(crate) shelf_parent: Vec<u32>,

    // -- Content --
    pub(crate) skin: Vec<Skin>,
    pub(crate) regions: Vec<RegionCache>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Lifecycle tracking --
    pub(crate) pending_deletion: Vec<u32>,
    pub(crate) root: u32,
}

impl WidgetTree {
    /// Creates a tree whose root covers `root_rect` in absolute coordinates.
    ///
    /// The root is borderless and attached.
    #[must_use]
    pub fn new(root_rect: Rect) -> Self {
        let mut tree = Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            rect: Vec::new(),
            insets: Vec::new(),
            flags: Vec::new(),
            state: Vec::new(),
            shelf_parent: Vec::new(),
            skin: Vec::new(),
            regions: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_deletion: Vec::new(),
            root: INVALID,
        };
        let root = tree.create_widget(root_rect);
        tree.root = root.idx;
        tree.state[root.idx as usize] = Lifecycle::Attached;
        tree.flags[root.idx as usize].borderless = true;
        tree
    }

    // -- Allocation API --

    /// Creates a detached widget at `rect` (relative to its future parent).
    ///
    /// The widget starts with [`Insets::BORDER`], default flags, and
    /// [`Skin::None`].
    pub fn create_widget(&mut self, rect: Rect) -> WidgetId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.rect[i] = rect;
            self.insets[i] = Insets::BORDER;
            self.flags[i] = WidgetFlags::default();
            self.state[i] = Lifecycle::Detached;
            self.shelf_parent[i] = INVALID;
            self.skin[i] = Skin::None;
            self.regions[i] = RegionCache::default();
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.rect.push(rect);
            self.insets.push(Insets::BORDER);
            self.flags.push(WidgetFlags::default());
            self.state.push(Lifecycle::Detached);
            self.shelf_parent.push(INVALID);
            self.skin.push(Skin::None);
            self.regions.push(RegionCache::default());
            self.generation.push(0);
            idx
        };
        self.handle(idx)
    }

    /// Closes a widget: removes it from the tree and queues it and its
    /// subtree for freeing at the next [`flush_deleted`](Self::flush_deleted).
    ///
    /// Handles stay valid until then. Closing an already closed widget does
    /// nothing.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or refers to the root.
    pub fn close(&mut self, id: WidgetId) {
        self.validate(id);
        let idx = id.idx;
        assert!(idx != self.root, "cannot close the root widget");
        match self.state[idx as usize] {
            Lifecycle::Closed => return,
            Lifecycle::Attached => self.detach(idx),
            Lifecycle::Shelved => self.shelf_parent[idx as usize] = INVALID,
            Lifecycle::Detached => {}
        }
        self.state[idx as usize] = Lifecycle::Closed;
        self.pending_deletion.push(idx);
    }

    /// Frees every widget closed since the last call, along with their
    /// subtrees (shelved descendants included). Returns the number of slots
    /// freed.
    pub fn flush_deleted(&mut self) -> u32 {
        if self.pending_deletion.is_empty() {
            return 0;
        }
        let pending: Vec<WidgetId> = core::mem::take(&mut self.pending_deletion)
            .into_iter()
            .map(|idx| self.handle(idx))
            .collect();
        // (shelf parent, widget), sorted so each parent's shelf is one run.
        let mut shelved: Vec<(u32, u32)> = (0..self.len)
            .filter(|&s| self.state[s as usize] == Lifecycle::Shelved)
            .map(|s| (self.shelf_parent[s as usize], s))
            .collect();
        shelved.sort_unstable();

        let mut freed = 0;
        let mut stack = Vec::new();
        for root in pending {
            if !self.is_alive(root) {
                continue;
            }
            stack.push(root.idx);
            while let Some(idx) = stack.pop() {
                let mut c = self.first_child[idx as usize];
                while c != INVALID {
                    stack.push(c);
                    c = self.next_sibling[c as usize];
                }
                let start = shelved.partition_point(|&(p, _)| p < idx);
                stack.extend(
                    shelved[start..]
                        .iter()
                        .take_while(|&&(p, _)| p == idx)
                        .map(|&(_, s)| s),
                );
                self.free_slot(idx);
                freed += 1;
            }
        }
        freed
    }

    /// Returns whether the handle refers to a widget that has not been freed.
    ///
    /// Freeing bumps the slot's generation, so a matching generation is
    /// enough.
    #[must_use]
    pub fn is_alive(&self, id: WidgetId) -> bool {
        self.generation
            .get(id.idx as usize)
            .is_some_and(|&g| g == id.generation)
    }

    /// Number of live widgets, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        (self.len as usize) - self.free_list.len()
    }

    /// Always false: the root is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    // -- Topology API --

    /// The root widget.
    #[must_use]
    pub fn root(&self) -> WidgetId {
        self.handle(self.root)
    }

    /// Adds `child` on top of `parent`'s children.
    ///
    /// A decoration goes on top of the decoration block instead, below every
    /// ordinary child.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` is the root, already has
    /// a parent, is shelved or closed, or if `parent` lies inside `child`'s
    /// subtree.
    pub fn add_child(&mut self, parent: WidgetId, child: WidgetId) {
        self.validate(parent);
        self.validate(child);
        let (p, c) = (parent.idx, child.idx);
        self.check_attachable(p, c);
        self.link_dependencies(c, p);
        self.link_child(p, c);
        self.state[c as usize] = Lifecycle::Attached;
        self.invalidate_around(c);
    }

    /// Inserts `child` directly below `sibling` in z-order.
    ///
    /// # Panics
    ///
    /// Panics like [`add_child`](Self::add_child), or if `sibling` has no
    /// parent.
    pub fn insert_before(&mut self, child: WidgetId, sibling: WidgetId) {
        self.validate(child);
        self.validate(sibling);
        let (c, s) = (child.idx, sibling.idx);
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");
        self.check_attachable(p, c);
        self.link_dependencies(c, p);
        self.link_before(c, s);
        self.state[c as usize] = Lifecycle::Attached;
        self.invalidate_around(c);
    }

    /// Removes `child` from its parent, leaving it detached and reusable.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the widget has no parent.
    pub fn remove_from_parent(&mut self, child: WidgetId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "widget has no parent");
        self.detach(c);
        self.state[c as usize] = Lifecycle::Detached;
    }

    /// Takes an attached widget out of its parent's child list, remembering
    /// the parent for [`unshelve`](Self::unshelve).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the widget is not attached to a
    /// parent.
    pub fn shelve(&mut self, id: WidgetId) {
        self.validate(id);
        let idx = id.idx;
        let p = self.parent[idx as usize];
        assert!(
            self.state[idx as usize] == Lifecycle::Attached && p != INVALID,
            "only attached widgets can be shelved"
        );
        self.detach(idx);
        self.shelf_parent[idx as usize] = p;
        self.state[idx as usize] = Lifecycle::Shelved;
    }

    /// Returns a shelved widget to the top of its parent's children.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the widget is not shelved.
    pub fn unshelve(&mut self, id: WidgetId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.state[idx as usize] == Lifecycle::Shelved,
            "widget is not shelved"
        );
        let p = self.shelf_parent[idx as usize];
        self.shelf_parent[idx as usize] = INVALID;
        self.link_dependencies(idx, p);
        self.link_child(p, idx);
        self.state[idx as usize] = Lifecycle::Attached;
        self.invalidate_around(idx);
    }

    /// Widgets currently shelved from `parent`.
    #[must_use]
    pub fn shelved(&self, parent: WidgetId) -> Vec<WidgetId> {
        self.validate(parent);
        (0..self.len)
            .filter(|&i| {
                self.shelf_parent[i as usize] == parent.idx
                    && self.state[i as usize] == Lifecycle::Shelved
            })
            .map(|i| self.handle(i))
            .collect()
    }

    /// Moves a widget to the top of its siblings. Returns whether the order
    /// changed; decorations and parentless widgets never move.
    pub fn raise_to_top(&mut self, id: WidgetId) -> bool {
        self.validate(id);
        let idx = id.idx;
        let p = self.parent[idx as usize];
        if p == INVALID
            || self.flags[idx as usize].decoration
            || self.next_sibling[idx as usize] == INVALID
        {
            return false;
        }
        self.unlink_from_parent(idx);
        self.link_last(p, idx);
        self.invalidate_around(idx);
        true
    }

    /// Moves a widget to the bottom of its ordinary siblings, just above any
    /// decorations. Returns whether the order changed.
    pub fn lower_to_bottom(&mut self, id: WidgetId) -> bool {
        self.validate(id);
        let idx = id.idx;
        let p = self.parent[idx as usize];
        if p == INVALID || self.flags[idx as usize].decoration {
            return false;
        }
        let bottom = self.first_plain_child(p);
        if bottom == idx {
            return false;
        }
        self.unlink_from_parent(idx);
        self.link_before(idx, bottom);
        self.invalidate_around(idx);
        true
    }

    /// The parent of a widget, if it is attached.
    #[must_use]
    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.handle(p))
    }

    /// The children of a widget, bottom of the z-order first.
    #[must_use]
    pub fn children(&self, id: WidgetId) -> Children<'_> {
        self.validate(id);
        Children::new(
            self,
            self.first_child[id.idx as usize],
            self.last_child(id.idx),
        )
    }

    // -- Geometry API --

    /// The widget's rect relative to its parent's top-left corner.
    #[must_use]
    pub fn rect(&self, id: WidgetId) -> Rect {
        self.validate(id);
        self.rect[id.idx as usize]
    }

    /// The widget's rect in absolute coordinates.
    #[must_use]
    pub fn absolute_rect(&self, id: WidgetId) -> Rect {
        self.validate(id);
        self.abs_rect(id.idx)
    }

    /// The absolute area children are clipped to.
    #[must_use]
    pub fn client_rect(&self, id: WidgetId) -> Rect {
        self.validate(id);
        self.client_abs(id.idx)
    }

    /// Replaces the widget's relative rect. Returns the previous one.
    pub fn set_rect(&mut self, id: WidgetId, rect: Rect) -> Rect {
        self.validate(id);
        let old = core::mem::replace(&mut self.rect[id.idx as usize], rect);
        if old != rect {
            self.invalidate_around(id.idx);
        }
        old
    }

    /// Moves the widget's top-left corner, keeping its size.
    pub fn move_to(&mut self, id: WidgetId, x: i32, y: i32) -> Rect {
        let r = self.rect(id);
        self.set_rect(
            id,
            Rect::from_i32(x, y, i32::from(r.width), i32::from(r.height)),
        )
    }

    /// Changes the widget's size, keeping its top-left corner.
    pub fn resize(&mut self, id: WidgetId, width: u16, height: u16) -> Rect {
        let r = self.rect(id);
        self.set_rect(id, Rect::new(r.x, r.y, width, height))
    }

    /// The widget's client insets as configured (ignored while borderless).
    #[must_use]
    pub fn insets(&self, id: WidgetId) -> Insets {
        self.validate(id);
        self.insets[id.idx as usize]
    }

    /// Replaces the widget's client insets.
    pub fn set_insets(&mut self, id: WidgetId, insets: Insets) {
        self.validate(id);
        if self.insets[id.idx as usize] != insets {
            self.insets[id.idx as usize] = insets;
            self.invalidate_subtree(id.idx);
        }
    }

    // -- State API --

    /// The widget's flags.
    #[must_use]
    pub fn flags(&self, id: WidgetId) -> WidgetFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Replaces the widget's flags.
    ///
    /// Flags that change clipping or visibility invalidate regions.
    /// Decorations are placed when attached, so toggling
    /// [`decoration`](WidgetFlags::decoration) on an attached widget does not
    /// move it.
    pub fn set_flags(&mut self, id: WidgetId, flags: WidgetFlags) {
        self.validate(id);
        let old = core::mem::replace(&mut self.flags[id.idx as usize], flags);
        let geometric = old.decoration != flags.decoration
            || old.permeable != flags.permeable
            || old.borderless != flags.borderless
            || old.hidden != flags.hidden;
        if geometric {
            self.invalidate_around(id.idx);
        }
    }

    /// Hides or shows a widget and its subtree. Returns whether anything
    /// changed.
    pub fn set_hidden(&mut self, id: WidgetId, hidden: bool) -> bool {
        let mut flags = self.flags(id);
        if flags.hidden == hidden {
            return false;
        }
        flags.hidden = hidden;
        self.set_flags(id, flags);
        true
    }

    /// Sets or clears the modal flag. Regions are unaffected.
    pub fn set_modal(&mut self, id: WidgetId, modal: bool) {
        self.validate(id);
        self.flags[id.idx as usize].modal = modal;
    }

    /// Where the widget is in its lifetime.
    #[must_use]
    pub fn state(&self, id: WidgetId) -> Lifecycle {
        self.validate(id);
        self.state[id.idx as usize]
    }

    /// Whether the widget can currently appear on screen: it and every
    /// ancestor are attached and not hidden, up to the root.
    #[must_use]
    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.validate(id);
        self.visible(id.idx)
    }

    /// The widget's skin.
    #[must_use]
    pub fn skin(&self, id: WidgetId) -> &Skin {
        self.validate(id);
        &self.skin[id.idx as usize]
    }

    /// Replaces the widget's skin. Regions are unaffected; the caller
    /// schedules the repaint.
    pub fn set_skin(&mut self, id: WidgetId, skin: Skin) {
        self.validate(id);
        self.skin[id.idx as usize] = skin;
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: WidgetId) {
        assert!(
            self.is_alive(id),
            "stale WidgetId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    pub(crate) fn handle(&self, idx: u32) -> WidgetId {
        WidgetId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    pub(crate) fn visible(&self, idx: u32) -> bool {
        let mut n = idx;
        loop {
            let i = n as usize;
            if self.state[i] != Lifecycle::Attached || self.flags[i].hidden {
                return false;
            }
            if n == self.root {
                return true;
            }
            n = self.parent[i];
            if n == INVALID {
                return false;
            }
        }
    }

    pub(crate) fn abs_rect(&self, idx: u32) -> Rect {
        let mut r = self.rect[idx as usize];
        let mut p = self.parent[idx as usize];
        while p != INVALID {
            let pr = self.rect[p as usize];
            r = r.translate(pr.left(), pr.top());
            p = self.parent[p as usize];
        }
        r
    }

    pub(crate) fn client_abs(&self, idx: u32) -> Rect {
        let r = self.abs_rect(idx);
        if self.flags[idx as usize].borderless {
            return r;
        }
        let i = self.insets[idx as usize];
        r.inset(i.left, i.top, i.right, i.bottom)
    }

    pub(crate) fn last_child(&self, idx: u32) -> u32 {
        let mut last = self.first_child[idx as usize];
        if last == INVALID {
            return INVALID;
        }
        while self.next_sibling[last as usize] != INVALID {
            last = self.next_sibling[last as usize];
        }
        last
    }

    fn first_plain_child(&self, p: u32) -> u32 {
        let mut c = self.first_child[p as usize];
        while c != INVALID && self.flags[c as usize].decoration {
            c = self.next_sibling[c as usize];
        }
        c
    }

    fn check_attachable(&self, p: u32, c: u32) {
        assert!(c != self.root, "the root cannot be attached");
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        assert!(
            self.state[c as usize] == Lifecycle::Detached,
            "only detached widgets can be attached"
        );
        assert!(
            p != c,
            "cannot attach a widget beneath its own descendant"
        );
    }

    /// Adds the child-to-parent edges on both channels.
    ///
    /// The tracker rejects an edge that closes a cycle, which is exactly the
    /// case of a widget being attached inside its own subtree.
    fn link_dependencies(&mut self, c: u32, p: u32) {
        let linked = self
            .dirty
            .add_dependency(c, p, dirty::FOREGROUND)
            .and_then(|_| self.dirty.add_dependency(c, p, dirty::BACKGROUND));
        assert!(
            linked.is_ok(),
            "cannot attach a widget beneath its own descendant"
        );
    }

    fn unlink_dependencies(&mut self, c: u32, p: u32) {
        self.dirty.remove_dependency(c, p, dirty::FOREGROUND);
        self.dirty.remove_dependency(c, p, dirty::BACKGROUND);
    }

    /// Links `c` into `p`'s child list: decorations on top of the
    /// decoration block, everything else on top.
    fn link_child(&mut self, p: u32, c: u32) {
        if self.flags[c as usize].decoration {
            let first_plain = self.first_plain_child(p);
            if first_plain != INVALID {
                self.link_before(c, first_plain);
                return;
            }
        }
        self.link_last(p, c);
    }

    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = INVALID;
        let last = self.last_child(p);
        self.prev_sibling[c as usize] = last;
        if last == INVALID {
            self.first_child[p as usize] = c;
        } else {
            self.next_sibling[last as usize] = c;
        }
    }

    fn link_before(&mut self, c: u32, s: u32) {
        let p = self.parent[s as usize];
        let prev = self.prev_sibling[s as usize];
        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = prev;
        if prev == INVALID {
            self.first_child[p as usize] = c;
        } else {
            self.next_sibling[prev as usize] = c;
        }
        self.prev_sibling[s as usize] = c;
    }

    /// Removes `idx` from its parent's child list without touching dirty
    /// state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];
        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }
        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Invalidates around an attached widget, then unlinks it.
    fn detach(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        self.invalidate_around(idx);
        self.unlink_from_parent(idx);
        self.unlink_dependencies(idx, p);
    }

    fn free_slot(&mut self, idx: u32) {
        let i = idx as usize;
        let p = self.parent[i];
        if p != INVALID {
            self.unlink_dependencies(idx, p);
        }
        self.dirty.remove_key(idx);
        self.parent[i] = INVALID;
        self.first_child[i] = INVALID;
        self.next_sibling[i] = INVALID;
        self.prev_sibling[i] = INVALID;
        self.state[i] = Lifecycle::Closed;
        self.shelf_parent[i] = INVALID;
        self.skin[i] = Skin::None;
        self.regions[i] = RegionCache::default();
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.free_list.push(idx);
    }

    /// Invalidates every region a structural change to `idx` can affect.
    ///
    /// That is every child subtree of the parent plus the parent's
    /// background. A permeable parent lets its children escape, so the walk
    /// continues one level up for each permeable ancestor.
    fn invalidate_around(&mut self, idx: u32) {
        let mut node = idx;
        loop {
            let p = self.parent[node as usize];
            if p == INVALID {
                self.mark_subtree(node);
                break;
            }
            let mut c = self.first_child[p as usize];
            while c != INVALID {
                self.mark_subtree(c);
                c = self.next_sibling[c as usize];
            }
            self.dirty.mark(p, dirty::BACKGROUND);
            if !self.flags[p as usize].permeable {
                break;
            }
            node = p;
        }
        self.apply_invalidation();
    }

    fn invalidate_subtree(&mut self, idx: u32) {
        self.mark_subtree(idx);
        self.apply_invalidation();
    }

    fn mark_subtree(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::FOREGROUND, &EagerPolicy);
        self.dirty.mark_with(idx, dirty::BACKGROUND, &EagerPolicy);
    }

    /// Drains both channels into the caches' validity flags.
    fn apply_invalidation(&mut self) {
        for channel in [dirty::FOREGROUND, dirty::BACKGROUND] {
            let keys: Vec<u32> = self.dirty.drain(channel).deterministic().run().collect();
            for k in keys {
                self.invalidate_cache(k, channel);
            }
        }
    }

    fn invalidate_cache(&mut self, idx: u32, channel: Channel) {
        if let Some(cache) = self.regions.get_mut(idx as usize) {
            cache.invalidate(channel);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn tree() -> WidgetTree {
        WidgetTree::new(Rect::new(0, 0, 100, 100))
    }

    #[test]
    fn create_close_and_flush() {
        let mut t = tree();
        let w = t.create_widget(Rect::new(0, 0, 10, 10));
        t.add_child(t.root(), w);
        assert!(t.is_alive(w));
        t.close(w);
        assert!(t.is_alive(w), "closed widgets live until the tick ends");
        assert_eq!(t.state(w), Lifecycle::Closed);
        assert!(t.children(t.root()).next().is_none());
        assert_eq!(t.flush_deleted(), 1);
        assert!(!t.is_alive(w));
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut t = tree();
        let a = t.create_widget(Rect::new(0, 0, 1, 1));
        t.close(a);
        t.flush_deleted();
        let b = t.create_widget(Rect::new(0, 0, 1, 1));
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(!t.is_alive(a));
        assert!(t.is_alive(b));
    }

    #[test]
    fn closing_frees_the_subtree() {
        let mut t = tree();
        let win = t.create_widget(Rect::new(0, 0, 50, 50));
        let a = t.create_widget(Rect::new(1, 1, 5, 5));
        let b = t.create_widget(Rect::new(1, 10, 5, 5));
        t.add_child(t.root(), win);
        t.add_child(win, a);
        t.add_child(win, b);
        t.shelve(b);
        t.close(win);
        assert_eq!(t.flush_deleted(), 3);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn flushing_frees_nested_shelves_only_under_closed_widgets() {
        let mut t = tree();
        let root = t.root();
        let (w1, w2, keep) = (
            t.create_widget(Rect::new(0, 0, 50, 50)),
            t.create_widget(Rect::new(50, 0, 50, 50)),
            t.create_widget(Rect::new(0, 50, 50, 50)),
        );
        for w in [w1, w2, keep] {
            t.add_child(root, w);
        }
        let inner = t.create_widget(Rect::new(1, 1, 20, 20));
        let leaf = t.create_widget(Rect::new(1, 1, 5, 5));
        t.add_child(w1, inner);
        t.add_child(inner, leaf);
        t.shelve(leaf);
        t.shelve(inner);
        let spare = t.create_widget(Rect::new(1, 1, 5, 5));
        t.add_child(keep, spare);
        t.shelve(spare);
        let child = t.create_widget(Rect::new(1, 1, 5, 5));
        t.add_child(w2, child);

        t.close(child);
        t.close(w1);
        t.close(w2);
        assert_eq!(t.flush_deleted(), 5);
        for gone in [w1, w2, inner, leaf, child] {
            assert!(!t.is_alive(gone));
        }
        assert_eq!(t.shelved(keep), vec![spare]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.flush_deleted(), 0);
    }

    #[test]
    #[should_panic(expected = "stale WidgetId")]
    fn stale_handle_panics() {
        let mut t = tree();
        let a = t.create_widget(Rect::new(0, 0, 1, 1));
        t.close(a);
        t.flush_deleted();
        let _ = t.rect(a);
    }

    #[test]
    fn children_iterate_both_ways() {
        let mut t = tree();
        let root = t.root();
        let ids: Vec<_> = (0..3)
            .map(|i| {
                let w = t.create_widget(Rect::new(i, 0, 1, 1));
                t.add_child(root, w);
                w
            })
            .collect();
        let up: Vec<_> = t.children(root).collect();
        let down: Vec<_> = t.children(root).rev().collect();
        assert_eq!(up, ids);
        assert_eq!(down, vec![ids[2], ids[1], ids[0]]);
    }

    #[test]
    fn insert_before_orders_siblings() {
        let mut t = tree();
        let root = t.root();
        let a = t.create_widget(Rect::new(0, 0, 1, 1));
        let b = t.create_widget(Rect::new(0, 0, 1, 1));
        let c = t.create_widget(Rect::new(0, 0, 1, 1));
        t.add_child(root, a);
        t.add_child(root, c);
        t.insert_before(b, c);
        assert_eq!(t.children(root).collect::<Vec<_>>(), vec![a, b, c]);
    }

    #[test]
    fn decorations_stay_below_ordinary_children() {
        let mut t = tree();
        let win = t.create_widget(Rect::new(0, 0, 50, 50));
        t.add_child(t.root(), win);
        let body = t.create_widget(Rect::new(0, 10, 50, 40));
        t.add_child(win, body);
        let title = t.create_widget(Rect::new(0, 0, 50, 10));
        t.set_flags(
            title,
            WidgetFlags {
                decoration: true,
                ..WidgetFlags::default()
            },
        );
        t.add_child(win, title);
        assert_eq!(t.children(win).collect::<Vec<_>>(), vec![title, body]);

        let other = t.create_widget(Rect::new(0, 0, 5, 5));
        t.add_child(win, other);
        assert!(t.lower_to_bottom(other));
        assert_eq!(t.children(win).collect::<Vec<_>>(), vec![title, other, body]);
        assert!(!t.raise_to_top(title), "decorations never move");
        assert!(t.raise_to_top(other));
        assert!(!t.raise_to_top(other));
        assert_eq!(t.children(win).collect::<Vec<_>>(), vec![title, body, other]);
    }

    #[test]
    fn shelve_and_unshelve_return_on_top() {
        let mut t = tree();
        let root = t.root();
        let a = t.create_widget(Rect::new(0, 0, 1, 1));
        let b = t.create_widget(Rect::new(0, 0, 1, 1));
        t.add_child(root, a);
        t.add_child(root, b);
        t.shelve(a);
        assert_eq!(t.state(a), Lifecycle::Shelved);
        assert_eq!(t.parent(a), None);
        assert_eq!(t.shelved(root), vec![a]);
        t.unshelve(a);
        assert_eq!(t.children(root).collect::<Vec<_>>(), vec![b, a]);
        assert!(t.shelved(root).is_empty());
    }

    #[test]
    fn absolute_and_client_rects() {
        let mut t = WidgetTree::new(Rect::new(10, 10, 100, 100));
        let win = t.create_widget(Rect::new(5, 5, 40, 30));
        t.add_child(t.root(), win);
        let inner = t.create_widget(Rect::new(2, 3, 4, 4));
        t.add_child(win, inner);
        assert_eq!(t.absolute_rect(win), Rect::new(15, 15, 40, 30));
        assert_eq!(t.client_rect(win), Rect::new(16, 16, 38, 28));
        assert_eq!(t.absolute_rect(inner), Rect::new(17, 18, 4, 4));
        assert_eq!(t.client_rect(t.root()), Rect::new(10, 10, 100, 100));
    }

    #[test]
    fn visibility_follows_ancestors() {
        let mut t = tree();
        let win = t.create_widget(Rect::new(0, 0, 50, 50));
        let w = t.create_widget(Rect::new(1, 1, 5, 5));
        t.add_child(win, w);
        assert!(!t.is_visible(w), "parent not attached to the root yet");
        t.add_child(t.root(), win);
        assert!(t.is_visible(w));
        assert!(t.set_hidden(win, true));
        assert!(!t.is_visible(w));
        assert!(!t.set_hidden(win, true));
    }

    #[test]
    #[should_panic(expected = "child already has a parent")]
    fn double_attach_panics() {
        let mut t = tree();
        let w = t.create_widget(Rect::new(0, 0, 1, 1));
        t.add_child(t.root(), w);
        t.add_child(t.root(), w);
    }

    #[test]
    #[should_panic(expected = "cannot attach a widget beneath its own descendant")]
    fn attaching_into_own_subtree_panics() {
        let mut t = tree();
        let a = t.create_widget(Rect::new(0, 0, 10, 10));
        let b = t.create_widget(Rect::new(0, 0, 5, 5));
        t.add_child(a, b);
        t.add_child(b, a);
    }

    #[test]
    #[should_panic(expected = "cannot close the root widget")]
    fn closing_root_panics() {
        let mut t = tree();
        let root = t.root();
        t.close(root);
    }

    #[test]
    #[should_panic(expected = "stale WidgetId")]
    fn freed_handle_panics() {
        let mut t = tree();
        let w = t.create_widget(Rect::new(0, 0, 1, 1));
        t.close(w);
        t.flush_deleted();
        let _ = t.rect(w);
    }
}
