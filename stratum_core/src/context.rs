// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The application object: one widget tree drawn onto one display.
//!
//! [`Context`] owns the [`WidgetTree`], the [`Display`], the event queue, the
//! queue of widgets waiting for a full paint, an optional [`TraceSink`], and
//! the modal stack. Nothing is global; create as many contexts as needed.
//!
//! # Structural changes
//!
//! The wrappers ([`attach`](Context::attach), [`close`](Context::close),
//! [`hide`](Context::hide), [`move_to`](Context::move_to), ...) apply the tree
//! mutation, then repair the screen straight away: whatever the widget no
//! longer covers is distributed by the [`DamageEngine`] to the widgets
//! underneath, and what nobody claims is repainted by the parent or cleared
//! to the display background. The changed widget itself, if still visible,
//! is queued for a full paint on the next tick.
//!
//! # Ticks
//!
//! [`tick`](Context::tick) runs three phases:
//!
//! 1. **Input**: the caller's callback runs once with the context.
//! 2. **Redraw**: every queued widget paints its background region, then its
//!    children do the same in ascending z-order.
//! 3. **Reap**: closed widgets are freed and their handles become stale.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use crate::display::{Display, DisplayConfig};
use crate::event::{EventKind, WidgetEvent};
use crate::port::DrawPort;
use crate::rect::{Rect, intersect_all, region_area, subtract_all};
use crate::skin::Skin;
use crate::time::{Clock, HostTime};
use crate::trace::{
    DamageEvent, PaintEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TickEvent,
    TickSummaryBuilder, TraceSink, Tracer,
};
use crate::widget::{DamageEngine, Lifecycle, WidgetId, WidgetTree};

/// What a tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Tick counter.
    pub tick_index: u64,
    /// Time supplied by the tick source.
    pub now: HostTime,
    /// Widget paints since the previous tick, damage repairs included.
    pub widgets_painted: u32,
    /// Clip rects those paints went through.
    pub rects_painted: u32,
    /// Widget slots freed in the reap phase.
    pub widgets_reaped: u32,
}

/// A widget tree, its display, and the tick loop that keeps them in sync.
pub struct Context {
    tree: WidgetTree,
    display: Display,
    events: Vec<WidgetEvent>,
    pending_paint: Vec<WidgetId>,
    sink: Option<Box<dyn TraceSink>>,
    tick_index: u64,
    modal_stack: Vec<WidgetId>,
    widgets_painted: u32,
    rects_painted: u32,
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("display", &self.display)
            .field("widgets", &self.tree.len())
            .field("tick_index", &self.tick_index)
            .field("pending_paint", &self.pending_paint)
            .field("modal_stack", &self.modal_stack)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Creates a context with a freshly allocated display.
    #[must_use]
    pub fn new(config: &DisplayConfig) -> Self {
        Self::with_display(Display::new(config))
    }

    /// Creates a context drawing onto an existing display.
    ///
    /// The root widget covers the whole display and is painted on the first
    /// tick.
    #[must_use]
    pub fn with_display(display: Display) -> Self {
        let tree = WidgetTree::new(display.bounds());
        let root = tree.root();
        Self {
            tree,
            display,
            events: Vec::new(),
            pending_paint: vec![root],
            sink: None,
            tick_index: 0,
            modal_stack: Vec::new(),
            widgets_painted: 0,
            rects_painted: 0,
        }
    }

    /// Installs a trace sink. Events are only delivered with the `trace`
    /// feature enabled.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.sink = Some(sink);
    }

    /// Removes and returns the trace sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.sink.take()
    }

    /// The widget tree.
    #[must_use]
    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    /// Mutable access to the widget tree.
    ///
    /// Changes made here bypass damage repair; follow them with
    /// [`redraw`](Self::redraw) where needed.
    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    /// The display.
    #[must_use]
    pub fn display(&self) -> &Display {
        &self.display
    }

    /// The root widget.
    #[must_use]
    pub fn root(&self) -> WidgetId {
        self.tree.root()
    }

    /// The innermost widget running a modal loop.
    #[must_use]
    pub fn modal_widget(&self) -> Option<WidgetId> {
        self.modal_stack.last().copied()
    }

    /// Events queued since the last drain.
    #[must_use]
    pub fn events(&self) -> &[WidgetEvent] {
        &self.events
    }

    /// Takes all queued events.
    pub fn drain_events(&mut self) -> Vec<WidgetEvent> {
        core::mem::take(&mut self.events)
    }

    // -- Structural wrappers --

    /// Creates a detached widget with the given skin.
    pub fn create_widget(&mut self, rect: Rect, skin: Skin) -> WidgetId {
        let id = self.tree.create_widget(rect);
        self.tree.set_skin(id, skin);
        id
    }

    /// Attaches `child` on top of `parent`'s children.
    ///
    /// # Panics
    ///
    /// Panics like [`WidgetTree::add_child`].
    pub fn attach(&mut self, parent: WidgetId, child: WidgetId) {
        self.restructure(child, |t| {
            t.add_child(parent, child);
            true
        });
        self.emit(child, EventKind::Attached);
    }

    /// Closes a widget and repairs what it exposed. The widget is freed at
    /// the end of the current tick.
    ///
    /// # Panics
    ///
    /// Panics like [`WidgetTree::close`].
    pub fn close(&mut self, id: WidgetId) {
        if self.tree.state(id) == Lifecycle::Closed {
            return;
        }
        self.restructure(id, |t| {
            t.close(id);
            true
        });
        self.emit(id, EventKind::Closed);
    }

    /// Shelves a widget and repairs what it exposed.
    ///
    /// # Panics
    ///
    /// Panics like [`WidgetTree::shelve`].
    pub fn shelve(&mut self, id: WidgetId) {
        self.restructure(id, |t| {
            t.shelve(id);
            true
        });
        self.emit(id, EventKind::Shelved);
    }

    /// Returns a shelved widget to the top of its parent.
    ///
    /// # Panics
    ///
    /// Panics like [`WidgetTree::unshelve`].
    pub fn unshelve(&mut self, id: WidgetId) {
        self.restructure(id, |t| {
            t.unshelve(id);
            true
        });
        self.emit(id, EventKind::Unshelved);
    }

    /// Hides a widget and its subtree.
    pub fn hide(&mut self, id: WidgetId) {
        if self.restructure(id, |t| t.set_hidden(id, true)) {
            self.emit(id, EventKind::Hidden);
        }
    }

    /// Shows a hidden widget.
    pub fn show(&mut self, id: WidgetId) {
        if self.restructure(id, |t| t.set_hidden(id, false)) {
            self.emit(id, EventKind::Shown);
        }
    }

    /// Moves a widget within its parent.
    pub fn move_to(&mut self, id: WidgetId, x: i32, y: i32) {
        let from = self.tree.rect(id);
        if self.restructure(id, |t| t.move_to(id, x, y) != t.rect(id)) {
            let to = self.tree.rect(id);
            self.emit(id, EventKind::Moved { from, to });
        }
    }

    /// Resizes a widget, keeping its top-left corner.
    pub fn resize(&mut self, id: WidgetId, width: u16, height: u16) {
        let from = self.tree.rect(id);
        if self.restructure(id, |t| t.resize(id, width, height) != t.rect(id)) {
            let to = self.tree.rect(id);
            self.emit(id, EventKind::Resized { from, to });
        }
    }

    /// Brings a widget to the top of its siblings.
    pub fn raise_to_top(&mut self, id: WidgetId) {
        if self.restructure(id, |t| t.raise_to_top(id)) {
            self.emit(id, EventKind::Raised);
        }
    }

    /// Sends a widget to the bottom of its ordinary siblings.
    pub fn lower_to_bottom(&mut self, id: WidgetId) {
        if self.restructure(id, |t| t.lower_to_bottom(id)) {
            self.emit(id, EventKind::Lowered);
        }
    }

    /// Replaces a widget's skin and queues a repaint.
    pub fn set_skin(&mut self, id: WidgetId, skin: Skin) {
        self.tree.set_skin(id, skin);
        self.redraw(id);
    }

    /// Queues a full paint of the widget and its subtree for the next tick.
    pub fn redraw(&mut self, id: WidgetId) {
        self.tree.validate(id);
        if !self.pending_paint.contains(&id) {
            self.pending_paint.push(id);
        }
    }

    // -- Tick loop --

    /// Runs one tick at a fixed time.
    pub fn tick(&mut self, now: HostTime, input: &mut dyn FnMut(&mut Self)) -> TickReport {
        let mut clock = move || now;
        self.tick_with(&mut clock, input)
    }

    /// Runs one tick, sampling `clock` at the start and around each phase.
    pub fn tick_with(
        &mut self,
        clock: &mut dyn Clock,
        input: &mut dyn FnMut(&mut Self),
    ) -> TickReport {
        let tick = TickEvent {
            tick_index: self.tick_index,
            now: clock.now(),
        };
        self.tracer().tick(&tick);
        let mut summary = TickSummaryBuilder::new(&tick);

        self.run_phase(PhaseKind::Input, clock, &mut summary, |cx| input(cx));
        self.run_phase(PhaseKind::Redraw, clock, &mut summary, Self::redraw_pending);
        let reaped = self.run_phase(PhaseKind::Reap, clock, &mut summary, |cx| {
            let freed = cx.tree.flush_deleted();
            let tree = &cx.tree;
            cx.pending_paint.retain(|&id| tree.is_alive(id));
            freed
        });

        summary.set_painted(self.widgets_painted, self.rects_painted);
        summary.set_reaped(reaped);
        let s = summary.finish();
        self.tracer().tick_summary(&s);

        let report = TickReport {
            tick_index: tick.tick_index,
            now: tick.now,
            widgets_painted: self.widgets_painted,
            rects_painted: self.rects_painted,
            widgets_reaped: reaped,
        };
        self.widgets_painted = 0;
        self.rects_painted = 0;
        self.tick_index += 1;
        report
    }

    /// Marks `id` modal and runs ticks until [`end_modal`](Self::end_modal)
    /// clears the flag or the widget is closed. Returns the number of ticks
    /// run.
    ///
    /// The input callback may start further modal loops; each returns before
    /// the one that started it resumes.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn run_modal(
        &mut self,
        id: WidgetId,
        clock: &mut dyn Clock,
        input: &mut dyn FnMut(&mut Self),
    ) -> u64 {
        self.tree.set_modal(id, true);
        self.modal_stack.push(id);
        self.emit(id, EventKind::ModalStarted);

        let mut ticks = 0;
        while self.is_modal(id) {
            self.tick_with(clock, input);
            ticks += 1;
        }

        if self.tree.is_alive(id) {
            self.tree.set_modal(id, false);
        }
        if let Some(pos) = self.modal_stack.iter().rposition(|&m| m == id) {
            self.modal_stack.remove(pos);
        }
        self.emit(id, EventKind::ModalEnded);
        ticks
    }

    /// Ends the modal loop running for `id` after the current tick.
    pub fn end_modal(&mut self, id: WidgetId) {
        if self.tree.is_alive(id) {
            self.tree.set_modal(id, false);
        }
    }

    // -- Internals --

    fn tracer(&mut self) -> Tracer<'_> {
        match self.sink.as_deref_mut() {
            Some(sink) => Tracer::new(sink),
            None => Tracer::none(),
        }
    }

    fn emit(&mut self, source: WidgetId, kind: EventKind) {
        self.events.push(WidgetEvent::new(source, kind));
    }

    fn is_modal(&self, id: WidgetId) -> bool {
        self.tree.is_alive(id)
            && self.tree.state(id) != Lifecycle::Closed
            && self.tree.flags(id).modal
    }

    fn run_phase<R>(
        &mut self,
        phase: PhaseKind,
        clock: &mut dyn Clock,
        summary: &mut TickSummaryBuilder,
        body: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let tick_index = self.tick_index;
        let timestamp = clock.now();
        summary.phase_begin(phase, timestamp);
        self.tracer().phase_begin(&PhaseBeginEvent {
            tick_index,
            phase,
            timestamp,
        });
        let out = body(self);
        let timestamp = clock.now();
        summary.phase_end(phase, timestamp);
        self.tracer().phase_end(&PhaseEndEvent {
            tick_index,
            phase,
            timestamp,
        });
        out
    }

    /// Applies a tree mutation and repairs the area the widget vacated.
    /// Returns whether `mutate` reported a change.
    fn restructure(
        &mut self,
        id: WidgetId,
        mutate: impl FnOnce(&mut WidgetTree) -> bool,
    ) -> bool {
        let parent = self.tree.parent(id);
        let mut damage = self.tree.footprint(id);
        if !mutate(&mut self.tree) {
            return false;
        }
        for r in self.tree.footprint(id) {
            subtract_all(&mut damage, r);
        }
        if !damage.is_empty() {
            match parent {
                Some(p) => self.repair(id, p, damage),
                None => self.display.clear(&damage),
            }
        }
        if self.tree.is_visible(id) {
            self.redraw(id);
        }
        true
    }

    /// Hands `damage` to the widgets below `source`, climbing past permeable
    /// parents for what lies outside them.
    fn repair(&mut self, source: WidgetId, parent: WidgetId, damage: Vec<Rect>) {
        let (mut skip, mut parent, mut damage) = (source, parent, damage);
        loop {
            #[cfg(feature = "trace-rich")]
            {
                let tick_index = self.tick_index;
                self.tracer().damage_rects(tick_index, &damage);
            }
            let report = DamageEngine::new(&self.tree).distribute(parent, damage, Some(skip));
            let event = DamageEvent {
                tick_index: self.tick_index,
                source: skip.index(),
                parent: parent.index(),
                repaints: u32::try_from(report.repaints.len()).unwrap_or(u32::MAX),
                repainted_area: report.repainted_area(),
                leftover_area: region_area(&report.leftover),
            };
            self.tracer().damage(&event);

            for repaint in &report.repaints {
                self.paint(repaint.widget, &repaint.rects);
            }

            let mut rest = report.leftover;
            if self.tree.is_visible(parent) && !rest.is_empty() {
                let own: Vec<Rect> = self
                    .tree
                    .background(parent)
                    .iter()
                    .flat_map(|&b| intersect_all(&rest, b))
                    .collect();
                for &r in &own {
                    subtract_all(&mut rest, r);
                }
                self.paint(parent, &own);
            }
            if rest.is_empty() {
                return;
            }
            match self.tree.parent(parent) {
                Some(grandparent) if self.tree.flags(parent).permeable => {
                    skip = parent;
                    parent = grandparent;
                    damage = rest;
                }
                _ => {
                    self.display.clear(&rest);
                    return;
                }
            }
        }
    }

    /// Paints one widget through `rects`.
    fn paint(&mut self, id: WidgetId, rects: &[Rect]) {
        if rects.is_empty() {
            return;
        }
        let bounds = self.tree.absolute_rect(id);
        let enabled = !self.tree.flags(id).drawing_disabled;
        let mut port = DrawPort::new(&mut self.display, bounds, rects).with_enabled(enabled);
        self.tree.skin(id).draw(&mut port);

        let n = u32::try_from(rects.len()).unwrap_or(u32::MAX);
        self.widgets_painted = self.widgets_painted.saturating_add(1);
        self.rects_painted = self.rects_painted.saturating_add(n);
        let event = PaintEvent {
            tick_index: self.tick_index,
            widget: id.index(),
            rects: n,
            area: region_area(rects),
        };
        self.tracer().paint(&event);
    }

    fn redraw_pending(&mut self) {
        let pending = core::mem::take(&mut self.pending_paint);
        for &id in &pending {
            if !self.tree.is_alive(id) || !self.tree.is_visible(id) {
                continue;
            }
            if self.has_pending_ancestor(id, &pending) {
                continue;
            }
            self.paint_subtree(id);
        }
    }

    fn has_pending_ancestor(&self, id: WidgetId, pending: &[WidgetId]) -> bool {
        let mut p = self.tree.parent(id);
        while let Some(a) = p {
            if pending.contains(&a) {
                return true;
            }
            p = self.tree.parent(a);
        }
        false
    }

    fn paint_subtree(&mut self, id: WidgetId) {
        if !self.tree.is_visible(id) {
            return;
        }
        let own = self.tree.background(id).to_vec();
        self.paint(id, &own);
        let children: Vec<WidgetId> = self.tree.children(id).collect();
        for child in children {
            self.paint_subtree(child);
        }
    }
}
