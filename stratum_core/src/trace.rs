// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the tick loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the [`Context`](crate::context::Context) calls at each stage of a tick.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! [`TickSummaryBuilder`] collects phase timestamps and paint counts during a
//! tick and produces a [`TickSummary`] at the end.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`DamageRect`] events and the
//!   corresponding `TraceSink` method.

use crate::time::HostTime;

#[cfg(feature = "trace-rich")]
use crate::rect::Rect;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of the tick is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// The caller's input callback.
    Input,
    /// Scheduled full paints.
    Redraw,
    /// Freeing closed widgets.
    Reap,
}

impl PhaseKind {
    /// Every phase, in tick order.
    pub const ALL: [Self; 3] = [Self::Input, Self::Redraw, Self::Reap];

    /// A short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Redraw => "redraw",
            Self::Reap => "reap",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a tick starts.
#[derive(Clone, Copy, Debug)]
pub struct TickEvent {
    /// Monotonic tick counter.
    pub tick_index: u64,
    /// Time supplied by the tick source.
    pub now: HostTime,
}

/// Marks the beginning of a tick phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Tick counter.
    pub tick_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a tick phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Tick counter.
    pub tick_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Time at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted after damage below one parent has been distributed.
#[derive(Clone, Copy, Debug)]
pub struct DamageEvent {
    /// Tick counter.
    pub tick_index: u64,
    /// Slot index of the widget whose change exposed the area.
    pub source: u32,
    /// Slot index of the parent the damage was distributed under.
    pub parent: u32,
    /// Number of widgets that repaint.
    pub repaints: u32,
    /// Pixels claimed by widgets.
    pub repainted_area: u32,
    /// Pixels nobody claimed.
    pub leftover_area: u32,
}

/// Emitted when a widget paints.
#[derive(Clone, Copy, Debug)]
pub struct PaintEvent {
    /// Tick counter.
    pub tick_index: u64,
    /// Slot index of the painted widget.
    pub widget: u32,
    /// Number of clip rects the paint was issued through.
    pub rects: u32,
    /// Total pixel area of those rects.
    pub area: u32,
}

/// Per-tick summary produced by [`TickSummaryBuilder`].
#[derive(Clone, Copy, Debug)]
pub struct TickSummary {
    /// Tick counter.
    pub tick_index: u64,
    /// Time supplied by the tick source.
    pub now: HostTime,
    /// Input phase duration in ticks (0 if not measured).
    pub input_ticks: u64,
    /// Redraw phase duration in ticks (0 if not measured).
    pub redraw_ticks: u64,
    /// Reap phase duration in ticks (0 if not measured).
    pub reap_ticks: u64,
    /// Widget paints issued during the tick, damage repairs included.
    pub widgets_painted: u32,
    /// Clip rects those paints went through.
    pub rects_painted: u32,
    /// Widget slots freed by the reap phase.
    pub widgets_reaped: u32,
}

/// An axis-aligned damage rectangle.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

#[cfg(feature = "trace-rich")]
impl From<Rect> for DamageRect {
    fn from(r: Rect) -> Self {
        Self {
            x: r.left(),
            y: r.top(),
            width: u32::from(r.width),
            height: u32::from(r.height),
        }
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the tick loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a tick starts.
    fn on_tick(&mut self, e: &TickEvent) {
        _ = e;
    }

    /// Called at the beginning of a tick phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a tick phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after damage has been distributed.
    fn on_damage(&mut self, e: &DamageEvent) {
        _ = e;
    }

    /// Called when a widget paints.
    fn on_paint(&mut self, e: &PaintEvent) {
        _ = e;
    }

    /// Called with a per-tick summary.
    fn on_tick_summary(&mut self, s: &TickSummary) {
        _ = s;
    }

    /// Called with the exposed rectangles of each damage pass (requires
    /// `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_damage_rects(&mut self, tick_index: u64, rects: &[DamageRect]) {
        _ = (tick_index, rects);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`TickEvent`].
    #[inline]
    pub fn tick(&mut self, e: &TickEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_tick(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DamageEvent`].
    #[inline]
    pub fn damage(&mut self, e: &DamageEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_damage(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PaintEvent`].
    #[inline]
    pub fn paint(&mut self, e: &PaintEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_paint(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TickSummary`].
    #[inline]
    pub fn tick_summary(&mut self, s: &TickSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_tick_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits damage rectangles (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn damage_rects(&mut self, tick_index: u64, rects: &[Rect]) {
        if let Some(s) = &mut self.sink {
            let rects: alloc::vec::Vec<DamageRect> = rects.iter().map(|&r| r.into()).collect();
            s.on_damage_rects(tick_index, &rects);
        }
    }
}

// ---------------------------------------------------------------------------
// TickSummaryBuilder
// ---------------------------------------------------------------------------

/// Collects phase timestamps and counts during a tick and produces a
/// [`TickSummary`].
#[derive(Debug)]
pub struct TickSummaryBuilder {
    tick: TickEvent,
    phase_starts: [Option<HostTime>; 3],
    phase_ends: [Option<HostTime>; 3],
    widgets_painted: u32,
    rects_painted: u32,
    widgets_reaped: u32,
}

impl TickSummaryBuilder {
    /// Starts building a summary for the given tick.
    #[must_use]
    pub fn new(tick: &TickEvent) -> Self {
        Self {
            tick: *tick,
            phase_starts: [None; 3],
            phase_ends: [None; 3],
            widgets_painted: 0,
            rects_painted: 0,
            widgets_reaped: 0,
        }
    }

    /// Records the start of a phase.
    pub fn phase_begin(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_starts[phase_index(phase)] = Some(t);
    }

    /// Records the end of a phase.
    pub fn phase_end(&mut self, phase: PhaseKind, t: HostTime) {
        self.phase_ends[phase_index(phase)] = Some(t);
    }

    /// Sets the paint counts.
    pub fn set_painted(&mut self, widgets: u32, rects: u32) {
        self.widgets_painted = widgets;
        self.rects_painted = rects;
    }

    /// Sets the number of freed widget slots.
    pub fn set_reaped(&mut self, widgets: u32) {
        self.widgets_reaped = widgets;
    }

    /// Consumes the builder and produces the final [`TickSummary`].
    #[must_use]
    pub fn finish(self) -> TickSummary {
        TickSummary {
            tick_index: self.tick.tick_index,
            now: self.tick.now,
            input_ticks: self.phase_duration(PhaseKind::Input),
            redraw_ticks: self.phase_duration(PhaseKind::Redraw),
            reap_ticks: self.phase_duration(PhaseKind::Reap),
            widgets_painted: self.widgets_painted,
            rects_painted: self.rects_painted,
            widgets_reaped: self.widgets_reaped,
        }
    }

    fn phase_duration(&self, phase: PhaseKind) -> u64 {
        let idx = phase_index(phase);
        match (self.phase_starts[idx], self.phase_ends[idx]) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).ticks(),
            _ => 0,
        }
    }
}

/// Maps a [`PhaseKind`] to an array index.
const fn phase_index(phase: PhaseKind) -> usize {
    match phase {
        PhaseKind::Input => 0,
        PhaseKind::Redraw => 1,
        PhaseKind::Reap => 2,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
