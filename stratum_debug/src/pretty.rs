// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use stratum_core::time::{HostTime, Timebase};
use stratum_core::trace::{
    DamageEvent, DamageRect, PaintEvent, PhaseBeginEvent, PhaseEndEvent, TickEvent, TickSummary,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.ticks_to_us(t.ticks())
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_tick(&mut self, e: &TickEvent) {
        let _ = writeln!(
            self.writer,
            "[tick] tick={} now={:.1}µs",
            e.tick_index,
            self.host_us(e.now),
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] tick={} {} at {:.1}µs",
            e.tick_index,
            e.phase.name(),
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] tick={} {} at {:.1}µs",
            e.tick_index,
            e.phase.name(),
            self.host_us(e.timestamp),
        );
    }

    fn on_damage(&mut self, e: &DamageEvent) {
        let _ = writeln!(
            self.writer,
            "[damage] tick={} source=#{} parent=#{} repaints={} claimed={}px leftover={}px",
            e.tick_index, e.source, e.parent, e.repaints, e.repainted_area, e.leftover_area,
        );
    }

    fn on_paint(&mut self, e: &PaintEvent) {
        let _ = writeln!(
            self.writer,
            "[paint] tick={} widget=#{} rects={} area={}px",
            e.tick_index, e.widget, e.rects, e.area,
        );
    }

    fn on_tick_summary(&mut self, s: &TickSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] tick={} input={:.1}µs redraw={:.1}µs reap={:.1}µs \
             painted={} rects={} reaped={}",
            s.tick_index,
            self.ticks_to_us(s.input_ticks),
            self.ticks_to_us(s.redraw_ticks),
            self.ticks_to_us(s.reap_ticks),
            s.widgets_painted,
            s.rects_painted,
            s.widgets_reaped,
        );
    }

    fn on_damage_rects(&mut self, tick_index: u64, rects: &[DamageRect]) {
        let _ = write!(self.writer, "[damage:rects] tick={tick_index}");
        for r in rects {
            let _ = write!(self.writer, " ({},{} {}x{})", r.x, r.y, r.width, r.height);
        }
        let _ = writeln!(self.writer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_core::trace::PhaseKind;

    #[test]
    fn pretty_print_tick() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_tick(&TickEvent {
            tick_index: 1,
            now: HostTime(1_000_000),
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[tick]"), "got: {output}");
        assert!(output.contains("tick=1"), "got: {output}");
        assert!(output.contains("now=1000.0µs"), "got: {output}");
    }

    #[test]
    fn pretty_print_phases_and_paint() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::MICROS);
        sink.on_phase_begin(&PhaseBeginEvent {
            tick_index: 2,
            phase: PhaseKind::Redraw,
            timestamp: HostTime(5),
        });
        sink.on_paint(&PaintEvent {
            tick_index: 2,
            widget: 3,
            rects: 2,
            area: 40,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "[phase:begin] tick=2 redraw at 5.0µs");
        assert_eq!(lines[1], "[paint] tick=2 widget=#3 rects=2 area=40px");
    }

    #[test]
    fn pretty_print_damage_rects() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_damage_rects(
            4,
            &[DamageRect {
                x: -1,
                y: 2,
                width: 3,
                height: 4,
            }],
        );
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output, "[damage:rects] tick=4 (-1,2 3x4)\n");
    }
}
