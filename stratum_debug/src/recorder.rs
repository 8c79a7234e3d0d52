// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records, each led by a one-byte
//! tag. [`decode`] reads them back as an iterator of [`RecordedEvent`].
//!
//! Damage rect lists ([`on_damage_rects`](TraceSink::on_damage_rects)) store
//! only the count.

use stratum_core::time::HostTime;
use stratum_core::trace::{
    DamageEvent, DamageRect, PaintEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TickEvent,
    TickSummary, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_TICK: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_DAMAGE: u8 = 4;
const TAG_PAINT: u8 = 5;
const TAG_TICK_SUMMARY: u8 = 6;
const TAG_DAMAGE_RECTS_COUNT: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Input => 0,
            PhaseKind::Redraw => 1,
            PhaseKind::Reap => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_tick(&mut self, e: &TickEvent) {
        self.write_u8(TAG_TICK);
        self.write_u64(e.tick_index);
        self.write_u64(e.now.ticks());
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.tick_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.tick_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_damage(&mut self, e: &DamageEvent) {
        self.write_u8(TAG_DAMAGE);
        self.write_u64(e.tick_index);
        self.write_u32(e.source);
        self.write_u32(e.parent);
        self.write_u32(e.repaints);
        self.write_u32(e.repainted_area);
        self.write_u32(e.leftover_area);
    }

    fn on_paint(&mut self, e: &PaintEvent) {
        self.write_u8(TAG_PAINT);
        self.write_u64(e.tick_index);
        self.write_u32(e.widget);
        self.write_u32(e.rects);
        self.write_u32(e.area);
    }

    fn on_tick_summary(&mut self, s: &TickSummary) {
        self.write_u8(TAG_TICK_SUMMARY);
        self.write_u64(s.tick_index);
        self.write_u64(s.now.ticks());
        self.write_u64(s.input_ticks);
        self.write_u64(s.redraw_ticks);
        self.write_u64(s.reap_ticks);
        self.write_u32(s.widgets_painted);
        self.write_u32(s.rects_painted);
        self.write_u32(s.widgets_reaped);
    }

    fn on_damage_rects(&mut self, tick_index: u64, rects: &[DamageRect]) {
        self.write_u8(TAG_DAMAGE_RECTS_COUNT);
        self.write_u64(tick_index);
        self.write_u32(u32::try_from(rects.len()).unwrap_or(u32::MAX));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`TickEvent`].
    Tick(TickEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`DamageEvent`].
    Damage(DamageEvent),
    /// A [`PaintEvent`].
    Paint(PaintEvent),
    /// A [`TickSummary`].
    TickSummary(TickSummary),
    /// Damage-rect count for one damage pass.
    DamageRectsCount {
        /// Tick counter.
        tick_index: u64,
        /// Number of damage rects.
        count: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?;
        self.pos += N;
        bytes.try_into().ok()
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Input,
            1 => PhaseKind::Redraw,
            _ => PhaseKind::Reap,
        })
    }

    fn decode_tick(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Tick(TickEvent {
            tick_index: self.read_u64()?,
            now: self.read_time()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            tick_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            tick_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: self.read_time()?,
        }))
    }

    fn decode_damage(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Damage(DamageEvent {
            tick_index: self.read_u64()?,
            source: self.read_u32()?,
            parent: self.read_u32()?,
            repaints: self.read_u32()?,
            repainted_area: self.read_u32()?,
            leftover_area: self.read_u32()?,
        }))
    }

    fn decode_paint(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Paint(PaintEvent {
            tick_index: self.read_u64()?,
            widget: self.read_u32()?,
            rects: self.read_u32()?,
            area: self.read_u32()?,
        }))
    }

    fn decode_tick_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TickSummary(TickSummary {
            tick_index: self.read_u64()?,
            now: self.read_time()?,
            input_ticks: self.read_u64()?,
            redraw_ticks: self.read_u64()?,
            reap_ticks: self.read_u64()?,
            widgets_painted: self.read_u32()?,
            rects_painted: self.read_u32()?,
            widgets_reaped: self.read_u32()?,
        }))
    }

    fn decode_damage_rects_count(&mut self) -> Option<RecordedEvent> {
        let tick_index = self.read_u64()?;
        let count = self.read_u32()?;
        Some(RecordedEvent::DamageRectsCount { tick_index, count })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_TICK => self.decode_tick(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_DAMAGE => self.decode_damage(),
            TAG_PAINT => self.decode_paint(),
            TAG_TICK_SUMMARY => self.decode_tick_summary(),
            TAG_DAMAGE_RECTS_COUNT => self.decode_damage_rects_count(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> TickSummary {
        TickSummary {
            tick_index: 7,
            now: HostTime(1_000_000),
            input_ticks: 100,
            redraw_ticks: 1500,
            reap_ticks: 50,
            widgets_painted: 4,
            rects_painted: 11,
            widgets_reaped: 1,
        }
    }

    #[test]
    fn tick_summary_survives_recording() {
        let mut rec = RecorderSink::new();
        let orig = sample_summary();
        rec.on_tick_summary(&orig);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            RecordedEvent::TickSummary(s) => {
                assert_eq!(s.tick_index, orig.tick_index);
                assert_eq!(s.now, orig.now);
                assert_eq!(s.redraw_ticks, orig.redraw_ticks);
                assert_eq!(s.rects_painted, orig.rects_painted);
                assert_eq!(s.widgets_reaped, orig.widgets_reaped);
            }
            other => panic!("expected TickSummary, got {other:?}"),
        }
    }

    #[test]
    fn mixed_stream_keeps_order() {
        let mut rec = RecorderSink::new();
        rec.on_tick(&TickEvent {
            tick_index: 7,
            now: HostTime(10),
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            tick_index: 7,
            phase: PhaseKind::Redraw,
            timestamp: HostTime(20),
        });
        rec.on_damage(&DamageEvent {
            tick_index: 7,
            source: 2,
            parent: 0,
            repaints: 1,
            repainted_area: 25,
            leftover_area: 75,
        });
        rec.on_paint(&PaintEvent {
            tick_index: 7,
            widget: 1,
            rects: 1,
            area: 25,
        });
        rec.on_phase_end(&PhaseEndEvent {
            tick_index: 7,
            phase: PhaseKind::Redraw,
            timestamp: HostTime(30),
        });
        rec.on_damage_rects(7, &[]);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 6);
        assert!(matches!(events[0], RecordedEvent::Tick(e) if e.now == HostTime(10)));
        assert!(matches!(
            events[1],
            RecordedEvent::PhaseBegin(e) if e.phase == PhaseKind::Redraw
        ));
        assert!(matches!(
            events[2],
            RecordedEvent::Damage(e) if e.leftover_area == 75 && e.source == 2
        ));
        assert!(matches!(events[3], RecordedEvent::Paint(e) if e.widget == 1));
        assert!(matches!(
            events[4],
            RecordedEvent::PhaseEnd(e) if e.timestamp == HostTime(30)
        ));
        assert!(matches!(
            events[5],
            RecordedEvent::DamageRectsCount {
                tick_index: 7,
                count: 0
            }
        ));
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_tick(&TickEvent {
            tick_index: 1,
            now: HostTime(1),
        });
        rec.on_tick(&TickEvent {
            tick_index: 2,
            now: HostTime(2),
        });
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 3]).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }
}
