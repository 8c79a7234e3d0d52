// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//! Tick phases become duration slices; damage and paint passes become
//! instant events on their own track.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use stratum_core::time::Timebase;

use crate::recorder::{RecordedEvent, decode};

const TID_LOOP: u32 = 0;
const TID_PAINT: u32 = 1;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Damage and paint records carry no timestamp of their own, so they are
/// placed at the start of the most recent phase.
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut last_ts = 0.0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Tick(e) => {
                last_ts = ticks_to_us(e.now.ticks(), timebase);
                events.push(json!({
                    "ph": "i",
                    "name": "Tick",
                    "cat": "Loop",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": TID_LOOP,
                    "s": "g",
                    "args": {
                        "tick_index": e.tick_index,
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                last_ts = ticks_to_us(e.timestamp.ticks(), timebase);
                events.push(json!({
                    "ph": "B",
                    "name": e.phase.name(),
                    "cat": "Tick",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": TID_LOOP,
                    "args": {
                        "tick_index": e.tick_index,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": e.phase.name(),
                    "cat": "Tick",
                    "ts": ticks_to_us(e.timestamp.ticks(), timebase),
                    "pid": 0,
                    "tid": TID_LOOP,
                    "args": {
                        "tick_index": e.tick_index,
                    }
                }));
            }
            RecordedEvent::Damage(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Damage",
                    "cat": "Redraw",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": TID_PAINT,
                    "s": "t",
                    "args": {
                        "tick_index": e.tick_index,
                        "source": e.source,
                        "parent": e.parent,
                        "repaints": e.repaints,
                        "repainted_area": e.repainted_area,
                        "leftover_area": e.leftover_area,
                    }
                }));
            }
            RecordedEvent::Paint(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Paint",
                    "cat": "Redraw",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": TID_PAINT,
                    "s": "t",
                    "args": {
                        "tick_index": e.tick_index,
                        "widget": e.widget,
                        "rects": e.rects,
                        "area": e.area,
                    }
                }));
            }
            RecordedEvent::TickSummary(s) => {
                events.push(json!({
                    "ph": "i",
                    "name": "TickSummary",
                    "cat": "Summary",
                    "ts": ticks_to_us(s.now.ticks(), timebase),
                    "pid": 0,
                    "tid": TID_LOOP,
                    "s": "g",
                    "args": {
                        "tick_index": s.tick_index,
                        "input_us": ticks_to_us(s.input_ticks, timebase),
                        "redraw_us": ticks_to_us(s.redraw_ticks, timebase),
                        "reap_us": ticks_to_us(s.reap_ticks, timebase),
                        "widgets_painted": s.widgets_painted,
                        "rects_painted": s.rects_painted,
                        "widgets_reaped": s.widgets_reaped,
                    }
                }));
            }
            RecordedEvent::DamageRectsCount { tick_index, count } => {
                events.push(json!({
                    "ph": "i",
                    "name": "DamageRects",
                    "cat": "Rich",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": TID_PAINT,
                    "s": "t",
                    "args": {
                        "tick_index": tick_index,
                        "count": count,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}
