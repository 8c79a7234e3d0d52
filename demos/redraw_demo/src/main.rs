// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated dual-screen tick loop that exercises regions, damage, and the
//! tracing pipeline.
//!
//! Builds a small desktop across two stacked screens, then scripts a series
//! of window operations (raise, move, hide, close, a modal dialog) over a
//! deterministic clock. Events go to both a
//! [`PrettyPrintSink`](stratum_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](stratum_debug::recorder::RecorderSink); the recording is
//! exported as a Chrome trace JSON file at the end.

use std::cell::RefCell;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use stratum_core::color::Color;
use stratum_core::context::Context;
use stratum_core::display::DisplayConfig;
use stratum_core::port::DrawPort;
use stratum_core::rect::Rect;
use stratum_core::skin::{DrawContents, Skin};
use stratum_core::time::{Duration, HostTime, ManualClock, Timebase};
use stratum_core::trace::{
    DamageEvent, DamageRect, PaintEvent, PhaseBeginEvent, PhaseEndEvent, TickEvent, TickSummary,
    TraceSink,
};
use stratum_core::widget::{Insets, WidgetFlags, WidgetId};

use stratum_debug::pretty::PrettyPrintSink;
use stratum_debug::recorder::RecorderSink;

/// 16.6ms tick interval in nanoseconds (≈60 Hz).
const TICK_INTERVAL_NS: u64 = 16_666_667;
/// Clock advance per sample inside a tick.
const SAMPLE_STEP_NS: u64 = 40_000;

// -- sinks ---------------------------------------------------------------

/// Forwards every event to a pretty printer and a shared recorder.
struct Tee {
    pretty: PrettyPrintSink,
    recorder: Rc<RefCell<RecorderSink>>,
}

impl TraceSink for Tee {
    fn on_tick(&mut self, e: &TickEvent) {
        self.pretty.on_tick(e);
        self.recorder.borrow_mut().on_tick(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.pretty.on_phase_begin(e);
        self.recorder.borrow_mut().on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.pretty.on_phase_end(e);
        self.recorder.borrow_mut().on_phase_end(e);
    }

    fn on_damage(&mut self, e: &DamageEvent) {
        self.pretty.on_damage(e);
        self.recorder.borrow_mut().on_damage(e);
    }

    fn on_paint(&mut self, e: &PaintEvent) {
        self.pretty.on_paint(e);
        self.recorder.borrow_mut().on_paint(e);
    }

    fn on_tick_summary(&mut self, s: &TickSummary) {
        self.pretty.on_tick_summary(s);
        self.recorder.borrow_mut().on_tick_summary(s);
    }

    fn on_damage_rects(&mut self, tick_index: u64, rects: &[DamageRect]) {
        self.pretty.on_damage_rects(tick_index, rects);
        self.recorder.borrow_mut().on_damage_rects(tick_index, rects);
    }
}

// -- custom skin ---------------------------------------------------------

/// A round dial with a needle.
struct Dial {
    face: Color,
    needle: Color,
}

impl DrawContents for Dial {
    fn draw(&self, port: &mut DrawPort<'_>) {
        let bg = port.background();
        port.clear(bg);
        let (w, h) = (i32::from(port.width()), i32::from(port.height()));
        let (cx, cy) = (w / 2, h / 2);
        let r = cx.min(cy) - 1;
        port.draw_filled_circle(cx, cy, r, self.face);
        port.draw_line(cx, cy, cx + r / 2, cy - r / 2, self.needle);
    }
}

// -- scene ---------------------------------------------------------------

/// Handles the script needs after setup.
struct Scene {
    editor: WidgetId,
    palette: WidgetId,
    status: WidgetId,
    dial: WidgetId,
}

/// Creates a bordered window with a title-bar decoration.
fn window(cx: &mut Context, rect: Rect, face: Color) -> WidgetId {
    let win = cx.create_widget(
        rect,
        Skin::Bevelled {
            face,
            light: Color::WHITE,
            shadow: Color::GREY,
        },
    );
    cx.tree_mut().set_insets(
        win,
        Insets {
            left: 1,
            top: 9,
            right: 1,
            bottom: 1,
        },
    );
    let title = cx.create_widget(
        Rect::new(1, 1, rect.width.saturating_sub(2), 8),
        Skin::Solid(Color::BLUE),
    );
    cx.tree_mut().set_flags(
        title,
        WidgetFlags {
            decoration: true,
            ..WidgetFlags::default()
        },
    );
    cx.attach(cx.root(), win);
    cx.attach(win, title);
    win
}

fn build(cx: &mut Context) -> Scene {
    let root = cx.root();
    cx.set_skin(root, Skin::Solid(Color::rgb(4, 8, 12)));

    let editor = window(cx, Rect::new(16, 16, 160, 120), Color::rgb(24, 24, 24));
    let body = cx.create_widget(Rect::new(4, 4, 140, 90), Skin::Solid(Color::WHITE));
    cx.attach(editor, body);

    // Straddles the screen boundary at y = 192.
    let palette = window(cx, Rect::new(120, 150, 96, 96), Color::rgb(20, 12, 6));
    let swatches = cx.create_widget(
        Rect::new(0, 0, 94, 86),
        Skin::Framed {
            face: Color::RED,
            frame: Color::BLACK,
        },
    );
    cx.tree_mut().set_flags(
        swatches,
        WidgetFlags {
            permeable: true,
            ..WidgetFlags::default()
        },
    );
    cx.attach(palette, swatches);

    let status = cx.create_widget(Rect::new(0, 368, 256, 16), Skin::Solid(Color::GREY));
    cx.attach(root, status);

    let dial = cx.create_widget(
        Rect::new(200, 260, 48, 48),
        Skin::Custom(Box::new(Dial {
            face: Color::GREEN,
            needle: Color::BLACK,
        })),
    );
    cx.attach(root, dial);

    Scene {
        editor,
        palette,
        status,
        dial,
    }
}

/// Moves the clock to the start of the next tick interval.
fn advance_to_next_tick(clock: &mut ManualClock) {
    let now = clock.peek().ticks();
    clock.advance(Duration(TICK_INTERVAL_NS - now % TICK_INTERVAL_NS));
}

fn main() {
    let timebase = Timebase::NANOS;

    let recorder = Rc::new(RefCell::new(RecorderSink::new()));
    let mut cx = Context::new(&DisplayConfig::dual_screen());
    cx.set_trace_sink(Box::new(Tee {
        pretty: PrettyPrintSink::new(Box::new(std::io::stdout()), timebase),
        recorder: Rc::clone(&recorder),
    }));

    let mut clock = ManualClock::new(HostTime(1_000_000_000), Duration(SAMPLE_STEP_NS));

    // -- scripted session --------------------------------------------------
    let mut scene = None;
    cx.tick_with(&mut clock, &mut |cx| scene = Some(build(cx)));
    let Some(scene) = scene else {
        return;
    };

    let script: [&dyn Fn(&mut Context, &Scene); 6] = [
        &|cx: &mut Context, s: &Scene| cx.raise_to_top(s.editor),
        &|cx: &mut Context, s: &Scene| cx.move_to(s.palette, 40, 200),
        &|cx: &mut Context, s: &Scene| cx.hide(s.status),
        &|cx: &mut Context, s: &Scene| cx.lower_to_bottom(s.palette),
        &|cx: &mut Context, s: &Scene| cx.redraw(s.dial),
        &|cx: &mut Context, s: &Scene| cx.show(s.status),
    ];
    for step in script {
        advance_to_next_tick(&mut clock);
        cx.tick_with(&mut clock, &mut |cx| step(cx, &scene));
    }

    // A modal dialog over the editor, dismissed after three ticks.
    advance_to_next_tick(&mut clock);
    let dialog = cx.create_widget(
        Rect::new(64, 64, 128, 48),
        Skin::Framed {
            face: Color::WHITE,
            frame: Color::RED,
        },
    );
    cx.attach(cx.root(), dialog);
    let mut remaining = 3;
    let modal_ticks = cx.run_modal(dialog, &mut clock, &mut |cx| {
        remaining -= 1;
        if remaining == 0 {
            cx.close(dialog);
        }
    });

    advance_to_next_tick(&mut clock);
    cx.tick_with(&mut clock, &mut |cx| cx.close(scene.editor));

    let events = cx.drain_events();
    println!(
        "{} widget events, modal loop ran {modal_ticks} ticks, {} widgets alive",
        events.len(),
        cx.tree().len(),
    );

    // Drop the tee so the recorder has a single owner.
    drop(cx.take_trace_sink());
    let recorder = Rc::try_unwrap(recorder)
        .map(RefCell::into_inner)
        .unwrap_or_default();

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    stratum_debug::chrome::export(recorder.as_bytes(), timebase, &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({} bytes recorded)", recorder.as_bytes().len());
}
