// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clipped 2D rasterization and per-widget visible regions for overlapping
//! widget trees.
//!
//! `stratum_core` draws a tree of rectangular widgets onto one or two
//! framebuffer surfaces without ever painting a pixel that belongs to a
//! widget stacked above. It is `no_std` compatible (with `alloc`) and uses
//! struct-of-arrays storage with index handles.
//!
//! # Architecture
//!
//! ```text
//!   tick source (HostTime)
//!       │
//!       ▼
//!   Context::tick ──► input callback ──► structural wrappers
//!       │                                     │
//!       │            WidgetTree mutation ◄────┘
//!       │                 │ marks FOREGROUND / BACKGROUND
//!       │                 ▼
//!       │            RegionCache (lazy) ──► DamageEngine ──► Repaints
//!       ▼                                                      │
//!   Redraw phase ──► Skin::draw ──► DrawPort ──► Rasterizer ◄───┘
//!                                                  │
//!                                                  ▼
//!                                           Display (Surface × 1..2)
//! ```
//!
//! **[`rect`]**: integer rectangles and disjoint region algebra.
//!
//! **[`surface`]** and **[`display`]**: the pixel-store trait, an owned
//! [`Bitmap`](surface::Bitmap), and a one- or two-screen display that maps a
//! unified coordinate space onto its surfaces.
//!
//! **[`raster`]**: primitives (lines, rects, circles, ellipses, flood fill,
//! blits, scroll) that clip to one rect and never write outside it.
//!
//! **[`widget`]**: the widget tree, visible-region computation, hit testing,
//! and damage distribution.
//!
//! **[`dirty`]**: the two region-invalidation channels, tracked with
//! `understory_dirty`.
//!
//! **[`port`]** and **[`skin`]**: widget-local drawing through a list of
//! clip rects, and how each widget paints itself.
//!
//! **[`context`]**: the application object and its Input, Redraw, and Reap
//! tick phases. **[`event`]** holds the notifications it queues.
//!
//! **[`time`]**: tick-source timestamps and clocks.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! tick-loop instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates damage-rect
//!   events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod color;
pub mod context;
pub mod dirty;
pub mod display;
pub mod event;
pub mod port;
pub mod raster;
pub mod rect;
pub mod skin;
pub mod surface;
pub mod time;
pub mod trace;
pub mod widget;
