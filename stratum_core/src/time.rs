// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tick-source time.
//!
//! The tick loop is driven by one external source that hands the
//! [`Context`](crate::context::Context) a [`HostTime`] per tick. Stratum never
//! reads a platform clock itself: whatever drives the loop supplies either a
//! timestamp or a [`Clock`] to sample from.
//!
//! [`Timebase`] converts the source's ticks to nanoseconds for diagnostics;
//! [`Duration`] is a span in the same tick units.

use core::fmt;
use core::ops::{Add, Sub};

/// A monotonic timestamp in tick-source units.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Converts to nanoseconds.
    #[inline]
    #[must_use]
    pub const fn to_nanos(self, timebase: Timebase) -> u64 {
        timebase.ticks_to_nanos(self.0)
    }

    /// Builds a timestamp from nanoseconds.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: u64, timebase: Timebase) -> Self {
        Self(timebase.nanos_to_ticks(nanos))
    }

    /// Time elapsed since `earlier`, or zero if `earlier` is later.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for HostTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for HostTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Self) -> Duration {
        self.saturating_duration_since(rhs)
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({})", self.0)
    }
}

/// Ratio from ticks to nanoseconds: `nanos = ticks * numer / denom`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timebase {
    /// Numerator.
    pub numer: u32,
    /// Denominator.
    pub denom: u32,
}

impl Timebase {
    /// Ticks are nanoseconds.
    pub const NANOS: Self = Self { numer: 1, denom: 1 };

    /// Ticks are microseconds.
    pub const MICROS: Self = Self {
        numer: 1_000,
        denom: 1,
    };

    /// Creates a timebase.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    #[inline]
    #[must_use]
    pub const fn new(numer: u32, denom: u32) -> Self {
        assert!(denom != 0, "timebase denominator must not be zero");
        Self { numer, denom }
    }

    /// Converts a tick count to nanoseconds.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn ticks_to_nanos(self, ticks: u64) -> u64 {
        (ticks as u128 * self.numer as u128 / self.denom as u128) as u64
    }

    /// Converts nanoseconds to a tick count.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn nanos_to_ticks(self, nanos: u64) -> u64 {
        if self.numer == 0 {
            return 0;
        }
        (nanos as u128 * self.denom as u128 / self.numer as u128) as u64
    }
}

impl fmt::Debug for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timebase({}/{})", self.numer, self.denom)
    }
}

/// A span of tick-source time.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    /// Zero ticks.
    pub const ZERO: Self = Self(0);

    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Converts to nanoseconds.
    #[inline]
    #[must_use]
    pub const fn to_nanos(self, timebase: Timebase) -> u64 {
        timebase.ticks_to_nanos(self.0)
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// A source of timestamps sampled during a tick.
///
/// Closures returning [`HostTime`] are clocks, so a fixed timestamp can be
/// passed as `&mut || now`.
pub trait Clock {
    /// Samples the current time. Successive samples never decrease.
    fn now(&mut self) -> HostTime;
}

impl<F: FnMut() -> HostTime> Clock for F {
    fn now(&mut self) -> HostTime {
        self()
    }
}

/// A deterministic clock that advances by a fixed step on every sample.
///
/// Useful for tests and recorded demos where phase durations should be
/// reproducible.
#[derive(Clone, Copy, Debug)]
pub struct ManualClock {
    now: HostTime,
    step: Duration,
}

impl ManualClock {
    /// Starts at `start`, advancing `step` per sample.
    #[must_use]
    pub const fn new(start: HostTime, step: Duration) -> Self {
        Self { now: start, step }
    }

    /// Moves the clock forward without sampling.
    pub fn advance(&mut self, by: Duration) {
        self.now = self.now + by;
    }

    /// The time the next sample will return.
    #[must_use]
    pub const fn peek(&self) -> HostTime {
        self.now
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> HostTime {
        let t = self.now;
        self.now = self.now + self.step;
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn microsecond_timebase() {
        let tb = Timebase::MICROS;
        assert_eq!(HostTime(16_667).to_nanos(tb), 16_667_000);
        assert_eq!(HostTime::from_nanos(2_000, tb), HostTime(2));
    }

    #[test]
    fn conversion_does_not_overflow() {
        let tb = Timebase::new(125, 3);
        let nanos = HostTime(24_000_000).to_nanos(tb);
        assert_eq!(nanos, 1_000_000_000, "24 MHz ticks for one second");
        let _ = HostTime(u64::MAX / 2).to_nanos(tb);
    }

    #[test]
    fn differences_saturate() {
        let t = HostTime(1000);
        assert_eq!(t - HostTime(1500), Duration::ZERO);
        assert_eq!(t - HostTime(400), Duration(600));
        assert_eq!((t + Duration(u64::MAX)).ticks(), u64::MAX);
    }

    #[test]
    fn manual_clock_steps_per_sample() {
        let mut clock = ManualClock::new(HostTime(10), Duration(5));
        assert_eq!(clock.now(), HostTime(10));
        assert_eq!(clock.now(), HostTime(15));
        clock.advance(Duration(100));
        assert_eq!(clock.peek(), HostTime(120));
    }

    #[test]
    fn closures_are_clocks() {
        let mut fixed = || HostTime(7);
        let clock: &mut dyn Clock = &mut fixed;
        assert_eq!(clock.now(), HostTime(7));
        assert_eq!(clock.now(), HostTime(7));
    }
}
