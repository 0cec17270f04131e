//! Perceived-latency overlay shown over freshly loaded results.
//!
//! Purely cosmetic: it advances on its own timer and is unrelated to when
//! the record became available.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};

use serde::Serialize;

/// Interval between overlay ticks, in milliseconds.
pub const TICK_INTERVAL_MS: u32 = 400;

/// Delay between reaching 100% and hiding the overlay, in milliseconds.
pub const SETTLE_DELAY_MS: u32 = 500;

/// Upper bound (exclusive) of a single random increment.
pub const MAX_INCREMENT: f64 = 15.0;

/// Overlay state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OverlayState {
    /// Progress bar filling, 0..100.
    Loading { progress: f64 },
    /// Bar is full; waiting out the settle delay.
    Settling,
    /// Overlay hidden.
    Ready,
}

/// `Loading(progress) -> Settling -> Ready`, or straight to `Ready` when dismissed.
#[derive(Debug, Clone)]
pub struct LoadingOverlay {
    state: OverlayState,
}

impl LoadingOverlay {
    pub fn new() -> Self {
        Self {
            state: OverlayState::Loading { progress: 0.0 },
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Current progress; 100 once the bar has filled.
    pub fn progress(&self) -> f64 {
        match self.state {
            OverlayState::Loading { progress } => progress,
            OverlayState::Settling | OverlayState::Ready => 100.0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == OverlayState::Ready
    }

    /// Advance by `increment` on a loading tick. Negative increments are
    /// ignored.
    pub fn tick(&mut self, increment: f64) -> OverlayState {
        if let OverlayState::Loading { progress } = self.state {
            let next = progress + increment.max(0.0);
            self.state = if next >= 100.0 {
                OverlayState::Settling
            } else {
                OverlayState::Loading { progress: next }
            };
        }
        self.state
    }

    /// Called once the settle delay elapsed.
    pub fn settle(&mut self) -> OverlayState {
        if self.state == OverlayState::Settling {
            self.state = OverlayState::Ready;
        }
        self.state
    }

    /// User closed the overlay early.
    pub fn dismiss(&mut self) {
        self.state = OverlayState::Ready;
    }
}

impl Default for LoadingOverlay {
    fn default() -> Self {
        Self::new()
    }
}

/// Random tick increments in `[0, MAX_INCREMENT)`.
#[derive(Debug, Clone)]
pub struct JitterSource {
    state: RandomState,
    counter: u64,
}

impl JitterSource {
    pub fn new() -> Self {
        Self {
            state: RandomState::new(),
            counter: 0,
        }
    }

    pub fn next_increment(&mut self) -> f64 {
        let mut hasher = self.state.build_hasher();
        hasher.write_u64(self.counter);
        self.counter = self.counter.wrapping_add(1);

        let unit = (hasher.finish() >> 11) as f64 / (1u64 << 53) as f64;
        unit * MAX_INCREMENT
    }
}

impl Default for JitterSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_then_settles() {
        let mut overlay = LoadingOverlay::new();
        assert_eq!(overlay.tick(40.0), OverlayState::Loading { progress: 40.0 });
        assert_eq!(overlay.tick(40.0), OverlayState::Loading { progress: 80.0 });
        assert_eq!(overlay.tick(25.0), OverlayState::Settling);
        assert_eq!(overlay.progress(), 100.0);
        assert!(!overlay.is_ready());

        assert_eq!(overlay.settle(), OverlayState::Ready);
    }

    #[test]
    fn test_settle_is_noop_while_loading() {
        let mut overlay = LoadingOverlay::new();
        overlay.tick(10.0);
        assert_eq!(overlay.settle(), OverlayState::Loading { progress: 10.0 });
    }

    #[test]
    fn test_dismiss_skips_to_ready() {
        let mut overlay = LoadingOverlay::new();
        overlay.tick(5.0);
        overlay.dismiss();
        assert!(overlay.is_ready());
        assert_eq!(overlay.tick(50.0), OverlayState::Ready);
    }

    #[test]
    fn test_negative_increment_ignored() {
        let mut overlay = LoadingOverlay::new();
        overlay.tick(-20.0);
        assert_eq!(overlay.progress(), 0.0);
    }

    #[test]
    fn test_jitter_range_and_termination() {
        let mut jitter = JitterSource::new();
        let mut overlay = LoadingOverlay::new();
        let mut ticks = 0;

        while !matches!(overlay.state(), OverlayState::Settling) && ticks < 10_000 {
            let step = jitter.next_increment();
            assert!((0.0..MAX_INCREMENT).contains(&step));
            overlay.tick(step);
            ticks += 1;
        }
        assert_eq!(overlay.state(), OverlayState::Settling);
    }
}
