// src/processing/smoother.rs
//! Asymmetric hysteresis debounce for emitted envelope values

use crate::config::constants::smoother::{FALL_STREAK_LIMIT, RISE_STREAK_LIMIT};

/// Per-channel output smoother
///
/// Single-count steps are debounced: a +1 step must repeat four times and a -1
/// step twice before the output follows. Any other change is taken at once.
#[derive(Debug, Clone, Default)]
pub struct OutputSmoother {
    last_accepted: u16,
    rise_streak: u8,
    fall_streak: u8,
}

impl OutputSmoother {
    /// Smoother with zero accepted and no streaks
    pub fn new() -> Self {
        Self::default()
    }

    /// Debounce one candidate value and return the value to emit
    pub fn smooth(&mut self, candidate: u16) -> u16 {
        // Cancels the +1 bias of the upstream scaling.
        let candidate = if candidate > 1 {
            candidate - 1
        } else {
            candidate
        };

        if candidate == self.last_accepted.wrapping_add(1) {
            self.rise_streak += 1;
            if self.rise_streak > RISE_STREAK_LIMIT {
                self.accept(candidate);
            }
        } else if candidate == self.last_accepted.wrapping_sub(1) {
            self.fall_streak += 1;
            if self.fall_streak > FALL_STREAK_LIMIT {
                self.accept(candidate);
            }
        } else {
            self.accept(candidate);
        }

        self.last_accepted
    }

    /// Value most recently accepted
    pub fn last_accepted(&self) -> u16 {
        self.last_accepted
    }

    /// Forget the accepted value and streaks
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn accept(&mut self, candidate: u16) {
        self.last_accepted = candidate;
        self.rise_streak = 0;
        self.fall_streak = 0;
    }
}
