// src/processing/detectors/rms.rs
//! Windowed RMS detector

use super::{DetectorKind, EnvelopeDetector};
use crate::config::constants::detector::{AVERAGING_WINDOW_LEN, SCALE_NUMERATOR};
use crate::config::constants::output::MAX_ENVELOPE;

/// Root mean square of the rectified signal over a 200-sample window
#[derive(Debug, Clone)]
pub struct RmsDetector {
    mean_square: f32,
    window_samples: u16,
}

impl RmsDetector {
    /// Detector at the start of its first window
    pub fn new() -> Self {
        Self {
            mean_square: 0.0,
            window_samples: 0,
        }
    }
}

impl Default for RmsDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeDetector for RmsDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Rms
    }

    fn accumulate(&mut self, rectified: u16) -> bool {
        let x = f32::from(rectified);
        self.mean_square += x * x / f32::from(AVERAGING_WINDOW_LEN);

        self.window_samples += 1;
        if self.window_samples < AVERAGING_WINDOW_LEN {
            return false;
        }
        self.window_samples = 0;
        true
    }

    fn emit(&mut self, coefficient: u16) -> Option<u16> {
        let mean_square = std::mem::take(&mut self.mean_square);
        if coefficient == 0 {
            return None;
        }

        let scaled = mean_square.sqrt() * SCALE_NUMERATOR as f32 / f32::from(coefficient);
        // Float-to-int `as` truncates and saturates.
        Some((scaled as u32).min(u32::from(MAX_ENVELOPE)) as u16)
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
