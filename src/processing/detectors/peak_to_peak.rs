// src/processing/detectors/peak_to_peak.rs
//! Ranked block-peak detector

use super::{scale_amplitude, DetectorKind, EnvelopeDetector};
use crate::config::constants::detector::{PEAK_BLOCK_LEN, PEAK_RANK_DEPTH, PEAK_TO_PEAK_CLAMP};
use crate::processing::polarity::PolarityTracker;

/// Peak-to-peak detector
///
/// Every 40-sample block yields one peak: the largest completed peak in the
/// block, or the block's running maximum when no peak completed. Four block
/// peaks are insertion-sorted and the largest becomes the output, so an output
/// window spans 160 samples.
#[derive(Debug, Clone)]
pub struct PeakToPeakDetector {
    tracker: PolarityTracker,
    block_peak: u16,
    block_samples: u16,
    ranked: [u16; PEAK_RANK_DEPTH],
    ranked_len: usize,
}

impl PeakToPeakDetector {
    /// Detector at the start of its first window
    pub fn new() -> Self {
        Self {
            tracker: PolarityTracker::new(),
            block_peak: 0,
            block_samples: 0,
            ranked: [0; PEAK_RANK_DEPTH],
            ranked_len: 0,
        }
    }

    /// Block peaks collected so far in the current output window, ascending
    pub fn ranked_peaks(&self) -> &[u16] {
        &self.ranked[..self.ranked_len]
    }

    fn close_block(&mut self) {
        let peak = if self.block_peak != 0 {
            self.block_peak
        } else {
            self.tracker.running_max()
        };
        self.tracker.take_running_max();
        self.block_peak = 0;
        self.insert_ranked(peak);
    }

    fn insert_ranked(&mut self, peak: u16) {
        // A full window that was never emitted is discarded.
        if self.ranked_len == PEAK_RANK_DEPTH {
            self.ranked_len = 0;
        }
        let mut slot = self.ranked_len;
        while slot > 0 && self.ranked[slot - 1] > peak {
            self.ranked[slot] = self.ranked[slot - 1];
            slot -= 1;
        }
        self.ranked[slot] = peak;
        self.ranked_len += 1;
    }
}

impl Default for PeakToPeakDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeDetector for PeakToPeakDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::PeakToPeak
    }

    fn accumulate(&mut self, rectified: u16) -> bool {
        if let Some(peak) = self.tracker.update(rectified) {
            if peak > self.block_peak {
                self.block_peak = peak;
            }
        }

        self.block_samples += 1;
        if self.block_samples < PEAK_BLOCK_LEN {
            return false;
        }
        self.block_samples = 0;
        self.close_block();

        self.ranked_len == PEAK_RANK_DEPTH
    }

    fn emit(&mut self, coefficient: u16) -> Option<u16> {
        let largest = self.ranked_peaks().last().copied().unwrap_or(0);
        self.ranked = [0; PEAK_RANK_DEPTH];
        self.ranked_len = 0;

        scale_amplitude(u32::from(largest), coefficient).map(|v| v.min(PEAK_TO_PEAK_CLAMP))
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
