// src/processing/dc_offset.rs
//! Moving-average baseline tracker

use crate::config::constants::dc_offset::{WINDOW_LEN, WINDOW_SHIFT};

/// Per-channel DC offset estimator over the last 256 filtered samples
///
/// During warm-up the estimate is the mean of all samples seen so far. Once the
/// window is full the oldest sample is evicted from the running sum before the
/// new one is added.
#[derive(Debug, Clone)]
pub struct DcOffsetEstimator {
    window: [u16; WINDOW_LEN],
    index: usize,
    count: usize,
    sum: u32,
}

impl DcOffsetEstimator {
    /// Empty window; the first sample becomes the estimate
    pub fn new() -> Self {
        Self {
            window: [0; WINDOW_LEN],
            index: 0,
            count: 0,
            sum: 0,
        }
    }

    /// Feed one filtered sample and return the current baseline
    pub fn estimate(&mut self, filtered_sample: u16) -> u16 {
        if self.count == WINDOW_LEN {
            self.sum -= u32::from(self.window[self.index]);
        }

        self.window[self.index] = filtered_sample;
        self.index = (self.index + 1) % WINDOW_LEN;
        self.sum += u32::from(filtered_sample);

        if self.count < WINDOW_LEN {
            self.count += 1;
            (self.sum / self.count as u32) as u16
        } else {
            (self.sum >> WINDOW_SHIFT) as u16
        }
    }

    /// Samples currently contributing to the estimate
    pub fn observed(&self) -> usize {
        self.count
    }

    /// Forget every observed sample
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for DcOffsetEstimator {
    fn default() -> Self {
        Self::new()
    }
}
