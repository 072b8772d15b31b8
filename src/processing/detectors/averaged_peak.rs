// src/processing/detectors/averaged_peak.rs
//! Averaged-peak detector

use super::{scale_amplitude, DetectorKind, EnvelopeDetector};
use crate::config::constants::detector::AVERAGING_WINDOW_LEN;
use crate::processing::polarity::PolarityTracker;

/// Averages every completed peak over a 200-sample window
#[derive(Debug, Clone)]
pub struct AveragedPeakDetector {
    tracker: PolarityTracker,
    peak_sum: u32,
    peak_count: u32,
    window_samples: u16,
}

impl AveragedPeakDetector {
    /// Detector at the start of its first window
    pub fn new() -> Self {
        Self {
            tracker: PolarityTracker::new(),
            peak_sum: 0,
            peak_count: 0,
            window_samples: 0,
        }
    }

    /// Peaks completed so far in the current window
    pub fn peak_count(&self) -> u32 {
        self.peak_count
    }
}

impl Default for AveragedPeakDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeDetector for AveragedPeakDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::AveragedPeak
    }

    fn accumulate(&mut self, rectified: u16) -> bool {
        if let Some(peak) = self.tracker.update(rectified) {
            self.peak_sum += u32::from(peak);
            self.peak_count += 1;
        }

        self.window_samples += 1;
        if self.window_samples < AVERAGING_WINDOW_LEN {
            return false;
        }
        self.window_samples = 0;
        true
    }

    fn emit(&mut self, coefficient: u16) -> Option<u16> {
        let sum = std::mem::take(&mut self.peak_sum);
        let count = std::mem::take(&mut self.peak_count);
        self.tracker.take_running_max();

        if count == 0 {
            return None;
        }
        scale_amplitude(sum / count, coefficient)
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: usize = AVERAGING_WINDOW_LEN as usize;

    #[test]
    fn test_averages_alternating_peaks() {
        let mut detector = AveragedPeakDetector::new();
        // Peaks alternate 600 and 200 every 4 samples.
        let mut emitted = None;
        for n in 0..WINDOW {
            let apex = if (n / 4) % 2 == 0 { 600 } else { 200 };
            let value = if n % 4 == 1 { apex } else { 0 };
            emitted = detector.process(value, 1000);
        }
        assert_eq!(emitted, Some(400));
    }

    #[test]
    fn test_emits_every_window() {
        let mut detector = AveragedPeakDetector::new();
        let mut boundaries = 0;
        for n in 0..WINDOW * 5 {
            if detector.accumulate(if n % 2 == 0 { 100 } else { 0 }) {
                boundaries += 1;
                assert_eq!(detector.emit(1000), Some(100));
            }
        }
        assert_eq!(boundaries, 5);
    }

    #[test]
    fn test_no_peaks_returns_none() {
        let mut detector = AveragedPeakDetector::new();
        let mut emitted = Some(0);
        for _ in 0..WINDOW {
            emitted = detector.process(300, 1000);
        }
        // A constant level never turns downward.
        assert_eq!(emitted, None);
        assert_eq!(detector.peak_count(), 0);
    }

    #[test]
    fn test_silence_returns_none() {
        let mut detector = AveragedPeakDetector::new();
        for _ in 0..WINDOW * 2 {
            assert_eq!(detector.process(0, 1000), None);
        }
    }

    #[test]
    fn test_zero_coefficient_returns_none_and_resets() {
        let mut detector = AveragedPeakDetector::new();
        for n in 0..WINDOW {
            assert_eq!(detector.process(if n % 2 == 0 { 50 } else { 0 }, 0), None);
        }
        assert_eq!(detector.peak_count(), 0);
    }

    #[test]
    fn test_large_average_saturates_below_sentinel() {
        let mut detector = AveragedPeakDetector::new();
        let mut emitted = None;
        for n in 0..WINDOW {
            emitted = detector.process(if n % 2 == 0 { 60000 } else { 0 }, 1);
        }
        assert_eq!(emitted, Some(0xFFFE));
    }
}
