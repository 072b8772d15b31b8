// src/processing/polarity.rs
//! Rising/falling peak tracker shared by the peak detectors

/// Direction of the rectified signal at the last sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Last sample was not below its predecessor
    Rising,
    /// Last sample dropped; the initial state
    Falling,
}

/// Two-state machine that reports a peak when a rise turns into a fall
#[derive(Debug, Clone)]
pub struct PolarityTracker {
    state: Polarity,
    previous: u16,
    running_max: u16,
}

impl PolarityTracker {
    /// Tracker in `Falling` with no history
    pub fn new() -> Self {
        Self {
            state: Polarity::Falling,
            previous: 0,
            running_max: 0,
        }
    }

    /// Feed one rectified sample; returns the completed peak, if any
    ///
    /// A non-decreasing sample (including a plateau) enters `Rising`. The first
    /// decrease after `Rising` completes a peak at the previous sample.
    pub fn update(&mut self, rectified: u16) -> Option<u16> {
        if rectified > self.running_max {
            self.running_max = rectified;
        }

        if rectified >= self.previous {
            self.state = Polarity::Rising;
            self.previous = rectified;
            return None;
        }

        let completed = match self.state {
            Polarity::Rising => {
                self.state = Polarity::Falling;
                Some(self.previous)
            }
            Polarity::Falling => None,
        };
        self.previous = rectified;
        completed
    }

    /// Current direction
    pub fn state(&self) -> Polarity {
        self.state
    }

    /// Largest sample seen since the last [`take_running_max`](Self::take_running_max)
    pub fn running_max(&self) -> u16 {
        self.running_max
    }

    /// Return the running maximum and restart it at zero
    pub fn take_running_max(&mut self) -> u16 {
        std::mem::take(&mut self.running_max)
    }

    /// Return to the initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for PolarityTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peaks(samples: &[u16]) -> Vec<u16> {
        let mut tracker = PolarityTracker::new();
        samples.iter().filter_map(|&s| tracker.update(s)).collect()
    }

    #[test]
    fn test_initial_state() {
        let tracker = PolarityTracker::new();
        assert_eq!(tracker.state(), Polarity::Falling);
        assert_eq!(tracker.running_max(), 0);
    }

    #[test]
    fn test_single_peak() {
        assert_eq!(peaks(&[1, 5, 9, 4, 2]), vec![9]);
    }

    #[test]
    fn test_plateau_reports_once() {
        assert_eq!(peaks(&[3, 7, 7, 7, 1, 0]), vec![7]);
    }

    #[test]
    fn test_monotonic_fall_reports_nothing() {
        let mut tracker = PolarityTracker::new();
        tracker.update(10);
        assert_eq!(tracker.update(9), Some(10));
        assert_eq!(tracker.update(8), None);
        assert_eq!(tracker.update(7), None);
        assert_eq!(tracker.state(), Polarity::Falling);
    }

    #[test]
    fn test_rectified_sine_peaks() {
        let samples = [0, 70, 100, 70, 0, 70, 100, 70, 0, 70, 100, 70, 0];
        assert_eq!(peaks(&samples), vec![100, 100, 100]);
    }

    #[test]
    fn test_running_max_take() {
        let mut tracker = PolarityTracker::new();
        for &s in &[4, 12, 3] {
            tracker.update(s);
        }
        assert_eq!(tracker.take_running_max(), 12);
        assert_eq!(tracker.running_max(), 0);
        // Direction survives the take.
        assert_eq!(tracker.state(), Polarity::Falling);
    }
}
