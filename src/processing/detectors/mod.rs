// src/processing/detectors/mod.rs
//! Envelope detectors
//!
//! Each detector consumes rectified samples (distance from the DC baseline) and
//! closes an output window at its own decimation cadence. Scaling by the
//! calibration coefficient happens only when a window closes, so callers fetch
//! the coefficient only at that point.

pub mod averaged_peak;
pub mod peak_to_peak;
pub mod rms;

pub use averaged_peak::AveragedPeakDetector;
pub use peak_to_peak::PeakToPeakDetector;
pub use rms::RmsDetector;

use crate::config::constants::detector::SCALE_NUMERATOR;
use crate::config::constants::output::MAX_ENVELOPE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Available envelope detection strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    /// Largest of four ranked block peaks
    PeakToPeak,
    /// Mean of all completed peaks in the window
    AveragedPeak,
    /// Root mean square of the rectified window
    Rms,
}

impl DetectorKind {
    /// Every variant, in table order
    pub const ALL: [DetectorKind; 3] = [
        DetectorKind::PeakToPeak,
        DetectorKind::AveragedPeak,
        DetectorKind::Rms,
    ];

    /// Whether the detector tracks peaks with the polarity state machine
    pub fn is_peak_based(self) -> bool {
        !matches!(self, DetectorKind::Rms)
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorKind::PeakToPeak => write!(f, "peak_to_peak"),
            DetectorKind::AveragedPeak => write!(f, "averaged_peak"),
            DetectorKind::Rms => write!(f, "rms"),
        }
    }
}

/// Common interface of the envelope detectors
pub trait EnvelopeDetector {
    /// Strategy implemented by this detector
    fn kind(&self) -> DetectorKind;

    /// Feed one rectified sample; returns `true` when it closes an output window
    fn accumulate(&mut self, rectified: u16) -> bool;

    /// Scale the closed window and reset the accumulators
    ///
    /// Returns `None` when no value can be produced (zero coefficient or an
    /// empty window). The window is reset either way.
    fn emit(&mut self, coefficient: u16) -> Option<u16>;

    /// Clear all state
    fn reset(&mut self);

    /// Accumulate and, at a window boundary, emit
    fn process(&mut self, rectified: u16, coefficient: u16) -> Option<u16> {
        if self.accumulate(rectified) {
            self.emit(coefficient)
        } else {
            None
        }
    }
}

/// Statically dispatched detector held by each channel
#[derive(Debug, Clone)]
pub enum Detector {
    /// Ranked block peak-to-peak
    PeakToPeak(PeakToPeakDetector),
    /// Mean of local peaks
    AveragedPeak(AveragedPeakDetector),
    /// Root mean square
    Rms(RmsDetector),
}

impl Detector {
    /// Fresh detector of the given kind
    pub fn new(kind: DetectorKind) -> Self {
        match kind {
            DetectorKind::PeakToPeak => Detector::PeakToPeak(PeakToPeakDetector::new()),
            DetectorKind::AveragedPeak => Detector::AveragedPeak(AveragedPeakDetector::new()),
            DetectorKind::Rms => Detector::Rms(RmsDetector::new()),
        }
    }
}

impl EnvelopeDetector for Detector {
    fn kind(&self) -> DetectorKind {
        match self {
            Detector::PeakToPeak(d) => d.kind(),
            Detector::AveragedPeak(d) => d.kind(),
            Detector::Rms(d) => d.kind(),
        }
    }

    fn accumulate(&mut self, rectified: u16) -> bool {
        match self {
            Detector::PeakToPeak(d) => d.accumulate(rectified),
            Detector::AveragedPeak(d) => d.accumulate(rectified),
            Detector::Rms(d) => d.accumulate(rectified),
        }
    }

    fn emit(&mut self, coefficient: u16) -> Option<u16> {
        match self {
            Detector::PeakToPeak(d) => d.emit(coefficient),
            Detector::AveragedPeak(d) => d.emit(coefficient),
            Detector::Rms(d) => d.emit(coefficient),
        }
    }

    fn reset(&mut self) {
        match self {
            Detector::PeakToPeak(d) => d.reset(),
            Detector::AveragedPeak(d) => d.reset(),
            Detector::Rms(d) => d.reset(),
        }
    }
}

/// `amplitude * 1000 / coefficient`, saturated below the sentinel
///
/// Returns `None` for a zero coefficient.
pub(crate) fn scale_amplitude(amplitude: u32, coefficient: u16) -> Option<u16> {
    if coefficient == 0 {
        return None;
    }
    let scaled = u64::from(amplitude) * u64::from(SCALE_NUMERATOR) / u64::from(coefficient);
    Some(scaled.min(u64::from(MAX_ENVELOPE)) as u16)
}
