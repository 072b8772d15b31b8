// src/processing/mod.rs
//! Streaming envelope detection for surface EMG

pub mod bandstop;
pub mod coefficients;
pub mod dc_offset;
pub mod detectors;
pub mod pipeline;
pub mod polarity;
pub mod smoother;

pub use bandstop::BandstopFilter;
pub use dc_offset::DcOffsetEstimator;
pub use detectors::{
    AveragedPeakDetector, Detector, DetectorKind, EnvelopeDetector, PeakToPeakDetector, RmsDetector,
};
pub use pipeline::{ChannelPipeline, ChannelStats, Envelope, EnvelopePipeline};
pub use polarity::{Polarity, PolarityTracker};
pub use smoother::OutputSmoother;
