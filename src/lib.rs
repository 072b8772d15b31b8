//! EMG-Envelope: streaming surface-EMG envelope detection
//!
//! Converts raw ADC samples into a calibrated amplitude estimate of muscle
//! activation, one channel at a time. Per channel and per sample:
//!
//! - 243-tap integer comb filter removing 50/100/150 Hz mains interference
//! - 256-sample moving-average DC baseline and rectification
//! - one of three detectors: ranked peak-to-peak, averaged peak, or RMS
//! - calibration scaling and an asymmetric debounce at each output window
//!
//! All state is fixed-size and allocated when the pipeline is built. Calls that
//! do not close an output window return [`Envelope::NO_VALUE`].
//!
//! # Quick Start
//!
//! ```rust
//! use emg_envelope::{EnvelopeConfig, EnvelopePipeline, DetectorKind};
//! use emg_envelope::simulation::{SignalGenerator, SimulationConfig};
//!
//! let mut config = EnvelopeConfig::default();
//! config.detector.kind = DetectorKind::Rms;
//! config.system.channel_count = 1;
//!
//! let mut pipeline = EnvelopePipeline::new(&config)?;
//! let mut generator = SignalGenerator::new(SimulationConfig {
//!     channel_count: 1,
//!     ..Default::default()
//! });
//!
//! for raw in generator.generate(2000) {
//!     if let Some(value) = pipeline.process_sample(0, raw)?.value() {
//!         println!("envelope: {} (0.1 uV)", value);
//!     }
//! }
//! # Ok::<(), emg_envelope::EnvelopeError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod calibration;
pub mod config;
pub mod error;
pub mod processing;
pub mod simulation;

// Re-export commonly used types for convenience
pub use calibration::{CalibrationTable, SharedCalibration};
pub use config::{ConfigError, ConfigLoader, EnvelopeConfig, SmootherPolicy};
pub use error::{EnvelopeError, EnvelopeResult};
pub use processing::{
    BandstopFilter, ChannelPipeline, ChannelStats, DcOffsetEstimator, DetectorKind, Envelope,
    EnvelopeDetector, EnvelopePipeline, OutputSmoother,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Streaming surface-EMG envelope detection".to_string(),
        detectors: DetectorKind::ALL.to_vec(),
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// Available envelope detectors
    pub detectors: Vec<DetectorKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert_eq!(info.name, NAME);
        assert_eq!(info.version, VERSION);
        assert_eq!(info.detectors.len(), 3);
    }

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "emg-envelope");
    }
}
