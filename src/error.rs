// src/error.rs
//! Unified error type for the envelope pipeline
//!
//! Only the configuration and calibration surfaces fail. The per-sample data
//! path reports problems through the `NO_VALUE` sentinel instead.

use crate::processing::detectors::DetectorKind;
use thiserror::Error;

/// Errors raised while building or reconfiguring an envelope pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Channel index outside the pipeline
    #[error("channel {channel} out of range (pipeline has {channel_count} channels)")]
    InvalidChannel {
        /// Requested channel
        channel: usize,
        /// Channels in the pipeline
        channel_count: usize,
    },

    /// Calibration coefficients are divisors and must be non-zero
    #[error("calibration coefficient for channel {channel} ({detector}) must be non-zero")]
    ZeroCoefficient {
        /// Channel whose coefficient was rejected
        channel: usize,
        /// Table the coefficient belongs to
        detector: DetectorKind,
    },

    /// Frame length differs from the channel count
    #[error("frame has {actual} samples, expected {expected}")]
    FrameLength {
        /// Channels in the pipeline
        expected: usize,
        /// Samples supplied
        actual: usize,
    },

    /// Invalid or inconsistent configuration
    #[error("configuration error in {component}: {reason}")]
    Configuration {
        /// Subsystem that rejected the configuration
        component: String,
        /// Human-readable cause
        reason: String,
    },
}

impl EnvelopeError {
    /// Create a configuration error
    pub fn configuration(component: &str, reason: impl Into<String>) -> Self {
        EnvelopeError::Configuration {
            component: component.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for pipeline operations
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = EnvelopeError::ZeroCoefficient {
            channel: 1,
            detector: DetectorKind::Rms,
        };
        assert_eq!(
            error.to_string(),
            "calibration coefficient for channel 1 (rms) must be non-zero"
        );

        let error = EnvelopeError::configuration("system", "channel_count must be positive");
        assert!(error.to_string().contains("system"));

        let error = EnvelopeError::FrameLength {
            expected: 2,
            actual: 3,
        };
        assert_eq!(error.to_string(), "frame has 3 samples, expected 2");
    }
}
