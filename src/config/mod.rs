// src/config/mod.rs
//! Envelope pipeline configuration

pub mod constants;
pub mod loader;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};

use crate::processing::detectors::DetectorKind;
use serde::{Deserialize, Serialize};

/// Complete pipeline configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct EnvelopeConfig {
    /// Acquisition settings
    #[serde(default)]
    pub system: SystemSettings,
    /// Detector selection
    #[serde(default)]
    pub detector: DetectorConfig,
    /// Per-detector calibration tables
    #[serde(default)]
    pub calibration: CalibrationConfig,
}

/// Acquisition settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SystemSettings {
    /// ADC sampling rate; window lengths assume 2000 Hz
    #[serde(default = "defaults::sampling_rate_hz")]
    pub sampling_rate_hz: u32,

    /// Number of independent channels
    #[serde(default = "defaults::channel_count")]
    pub channel_count: usize,
}

/// Detector selection and output smoothing
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Envelope detector run on every channel
    #[serde(default = "defaults::detector_kind")]
    pub kind: DetectorKind,

    /// Which detector outputs pass through the smoother
    #[serde(default)]
    pub smoothing: SmootherPolicy,
}

/// Where the output smoother is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmootherPolicy {
    /// Peak-to-peak and averaged-peak outputs only
    #[default]
    PeakDetectors,
    /// Every detector output
    All,
    /// Raw scaled values
    Disabled,
}

impl SmootherPolicy {
    /// Whether outputs of `kind` are smoothed under this policy
    pub fn applies_to(self, kind: DetectorKind) -> bool {
        match self {
            SmootherPolicy::PeakDetectors => kind.is_peak_based(),
            SmootherPolicy::All => true,
            SmootherPolicy::Disabled => false,
        }
    }
}

/// Calibration coefficients; missing per-channel entries use the default
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CalibrationConfig {
    /// Coefficient for channels without a table entry
    #[serde(default = "defaults::coefficient")]
    pub default_coefficient: u16,

    /// Peak-to-peak coefficients by channel
    #[serde(default)]
    pub peak_to_peak: Vec<u16>,

    /// Averaged-peak coefficients by channel
    #[serde(default)]
    pub averaged_peak: Vec<u16>,

    /// RMS coefficients by channel
    #[serde(default)]
    pub rms: Vec<u16>,
}

impl CalibrationConfig {
    /// Per-channel overrides for one detector
    pub fn table(&self, kind: DetectorKind) -> &[u16] {
        match kind {
            DetectorKind::PeakToPeak => &self.peak_to_peak,
            DetectorKind::AveragedPeak => &self.averaged_peak,
            DetectorKind::Rms => &self.rms,
        }
    }
}

/// Default value providers using constants
mod defaults {
    use crate::config::constants::*;
    use crate::processing::detectors::DetectorKind;

    pub fn sampling_rate_hz() -> u32 {
        signal::NOMINAL_SAMPLING_RATE_HZ
    }

    pub fn channel_count() -> usize {
        signal::DEFAULT_CHANNEL_COUNT
    }

    pub fn detector_kind() -> DetectorKind {
        DetectorKind::PeakToPeak
    }

    pub fn coefficient() -> u16 {
        calibration::DEFAULT_COEFFICIENT
    }
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            sampling_rate_hz: defaults::sampling_rate_hz(),
            channel_count: defaults::channel_count(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            kind: defaults::detector_kind(),
            smoothing: SmootherPolicy::default(),
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            default_coefficient: defaults::coefficient(),
            peak_to_peak: Vec::new(),
            averaged_peak: Vec::new(),
            rms: Vec::new(),
        }
    }
}

/// Configuration utility functions
impl EnvelopeConfig {
    /// Validate configuration consistency
    pub fn validate_consistency(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let rate = self.system.sampling_rate_hz;
        if !(signal::MIN_SAMPLING_RATE_HZ..=signal::MAX_SAMPLING_RATE_HZ).contains(&rate) {
            errors.push(format!(
                "Sampling rate {} Hz outside {}..={} Hz",
                rate,
                signal::MIN_SAMPLING_RATE_HZ,
                signal::MAX_SAMPLING_RATE_HZ
            ));
        }

        let channels = self.system.channel_count;
        if !(signal::MIN_CHANNEL_COUNT..=signal::MAX_CHANNEL_COUNT).contains(&channels) {
            errors.push(format!(
                "Channel count {} outside {}..={}",
                channels,
                signal::MIN_CHANNEL_COUNT,
                signal::MAX_CHANNEL_COUNT
            ));
        }

        if self.calibration.default_coefficient == 0 {
            errors.push("Default calibration coefficient must be non-zero".to_string());
        }

        for kind in DetectorKind::ALL {
            let table = self.calibration.table(kind);
            if table.len() > channels {
                errors.push(format!(
                    "Calibration table {} has {} entries for {} channels",
                    kind,
                    table.len(),
                    channels
                ));
            }
            if let Some(channel) = table.iter().position(|&c| c == 0) {
                errors.push(format!(
                    "Calibration coefficient {}[{}] must be non-zero",
                    kind, channel
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Whether the fixed window lengths match the configured sampling rate
    pub fn is_nominal_rate(&self) -> bool {
        self.system.sampling_rate_hz == signal::NOMINAL_SAMPLING_RATE_HZ
    }

    /// Approximate envelope output rate of the selected detector
    pub fn output_rate_hz(&self) -> f32 {
        let window = match self.detector.kind {
            DetectorKind::PeakToPeak => {
                detector::PEAK_BLOCK_LEN as usize * detector::PEAK_RANK_DEPTH
            }
            DetectorKind::AveragedPeak | DetectorKind::Rms => {
                detector::AVERAGING_WINDOW_LEN as usize
            }
        };
        self.system.sampling_rate_hz as f32 / window as f32
    }

    /// Get configuration summary
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            sampling_rate_hz: self.system.sampling_rate_hz,
            channel_count: self.system.channel_count,
            detector: self.detector.kind,
            smoothing: self.detector.smoothing,
            output_rate_hz: self.output_rate_hz(),
        }
    }
}

/// Configuration summary for display/logging
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    /// Configured sampling rate
    pub sampling_rate_hz: u32,
    /// Configured channel count
    pub channel_count: usize,
    /// Selected detector
    pub detector: DetectorKind,
    /// Smoothing policy
    pub smoothing: SmootherPolicy,
    /// Envelopes per second per channel
    pub output_rate_hz: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = EnvelopeConfig::default();
        assert_eq!(
            config.system.sampling_rate_hz,
            signal::NOMINAL_SAMPLING_RATE_HZ
        );
        assert_eq!(config.system.channel_count, signal::DEFAULT_CHANNEL_COUNT);
        assert_eq!(config.detector.kind, DetectorKind::PeakToPeak);
        assert_eq!(config.detector.smoothing, SmootherPolicy::PeakDetectors);
        assert!(config.validate_consistency().is_ok());
        assert!(config.is_nominal_rate());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = EnvelopeConfig::default();
        config.detector.kind = DetectorKind::Rms;
        config.calibration.rms = vec![900, 1100];

        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: EnvelopeConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config: EnvelopeConfig = toml::from_str(
            r#"
[detector]
kind = "averaged_peak"
smoothing = "all"
"#,
        )
        .unwrap();
        assert_eq!(config.detector.kind, DetectorKind::AveragedPeak);
        assert_eq!(config.detector.smoothing, SmootherPolicy::All);
        assert_eq!(config.system, SystemSettings::default());
        assert_eq!(config.calibration.default_coefficient, 1000);
    }

    #[test]
    fn test_config_validation() {
        let mut config = EnvelopeConfig::default();
        config.system.channel_count = 0;
        config.calibration.peak_to_peak = vec![1000, 0, 1000];

        let errors = config.validate_consistency().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_zero_default_coefficient_rejected() {
        let mut config = EnvelopeConfig::default();
        config.calibration.default_coefficient = 0;
        assert!(config.validate_consistency().is_err());
    }

    #[test]
    fn test_smoother_policy() {
        assert!(SmootherPolicy::PeakDetectors.applies_to(DetectorKind::PeakToPeak));
        assert!(!SmootherPolicy::PeakDetectors.applies_to(DetectorKind::Rms));
        assert!(SmootherPolicy::All.applies_to(DetectorKind::Rms));
        assert!(!SmootherPolicy::Disabled.applies_to(DetectorKind::AveragedPeak));
    }

    #[test]
    fn test_output_rates() {
        let mut config = EnvelopeConfig::default();
        assert_eq!(config.output_rate_hz(), 12.5);
        config.detector.kind = DetectorKind::Rms;
        assert_eq!(config.summary().output_rate_hz, 10.0);
    }
}
