// src/simulation/config.rs
//! Synthetic signal configuration

use serde::{Deserialize, Serialize};

/// Synthetic multi-channel EMG source
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Output sample rate
    pub sample_rate_hz: u32,
    /// Channels per frame
    pub channel_count: usize,
    /// Seed of the noise generator; equal seeds give equal streams
    pub seed: u64,
    /// Carrier settings
    pub muscle: MuscleConfig,
    /// Interference settings
    pub noise: NoiseConfig,
}

/// Activation-modulated EMG carrier
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MuscleConfig {
    /// Carrier tones approximating the EMG band
    pub carrier_frequencies_hz: Vec<f32>,
    /// Peak amplitude in ADC counts at full activation
    pub full_scale_amplitude: f32,
    /// Initial activation level, 0.0..=1.0
    pub activation: f32,
}

/// Interference and baseline added to the carrier, in ADC counts
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NoiseConfig {
    /// RMS of white Gaussian noise
    pub thermal_rms: f32,
    /// Mains fundamental
    pub powerline_frequency_hz: f32,
    /// Amplitude of the mains fundamental
    pub powerline_amplitude: f32,
    /// Constant baseline shift
    pub dc_offset: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 2000,
            channel_count: 2,
            seed: 0x5EED,
            muscle: MuscleConfig::default(),
            noise: NoiseConfig::default(),
        }
    }
}

impl Default for MuscleConfig {
    fn default() -> Self {
        Self {
            carrier_frequencies_hz: vec![80.0, 130.0, 210.0],
            full_scale_amplitude: 6000.0,
            activation: 0.5,
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            thermal_rms: 20.0,
            powerline_frequency_hz: 50.0,
            powerline_amplitude: 1500.0,
            dc_offset: 300.0,
        }
    }
}

impl NoiseConfig {
    /// No interference, noise or offset
    pub fn clean() -> Self {
        Self {
            thermal_rms: 0.0,
            powerline_frequency_hz: 50.0,
            powerline_amplitude: 0.0,
            dc_offset: 0.0,
        }
    }
}
