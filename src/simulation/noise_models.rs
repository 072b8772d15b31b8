// src/simulation/noise_models.rs
//! Interference and noise sources for synthetic EMG

use super::config::NoiseConfig;
use rand::rngs::StdRng;
use rand::Rng;
use std::f32::consts::PI;

/// Mains interference with its 2nd and 3rd harmonics
#[derive(Debug, Clone)]
pub struct PowerlineNoise {
    frequency_hz: f32,
    amplitude: f32,
    phase: f32,
    phase_step: f32,
}

/// (harmonic, relative amplitude, phase offset)
const HARMONICS: [(f32, f32, f32); 3] = [
    (1.0, 1.0, 0.0),
    (2.0, 0.3, PI / 4.0),
    (3.0, 0.15, PI / 6.0),
];

impl PowerlineNoise {
    /// Mains source starting at zero phase
    pub fn new(frequency_hz: f32, amplitude: f32, sample_rate_hz: u32) -> Self {
        Self {
            frequency_hz,
            amplitude,
            phase: 0.0,
            phase_step: 2.0 * PI * frequency_hz / sample_rate_hz as f32,
        }
    }

    /// Fundamental frequency
    pub fn frequency_hz(&self) -> f32 {
        self.frequency_hz
    }

    /// Next interference sample, fundamental plus harmonics
    pub fn next_sample(&mut self) -> f32 {
        let interference: f32 = HARMONICS
            .iter()
            .map(|&(harmonic, weight, offset)| (self.phase * harmonic + offset).sin() * weight)
            .sum();

        self.phase += self.phase_step;
        if self.phase > 2.0 * PI {
            self.phase -= 2.0 * PI;
        }
        interference * self.amplitude
    }
}

/// White Gaussian noise (Box-Muller)
#[derive(Debug, Clone)]
pub struct ThermalNoise {
    rms: f32,
}

impl ThermalNoise {
    /// Noise with the given RMS; zero disables it
    pub fn new(rms: f32) -> Self {
        Self { rms }
    }

    /// Draw one Gaussian sample
    pub fn next_sample(&self, rng: &mut StdRng) -> f32 {
        if self.rms == 0.0 {
            return 0.0;
        }
        // Avoid ln(0)
        let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
        let u2: f32 = rng.gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos() * self.rms
    }
}

/// All additive disturbances of one channel
#[derive(Debug, Clone)]
pub struct NoiseModel {
    powerline: PowerlineNoise,
    thermal: ThermalNoise,
    dc_offset: f32,
}

impl NoiseModel {
    /// Per-channel noise sources from configuration
    pub fn new(config: &NoiseConfig, sample_rate_hz: u32) -> Self {
        Self {
            powerline: PowerlineNoise::new(
                config.powerline_frequency_hz,
                config.powerline_amplitude,
                sample_rate_hz,
            ),
            thermal: ThermalNoise::new(config.thermal_rms),
            dc_offset: config.dc_offset,
        }
    }

    /// Add thermal noise, mains and baseline to a clean sample
    pub fn add_noise(&mut self, clean_signal: f32, rng: &mut StdRng) -> f32 {
        clean_signal + self.powerline.next_sample() + self.thermal.next_sample(rng) + self.dc_offset
    }
}
