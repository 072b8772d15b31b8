// src/simulation/signal_generator.rs
//! Raw ADC sample generation

use super::config::SimulationConfig;
use super::noise_models::NoiseModel;
use crate::config::constants::signal::MID_SCALE;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

/// Deterministic multi-channel source of centred raw samples
pub struct SignalGenerator {
    config: SimulationConfig,
    rng: StdRng,
    noise: Vec<NoiseModel>,
    /// Per-channel, per-carrier starting phase
    carrier_phases: Vec<Vec<f32>>,
    activation: f32,
    sample_index: u64,
}

impl SignalGenerator {
    /// Generator seeded from `config.seed`
    pub fn new(config: SimulationConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let carrier_phases: Vec<Vec<f32>> = (0..config.channel_count)
            .map(|_| {
                config
                    .muscle
                    .carrier_frequencies_hz
                    .iter()
                    .map(|_| rng.gen_range(0.0..2.0 * PI))
                    .collect()
            })
            .collect();
        let noise: Vec<NoiseModel> = (0..config.channel_count)
            .map(|_| NoiseModel::new(&config.noise, config.sample_rate_hz))
            .collect();

        Self {
            activation: config.muscle.activation.clamp(0.0, 1.0),
            config,
            rng,
            noise,
            carrier_phases,
            sample_index: 0,
        }
    }

    /// Channels per frame
    pub fn channel_count(&self) -> usize {
        self.config.channel_count
    }

    /// Set muscle activation, clamped to 0.0..=1.0
    pub fn set_activation(&mut self, level: f32) {
        self.activation = level.clamp(0.0, 1.0);
    }

    /// Current activation level
    pub fn activation(&self) -> f32 {
        self.activation
    }

    /// Peak carrier amplitude at the current activation, in ADC counts
    pub fn carrier_amplitude(&self) -> f32 {
        self.activation * self.config.muscle.full_scale_amplitude
    }

    /// Fill one sample per channel
    ///
    /// Extra slots in `frame` are left untouched.
    pub fn next_frame(&mut self, frame: &mut [u16]) {
        let t = self.sample_index as f32 / self.config.sample_rate_hz as f32;
        let tones = self.config.muscle.carrier_frequencies_hz.len().max(1) as f32;
        let amplitude = self.carrier_amplitude() / tones;

        for (channel, slot) in frame.iter_mut().take(self.config.channel_count).enumerate() {
            let carrier: f32 = self
                .config
                .muscle
                .carrier_frequencies_hz
                .iter()
                .zip(&self.carrier_phases[channel])
                .map(|(&hz, &phase)| (2.0 * PI * hz * t + phase).sin())
                .sum();

            let noisy = self.noise[channel].add_noise(carrier * amplitude, &mut self.rng);
            *slot = to_adc(noisy);
        }
        self.sample_index += 1;
    }

    /// Generate `count` consecutive samples of channel 0
    pub fn generate(&mut self, count: usize) -> Vec<u16> {
        let mut frame = vec![MID_SCALE; self.config.channel_count.max(1)];
        (0..count)
            .map(|_| {
                self.next_frame(&mut frame);
                frame[0]
            })
            .collect()
    }
}

fn to_adc(centred: f32) -> u16 {
    let level = (f32::from(MID_SCALE) + centred).round();
    level.clamp(0.0, f32::from(u16::MAX)) as u16
}
