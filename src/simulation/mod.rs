// src/simulation/mod.rs
//! Synthetic surface-EMG source
//!
//! Stands in for the acquisition hardware in tests, benchmarks and demos.

pub mod config;
pub mod noise_models;
pub mod signal_generator;

pub use config::{MuscleConfig, NoiseConfig, SimulationConfig};
pub use noise_models::{NoiseModel, PowerlineNoise, ThermalNoise};
pub use signal_generator::SignalGenerator;
