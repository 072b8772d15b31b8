//! EMG Envelope Demo
//!
//! Feeds a simulated contraction (rest, ramp up, hold, release) through the
//! envelope pipeline and prints each envelope as it is emitted. Mains
//! interference is enabled in the simulator and removed by the comb filter.
//!
//! Configuration is read from `config/envelope.toml` when present and can be
//! overridden with `EMG_<SECTION>_<KEY>` variables, e.g.
//! `EMG_DETECTOR_KIND=rms cargo run --example envelope_demo`.

use emg_envelope::simulation::{SignalGenerator, SimulationConfig};
use emg_envelope::{BandstopFilter, ConfigLoader, Envelope, EnvelopePipeline};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PHASES: &[(&str, f32, f32, usize)] = &[
    // (label, start activation, end activation, samples)
    ("rest", 0.05, 0.05, 2000),
    ("ramp", 0.05, 0.9, 4000),
    ("hold", 0.9, 0.9, 4000),
    ("release", 0.9, 0.05, 2000),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emg_envelope=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("EMG Envelope Demo");
    println!("=================");

    let config = ConfigLoader::new().load()?;
    let summary = config.summary();
    println!("Configuration:");
    println!("  Channels: {}", summary.channel_count);
    println!("  Sampling Rate: {} Hz", summary.sampling_rate_hz);
    println!("  Detector: {}", summary.detector);
    println!("  Smoothing: {:?}", summary.smoothing);
    println!("  Output Rate: {:.1} Hz", summary.output_rate_hz);
    println!();

    let response = BandstopFilter::frequency_response(4000);
    let bin_hz = summary.sampling_rate_hz as f32 / 4000.0;
    println!("Comb filter response:");
    for hz in [40.0f32, 50.0, 100.0, 150.0, 250.0] {
        let bin = (hz / bin_hz).round() as usize;
        let gain_db = 20.0 * response[bin].max(1e-6).log10();
        println!("  {:>5.0} Hz: {:>7.1} dB", hz, gain_db);
    }
    println!();

    let mut pipeline = EnvelopePipeline::new(&config)?;
    let mut generator = SignalGenerator::new(SimulationConfig {
        sample_rate_hz: summary.sampling_rate_hz,
        channel_count: summary.channel_count,
        ..Default::default()
    });

    let channels = summary.channel_count;
    let mut frame = vec![0u16; channels];
    let mut out = vec![Envelope::NO_VALUE; channels];

    for &(label, start, end, samples) in PHASES {
        println!("-- {} --", label);
        for n in 0..samples {
            let progress = n as f32 / samples as f32;
            generator.set_activation(start + (end - start) * progress);
            generator.next_frame(&mut frame);
            pipeline.process_frame(&frame, &mut out)?;

            if let Some(value) = out[0].value() {
                let bar = "#".repeat((value / 100) as usize);
                println!(
                    "  activation {:>4.2}  ch0 {:>10}  {}",
                    generator.activation(),
                    out[0].to_string(),
                    bar
                );
            }
        }
    }

    // Halve the gain of channel 0 while running
    let calibration = pipeline.calibration();
    let kind = pipeline.detector_kind();
    let current = calibration.coefficient(0, kind);
    calibration
        .set_coefficient(0, kind, current.saturating_mul(2))?;
    println!();
    println!(
        "Channel 0 coefficient {} -> {}",
        current,
        calibration.coefficient(0, kind)
    );

    generator.set_activation(0.9);
    for _ in 0..2000 {
        generator.next_frame(&mut frame);
        pipeline.process_frame(&frame, &mut out)?;
        if out[0].is_value() {
            println!("  ch0 {}", out[0]);
        }
    }

    println!();
    println!("Channel statistics:");
    for channel in 0..pipeline.channel_count() {
        if let Some(stats) = pipeline.stats(channel) {
            println!(
                "  ch{}: {} samples, {} envelopes, {} guarded",
                channel, stats.samples_processed, stats.envelopes_emitted, stats.guarded_outputs
            );
        }
    }

    Ok(())
}
