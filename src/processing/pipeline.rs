// src/processing/pipeline.rs
//! Per-channel envelope pipeline
//!
//! raw sample -> comb filter -> DC baseline -> rectify -> detector -> (window
//! boundary) calibration scaling -> smoother -> envelope.

use super::bandstop::BandstopFilter;
use super::dc_offset::DcOffsetEstimator;
use super::detectors::{Detector, DetectorKind, EnvelopeDetector};
use super::smoother::OutputSmoother;
use crate::calibration::{CalibrationTable, SharedCalibration};
use crate::config::constants::output::{NO_VALUE, UNITS_PER_MICROVOLT};
use crate::config::{EnvelopeConfig, SmootherPolicy};
use crate::error::{EnvelopeError, EnvelopeResult};
use std::fmt;

/// Envelope output of one pipeline step
///
/// Holds either a calibrated amplitude in 0.1 uV units or [`Envelope::NO_VALUE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Envelope(u16);

impl Envelope {
    /// Sentinel for calls that do not produce a new value
    pub const NO_VALUE: Envelope = Envelope(NO_VALUE);

    /// Wrap a raw output word
    pub fn from_raw(raw: u16) -> Self {
        Envelope(raw)
    }

    /// Raw output word, `0xFFFF` when no value was produced
    pub fn raw(self) -> u16 {
        self.0
    }

    /// Amplitude, or `None` for the sentinel
    pub fn value(self) -> Option<u16> {
        (self.0 != NO_VALUE).then_some(self.0)
    }

    /// Whether this step produced an amplitude
    pub fn is_value(self) -> bool {
        self.0 != NO_VALUE
    }

    /// Amplitude in microvolts
    pub fn as_microvolts(self) -> Option<f32> {
        self.value().map(|v| f32::from(v) / UNITS_PER_MICROVOLT)
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Envelope::NO_VALUE
    }
}

impl From<Option<u16>> for Envelope {
    fn from(value: Option<u16>) -> Self {
        value.map_or(Envelope::NO_VALUE, Envelope)
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(v) => write!(f, "{}.{} uV", v / 10, v % 10),
            None => write!(f, "-"),
        }
    }
}

/// Counters kept per channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Raw samples consumed
    pub samples_processed: u64,
    /// Values returned (anything other than the sentinel)
    pub envelopes_emitted: u64,
    /// Window boundaries that produced no value (zero coefficient or no peaks)
    pub guarded_outputs: u64,
    /// Most recent emitted value
    pub last_envelope: Option<u16>,
}

/// One channel's complete state
#[derive(Debug, Clone)]
pub struct ChannelPipeline {
    channel: usize,
    filter: BandstopFilter,
    dc_offset: DcOffsetEstimator,
    detector: Detector,
    smoother: OutputSmoother,
    policy: SmootherPolicy,
    stats: ChannelStats,
}

impl ChannelPipeline {
    /// Fresh channel state for one detector
    pub fn new(channel: usize, kind: DetectorKind, policy: SmootherPolicy) -> Self {
        Self {
            channel,
            filter: BandstopFilter::new(),
            dc_offset: DcOffsetEstimator::new(),
            detector: Detector::new(kind),
            smoother: OutputSmoother::new(),
            policy,
            stats: ChannelStats::default(),
        }
    }

    /// Process one raw sample
    ///
    /// `coefficient` is only called when an output window closes.
    pub fn process<F>(&mut self, raw_sample: u16, coefficient: F) -> Envelope
    where
        F: FnOnce() -> u16,
    {
        self.stats.samples_processed += 1;

        let filtered = self.filter.filter(raw_sample);
        let baseline = self.dc_offset.estimate(filtered);
        let rectified = filtered.abs_diff(baseline);

        if !self.detector.accumulate(rectified) {
            return Envelope::NO_VALUE;
        }

        let Some(scaled) = self.detector.emit(coefficient()) else {
            self.record_guard();
            return Envelope::NO_VALUE;
        };

        let value = if self.policy.applies_to(self.detector.kind()) {
            self.smoother.smooth(scaled)
        } else {
            scaled
        };

        self.stats.envelopes_emitted += 1;
        self.stats.last_envelope = Some(value);
        tracing::trace!(channel = self.channel, value, "envelope emitted");
        Envelope(value)
    }

    /// Channel index this state belongs to
    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Detector run by this channel
    pub fn detector_kind(&self) -> DetectorKind {
        self.detector.kind()
    }

    /// Counters since construction or the last reset
    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }

    /// Clear filter, baseline, detector, smoother and counters
    pub fn reset(&mut self) {
        self.filter.reset();
        self.dc_offset.reset();
        self.detector.reset();
        self.smoother.reset();
        self.stats = ChannelStats::default();
    }

    fn record_guard(&mut self) {
        self.stats.guarded_outputs += 1;
        if self.stats.guarded_outputs == 1 {
            tracing::warn!(
                channel = self.channel,
                detector = %self.detector.kind(),
                "output window produced no value (zero coefficient or no peaks)"
            );
        } else {
            tracing::trace!(channel = self.channel, "output window guarded");
        }
    }
}

/// Multi-channel envelope pipeline
///
/// Channels are fully independent and may be fed in any order.
pub struct EnvelopePipeline {
    channels: Vec<ChannelPipeline>,
    calibration: SharedCalibration,
    /// Coefficient each channel last scaled with; used while a writer holds the table
    last_coefficients: Vec<u16>,
    kind: DetectorKind,
}

impl EnvelopePipeline {
    /// Build a pipeline with calibration taken from the configuration
    pub fn new(config: &EnvelopeConfig) -> EnvelopeResult<Self> {
        validate(config)?;
        let table =
            CalibrationTable::from_config(&config.calibration, config.system.channel_count)?;
        Self::build(config, SharedCalibration::new(table))
    }

    /// Build a pipeline around an existing calibration handle
    ///
    /// The configuration is validated the same way as in [`new`](Self::new);
    /// its calibration section is ignored in favour of `calibration`.
    pub fn with_calibration(
        config: &EnvelopeConfig,
        calibration: SharedCalibration,
    ) -> EnvelopeResult<Self> {
        validate(config)?;
        Self::build(config, calibration)
    }

    fn build(config: &EnvelopeConfig, calibration: SharedCalibration) -> EnvelopeResult<Self> {
        let channel_count = config.system.channel_count;
        let kind = config.detector.kind;
        let snapshot = calibration.snapshot();
        if snapshot.channel_count() != channel_count {
            return Err(EnvelopeError::configuration(
                "pipeline",
                format!(
                    "calibration covers {} channels, pipeline has {}",
                    snapshot.channel_count(),
                    channel_count
                ),
            ));
        }

        let channels = (0..channel_count)
            .map(|channel| ChannelPipeline::new(channel, kind, config.detector.smoothing))
            .collect();
        let last_coefficients = snapshot.column(kind).to_vec();

        tracing::info!(
            channels = channel_count,
            detector = %kind,
            smoothing = ?config.detector.smoothing,
            "envelope pipeline initialised"
        );

        Ok(Self {
            channels,
            calibration,
            last_coefficients,
            kind,
        })
    }

    /// Process one raw sample for one channel
    pub fn process_sample(&mut self, channel: usize, raw_sample: u16) -> EnvelopeResult<Envelope> {
        let channel_count = self.channels.len();
        let calibration = &self.calibration;
        let kind = self.kind;
        let (pipeline, last) = self
            .channels
            .get_mut(channel)
            .zip(self.last_coefficients.get_mut(channel))
            .ok_or(EnvelopeError::InvalidChannel {
                channel,
                channel_count,
            })?;

        Ok(pipeline.process(raw_sample, || {
            current_coefficient(calibration, channel, kind, last)
        }))
    }

    /// Process one sample per channel, writing one envelope per channel
    pub fn process_frame(&mut self, samples: &[u16], out: &mut [Envelope]) -> EnvelopeResult<()> {
        let expected = self.channels.len();
        for actual in [samples.len(), out.len()] {
            if actual != expected {
                return Err(EnvelopeError::FrameLength { expected, actual });
            }
        }

        let calibration = &self.calibration;
        let kind = self.kind;
        let lanes = self
            .channels
            .iter_mut()
            .zip(self.last_coefficients.iter_mut());
        for (((pipeline, last), &raw), slot) in lanes.zip(samples).zip(out.iter_mut()) {
            let channel = pipeline.channel();
            *slot = pipeline.process(raw, || {
                current_coefficient(calibration, channel, kind, last)
            });
        }
        Ok(())
    }

    /// Handle for updating coefficients while the pipeline runs
    pub fn calibration(&self) -> SharedCalibration {
        self.calibration.clone()
    }

    /// Counters of one channel
    pub fn stats(&self, channel: usize) -> Option<&ChannelStats> {
        self.channels.get(channel).map(ChannelPipeline::stats)
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Detector run on every channel
    pub fn detector_kind(&self) -> DetectorKind {
        self.kind
    }

    /// Return every channel to its initial state
    pub fn reset(&mut self) {
        self.channels.iter_mut().for_each(ChannelPipeline::reset);
        tracing::debug!(channels = self.channels.len(), "envelope pipeline reset");
    }
}

fn validate(config: &EnvelopeConfig) -> EnvelopeResult<()> {
    config
        .validate_consistency()
        .map_err(|errors| EnvelopeError::configuration("pipeline", errors.join("; ")))
}

/// Never waits on the calibration lock; a contended read keeps the previous coefficient
fn current_coefficient(
    calibration: &SharedCalibration,
    channel: usize,
    kind: DetectorKind,
    last: &mut u16,
) -> u16 {
    match calibration.try_coefficient(channel, kind) {
        Some(coefficient) => *last = coefficient,
        None => tracing::trace!(channel, coefficient = *last, "calibration busy"),
    }
    *last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::signal::MID_SCALE;

    fn config(kind: DetectorKind, channels: usize) -> EnvelopeConfig {
        let mut config = EnvelopeConfig::default();
        config.detector.kind = kind;
        config.system.channel_count = channels;
        config
    }

    #[test]
    fn test_envelope_sentinel() {
        assert_eq!(Envelope::NO_VALUE.raw(), 0xFFFF);
        assert_eq!(Envelope::NO_VALUE.value(), None);
        assert_eq!(Envelope::default(), Envelope::NO_VALUE);
        assert_eq!(Envelope::from(Some(499)).value(), Some(499));
        assert_eq!(Envelope::from(None), Envelope::NO_VALUE);
        assert_eq!(Envelope::from_raw(123).as_microvolts(), Some(12.3));
        assert_eq!(Envelope::from_raw(123).to_string(), "12.3 uV");
    }

    #[test]
    fn test_silence_yields_zero_envelope() {
        let mut pipeline = EnvelopePipeline::new(&config(DetectorKind::Rms, 1)).unwrap();
        let mut emitted = Vec::new();
        for _ in 0..2000 {
            if let Some(v) = pipeline.process_sample(0, MID_SCALE).unwrap().value() {
                emitted.push(v);
            }
        }
        assert_eq!(emitted, vec![0; 10]);
    }

    #[test]
    fn test_non_boundary_calls_return_sentinel() {
        let mut pipeline = EnvelopePipeline::new(&config(DetectorKind::PeakToPeak, 1)).unwrap();
        for n in 1..=480usize {
            let envelope = pipeline.process_sample(0, MID_SCALE).unwrap();
            assert_eq!(envelope.is_value(), n % 160 == 0, "sample {}", n);
        }
        let stats = pipeline.stats(0).unwrap();
        assert_eq!(stats.samples_processed, 480);
        assert_eq!(stats.envelopes_emitted, 3);
    }

    #[test]
    fn test_invalid_channel() {
        let mut pipeline = EnvelopePipeline::new(&config(DetectorKind::PeakToPeak, 2)).unwrap();
        assert_eq!(
            pipeline.process_sample(2, MID_SCALE),
            Err(EnvelopeError::InvalidChannel {
                channel: 2,
                channel_count: 2
            })
        );
    }

    #[test]
    fn test_frame_length_checked() {
        let mut pipeline = EnvelopePipeline::new(&config(DetectorKind::Rms, 2)).unwrap();
        let mut out = [Envelope::NO_VALUE; 2];
        assert!(matches!(
            pipeline.process_frame(&[MID_SCALE; 3], &mut out),
            Err(EnvelopeError::FrameLength {
                expected: 2,
                actual: 3
            })
        ));
        assert!(pipeline.process_frame(&[MID_SCALE; 2], &mut out).is_ok());
    }

    #[test]
    fn test_averaged_peak_silence_is_guarded() {
        let mut pipeline = EnvelopePipeline::new(&config(DetectorKind::AveragedPeak, 1)).unwrap();
        for _ in 0..1000 {
            let envelope = pipeline.process_sample(0, MID_SCALE).unwrap();
            assert_eq!(envelope, Envelope::NO_VALUE);
        }
        assert_eq!(pipeline.stats(0).unwrap().guarded_outputs, 5);
    }

    #[test]
    fn test_calibration_mismatch_rejected() {
        let shared = SharedCalibration::new(CalibrationTable::new(3));
        let result = EnvelopePipeline::with_calibration(&config(DetectorKind::Rms, 2), shared);
        assert!(result.is_err());
    }

    #[test]
    fn test_with_calibration_validates_config() {
        let too_many = config(DetectorKind::Rms, 64);
        let shared = SharedCalibration::new(CalibrationTable::new(64));
        assert!(matches!(
            EnvelopePipeline::with_calibration(&too_many, shared),
            Err(EnvelopeError::Configuration { .. })
        ));

        let mut too_slow = config(DetectorKind::Rms, 2);
        too_slow.system.sampling_rate_hz = 100;
        let shared = SharedCalibration::new(CalibrationTable::new(2));
        assert!(matches!(
            EnvelopePipeline::with_calibration(&too_slow, shared),
            Err(EnvelopeError::Configuration { .. })
        ));

        let shared = SharedCalibration::new(CalibrationTable::new(2));
        let valid = EnvelopePipeline::with_calibration(&config(DetectorKind::Rms, 2), shared);
        assert!(valid.is_ok());
    }

    fn run_pair(
        reference: &mut EnvelopePipeline,
        pipeline: &mut EnvelopePipeline,
        samples: std::ops::Range<usize>,
    ) -> (Vec<Envelope>, Vec<Envelope>) {
        let mut outputs = (Vec::new(), Vec::new());
        for n in samples {
            let raw = MID_SCALE + ((n * 37) % 2000) as u16;
            outputs.0.push(reference.process_sample(0, raw).unwrap());
            outputs.1.push(pipeline.process_sample(0, raw).unwrap());
        }
        outputs
    }

    #[test]
    fn test_locked_calibration_keeps_last_coefficient() {
        let mut reference = EnvelopePipeline::new(&config(DetectorKind::Rms, 1)).unwrap();
        let mut pipeline = EnvelopePipeline::new(&config(DetectorKind::Rms, 1)).unwrap();
        let calibration = pipeline.calibration();
        for handle in [reference.calibration(), calibration.clone()] {
            handle.set_coefficient(0, DetectorKind::Rms, 500).unwrap();
        }

        let (expected, actual) = run_pair(&mut reference, &mut pipeline, 0..200);
        assert_eq!(expected, actual);

        {
            let mut table = calibration.lock_for_update();
            table.set_coefficient(0, DetectorKind::Rms, 2000).unwrap();
            let (expected, actual) = run_pair(&mut reference, &mut pipeline, 200..1200);
            assert_eq!(expected, actual);
            assert_eq!(actual.iter().filter(|e| e.is_value()).count(), 5);
        }

        let (expected, actual) = run_pair(&mut reference, &mut pipeline, 1200..2200);
        assert!(expected.iter().any(|e| e.value().is_some_and(|v| v > 0)));
        assert_ne!(expected, actual);
        assert_eq!(calibration.coefficient(0, DetectorKind::Rms), 2000);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut bad = config(DetectorKind::Rms, 2);
        bad.calibration.rms = vec![0];
        assert!(matches!(
            EnvelopePipeline::new(&bad),
            Err(EnvelopeError::Configuration { .. })
        ));
    }

    #[test]
    fn test_reset_clears_stats() {
        let mut pipeline = EnvelopePipeline::new(&config(DetectorKind::Rms, 1)).unwrap();
        for _ in 0..300 {
            pipeline.process_sample(0, MID_SCALE).unwrap();
        }
        pipeline.reset();
        assert_eq!(pipeline.stats(0), Some(&ChannelStats::default()));
        assert_eq!(pipeline.detector_kind(), DetectorKind::Rms);
        assert_eq!(pipeline.channel_count(), 1);
    }
}
