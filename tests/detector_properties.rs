// tests/detector_properties.rs
//! Property tests for the per-sample building blocks

use emg_envelope::config::constants::output::NO_VALUE;
use emg_envelope::processing::{
    AveragedPeakDetector, BandstopFilter, DcOffsetEstimator, Detector, DetectorKind,
    EnvelopeDetector, OutputSmoother, PeakToPeakDetector,
};
use emg_envelope::{EnvelopeConfig, EnvelopePipeline};
use proptest::prelude::*;

fn adjusted(candidate: u16) -> u16 {
    if candidate > 1 {
        candidate - 1
    } else {
        candidate
    }
}

proptest! {
    #[test]
    fn prop_smoother_settles_on_constant_input(candidate in any::<u16>(), repeats in 4usize..20) {
        let mut smoother = OutputSmoother::new();
        let mut last = 0;
        for _ in 0..repeats {
            last = smoother.smooth(candidate);
        }
        prop_assert_eq!(last, adjusted(candidate));
        prop_assert_eq!(smoother.smooth(candidate), last);
    }

    #[test]
    fn prop_smoother_large_steps_pass_immediately(start in 10u16..60000, target in 10u16..60000) {
        prop_assume!(start.abs_diff(target) > 1);
        let mut smoother = OutputSmoother::new();
        smoother.smooth(start);
        smoother.smooth(start);
        prop_assert_eq!(smoother.smooth(target), target - 1);
    }

    #[test]
    fn prop_smoother_rise_slower_than_fall(level in 10u16..60000) {
        let mut rising = OutputSmoother::new();
        let mut falling = OutputSmoother::new();
        rising.smooth(level);
        falling.smooth(level);
        let held = level - 1;

        for _ in 0..3 {
            prop_assert_eq!(rising.smooth(level + 1), held);
        }
        prop_assert_eq!(rising.smooth(level + 1), level);

        prop_assert_eq!(falling.smooth(level - 1), held);
        prop_assert_eq!(falling.smooth(level - 1), level - 2);
    }

    #[test]
    fn prop_dc_estimate_of_constant_is_exact(value in any::<u16>(), count in 1usize..600) {
        let mut dc = DcOffsetEstimator::new();
        for _ in 0..count {
            prop_assert_eq!(dc.estimate(value), value);
        }
    }

    #[test]
    fn prop_dc_estimate_within_input_range(samples in prop::collection::vec(any::<u16>(), 1..800)) {
        let mut dc = DcOffsetEstimator::new();
        let lo = *samples.iter().min().unwrap();
        let hi = *samples.iter().max().unwrap();
        for &sample in &samples {
            let estimate = dc.estimate(sample);
            prop_assert!(estimate >= lo && estimate <= hi);
        }
    }

    #[test]
    fn prop_filter_passes_settled_constant(value in any::<u16>()) {
        let mut filter = BandstopFilter::new();
        for _ in 0..242 {
            filter.filter(value);
        }
        for _ in 0..20 {
            prop_assert_eq!(filter.filter(value), value);
        }
    }

    #[test]
    fn prop_peak_to_peak_never_exceeds_clamp(
        samples in prop::collection::vec(any::<u16>(), 160..1000),
        coefficient in 1u16..=u16::MAX,
    ) {
        let mut detector = PeakToPeakDetector::new();
        for &sample in &samples {
            if let Some(value) = detector.process(sample, coefficient) {
                prop_assert!(value <= 20000);
            }
        }
    }

    #[test]
    fn prop_detectors_never_emit_sentinel(
        samples in prop::collection::vec(any::<u16>(), 200..1000),
        coefficient in 1u16..=u16::MAX,
    ) {
        for kind in DetectorKind::ALL {
            let mut detector = Detector::new(kind);
            for &sample in &samples {
                if let Some(value) = detector.process(sample, coefficient) {
                    prop_assert_ne!(value, NO_VALUE);
                }
            }
        }
    }

    #[test]
    fn prop_window_cadence_is_input_independent(
        samples in prop::collection::vec(any::<u16>(), 0..1000),
    ) {
        let mut peak_to_peak = PeakToPeakDetector::new();
        let mut averaged = AveragedPeakDetector::new();
        for (n, &sample) in samples.iter().enumerate() {
            let closed = peak_to_peak.accumulate(sample);
            prop_assert_eq!(closed, (n + 1) % 160 == 0);
            if closed {
                peak_to_peak.emit(1000);
            }
            let closed = averaged.accumulate(sample);
            prop_assert_eq!(closed, (n + 1) % 200 == 0);
            if closed {
                averaged.emit(1000);
            }
        }
    }

    #[test]
    fn prop_pipeline_emits_only_at_window_boundaries(
        raw in prop::collection::vec(any::<u16>(), 0..1200),
    ) {
        let mut config = EnvelopeConfig::default();
        config.detector.kind = DetectorKind::Rms;
        config.system.channel_count = 1;
        let mut pipeline = EnvelopePipeline::new(&config).unwrap();

        for (n, &sample) in raw.iter().enumerate() {
            let envelope = pipeline.process_sample(0, sample).unwrap();
            prop_assert_eq!(envelope.is_value(), (n + 1) % 200 == 0);
        }
    }
}
