// src/processing/bandstop.rs
//! Integer mains comb filter (50/100/150 Hz)

use super::coefficients::COMB_COEFFICIENTS;
use crate::config::constants::filter::{COMB_TAP_COUNT, Q15_ONE, Q15_SHIFT};
use crate::config::constants::signal::MID_SCALE;
use rustfft::{num_complex::Complex, FftPlanner};

/// Per-channel FIR bandstop filter over a fixed circular history
///
/// Input and output are raw ADC codes centred on [`MID_SCALE`]. Unfilled history
/// slots read as zero, so the first 243 outputs carry a start-up transient.
#[derive(Debug, Clone)]
pub struct BandstopFilter {
    history: [i32; COMB_TAP_COUNT],
    index: usize,
}

impl BandstopFilter {
    /// Create filter with an all-zero history
    pub fn new() -> Self {
        Self {
            history: [0; COMB_TAP_COUNT],
            index: 0,
        }
    }

    /// Filter one raw sample
    pub fn filter(&mut self, raw_sample: u16) -> u16 {
        self.history[self.index] = i32::from(raw_sample) - i32::from(MID_SCALE);
        self.index = (self.index + 1) % COMB_TAP_COUNT;

        // Oldest sample sits at the write index after advancing.
        let (newer, older) = self.history.split_at(self.index);
        let acc: i64 = older
            .iter()
            .chain(newer.iter())
            .zip(COMB_COEFFICIENTS.iter())
            .map(|(&x, &c)| i64::from(x) * i64::from(c))
            .sum();

        let centred = (acc >> Q15_SHIFT) + i64::from(MID_SCALE);
        centred.clamp(0, i64::from(u16::MAX)) as u16
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.history.fill(0);
        self.index = 0;
    }

    /// Get filter length
    pub fn length(&self) -> usize {
        COMB_TAP_COUNT
    }

    /// Magnitude response of the coefficient table over `fft_len / 2 + 1` bins
    ///
    /// Bin `k` corresponds to `k * sample_rate / fft_len` Hz. Magnitudes are
    /// linear, normalised so that 1.0 is unity gain. `fft_len` shorter than the
    /// tap count is raised to the tap count.
    pub fn frequency_response(fft_len: usize) -> Vec<f32> {
        let len = fft_len.max(COMB_TAP_COUNT);
        let mut buffer: Vec<Complex<f32>> = COMB_COEFFICIENTS
            .iter()
            .map(|&c| Complex::new(c as f32 / Q15_ONE as f32, 0.0))
            .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
            .take(len)
            .collect();

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(len);
        fft.process(&mut buffer);

        buffer[..=len / 2].iter().map(|bin| bin.norm()).collect()
    }
}

impl Default for BandstopFilter {
    fn default() -> Self {
        Self::new()
    }
}
