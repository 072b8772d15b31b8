// src/calibration.rs
//! Calibration coefficient tables
//!
//! Coefficients are fixed-point divisors: an output of `amplitude * 1000 /
//! coefficient` is in units of 0.1 uV, so the default of 1000 leaves the ADC
//! amplitude unscaled. Each detector variant has its own per-channel table.

use crate::config::constants::calibration::DEFAULT_COEFFICIENT;
use crate::config::CalibrationConfig;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::processing::detectors::DetectorKind;
use parking_lot::RwLock;
use std::sync::Arc;

/// Per-channel coefficients for all three detector variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationTable {
    peak_to_peak: Vec<u16>,
    averaged_peak: Vec<u16>,
    rms: Vec<u16>,
}

impl CalibrationTable {
    /// Table with every coefficient at the default
    pub fn new(channel_count: usize) -> Self {
        Self {
            peak_to_peak: vec![DEFAULT_COEFFICIENT; channel_count],
            averaged_peak: vec![DEFAULT_COEFFICIENT; channel_count],
            rms: vec![DEFAULT_COEFFICIENT; channel_count],
        }
    }

    /// Build from configuration, filling missing entries with the default
    pub fn from_config(
        config: &CalibrationConfig,
        channel_count: usize,
    ) -> EnvelopeResult<Self> {
        let mut table = Self::new(channel_count);
        for kind in DetectorKind::ALL {
            let overrides = config.table(kind);
            if overrides.len() > channel_count {
                return Err(EnvelopeError::configuration(
                    "calibration",
                    format!(
                        "{} table has {} entries for {} channels",
                        kind,
                        overrides.len(),
                        channel_count
                    ),
                ));
            }
            for channel in 0..channel_count {
                let value = overrides
                    .get(channel)
                    .copied()
                    .unwrap_or(config.default_coefficient);
                table.set_coefficient(channel, kind, value)?;
            }
        }
        Ok(table)
    }

    /// Channels covered by every column
    pub fn channel_count(&self) -> usize {
        self.peak_to_peak.len()
    }

    /// Coefficient for a channel and detector
    ///
    /// Out-of-range channels read as the default.
    pub fn coefficient(&self, channel: usize, kind: DetectorKind) -> u16 {
        self.column(kind)
            .get(channel)
            .copied()
            .unwrap_or(DEFAULT_COEFFICIENT)
    }

    /// Replace one coefficient; zero and unknown channels are rejected
    pub fn set_coefficient(
        &mut self,
        channel: usize,
        kind: DetectorKind,
        value: u16,
    ) -> EnvelopeResult<()> {
        let channel_count = self.channel_count();
        if value == 0 {
            return Err(EnvelopeError::ZeroCoefficient {
                channel,
                detector: kind,
            });
        }
        let slot = self
            .column_mut(kind)
            .get_mut(channel)
            .ok_or(EnvelopeError::InvalidChannel {
                channel,
                channel_count,
            })?;
        *slot = value;
        Ok(())
    }

    /// Coefficients of one detector, indexed by channel
    pub fn column(&self, kind: DetectorKind) -> &[u16] {
        match kind {
            DetectorKind::PeakToPeak => &self.peak_to_peak,
            DetectorKind::AveragedPeak => &self.averaged_peak,
            DetectorKind::Rms => &self.rms,
        }
    }

    fn column_mut(&mut self, kind: DetectorKind) -> &mut [u16] {
        match kind {
            DetectorKind::PeakToPeak => &mut self.peak_to_peak,
            DetectorKind::AveragedPeak => &mut self.averaged_peak,
            DetectorKind::Rms => &mut self.rms,
        }
    }
}

/// Cloneable handle shared between the pipeline and a calibration source
///
/// The pipeline only reads when an output window closes, and never waits:
/// see [`try_coefficient`](Self::try_coefficient).
#[derive(Debug, Clone)]
pub struct SharedCalibration {
    inner: Arc<RwLock<CalibrationTable>>,
}

impl SharedCalibration {
    /// Share `table` behind a new handle
    pub fn new(table: CalibrationTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(table)),
        }
    }

    /// Current coefficient, waiting for any writer to finish
    pub fn coefficient(&self, channel: usize, kind: DetectorKind) -> u16 {
        self.inner.read().coefficient(channel, kind)
    }

    /// Current coefficient, or `None` while a writer holds the table
    pub fn try_coefficient(&self, channel: usize, kind: DetectorKind) -> Option<u16> {
        self.inner
            .try_read()
            .map(|table| table.coefficient(channel, kind))
    }

    /// Update one coefficient; the new value applies from the next output
    pub fn set_coefficient(
        &self,
        channel: usize,
        kind: DetectorKind,
        value: u16,
    ) -> EnvelopeResult<()> {
        self.inner.write().set_coefficient(channel, kind, value)?;
        tracing::debug!(channel, detector = %kind, coefficient = value, "calibration updated");
        Ok(())
    }

    /// Replace the whole table; the channel count must match
    pub fn replace(&self, table: CalibrationTable) -> EnvelopeResult<()> {
        let mut current = self.inner.write();
        if table.channel_count() != current.channel_count() {
            return Err(EnvelopeError::configuration(
                "calibration",
                format!(
                    "replacement table has {} channels, pipeline has {}",
                    table.channel_count(),
                    current.channel_count()
                ),
            ));
        }
        *current = table;
        tracing::debug!("calibration table replaced");
        Ok(())
    }

    /// Copy of the current table
    pub fn snapshot(&self) -> CalibrationTable {
        self.inner.read().clone()
    }

    /// Hold the write lock, as a slow calibration source would
    #[cfg(test)]
    pub(crate) fn lock_for_update(&self) -> parking_lot::RwLockWriteGuard<'_, CalibrationTable> {
        self.inner.write()
    }
}
