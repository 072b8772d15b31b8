// src/config/constants.rs
//! Pipeline-wide constants
//!
//! The window lengths below assume the nominal 2 kHz input rate. They are fixed
//! at compile time so every per-channel buffer has a static size.

/// Acquisition and channel constants
pub mod signal {
    /// Rate the window lengths are tuned for
    pub const NOMINAL_SAMPLING_RATE_HZ: u32 = 2000;
    /// Lowest accepted sampling rate
    pub const MIN_SAMPLING_RATE_HZ: u32 = 500;
    /// Highest accepted sampling rate
    pub const MAX_SAMPLING_RATE_HZ: u32 = 10000;
    /// Channels when none are configured
    pub const DEFAULT_CHANNEL_COUNT: usize = 2;
    /// Fewest channels a pipeline may have
    pub const MIN_CHANNEL_COUNT: usize = 1;
    /// Most channels a pipeline may have
    pub const MAX_CHANNEL_COUNT: usize = 16;

    /// Raw ADC value representing zero differential input
    pub const MID_SCALE: u16 = 0x8000;
}

/// Mains comb filter constants
pub mod filter {
    /// Taps of the linear-phase comb FIR
    pub const COMB_TAP_COUNT: usize = 243;

    /// Fixed-point unity of the coefficient table
    pub const Q15_ONE: i64 = 32768;
    /// Right shift that divides by [`Q15_ONE`]
    pub const Q15_SHIFT: u32 = 15;

    /// Frequencies the comb must reject
    pub const MAINS_HARMONICS_HZ: [f32; 3] = [50.0, 100.0, 150.0];
}

/// Baseline tracker constants
pub mod dc_offset {
    /// Samples averaged into the baseline
    pub const WINDOW_LEN: usize = 256;
    /// log2 of [`WINDOW_LEN`]
    pub const WINDOW_SHIFT: u32 = 8;
}

/// Envelope detector constants
pub mod detector {
    /// Samples per block of the ranked peak-to-peak detector
    pub const PEAK_BLOCK_LEN: u16 = 40;
    /// Blocks ranked per peak-to-peak output
    pub const PEAK_RANK_DEPTH: usize = 4;
    /// Accumulation window of the averaged-peak and RMS detectors
    pub const AVERAGING_WINDOW_LEN: u16 = 200;
    /// Output scale: coefficient 1000 maps one ADC count to 0.1 uV
    pub const SCALE_NUMERATOR: u32 = 1000;
    /// Upper bound of the peak-to-peak output
    pub const PEAK_TO_PEAK_CLAMP: u16 = 20000;
}

/// Calibration constants
pub mod calibration {
    /// Unity gain coefficient
    pub const DEFAULT_COEFFICIENT: u16 = 1000;
}

/// Output smoother constants
pub mod smoother {
    /// Consecutive +1 steps tolerated before the output follows
    pub const RISE_STREAK_LIMIT: u8 = 3;
    /// Consecutive -1 steps tolerated before the output follows
    pub const FALL_STREAK_LIMIT: u8 = 1;
}

/// Envelope output constants
pub mod output {
    /// Returned on every call that does not close an output window
    pub const NO_VALUE: u16 = 0xFFFF;
    /// Largest value a detector may emit without colliding with `NO_VALUE`
    pub const MAX_ENVELOPE: u16 = 0xFFFE;
    /// Envelope units per microvolt
    pub const UNITS_PER_MICROVOLT: f32 = 10.0;
}

/// File system paths
pub mod paths {
    /// Checked-in defaults, merged first
    pub const DEFAULT_CONFIG_FILE: &str = "config/envelope.toml";
    /// Machine-local overrides, merged last
    pub const LOCAL_CONFIG_FILE: &str = "config/local.toml";

    /// Prefix of environment variable overrides
    pub const ENV_PREFIX: &str = "EMG_";
}
