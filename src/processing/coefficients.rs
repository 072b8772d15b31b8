// src/processing/coefficients.rs
//! Fixed-point coefficient table for the mains comb filter
//!
//! The table is a 243-tap linear-phase FIR in Q15 (unity gain is 32768). It was
//! designed for a 2 kHz input rate as an identity tap minus three Hann-windowed
//! cosine bands at 50, 100 and 150 Hz, with the band weights solved so that the
//! response is exactly zero at each of the three mains harmonics. After
//! quantisation the centre tap was trimmed so the taps sum to exactly 32768,
//! which makes the DC gain exactly one.
//!
//! Measured response of the quantised table: about -60 dB at 50/100/150 Hz,
//! -3.7 dB at 40 and 60 Hz, and within 0.1 dB of unity from 75 Hz to Nyquist.

use crate::config::constants::filter::{COMB_TAP_COUNT, Q15_ONE};

/// Q15 taps of the mains comb filter, symmetric about index 121.
#[rustfmt::skip]
pub const COMB_COEFFICIENTS: [i32; COMB_TAP_COUNT] = [
         0,      0,     -1,     -2,     -2,     -2,      0,      3,      7,
        10,     11,     11,      9,      5,      1,     -1,      0,      5,
        13,     24,     33,     39,     40,     34,     23,     11,      0,
        -3,      4,     23,     51,     83,    110,    122,    111,     70,
         0,    -94,   -199,   -299,   -378,   -419,   -412,   -357,   -259,
      -133,      0,    120,    207,    250,    247,    205,    138,     68,
        12,    -13,      0,     47,    116,    190,    248,    274,    261,
       211,    136,     58,      0,    -17,     18,    102,    220,    344,
       438,    468,    408,    249,      0,   -310,   -637,   -930,  -1138,
     -1225,  -1173,   -987,   -697,   -349,      0,    298,    503,    594,
       573,    464,    306,    146,     26,    -26,      0,     94,    227,
       364,    466,    506,    473,    374,    237,     99,      0,    -28,
        29,    163,    347,    533,    667,    702,    603,    362,      0,
      -437,   -885,  -1271,  -1533,  31114,  -1533,  -1271,   -885,   -437,
         0,    362,    603,    702,    667,    533,    347,    163,     29,
       -28,      0,     99,    237,    374,    473,    506,    466,    364,
       227,     94,      0,    -26,     26,    146,    306,    464,    573,
       594,    503,    298,      0,   -349,   -697,   -987,  -1173,  -1225,
     -1138,   -930,   -637,   -310,      0,    249,    408,    468,    438,
       344,    220,    102,     18,    -17,      0,     58,    136,    211,
       261,    274,    248,    190,    116,     47,      0,    -13,     12,
        68,    138,    205,    247,    250,    207,    120,      0,   -133,
      -259,   -357,   -412,   -419,   -378,   -299,   -199,    -94,      0,
        70,    111,    122,    110,     83,     51,     23,      4,     -3,
         0,     11,     23,     34,     40,     39,     33,     24,     13,
         5,      0,     -1,      1,      5,      9,     11,     11,     10,
         7,      3,      0,     -2,     -2,     -2,     -1,      0,      0,
];

/// Sum of all taps, i.e. the DC gain of the filter in Q15.
pub const fn dc_gain_q15() -> i64 {
    let mut sum = 0i64;
    let mut i = 0;
    while i < COMB_TAP_COUNT {
        sum += COMB_COEFFICIENTS[i] as i64;
        i += 1;
    }
    sum
}

const _: () = assert!(dc_gain_q15() == Q15_ONE);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_symmetric() {
        for i in 0..COMB_TAP_COUNT / 2 {
            let mirror = COMB_TAP_COUNT - 1 - i;
            assert_eq!(COMB_COEFFICIENTS[i], COMB_COEFFICIENTS[mirror]);
        }
    }

    #[test]
    fn test_unity_dc_gain() {
        assert_eq!(dc_gain_q15(), 32768);
    }

    #[test]
    fn test_centre_tap_dominates() {
        let centre = COMB_COEFFICIENTS[COMB_TAP_COUNT / 2];
        assert!(COMB_COEFFICIENTS
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != COMB_TAP_COUNT / 2)
            .all(|(_, c)| c.abs() < centre));
    }
}
