//! Deterministic sawtooth waveform synthesis.
//!
//! The fake input streams replay this signal block by block, so the
//! synthesis must be stitchable: the output for a given start offset is the
//! byte-aligned subrange of a longer synthesis starting at zero. Both the
//! start index and the quantized sample value truncate toward zero to keep
//! that property exact.

use bytes::{BufMut, Bytes, BytesMut};

/// Synthesize a sawtooth wave as little-endian signed samples.
///
/// For each sample index `i` in `[0, seconds * sample_rate)`:
/// `t = (i + trunc(start * sample_rate)) / sample_rate`,
/// `phase = (t * period) mod 1.0`, amplitude `2 * phase - 1.0` in `[-1, 1)`,
/// quantized at full scale `2^(8 * bytes_per_sample - 1) - 1`.
/// Sample widths of 1 through 4 bytes are supported, matching
/// [`crate::stream::SampleFormat`].
pub fn sawtooth_wave(
    period: f64,
    seconds: f64,
    sample_rate: f64,
    bytes_per_sample: usize,
    start: f64,
) -> Bytes {
    debug_assert!(
        (1..=4).contains(&bytes_per_sample),
        "bytes_per_sample must be 1..=4, got {bytes_per_sample}"
    );
    let total_samples = (seconds * sample_rate) as usize;
    let max_value = (1i64 << (bytes_per_sample * 8 - 1)) - 1;
    let start_index = (start * sample_rate) as i64;

    let mut buffer = BytesMut::with_capacity(total_samples * bytes_per_sample);
    for i in 0..total_samples {
        let time_seconds = (i as i64 + start_index) as f64 / sample_rate;
        let phase = (time_seconds * period).rem_euclid(1.0);
        let amplitude = 2.0 * phase - 1.0;

        let sample_value = (amplitude * max_value as f64) as i64;
        buffer.put_slice(&sample_value.to_le_bytes()[..bytes_per_sample]);
    }

    buffer.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIODS: [f64; 3] = [0.5, 1.0, 2.0];
    const WIDTHS: [usize; 3] = [1, 2, 4];
    const RATES: [f64; 2] = [44100.0, 24000.0];

    #[test]
    fn test_output_length() {
        for period in PERIODS {
            for width in WIDTHS {
                for rate in RATES {
                    let wave = sawtooth_wave(period, 2.0, rate, width, 0.0);
                    assert_eq!(wave.len(), (2.0 * rate) as usize * width);
                }
            }
        }
    }

    #[test]
    fn test_first_sample_is_negative_full_scale() {
        // phase 0 at t=0 quantizes to -(2^(8w-1) - 1).
        let wave = sawtooth_wave(1.0, 0.01, 44100.0, 2, 0.0);
        assert_eq!(&wave[..2], &(-32767i16).to_le_bytes());

        let wave = sawtooth_wave(1.0, 0.01, 44100.0, 4, 0.0);
        assert_eq!(&wave[..4], &(-2147483647i32).to_le_bytes());
    }

    #[test]
    fn test_ramp_is_monotonic_within_one_period() {
        // One full period of a 1 Hz sawtooth at a low rate: strictly rising.
        let wave = sawtooth_wave(1.0, 1.0, 100.0, 2, 0.0);
        let samples: Vec<i16> = wave
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        assert_eq!(samples.len(), 100);
        for window in samples.windows(2) {
            assert!(window[1] > window[0]);
        }
        assert_eq!(samples[0], -32767);
        assert!(samples[99] > 32000);
    }

    #[test]
    fn test_start_offset_matches_subrange() {
        for period in PERIODS {
            for width in WIDTHS {
                for rate in RATES {
                    let long = sawtooth_wave(period, 2.0, rate, width, 0.0);
                    let offset = sawtooth_wave(period, 1.0, rate, width, 0.2);

                    let skip = (0.2 * rate) as usize * width;
                    assert_eq!(
                        offset,
                        long.slice(skip..skip + offset.len()),
                        "stitch mismatch at period={period} width={width} rate={rate}"
                    );
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "bytes_per_sample must be 1..=4")]
    fn test_rejects_unsupported_sample_width() {
        sawtooth_wave(1.0, 0.01, 44100.0, 8, 0.0);
    }

    #[test]
    fn test_wraps_at_period_boundary() {
        // A 2 Hz sawtooth wraps every half second.
        let wave = sawtooth_wave(2.0, 1.0, 100.0, 2, 0.0);
        let sample_at = |index: usize| {
            i16::from_le_bytes([wave[index * 2], wave[index * 2 + 1]])
        };
        // Just before the wrap the ramp is near full scale; at the wrap it
        // returns to the bottom.
        assert!(sample_at(49) > 30000);
        assert_eq!(sample_at(50), -32767);
    }
}
