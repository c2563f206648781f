// src/onewire/decode.rs

use super::config::{DecoderConfig, DATA_BITS};
use crate::common::error::NodeError;

/// Bytes in one sensor frame: humidity (2), temperature (2), checksum.
pub const SENSOR_FRAME_LEN: usize = 5;

/// Low byte of the sum of the four data bytes.
pub fn additive_checksum(bytes: &[u8; SENSOR_FRAME_LEN]) -> u8 {
    bytes[..SENSOR_FRAME_LEN - 1]
        .iter()
        .fold(0u8, |sum, byte| sum.wrapping_add(*byte))
}

/// Checks the trailing checksum byte. On mismatch the error still carries the
/// decoded bytes.
pub fn verify_checksum<E>(bytes: [u8; SENSOR_FRAME_LEN]) -> Result<[u8; SENSOR_FRAME_LEN], NodeError<E>>
where
    E: core::fmt::Debug,
{
    let expected = additive_checksum(&bytes);
    let received = bytes[SENSOR_FRAME_LEN - 1];
    if expected == received {
        Ok(bytes)
    } else {
        Err(NodeError::ChecksumInvalid { bytes, expected, received })
    }
}

/// Turns captured high-pulse widths into the five sensor bytes.
///
/// Skips the acknowledgement sample when the variant has one, then reads 40
/// bits most significant first. Pure: no hardware access.
pub fn decode<E>(samples: &[u16], config: &DecoderConfig) -> Result<[u8; SENSOR_FRAME_LEN], NodeError<E>>
where
    E: core::fmt::Debug,
{
    let expected = config.sample_count();
    if samples.len() != expected {
        return Err(NodeError::SampleCount { expected, got: samples.len() });
    }

    let mut bytes = [0u8; SENSOR_FRAME_LEN];
    for (bit, width) in samples[config.leading_samples()..].iter().take(DATA_BITS).enumerate() {
        let byte = &mut bytes[bit / 8];
        *byte = (*byte << 1) | u8::from(config.bit_for(*width));
    }

    verify_checksum(bytes)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ZERO_WIDTH: u16 = 26;
    const ONE_WIDTH: u16 = 70;
    const ACK_WIDTH: u16 = 80;

    fn widths_for(bytes: &[u8; SENSOR_FRAME_LEN], config: &DecoderConfig) -> Vec<u16> {
        let mut widths = Vec::new();
        if config.leading_ack {
            widths.push(ACK_WIDTH);
        }
        for byte in bytes {
            for shift in (0..8).rev() {
                let one = (byte >> shift) & 1 == 1;
                widths.push(if one { ONE_WIDTH } else { ZERO_WIDTH });
            }
        }
        widths
    }

    #[test]
    fn test_all_short_pulses_decode_to_zeros() {
        let config = DecoderConfig::DHT22;
        let mut samples = vec![ZERO_WIDTH; 41];
        samples[0] = ACK_WIDTH;
        assert_eq!(decode::<()>(&samples, &config), Ok([0; 5]));
    }

    #[test]
    fn test_all_long_pulses_fail_checksum_but_keep_bytes() {
        let config = DecoderConfig::DHT22;
        let samples = vec![ONE_WIDTH; 41];
        let err = decode::<()>(&samples, &config).unwrap_err();
        assert_eq!(
            err,
            NodeError::ChecksumInvalid { bytes: [0xFF; 5], expected: 0xFC, received: 0xFF }
        );
        assert_eq!(err.unverified_bytes(), Some([0xFF; 5]));
    }

    #[test]
    fn test_known_frame_decodes() {
        let frame = [0x32, 0x00, 0x18, 0x05, 0x4F];
        for config in [DecoderConfig::DHT22, DecoderConfig::DHT22_NO_ACK] {
            let samples = widths_for(&frame, &config);
            assert_eq!(decode::<()>(&samples, &config), Ok(frame));
        }
    }

    #[test]
    fn test_checksum_mismatch_reports_data_bytes() {
        let frame = [0x32, 0x00, 0x18, 0x05, 0x50];
        let config = DecoderConfig::DHT22;
        let err = decode::<()>(&widths_for(&frame, &config), &config).unwrap_err();
        assert_eq!(err.unverified_bytes(), Some(frame));
        assert_eq!(
            err,
            NodeError::ChecksumInvalid { bytes: frame, expected: 0x4F, received: 0x50 }
        );
    }

    #[test]
    fn test_ack_sample_is_ignored() {
        let config = DecoderConfig::DHT22;
        let mut samples = widths_for(&[0; 5], &config);
        samples[0] = 5;
        assert_eq!(decode::<()>(&samples, &config), Ok([0; 5]));
    }

    #[test]
    fn test_wrong_sample_count() {
        let samples = [ZERO_WIDTH; 40];
        assert_eq!(
            decode::<()>(&samples, &DecoderConfig::DHT22),
            Err(NodeError::SampleCount { expected: 41, got: 40 })
        );
    }

    #[test]
    fn test_checksum_wraps() {
        assert_eq!(additive_checksum(&[0x80, 0x80, 0x01, 0x02, 0x00]), 0x03);
    }

    proptest! {
        #[test]
        fn prop_valid_frames_decode(data in any::<[u8; 4]>(), jitter in 0u16..=5) {
            let mut frame = [data[0], data[1], data[2], data[3], 0];
            frame[4] = additive_checksum(&frame);
            let config = DecoderConfig::DHT22;
            // Widths drift inside each band.
            let samples: Vec<u16> = widths_for(&frame, &config)
                .into_iter()
                .map(|w| if w == ZERO_WIDTH { w + jitter } else { w - jitter })
                .collect();
            prop_assert_eq!(decode::<()>(&samples, &config), Ok(frame));
        }
    }
}
