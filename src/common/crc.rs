// src/common/crc.rs

use super::error::NodeError;
use crc::{Crc, CRC_16_MODBUS};

// CRC-16/MODBUS: reflected polynomial 0xA001 (0x8005 normal), seed 0xFFFF,
// no final XOR. `Crc::new` builds the 256-entry byte-at-a-time table at
// compile time.
const CRC_COMPUTER: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// Calculates the CRC-16 used by request and response frames.
///
/// # Arguments
///
/// * `data`: The frame bytes preceding the two trailing checksum bytes.
///
/// # Returns
///
/// The calculated 16-bit CRC value.
#[inline]
pub fn calculate_crc16(data: &[u8]) -> u16 {
    CRC_COMPUTER.checksum(data)
}

/// Encodes a 16-bit CRC value into two bytes, low byte first, as sent on the wire.
pub fn encode_crc(crc_value: u16) -> [u8; 2] {
    crc_value.to_le_bytes()
}

/// Decodes the two trailing frame bytes (low byte first) into a 16-bit CRC value.
///
/// Returns `None` unless `crc_bytes` holds exactly two bytes.
pub fn decode_crc(crc_bytes: &[u8]) -> Option<u16> {
    match crc_bytes {
        [lo, hi] => Some(u16::from_le_bytes([*lo, *hi])),
        _ => None,
    }
}

/// Verifies a frame whose last two bytes are its CRC.
///
/// # Returns
///
/// * `Ok(())` if the CRC is valid.
/// * `Err(NodeError::CrcInvalid)` if the buffer is too short or the CRCs don't match.
pub fn verify_frame_crc<E>(frame_with_crc: &[u8]) -> Result<(), NodeError<E>>
where
    E: core::fmt::Debug,
{
    if frame_with_crc.len() < 2 {
        return Err(NodeError::CrcInvalid { expected: 0, calculated: calculate_crc16(&[]) });
    }
    let data_len = frame_with_crc.len() - 2;
    let calculated = calculate_crc16(&frame_with_crc[..data_len]);
    let expected = decode_crc(&frame_with_crc[data_len..]).unwrap_or(0);

    if calculated == expected {
        Ok(())
    } else {
        Err(NodeError::CrcInvalid { expected, calculated })
    }
}
