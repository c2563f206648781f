// src/common/frame.rs

use super::crc::{calculate_crc16, decode_crc, encode_crc};
use super::error::NodeError;
use arrayvec::ArrayVec;
use core::convert::TryFrom;

/// Length of every request frame on the wire.
pub const REQUEST_FRAME_LEN: usize = 8;
/// Trailing checksum length of request and response frames.
pub const CRC_LEN: usize = 2;
/// Request bytes covered by the checksum (address + command fields).
pub const REQUEST_DATA_LEN: usize = REQUEST_FRAME_LEN - CRC_LEN;
/// Most registers a single request may ask for.
pub const MAX_REGISTER_COUNT: usize = 4;
/// Address, function code and byte count.
pub const RESPONSE_HEADER_LEN: usize = 3;
/// Largest response frame the node ever sends.
pub const MAX_RESPONSE_LEN: usize = RESPONSE_HEADER_LEN + 2 * MAX_REGISTER_COUNT + CRC_LEN;

/// Function codes served by the responder.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FunctionCode {
    /// Answered exactly like `ReadInputRegisters`; all readings are read-only.
    ReadHoldingRegisters = 0x03,
    ReadInputRegisters = 0x04,
}

impl FunctionCode {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x03 => Some(FunctionCode::ReadHoldingRegisters),
            0x04 => Some(FunctionCode::ReadInputRegisters),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for FunctionCode {
    type Error = NodeError<()>;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(NodeError::FunctionUnsupported(value))
    }
}

/// Field view of an 8-byte request frame.
///
/// Layout: `address, function, start_hi, start_lo, count_hi, count_lo, crc_lo, crc_hi`.
/// No validation happens here; the responder gates on address and CRC.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RequestFrame {
    pub address: u8,
    pub function: u8,
    pub start_register: u16,
    pub count: u16,
    /// CRC as received (trailing two bytes, low byte first).
    pub crc: u16,
}

impl RequestFrame {
    /// Builds a request with a correct CRC, as a bus master would.
    pub fn new(address: u8, function: u8, start_register: u16, count: u16) -> Self {
        let mut frame = RequestFrame { address, function, start_register, count, crc: 0 };
        frame.crc = calculate_crc16(&frame.data_bytes());
        frame
    }

    pub fn from_bytes(bytes: &[u8; REQUEST_FRAME_LEN]) -> Self {
        RequestFrame {
            address: bytes[0],
            function: bytes[1],
            start_register: u16::from_be_bytes([bytes[2], bytes[3]]),
            count: u16::from_be_bytes([bytes[4], bytes[5]]),
            crc: decode_crc(&bytes[REQUEST_DATA_LEN..]).unwrap_or(0),
        }
    }

    /// The checksummed part of the frame.
    pub fn data_bytes(&self) -> [u8; REQUEST_DATA_LEN] {
        let start = self.start_register.to_be_bytes();
        let count = self.count.to_be_bytes();
        [self.address, self.function, start[0], start[1], count[0], count[1]]
    }

    pub fn to_bytes(&self) -> [u8; REQUEST_FRAME_LEN] {
        let data = self.data_bytes();
        let crc = encode_crc(self.crc);
        [data[0], data[1], data[2], data[3], data[4], data[5], crc[0], crc[1]]
    }
}

/// A response frame ready for transmission.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResponseFrame {
    bytes: ArrayVec<u8, MAX_RESPONSE_LEN>,
}

impl ResponseFrame {
    /// Assembles `address, function, byte_count, registers (big-endian), crc_lo, crc_hi`.
    pub fn build<E>(address: u8, function: u8, registers: &[u16]) -> Result<Self, NodeError<E>>
    where
        E: core::fmt::Debug,
    {
        if registers.is_empty() || registers.len() > MAX_REGISTER_COUNT {
            return Err(NodeError::CountInvalid(registers.len() as u16));
        }

        let mut bytes = ArrayVec::<u8, MAX_RESPONSE_LEN>::new();
        let overflow = |_| NodeError::CountInvalid(registers.len() as u16);

        let byte_count = (registers.len() * 2) as u8;
        bytes.try_extend_from_slice(&[address, function, byte_count]).map_err(overflow)?;
        for register in registers {
            bytes.try_extend_from_slice(&register.to_be_bytes()).map_err(overflow)?;
        }
        let crc = calculate_crc16(&bytes);
        bytes.try_extend_from_slice(&encode_crc(crc)).map_err(overflow)?;

        Ok(ResponseFrame { bytes })
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn address(&self) -> u8 {
        self.bytes[0]
    }

    pub fn function(&self) -> u8 {
        self.bytes[1]
    }

    pub fn byte_count(&self) -> u8 {
        self.bytes[2]
    }

    /// Register bytes between the header and the CRC.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[RESPONSE_HEADER_LEN..self.bytes.len() - CRC_LEN]
    }

    pub fn crc(&self) -> u16 {
        decode_crc(&self.bytes[self.bytes.len() - CRC_LEN..]).unwrap_or(0)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::crc::verify_frame_crc;

    #[test]
    fn test_request_layout() {
        let request = RequestFrame::new(0x01, 0x04, 0x0001, 0x0001);
        assert_eq!(request.to_bytes(), [0x01, 0x04, 0x00, 0x01, 0x00, 0x01, 0x60, 0x0A]);
    }

    #[test]
    fn test_request_from_bytes() {
        let request = RequestFrame::from_bytes(&[0x06, 0x04, 0x01, 0x02, 0x00, 0x02, 0xAA, 0xBB]);
        assert_eq!(request.address, 0x06);
        assert_eq!(request.function, 0x04);
        assert_eq!(request.start_register, 0x0102);
        assert_eq!(request.count, 2);
        assert_eq!(request.crc, 0xBBAA);
    }

    #[test]
    fn test_function_codes() {
        assert_eq!(FunctionCode::try_from(0x04), Ok(FunctionCode::ReadInputRegisters));
        assert_eq!(FunctionCode::try_from(0x03), Ok(FunctionCode::ReadHoldingRegisters));
        assert_eq!(FunctionCode::try_from(0x10), Err(NodeError::FunctionUnsupported(0x10)));
    }

    #[test]
    fn test_response_single_register() {
        let response = ResponseFrame::build::<()>(0x05, 0x04, &[0x01A4]).unwrap();
        let bytes = response.as_bytes();
        assert_eq!(&bytes[..5], &[0x05, 0x04, 0x02, 0x01, 0xA4]);
        assert_eq!(bytes.len(), 7);
        assert_eq!(response.payload(), &[0x01, 0xA4]);
        assert_eq!(response.byte_count(), 2);
        assert_eq!(response.crc(), calculate_crc16(&bytes[..5]));
        assert!(verify_frame_crc::<()>(bytes).is_ok());
    }

    #[test]
    fn test_response_max_registers() {
        let response = ResponseFrame::build::<()>(0x06, 0x03, &[1, 2, 3, 4]).unwrap();
        assert_eq!(response.as_bytes().len(), MAX_RESPONSE_LEN);
        assert_eq!(response.byte_count(), 8);
        assert_eq!(response.payload(), &[0, 1, 0, 2, 0, 3, 0, 4]);
    }

    #[test]
    fn test_response_rejects_bad_counts() {
        assert_eq!(ResponseFrame::build::<()>(0x06, 0x04, &[]), Err(NodeError::CountInvalid(0)));
        assert_eq!(ResponseFrame::build::<()>(0x06, 0x04, &[0; 5]), Err(NodeError::CountInvalid(5)));
    }
}
