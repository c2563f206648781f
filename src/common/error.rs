// src/common/error.rs

use super::types::HandshakePhase;

/// Outcome of a rejected frame or a failed sensor acquisition.
///
/// None of these are fatal. The control loop decides whether to retry, keep the
/// previous reading, or use an unverified one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NodeError<E = ()>
where
    E: core::fmt::Debug, // Still need Debug for the generic Io error
{
    /// Underlying I/O error from the HAL implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// Frame addressed to a device that is not in the slave table.
    #[error("Address {0:#04x} is not served by this node")]
    AddressInvalid(u8),

    /// Trailing frame checksum does not match the computed CRC.
    #[error("CRC mismatch: expected {expected:#06x}, calculated {calculated:#06x}")]
    CrcInvalid { expected: u16, calculated: u16 },

    /// Function code other than the supported register reads.
    #[error("Unsupported function code {0:#04x}")]
    FunctionUnsupported(u8),

    /// Register not mapped for the addressed device.
    #[error("Register {register} not mapped for address {address:#04x}")]
    RegisterInvalid { address: u8, register: u16 },

    /// Register count of zero or larger than a response can carry.
    #[error("Invalid register count {0}")]
    CountInvalid(u16),

    /// Value outside the valid slave address range.
    #[error("Invalid slave address {0:#04x}")]
    InvalidAddress(u8),

    /// The one-wire sensor did not answer the start signal in time.
    #[error("Handshake timed out while {0}")]
    HandshakeTimeout(HandshakePhase),

    /// The expected number of pulses did not arrive in time.
    #[error("Capture timed out after {captured} pulses")]
    CaptureTimeout { captured: usize },

    /// Decoded sensor bytes fail the additive checksum. The bytes are kept so the
    /// caller can still use them with a caveat.
    #[error("Sensor checksum mismatch: expected {expected:#04x}, received {received:#04x}")]
    ChecksumInvalid {
        bytes: [u8; 5],
        expected: u8,
        received: u8,
    },

    /// Sample slice length does not match the configured protocol variant.
    #[error("Expected {expected} pulse samples, got {got}")]
    SampleCount { expected: usize, got: usize },

    /// The receive ring buffer dropped at least one byte.
    #[error("Receive buffer overflow")]
    BufferOverflow,
}

impl<E: core::fmt::Debug> NodeError<E> {
    /// True for the per-frame rejections the responder handles silently.
    pub fn is_frame_rejection(&self) -> bool {
        matches!(
            self,
            NodeError::AddressInvalid(_)
                | NodeError::CrcInvalid { .. }
                | NodeError::FunctionUnsupported(_)
                | NodeError::RegisterInvalid { .. }
                | NodeError::CountInvalid(_)
        )
    }

    /// Bytes that were decoded but failed verification, if any.
    pub fn unverified_bytes(&self) -> Option<[u8; 5]> {
        match self {
            NodeError::ChecksumInvalid { bytes, .. } => Some(*bytes),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rejection_classification() {
        assert!(NodeError::<()>::AddressInvalid(9).is_frame_rejection());
        assert!(NodeError::<()>::CrcInvalid { expected: 1, calculated: 2 }.is_frame_rejection());
        assert!(!NodeError::<()>::BufferOverflow.is_frame_rejection());
        assert!(!NodeError::<()>::HandshakeTimeout(HandshakePhase::AwaitLow).is_frame_rejection());
    }

    #[test]
    fn test_unverified_bytes_only_for_checksum_errors() {
        let err: NodeError = NodeError::ChecksumInvalid {
            bytes: [1, 2, 3, 4, 0],
            expected: 10,
            received: 0,
        };
        assert_eq!(err.unverified_bytes(), Some([1, 2, 3, 4, 0]));
        assert_eq!(NodeError::<()>::CaptureTimeout { captured: 3 }.unverified_bytes(), None);
    }
}
