// src/common/types.rs

use core::fmt;

// --- One-wire capture status ---

/// Progress of a pulse capture, shared between the edge interrupt and the main loop.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CaptureStatus {
    /// Store reset, no edge seen yet.
    NotReady = 0,
    /// At least one edge recorded, sample count not reached.
    Measuring = 1,
    /// All expected samples recorded.
    Ready = 2,
    /// Acquisition aborted by the main loop.
    Error = 3,
}

impl CaptureStatus {
    /// Converts the raw atomic representation back into a status.
    /// Unknown values map to `Error`.
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => CaptureStatus::NotReady,
            1 => CaptureStatus::Measuring,
            2 => CaptureStatus::Ready,
            _ => CaptureStatus::Error,
        }
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

// --- Line edges ---

/// Direction of a data-line transition seen by the edge interrupt.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    /// Edge implied by the line level sampled right after the interrupt fired.
    #[inline]
    pub const fn from_level(is_high: bool) -> Self {
        if is_high {
            Edge::Rising
        } else {
            Edge::Falling
        }
    }
}

// --- Handshake ---

/// The two bounded waits of the sensor's answer to the start signal.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakePhase {
    /// Waiting for the sensor to pull the line low.
    AwaitLow,
    /// Waiting for the sensor to release the line high.
    AwaitHigh,
}

impl fmt::Display for HandshakePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakePhase::AwaitLow => write!(f, "waiting for the sensor to pull low"),
            HandshakePhase::AwaitHigh => write!(f, "waiting for the sensor to release"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_status_roundtrips_through_u8() {
        for status in [
            CaptureStatus::NotReady,
            CaptureStatus::Measuring,
            CaptureStatus::Ready,
            CaptureStatus::Error,
        ] {
            assert_eq!(CaptureStatus::from_u8(status.as_u8()), status);
        }
        assert_eq!(CaptureStatus::from_u8(0xAA), CaptureStatus::Error);
    }

    #[test]
    fn test_edge_from_level() {
        assert_eq!(Edge::from_level(true), Edge::Rising);
        assert_eq!(Edge::from_level(false), Edge::Falling);
    }
}
