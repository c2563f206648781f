// src/onewire/config.rs

use crate::common::timing::{
    CAPTURE_MAX, HANDSHAKE_PHASE_MAX, RELEASE_SETTLE, SHORT_PULSE_MAX_TICKS, SHORT_PULSE_MIN_TICKS,
    START_HOLD,
};
use core::time::Duration;

/// Data bits in one sensor frame (5 bytes).
pub const DATA_BITS: usize = 40;

/// Protocol variant and timing bounds for the pulse-timing decoder.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DecoderConfig {
    /// The sensor's acknowledgement pulse is captured ahead of the data bits
    /// and discarded by the decoder.
    pub leading_ack: bool,
    /// Inclusive tick band of a `0` bit. Anything outside reads as `1`.
    pub short_pulse_min: u16,
    pub short_pulse_max: u16,
    pub start_hold: Duration,
    pub release_settle: Duration,
    /// Bound applied to each of the two handshake phases.
    pub handshake_timeout: Duration,
    pub capture_timeout: Duration,
}

impl DecoderConfig {
    /// 41 pulses: acknowledgement plus 40 data bits.
    pub const DHT22: DecoderConfig = DecoderConfig {
        leading_ack: true,
        short_pulse_min: SHORT_PULSE_MIN_TICKS,
        short_pulse_max: SHORT_PULSE_MAX_TICKS,
        start_hold: START_HOLD,
        release_settle: RELEASE_SETTLE,
        handshake_timeout: HANDSHAKE_PHASE_MAX,
        capture_timeout: CAPTURE_MAX,
    };

    /// 40 pulses: the capture starts on the first data bit.
    pub const DHT22_NO_ACK: DecoderConfig = DecoderConfig { leading_ack: false, ..Self::DHT22 };

    /// Pulses one acquisition must record.
    pub const fn sample_count(&self) -> usize {
        DATA_BITS + self.leading_samples()
    }

    /// Pulses skipped before the first data bit.
    pub const fn leading_samples(&self) -> usize {
        if self.leading_ack {
            1
        } else {
            0
        }
    }

    /// Classifies a high-pulse width: `false` for a `0` bit, `true` for a `1` bit.
    #[inline]
    pub const fn bit_for(&self, width: u16) -> bool {
        !(width >= self.short_pulse_min && width <= self.short_pulse_max)
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::DHT22
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_counts() {
        assert_eq!(DecoderConfig::DHT22.sample_count(), 41);
        assert_eq!(DecoderConfig::DHT22_NO_ACK.sample_count(), 40);
        assert_eq!(DecoderConfig::default(), DecoderConfig::DHT22);
    }

    #[test]
    fn test_bit_band_edges() {
        let config = DecoderConfig::DHT22;
        assert!(config.bit_for(20));
        assert!(!config.bit_for(21));
        assert!(!config.bit_for(26));
        assert!(!config.bit_for(31));
        assert!(config.bit_for(32));
        assert!(config.bit_for(70));
        assert!(config.bit_for(0));
    }
}
