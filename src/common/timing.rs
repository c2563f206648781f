// src/common/timing.rs

use core::time::Duration;

// All hardware tick values in this crate assume a 1 MHz free-running counter
// (one tick per microsecond).

/// Counter ticks per microsecond.
pub const TICKS_PER_US: u32 = 1;

// === Serial link (9600 baud, 8N1) ===

/// Reference baud rate of the sensor bus.
pub const BAUD_RATE: u32 = 9600;
/// 1 start bit + 8 data bits + 1 stop bit.
pub const BITS_PER_CHARACTER: u32 = 10;
/// Nominal duration of one character at 9600 baud (~1.04 ms).
pub const CHARACTER_DURATION: Duration = Duration::from_micros(1042);
/// Bus silence marking the end of a frame (3.5 characters).
pub const INTER_FRAME_SILENCE: Duration = Duration::from_micros(3646);

// === One-wire sensor start signal ===

/// Time the data line is held low to request a reading.
pub const START_HOLD: Duration = Duration::from_millis(20);
/// Settle time after releasing the line before watching for the answer.
pub const RELEASE_SETTLE: Duration = Duration::from_micros(20);

// === One-wire sensor answer ===

/// Upper bound for each handshake phase (sensor drives ~80 us per phase).
pub const HANDSHAKE_PHASE_MAX: Duration = Duration::from_micros(90);
/// Upper bound for receiving every data pulse after the handshake.
pub const CAPTURE_MAX: Duration = Duration::from_millis(20);

// === Bit encoding ===

/// Shortest high pulse still read as a `0` bit (exclusive lower edge is 20 us).
pub const SHORT_PULSE_MIN_TICKS: u16 = 21;
/// Longest high pulse still read as a `0` bit (exclusive upper edge is 32 us).
pub const SHORT_PULSE_MAX_TICKS: u16 = 31;

/// Converts a duration to counter ticks, saturating at `u32::MAX`.
pub const fn to_ticks(duration: Duration) -> u32 {
    let us = duration.as_micros();
    let ticks = us * TICKS_PER_US as u128;
    if ticks > u32::MAX as u128 {
        u32::MAX
    } else {
        ticks as u32
    }
}

/// A point in tick time after which a bounded wait gives up.
///
/// Uses wrapping arithmetic so a counter rollover between `start` and the
/// check does not end the wait early.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Deadline {
    start: u32,
    budget: u32,
}

impl Deadline {
    pub const fn new(start: u32, budget: u32) -> Self {
        Deadline { start, budget }
    }

    /// Ticks elapsed since the deadline was armed.
    #[inline]
    pub const fn elapsed(&self, now: u32) -> u32 {
        now.wrapping_sub(self.start)
    }

    /// True once the full budget has elapsed.
    #[inline]
    pub const fn is_expired(&self, now: u32) -> bool {
        self.elapsed(now) >= self.budget
    }

    pub const fn budget(&self) -> u32 {
        self.budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_ticks() {
        assert_eq!(to_ticks(HANDSHAKE_PHASE_MAX), 90);
        assert_eq!(to_ticks(START_HOLD), 20_000);
        assert_eq!(to_ticks(Duration::from_secs(10_000)), u32::MAX);
    }

    #[test]
    fn test_deadline_expires_at_budget() {
        let deadline = Deadline::new(100, 90);
        assert!(!deadline.is_expired(100));
        assert!(!deadline.is_expired(189));
        assert!(deadline.is_expired(190));
        assert_eq!(deadline.elapsed(190), 90);
    }

    #[test]
    fn test_deadline_survives_wraparound() {
        let deadline = Deadline::new(u32::MAX - 10, 20);
        assert!(!deadline.is_expired(u32::MAX));
        assert!(!deadline.is_expired(5));
        assert!(deadline.is_expired(9));
    }

    #[test]
    fn test_serial_constants_agree() {
        let char_us = (1_000_000 * BITS_PER_CHARACTER + BAUD_RATE / 2) / BAUD_RATE;
        assert_eq!(char_us as u128, CHARACTER_DURATION.as_micros());
        assert!(INTER_FRAME_SILENCE > CHARACTER_DURATION * 3);
    }
}
