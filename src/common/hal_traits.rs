// src/common/hal_traits.rs

use core::fmt::Debug;

/// Monotonic tick source used for bounded busy-waits.
///
/// One tick per microsecond; the value may wrap. Implementations typically
/// extend a free-running hardware counter.
pub trait TickSource {
    /// Current tick count.
    fn now(&mut self) -> u32;
}

/// Abstraction for the transmit side of the sensor-bus serial link.
pub trait FrameTransmitter {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Attempts to write a single byte to the serial interface.
    ///
    /// Returns `Ok(())` if the byte was accepted for transmission, or `Err(nb::Error::WouldBlock)`
    /// if the transmit register is still busy. Other errors are returned as `Err(nb::Error::Other(Self::Error))`.
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error>;

    /// Attempts to flush the transmit buffer, ensuring all written bytes have been sent.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;
}

/// The single data pin of the one-wire sensor, including its edge interrupt.
///
/// Only the pulse timing decoder may touch this pin while an acquisition is in
/// progress.
pub trait OneWirePin {
    /// Associated error type for pin errors.
    type Error: Debug;

    /// Switches the pin to push-pull output.
    fn set_output(&mut self) -> Result<(), Self::Error>;

    /// Switches the pin to input so the sensor can drive the line.
    fn set_input(&mut self) -> Result<(), Self::Error>;

    /// Drives the line low (output mode only).
    fn set_low(&mut self) -> Result<(), Self::Error>;

    /// Drives the line high (output mode only).
    fn set_high(&mut self) -> Result<(), Self::Error>;

    /// Reads the current line level.
    fn is_high(&mut self) -> Result<bool, Self::Error>;

    /// Unmasks the rising/falling edge interrupt.
    fn arm_edge_interrupt(&mut self);

    /// Masks the edge interrupt.
    fn disarm_edge_interrupt(&mut self);

    /// Clears a pending edge interrupt flag.
    fn clear_pending_interrupt(&mut self);
}
