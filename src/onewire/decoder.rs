// src/onewire/decoder.rs

use super::capture::CaptureReader;
use super::config::DecoderConfig;
use super::decode::{self, SENSOR_FRAME_LEN};
use crate::common::{
    error::NodeError,
    hal_traits::{OneWirePin, TickSource},
    timing::{to_ticks, Deadline},
    types::{CaptureStatus, HandshakePhase},
};
use core::time::Duration;
use embedded_hal::delay::DelayNs;

/// Where the decoder is in one acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecoderPhase {
    Idle,
    Starting,
    WaitingHandshake,
    Capturing,
    Decoding,
    Ready,
    Error,
}

/// Main-loop side of the one-wire temperature/humidity sensor.
///
/// Owns the data pin for the whole acquisition. The edge interrupt feeds the
/// [`CaptureWriter`](super::CaptureWriter) that was split off the same store
/// as `capture`.
pub struct PulseTimingDecoder<'a, P, T, const B: usize> {
    pin: P,
    timer: T,
    capture: CaptureReader<'a, B>,
    config: DecoderConfig,
    phase: DecoderPhase,
}

impl<'a, P, T, const B: usize> PulseTimingDecoder<'a, P, T, B>
where
    P: OneWirePin,
    T: TickSource + DelayNs,
{
    /// Fails with `SampleCount` when the store size does not match the variant.
    pub fn new(
        pin: P,
        timer: T,
        capture: CaptureReader<'a, B>,
        config: DecoderConfig,
    ) -> Result<Self, NodeError<P::Error>> {
        let expected = config.sample_count();
        if expected != B {
            return Err(NodeError::SampleCount { expected, got: B });
        }
        Ok(PulseTimingDecoder { pin, timer, capture, config, phase: DecoderPhase::Idle })
    }

    /// Runs one complete acquisition and returns the verified sensor bytes.
    ///
    /// Any failure disarms the edge interrupt and leaves the decoder in
    /// `Error`; calling again starts a fresh attempt.
    pub fn acquire(&mut self) -> Result<[u8; SENSOR_FRAME_LEN], NodeError<P::Error>> {
        self.start_acquisition()?;
        self.await_handshake(to_ticks(self.config.handshake_timeout))?;
        let samples = self.await_capture()?;
        self.decode(&samples)
    }

    /// Sends the start signal and releases the line. The edge interrupt is
    /// armed here when the acknowledgement pulse is captured, otherwise once
    /// the handshake has passed.
    pub fn start_acquisition(&mut self) -> Result<(), NodeError<P::Error>> {
        self.phase = DecoderPhase::Starting;
        debug!("one-wire: start signal");
        let result = self.send_start_signal();
        self.guard(result)?;
        self.phase = DecoderPhase::WaitingHandshake;
        Ok(())
    }

    /// Waits for the sensor to pull the line low, then to release it. Each
    /// phase is bounded by `timeout_ticks`.
    ///
    /// Without a captured acknowledgement the edge interrupt is armed here,
    /// while the line is high inside the acknowledgement pulse. The falling
    /// edge closing that pulse has no rising edge before it and records nothing.
    pub fn await_handshake(&mut self, timeout_ticks: u32) -> Result<(), NodeError<P::Error>> {
        self.phase = DecoderPhase::WaitingHandshake;
        let result = self
            .wait_for_level(false, timeout_ticks, HandshakePhase::AwaitLow)
            .and_then(|()| self.wait_for_level(true, timeout_ticks, HandshakePhase::AwaitHigh));
        self.guard(result)?;
        if !self.config.leading_ack {
            self.arm_capture();
        }
        self.phase = DecoderPhase::Capturing;
        Ok(())
    }

    /// Waits until the edge interrupt has recorded every pulse, then disarms it
    /// and hands back the samples.
    pub fn await_capture(&mut self) -> Result<[u16; B], NodeError<P::Error>> {
        self.phase = DecoderPhase::Capturing;
        let deadline = Deadline::new(self.timer.now(), to_ticks(self.config.capture_timeout));
        loop {
            if let Some(samples) = self.capture.samples() {
                self.pin.disarm_edge_interrupt();
                self.phase = DecoderPhase::Decoding;
                return Ok(samples);
            }
            if deadline.is_expired(self.timer.now()) {
                self.pin.disarm_edge_interrupt();
                let captured = self.capture.captured();
                self.capture.mark_error();
                self.phase = DecoderPhase::Error;
                warn!("one-wire: capture timeout after {} pulses", captured);
                return Err(NodeError::CaptureTimeout { captured });
            }
        }
    }

    /// Decodes captured pulse widths. A checksum mismatch still carries the
    /// decoded bytes in the error.
    pub fn decode(&mut self, samples: &[u16]) -> Result<[u8; SENSOR_FRAME_LEN], NodeError<P::Error>> {
        self.phase = DecoderPhase::Decoding;
        let result = decode::decode::<P::Error>(samples, &self.config);
        match &result {
            Ok(_) => {
                self.phase = DecoderPhase::Ready;
                debug!("one-wire: frame decoded");
            }
            Err(NodeError::ChecksumInvalid { expected, received, .. }) => {
                self.phase = DecoderPhase::Error;
                warn!("one-wire: checksum {} != {}", received, expected);
            }
            Err(_) => self.phase = DecoderPhase::Error,
        }
        result
    }

    pub fn phase(&self) -> DecoderPhase {
        self.phase
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn capture_status(&self) -> CaptureStatus {
        self.capture.status()
    }

    /// Gives the pin and timer back, edge interrupt disarmed.
    pub fn release(mut self) -> (P, T) {
        self.pin.disarm_edge_interrupt();
        (self.pin, self.timer)
    }

    fn send_start_signal(&mut self) -> Result<(), NodeError<P::Error>> {
        // Direction changes happen with the edge interrupt masked.
        self.pin.disarm_edge_interrupt();
        self.pin.set_output().map_err(NodeError::Io)?;
        self.pin.set_low().map_err(NodeError::Io)?;
        self.delay(self.config.start_hold);
        self.pin.set_high().map_err(NodeError::Io)?;
        self.pin.set_input().map_err(NodeError::Io)?;
        self.delay(self.config.release_settle);

        self.capture.reset();
        if self.config.leading_ack {
            self.arm_capture();
        }
        Ok(())
    }

    fn arm_capture(&mut self) {
        self.pin.clear_pending_interrupt();
        self.pin.arm_edge_interrupt();
    }

    fn wait_for_level(
        &mut self,
        high: bool,
        timeout_ticks: u32,
        phase: HandshakePhase,
    ) -> Result<(), NodeError<P::Error>> {
        let deadline = Deadline::new(self.timer.now(), timeout_ticks);
        loop {
            if self.pin.is_high().map_err(NodeError::Io)? == high {
                return Ok(());
            }
            if deadline.is_expired(self.timer.now()) {
                warn!("one-wire: handshake timeout ({})", phase);
                return Err(NodeError::HandshakeTimeout(phase));
            }
        }
    }

    fn delay(&mut self, duration: Duration) {
        let us = u32::try_from(duration.as_micros()).unwrap_or(u32::MAX);
        self.timer.delay_us(us);
    }

    // Disarms and flags the decoder on any failed step.
    fn guard<V>(&mut self, result: Result<V, NodeError<P::Error>>) -> Result<V, NodeError<P::Error>> {
        if result.is_err() {
            self.pin.disarm_edge_interrupt();
            self.phase = DecoderPhase::Error;
        }
        result
    }
}
