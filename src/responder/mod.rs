// src/responder/mod.rs

//! Request/response side of the sensor bus.
//!
//! Frames are recognised purely by length: every `REQUEST_FRAME_LEN` bytes popped
//! from the receive buffer form one request. There is no start delimiter, so a
//! lost or injected byte shifts every later frame until the stream happens to
//! realign. [`SensorBusResponder::resync`] lets the control loop drop a partial
//! frame (for example after an inter-frame silence) but nothing calls it
//! automatically.

mod dispatch;
mod stats;

pub use stats::ResponderStats;

use crate::common::{
    address::SlaveTable,
    error::NodeError,
    frame::{ResponseFrame, REQUEST_FRAME_LEN},
    hal_traits::FrameTransmitter,
    reading::ReadingProvider,
};
use crate::ring::{RxConsumer, RX_BUFFER_SIZE};

/// Frame assembly state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameState {
    /// Accumulating bytes into the frame buffer.
    Collecting,
    /// A full frame is waiting for `process_ready_frame`.
    FrameReady,
}

/// What `process_ready_frame` did with the pending frame.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Dispatch {
    /// No complete frame was waiting.
    Idle,
    /// A response was built and handed to the transmitter.
    Responded(ResponseFrame),
}

/// Assembles, validates and answers fixed-length request frames.
pub struct SensorBusResponder<'a, const N: usize = RX_BUFFER_SIZE> {
    rx: RxConsumer<'a, N>,
    slaves: SlaveTable<'a>,
    frame: [u8; REQUEST_FRAME_LEN],
    cursor: usize,
    state: FrameState,
    stats: ResponderStats,
}

impl<'a, const N: usize> SensorBusResponder<'a, N> {
    pub fn new(rx: RxConsumer<'a, N>, slaves: SlaveTable<'a>) -> Self {
        SensorBusResponder {
            rx,
            slaves,
            frame: [0; REQUEST_FRAME_LEN],
            cursor: 0,
            state: FrameState::Collecting,
            stats: ResponderStats::default(),
        }
    }

    /// Moves received bytes into the frame buffer.
    ///
    /// Resumes at the persistent cursor, so it can be called at any interval.
    /// Stops consuming once a frame is complete; later bytes stay queued until
    /// that frame has been processed. Returns true when a frame is ready.
    pub fn pump(&mut self) -> bool {
        if self.rx.take_overflow() {
            self.stats.overflows = self.stats.overflows.wrapping_add(1);
            warn!("rx buffer overflow, bytes dropped");
        }

        while self.state == FrameState::Collecting {
            match self.rx.pop() {
                Some(byte) => {
                    self.frame[self.cursor] = byte;
                    self.cursor += 1;
                    if self.cursor >= REQUEST_FRAME_LEN {
                        self.cursor = 0;
                        self.state = FrameState::FrameReady;
                        self.stats.frames_received = self.stats.frames_received.wrapping_add(1);
                    }
                }
                None => break,
            }
        }

        self.state == FrameState::FrameReady
    }

    /// Validates and answers the pending frame, if any.
    ///
    /// Address and CRC are checked in that order; both must pass. Rejected
    /// frames are dropped without a reply. The ready condition is cleared
    /// whatever the outcome.
    pub fn process_ready_frame<R, T>(
        &mut self,
        readings: &R,
        tx: &mut T,
    ) -> Result<Dispatch, NodeError<T::Error>>
    where
        R: ReadingProvider,
        T: FrameTransmitter,
    {
        if self.state != FrameState::FrameReady {
            return Ok(Dispatch::Idle);
        }

        let frame = self.frame;
        let result = self.answer(&frame, readings, tx);
        self.state = FrameState::Collecting;
        self.record(&result);

        result.map(Dispatch::Responded)
    }

    /// `pump` followed by `process_ready_frame`; one call per control-loop pass.
    pub fn poll<R, T>(&mut self, readings: &R, tx: &mut T) -> Result<Dispatch, NodeError<T::Error>>
    where
        R: ReadingProvider,
        T: FrameTransmitter,
    {
        self.pump();
        self.process_ready_frame(readings, tx)
    }

    /// Discards a partially assembled frame. A frame that is already complete
    /// is kept.
    ///
    /// Meant for the control loop to call once the bus has been quiet for
    /// [`INTER_FRAME_SILENCE`](crate::common::timing::INTER_FRAME_SILENCE).
    pub fn resync(&mut self) {
        if self.cursor != 0 {
            debug!("resync dropped {} partial bytes", self.cursor);
        }
        self.cursor = 0;
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Bytes of the next frame collected so far.
    pub fn pending_bytes(&self) -> usize {
        self.cursor
    }

    pub fn stats(&self) -> &ResponderStats {
        &self.stats
    }

    fn record<E>(&mut self, result: &Result<ResponseFrame, NodeError<E>>)
    where
        E: core::fmt::Debug,
    {
        match result {
            Ok(response) => {
                self.stats.responses_sent = self.stats.responses_sent.wrapping_add(1);
                trace!("responded to {} with {} bytes", response.address(), response.as_bytes().len());
            }
            Err(NodeError::AddressInvalid(address)) => {
                self.stats.address_rejects = self.stats.address_rejects.wrapping_add(1);
                debug!("frame for foreign address {}", address);
            }
            Err(NodeError::CrcInvalid { expected, calculated }) => {
                self.stats.crc_rejects = self.stats.crc_rejects.wrapping_add(1);
                warn!("frame crc mismatch: received {}, calculated {}", expected, calculated);
            }
            Err(err) if err.is_frame_rejection() => {
                self.stats.other_rejects = self.stats.other_rejects.wrapping_add(1);
                warn!("request rejected");
            }
            Err(_) => {
                error!("response transmit failed");
            }
        }
    }
}
