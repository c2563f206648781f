// src/lib.rs

#![cfg_attr(not(test), no_std)] // no_std on target, std for the test harness

// Logging macros must be declared before the modules that use them.
#[macro_use]
mod log;

pub mod common;
pub mod onewire;
pub mod responder;
pub mod ring;

// Re-export key types for convenience
pub use common::{NodeError, Reading, ReadingProvider, SlaveAddr, SlaveTable};
pub use onewire::{DecoderConfig, PulseCaptureStore, PulseTimingDecoder};
pub use responder::{Dispatch, SensorBusResponder};
pub use ring::ByteRingBuffer;
