// src/onewire/mod.rs

//! One-wire temperature/humidity sensor: the edge-interrupt capture store and
//! the main-loop decoder that drives the start signal and decodes pulses.

pub mod capture;
pub mod config;
pub mod decode;
mod decoder;

pub use capture::{CaptureReader, CaptureWriter, PulseCaptureStore};
pub use config::DecoderConfig;
pub use decode::SENSOR_FRAME_LEN;
pub use decoder::{DecoderPhase, PulseTimingDecoder};
