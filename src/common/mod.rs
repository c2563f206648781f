// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod address;
pub mod crc;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod reading;
pub mod timing;
pub mod types;

// --- Re-export key types/traits/functions for easier access ---

// From address.rs
pub use address::{SlaveAddr, SlaveTable, DEFAULT_SLAVES};

// From crc.rs
pub use crc::{calculate_crc16, decode_crc, encode_crc, verify_frame_crc};

// From error.rs
pub use error::NodeError;

// From frame.rs
pub use frame::{FunctionCode, RequestFrame, ResponseFrame, REQUEST_FRAME_LEN};

// From hal_traits.rs
pub use hal_traits::{FrameTransmitter, OneWirePin, TickSource};

// From reading.rs
pub use reading::{Channel, Reading, ReadingProvider};

// From timing.rs (constants - users can access via common::timing::*)
pub use timing::Deadline;

// From types.rs
pub use types::{CaptureStatus, Edge, HandshakePhase};
