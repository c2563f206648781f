// src/responder/dispatch.rs

use super::SensorBusResponder;
use crate::common::{
    crc::verify_frame_crc,
    error::NodeError,
    frame::{FunctionCode, RequestFrame, ResponseFrame, MAX_REGISTER_COUNT, REQUEST_FRAME_LEN},
    hal_traits::FrameTransmitter,
    reading::{Channel, ReadingProvider},
};

// Validation and reply helpers
impl<'a, const N: usize> SensorBusResponder<'a, N> {
    /// Runs both gates on a complete frame, then builds and sends the reply.
    pub(super) fn answer<R, T>(
        &self,
        frame: &[u8; REQUEST_FRAME_LEN],
        readings: &R,
        tx: &mut T,
    ) -> Result<ResponseFrame, NodeError<T::Error>>
    where
        R: ReadingProvider,
        T: FrameTransmitter,
    {
        let address = self
            .slaves
            .lookup(frame[0])
            .ok_or(NodeError::<T::Error>::AddressInvalid(frame[0]))?;

        verify_frame_crc::<T::Error>(frame)?;

        let request = RequestFrame::from_bytes(frame);
        let function = FunctionCode::from_u8(request.function)
            .ok_or(NodeError::<T::Error>::FunctionUnsupported(request.function))?;

        let count = request.count as usize;
        if count == 0 || count > MAX_REGISTER_COUNT {
            return Err(NodeError::CountInvalid(request.count));
        }

        let mut registers = [0u16; MAX_REGISTER_COUNT];
        for (offset, slot) in registers[..count].iter_mut().enumerate() {
            let register = request.start_register.wrapping_add(offset as u16);
            let invalid = || NodeError::<T::Error>::RegisterInvalid { address: address.as_u8(), register };
            let channel = Channel::lookup(address, register).ok_or_else(invalid)?;
            *slot = readings.read_channel(channel).ok_or_else(invalid)?;
        }

        let response = ResponseFrame::build::<T::Error>(address.as_u8(), function.as_u8(), &registers[..count])?;
        send_frame(tx, response.as_bytes())?;

        Ok(response)
    }
}

/// Writes a frame byte by byte and waits for the transmitter to drain.
fn send_frame<T>(tx: &mut T, bytes: &[u8]) -> Result<(), NodeError<T::Error>>
where
    T: FrameTransmitter,
{
    for byte in bytes {
        nb::block!(tx.write_byte(*byte)).map_err(NodeError::Io)?;
    }
    nb::block!(tx.flush()).map_err(NodeError::Io)?;
    Ok(())
}
