// src/responder/stats.rs

/// Running counters kept by the responder. All counters wrap.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResponderStats {
    /// Complete frames sliced from the receive stream.
    pub frames_received: u32,
    /// Responses handed to the transmitter.
    pub responses_sent: u32,
    /// Frames dropped because their address is not served.
    pub address_rejects: u32,
    /// Frames dropped because of a CRC mismatch.
    pub crc_rejects: u32,
    /// Frames dropped for an unsupported function, register or count.
    pub other_rejects: u32,
    /// Times the receive buffer reported dropped bytes.
    pub overflows: u32,
}

impl ResponderStats {
    /// Frames that produced no response for any reason.
    pub fn total_rejects(&self) -> u32 {
        self.address_rejects
            .wrapping_add(self.crc_rejects)
            .wrapping_add(self.other_rejects)
    }
}
