// src/common/address.rs

use super::error::NodeError;
use core::convert::TryFrom;
use core::fmt;

/// Device address carried in byte 0 of every frame.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveAddr(u8);

impl SlaveAddr {
    /// Analog temperature sensor.
    pub const ANALOG_TEMPERATURE: SlaveAddr = SlaveAddr(0x01);
    /// Analog light sensor.
    pub const LIGHT: SlaveAddr = SlaveAddr(0x04);
    /// VOC/CO2 air quality sensor on the secondary bus.
    pub const AIR_QUALITY: SlaveAddr = SlaveAddr(0x05);
    /// One-wire humidity/temperature sensor.
    pub const HUMIDITY: SlaveAddr = SlaveAddr(0x06);

    pub const MIN: u8 = 1;
    pub const MAX: u8 = 247;

    /// Creates a new `SlaveAddr` if the value is a valid unicast address (1..=247).
    pub fn new(address: u8) -> Result<Self, NodeError<()>> {
        if Self::is_valid(address) {
            Ok(SlaveAddr(address))
        } else {
            Err(NodeError::InvalidAddress(address))
        }
    }

    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_valid(address: u8) -> bool {
        address >= Self::MIN && address <= Self::MAX
    }
}

impl TryFrom<u8> for SlaveAddr {
    type Error = NodeError<()>;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SlaveAddr> for u8 {
    fn from(value: SlaveAddr) -> Self {
        value.0
    }
}

impl fmt::Display for SlaveAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// Addresses served by the stock node, lowest first.
pub const DEFAULT_SLAVES: [SlaveAddr; 4] = [
    SlaveAddr::ANALOG_TEMPERATURE,
    SlaveAddr::LIGHT,
    SlaveAddr::AIR_QUALITY,
    SlaveAddr::HUMIDITY,
];

/// Ordered set of addresses this node answers for.
///
/// Ascending order is expected but not enforced; lookup is a linear scan.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SlaveTable<'a> {
    slaves: &'a [SlaveAddr],
}

impl<'a> SlaveTable<'a> {
    pub const fn new(slaves: &'a [SlaveAddr]) -> Self {
        SlaveTable { slaves }
    }

    /// Looks up a raw frame address.
    pub fn lookup(&self, address: u8) -> Option<SlaveAddr> {
        self.slaves.iter().copied().find(|slave| slave.0 == address)
    }

    #[inline]
    pub fn contains(&self, address: u8) -> bool {
        self.lookup(address).is_some()
    }

    /// True when the table is in ascending order without duplicates.
    pub fn is_ascending(&self) -> bool {
        self.slaves.windows(2).all(|pair| pair[0] < pair[1])
    }

    pub fn len(&self) -> usize {
        self.slaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slaves.is_empty()
    }
}

impl Default for SlaveTable<'static> {
    fn default() -> Self {
        SlaveTable::new(&DEFAULT_SLAVES)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_addresses() {
        assert!(SlaveAddr::new(1).is_ok());
        assert!(SlaveAddr::new(0x06).is_ok());
        assert!(SlaveAddr::new(247).is_ok());
    }

    #[test]
    fn test_invalid_addresses() {
        assert_eq!(SlaveAddr::new(0), Err(NodeError::InvalidAddress(0)));
        assert_eq!(SlaveAddr::new(248), Err(NodeError::InvalidAddress(248)));
        assert_eq!(SlaveAddr::try_from(0xFF), Err(NodeError::InvalidAddress(0xFF)));
    }

    #[test]
    fn test_default_table_membership() {
        let table = SlaveTable::default();
        assert!(table.contains(0x01));
        assert!(table.contains(0x04));
        assert!(table.contains(0x05));
        assert!(table.contains(0x06));
        assert!(!table.contains(0x02));
        assert!(!table.contains(0x00));
        assert_eq!(table.lookup(0x06), Some(SlaveAddr::HUMIDITY));
        assert!(table.is_ascending());
    }

    #[test]
    fn test_unordered_table_still_matches() {
        let slaves = [SlaveAddr::HUMIDITY, SlaveAddr::ANALOG_TEMPERATURE];
        let table = SlaveTable::new(&slaves);
        assert!(!table.is_ascending());
        assert!(table.contains(0x01));
        assert!(table.contains(0x06));
        assert_eq!(table.len(), 2);
    }
}
