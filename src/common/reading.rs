// src/common/reading.rs

use super::address::SlaveAddr;

/// A single 16-bit reading the responder can report.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Analog temperature sensor, raw scaled value.
    Temperature,
    /// Relative humidity from the one-wire sensor, tenths of a percent.
    Humidity,
    /// Air temperature from the one-wire sensor, tenths of a degree, two's complement.
    AirTemperature,
    /// Raw light sensor ADC value.
    Light,
    /// Raw CO2-equivalent value from the air quality sensor.
    Co2,
    /// Raw VOC value from the air quality sensor.
    Voc,
}

impl Channel {
    /// Maps an address/register pair to a channel. Registers start at 1.
    pub fn lookup(address: SlaveAddr, register: u16) -> Option<Self> {
        match (address, register) {
            (SlaveAddr::ANALOG_TEMPERATURE, 1) => Some(Channel::Temperature),
            (SlaveAddr::LIGHT, 1) => Some(Channel::Light),
            (SlaveAddr::AIR_QUALITY, 1) => Some(Channel::Co2),
            (SlaveAddr::AIR_QUALITY, 2) => Some(Channel::Voc),
            (SlaveAddr::HUMIDITY, 1) => Some(Channel::AirTemperature),
            (SlaveAddr::HUMIDITY, 2) => Some(Channel::Humidity),
            _ => None,
        }
    }
}

/// Source of the latest value for each channel, consulted when building a response.
pub trait ReadingProvider {
    /// Latest value, or `None` if the channel is not available on this node.
    fn read_channel(&self, channel: Channel) -> Option<u16>;
}

/// Latest values from every physical sensor on the node.
///
/// Acquisition routines overwrite fields in place; nothing is ever removed.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Reading {
    pub temperature: u16,
    pub humidity: u16,
    pub air_temperature: u16,
    pub light: u16,
    pub voc: u16,
    pub co2: u16,
    /// The four data bytes of the last one-wire frame, as captured.
    pub raw_humidity_frame: [u8; 4],
    /// False when the last one-wire frame failed its checksum.
    pub humidity_frame_verified: bool,
}

impl Reading {
    pub const fn new() -> Self {
        Reading {
            temperature: 0,
            humidity: 0,
            air_temperature: 0,
            light: 0,
            voc: 0,
            co2: 0,
            raw_humidity_frame: [0; 4],
            humidity_frame_verified: false,
        }
    }

    /// Merges a decoded one-wire frame `[rh_hi, rh_lo, t_hi, t_lo, checksum]`.
    ///
    /// Humidity is tenths of %RH. Temperature is tenths of a degree with the
    /// sign in bit 7 of `t_hi`, stored as two's complement.
    pub fn apply_humidity_frame(&mut self, bytes: [u8; 5], verified: bool) {
        self.raw_humidity_frame = [bytes[0], bytes[1], bytes[2], bytes[3]];
        self.humidity_frame_verified = verified;
        self.humidity = u16::from_be_bytes([bytes[0], bytes[1]]);

        let magnitude = u16::from_be_bytes([bytes[2] & 0x7F, bytes[3]]) as i16;
        let temperature = if bytes[2] & 0x80 != 0 { -magnitude } else { magnitude };
        self.air_temperature = temperature as u16;
    }
}

impl ReadingProvider for Reading {
    fn read_channel(&self, channel: Channel) -> Option<u16> {
        Some(match channel {
            Channel::Temperature => self.temperature,
            Channel::Humidity => self.humidity,
            Channel::AirTemperature => self.air_temperature,
            Channel::Light => self.light,
            Channel::Co2 => self.co2,
            Channel::Voc => self.voc,
        })
    }
}
