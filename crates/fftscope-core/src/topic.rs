//! Bus topics published by the sensor device

use core::fmt;

/// Logical topic an inbound message was published on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Raw temperature reading in °C
    TemperatureRaw,
    /// Raw relative humidity reading in %
    HumidityRaw,
    /// Dominant frequency/amplitude of the temperature signal
    TemperatureSpectrum,
    /// Dominant frequency/amplitude of the humidity signal
    HumiditySpectrum,
    /// Device liveness string, display only
    OnlineStatus,
}

impl Topic {
    /// Every topic the dashboard subscribes to, in subscription order.
    pub const ALL: [Topic; 5] = [
        Topic::TemperatureSpectrum,
        Topic::HumiditySpectrum,
        Topic::TemperatureRaw,
        Topic::HumidityRaw,
        Topic::OnlineStatus,
    ];

    /// Topic filter as published by the device
    pub const fn name(self) -> &'static str {
        match self {
            Self::TemperatureRaw => "/temperature",
            Self::HumidityRaw => "/humidity",
            Self::TemperatureSpectrum => "/temperature/fft",
            Self::HumiditySpectrum => "/humidity/fft",
            Self::OnlineStatus => "/online",
        }
    }

    /// Resolve a wire topic name.
    ///
    /// The leading `/` is optional so that brokers and publishers that drop it
    /// still route to the same series.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let name = name.strip_prefix('/').unwrap_or(name);
        match name {
            "temperature" => Some(Self::TemperatureRaw),
            "humidity" => Some(Self::HumidityRaw),
            "temperature/fft" => Some(Self::TemperatureSpectrum),
            "humidity/fft" => Some(Self::HumiditySpectrum),
            "online" => Some(Self::OnlineStatus),
            _ => None,
        }
    }

    /// Whether messages on this topic carry a spectrum record
    pub const fn is_spectrum(self) -> bool {
        matches!(self, Self::TemperatureSpectrum | Self::HumiditySpectrum)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
