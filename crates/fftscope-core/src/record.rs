//! Inbound records and payload decoding
//!
//! Decoding happens on the transport's delivery context, before anything is
//! queued: a payload either decodes completely into an [`InboundRecord`] or is
//! rejected with a [`DecodeError`]. Partially decoded records never exist.

use core::str::Utf8Error;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Timestamp;
use crate::topic::Topic;

/// Seconds per minute, used to turn a frequency into a period in minutes
const SECS_PER_MIN: f64 = 60.0;

/// Errors raised while turning a wire payload into an [`InboundRecord`]
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("topic '{0}' is not subscribed")]
    UnknownTopic(String),
    #[error("payload is not valid UTF-8: {0}")]
    NotUtf8(#[from] Utf8Error),
    #[error("'{0}' is not a decimal number")]
    InvalidNumber(String),
    #[error("{field} is not a finite number")]
    NonFinite { field: &'static str },
    #[error("spectrum payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("payload kind does not match topic {0}")]
    PayloadMismatch(Topic),
}

/// Precomputed dominant-frequency result published by the device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumRecord {
    /// Dominant frequency in Hz
    pub freq: f64,
    /// Amplitude of the dominant component
    pub amplitude: f64,
    /// Period of the dominant component in minutes, when the device sends it
    #[serde(default)]
    pub period_min: Option<f64>,
}

impl SpectrumRecord {
    pub const fn new(freq: f64, amplitude: f64) -> Self {
        Self {
            freq,
            amplitude,
            period_min: None,
        }
    }

    /// Period in minutes, derived from `freq` when the device omitted it
    pub fn effective_period_min(&self) -> Option<f64> {
        match self.period_min {
            Some(period) => Some(period),
            None if self.freq > 0.0 => Some(1.0 / self.freq / SECS_PER_MIN),
            None => None,
        }
    }

    fn validate(self) -> Result<Self, DecodeError> {
        if !self.freq.is_finite() {
            return Err(DecodeError::NonFinite { field: "freq" });
        }
        if !self.amplitude.is_finite() {
            return Err(DecodeError::NonFinite { field: "amplitude" });
        }
        if let Some(period) = self.period_min
            && !period.is_finite()
        {
            return Err(DecodeError::NonFinite {
                field: "period_min",
            });
        }
        Ok(self)
    }
}

/// Decoded payload, shape determined by the topic
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Single raw sensor reading
    Reading(f64),
    /// Spectrum analysis result
    Spectrum(SpectrumRecord),
    /// Opaque device status string
    Status(String),
}

impl Payload {
    fn matches(&self, topic: Topic) -> bool {
        match self {
            Self::Reading(_) => matches!(topic, Topic::TemperatureRaw | Topic::HumidityRaw),
            Self::Spectrum(_) => topic.is_spectrum(),
            Self::Status(_) => topic == Topic::OnlineStatus,
        }
    }
}

/// A decoded message, immutable once constructed
#[derive(Debug, Clone, PartialEq)]
pub struct InboundRecord {
    topic: Topic,
    payload: Payload,
    received_at: Timestamp,
}

impl InboundRecord {
    /// Build a record from an already-decoded payload.
    ///
    /// Fails if the payload kind does not belong on `topic`.
    pub fn new(
        topic: Topic,
        payload: Payload,
        received_at: Timestamp,
    ) -> Result<Self, DecodeError> {
        if !payload.matches(topic) {
            return Err(DecodeError::PayloadMismatch(topic));
        }
        Ok(Self {
            topic,
            payload,
            received_at,
        })
    }

    /// Decode a raw wire payload for `topic`
    pub fn decode(topic: Topic, raw: &[u8], received_at: Timestamp) -> Result<Self, DecodeError> {
        let text = core::str::from_utf8(raw)?;

        let payload = match topic {
            Topic::TemperatureRaw | Topic::HumidityRaw => Payload::Reading(parse_reading(text)?),
            Topic::TemperatureSpectrum | Topic::HumiditySpectrum => {
                let record: SpectrumRecord = serde_json::from_str(text)?;
                Payload::Spectrum(record.validate()?)
            }
            Topic::OnlineStatus => Payload::Status(text.trim().to_owned()),
        };

        Ok(Self {
            topic,
            payload,
            received_at,
        })
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn received_at(&self) -> Timestamp {
        self.received_at
    }

    /// Split the record into its parts, consuming it
    pub fn into_parts(self) -> (Topic, Payload, Timestamp) {
        (self.topic, self.payload, self.received_at)
    }
}

fn parse_reading(text: &str) -> Result<f64, DecodeError> {
    let trimmed = text.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| DecodeError::InvalidNumber(trimmed.to_owned()))?;

    if !value.is_finite() {
        return Err(DecodeError::NonFinite { field: "reading" });
    }
    Ok(value)
}
