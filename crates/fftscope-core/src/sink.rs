//! Ingestion sink: the transport-facing half of the pipeline
//!
//! Everything here runs on the transport's delivery context. Decoding, routing
//! and enqueueing are constant-time and never touch the aggregator's lock, so a
//! slow render can never stall message delivery.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::Timestamp;
use crate::handoff::{self, HandoffQueue, Producer};
use crate::record::{DecodeError, InboundRecord, Payload};
use crate::session::SessionState;
use crate::snapshot::{RawSample, SpectrumSample};
use crate::topic::Topic;

/// Narrow interface a message-bus client drives
///
/// Any transport that can report "a message arrived" and "the connection state
/// changed" can feed the dashboard through this trait.
pub trait MessageHandler: Send + Sync {
    /// Called once per received wire message, possibly from several threads
    fn on_message(&self, topic: &str, payload: &[u8], received_at: Timestamp);

    /// Called on every connect/disconnect transition
    fn on_connection_change(&self, connected: bool);
}

/// Producer halves of the five per-topic hand-off queues
#[derive(Debug, Clone)]
pub(crate) struct Producers {
    temperature_raw: Producer<RawSample>,
    humidity_raw: Producer<RawSample>,
    temperature_spectrum: Producer<SpectrumSample>,
    humidity_spectrum: Producer<SpectrumSample>,
    status: Producer<String>,
}

/// Consumer halves of the five per-topic hand-off queues
#[derive(Debug)]
pub(crate) struct Queues {
    pub(crate) temperature_raw: HandoffQueue<RawSample>,
    pub(crate) humidity_raw: HandoffQueue<RawSample>,
    pub(crate) temperature_spectrum: HandoffQueue<SpectrumSample>,
    pub(crate) humidity_spectrum: HandoffQueue<SpectrumSample>,
    pub(crate) status: HandoffQueue<String>,
}

pub(crate) fn queues() -> (Producers, Queues) {
    let (temperature_raw_tx, temperature_raw) = handoff::channel();
    let (humidity_raw_tx, humidity_raw) = handoff::channel();
    let (temperature_spectrum_tx, temperature_spectrum) = handoff::channel();
    let (humidity_spectrum_tx, humidity_spectrum) = handoff::channel();
    let (status_tx, status) = handoff::channel();

    (
        Producers {
            temperature_raw: temperature_raw_tx,
            humidity_raw: humidity_raw_tx,
            temperature_spectrum: temperature_spectrum_tx,
            humidity_spectrum: humidity_spectrum_tx,
            status: status_tx,
        },
        Queues {
            temperature_raw,
            humidity_raw,
            temperature_spectrum,
            humidity_spectrum,
            status,
        },
    )
}

/// Accepts decoded records and routes them to their hand-off queue
///
/// Cheap to clone; every clone feeds the same queues and session counters.
#[derive(Debug, Clone)]
pub struct IngestionSink {
    producers: Producers,
    session: Arc<SessionState>,
}

impl IngestionSink {
    pub(crate) fn new(producers: Producers, session: Arc<SessionState>) -> Self {
        Self { producers, session }
    }

    /// Session counters this sink updates
    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    /// Route a decoded record to its queue. Never blocks.
    pub fn submit(&self, record: InboundRecord) {
        let (topic, payload, received_at) = record.into_parts();

        let pushed = match (topic, payload) {
            (Topic::TemperatureRaw, Payload::Reading(value)) => self
                .producers
                .temperature_raw
                .push(RawSample::new(value, received_at)),
            (Topic::HumidityRaw, Payload::Reading(value)) => self
                .producers
                .humidity_raw
                .push(RawSample::new(value, received_at)),
            (Topic::TemperatureSpectrum, Payload::Spectrum(spectrum)) => self
                .producers
                .temperature_spectrum
                .push(SpectrumSample::new(spectrum, received_at)),
            (Topic::HumiditySpectrum, Payload::Spectrum(spectrum)) => self
                .producers
                .humidity_spectrum
                .push(SpectrumSample::new(spectrum, received_at)),
            (Topic::OnlineStatus, Payload::Status(status)) => self.producers.status.push(status),
            (topic, _) => {
                // InboundRecord::new/decode never build this combination
                warn!("Dropping record with payload not matching {}", topic);
                self.session.record_dropped();
                return;
            }
        };

        match pushed {
            Ok(()) => self.session.record_message(topic.is_spectrum(), received_at),
            Err(e) => {
                debug!("Dropping {} record: {}", topic, e);
                self.session.record_dropped();
            }
        }
    }

    /// Decode a raw wire message and submit it.
    ///
    /// Failures are logged and the message is dropped; nothing is enqueued.
    pub fn submit_raw(
        &self,
        topic_name: &str,
        payload: &[u8],
        received_at: Timestamp,
    ) -> Result<(), DecodeError> {
        let topic = Topic::from_name(topic_name)
            .ok_or_else(|| DecodeError::UnknownTopic(topic_name.to_owned()))?;
        let record = InboundRecord::decode(topic, payload, received_at)?;

        log_record(&record);
        self.submit(record);
        Ok(())
    }
}

impl MessageHandler for IngestionSink {
    fn on_message(&self, topic: &str, payload: &[u8], received_at: Timestamp) {
        if let Err(e) = self.submit_raw(topic, payload, received_at) {
            warn!("Dropping message on '{}': {}", topic, e);
            self.session.record_dropped();
        }
    }

    fn on_connection_change(&self, connected: bool) {
        let was_connected = self.session.set_connected(connected);
        if was_connected != connected {
            if connected {
                info!("Connected to broker");
            } else {
                info!("Disconnected from broker");
            }
        }
    }
}

fn log_record(record: &InboundRecord) {
    match record.payload() {
        Payload::Reading(value) => debug!("{} <- {}", record.topic(), value),
        Payload::Spectrum(spectrum) => debug!(
            "{} <- freq {:.4} Hz, amplitude {:.2}",
            record.topic(),
            spectrum.freq,
            spectrum.amplitude
        ),
        Payload::Status(status) => info!("Device status: {}", status),
    }
}
