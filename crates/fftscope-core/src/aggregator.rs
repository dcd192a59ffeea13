//! Snapshot aggregator: the render-loop half of the pipeline
//!
//! Once per tick the aggregator drains every hand-off queue into its rolling
//! window and publishes a fresh [`Snapshot`]. The whole drain runs under one
//! mutex, which the ingestion side never takes.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use log::debug;

use crate::Timestamp;
use crate::session::SessionState;
use crate::sink::{self, IngestionSink, Queues};
use crate::snapshot::{RawSample, Snapshot, SpectrumSample};
use crate::window::{
    RAW_WINDOW_CAPACITY, RollingWindow, SPECTRUM_WINDOW_CAPACITY, TIMESTAMP_WINDOW_CAPACITY,
};

/// Create a connected sink/aggregator pair sharing `session`
pub fn pipeline(session: Arc<SessionState>) -> (IngestionSink, SnapshotAggregator) {
    let (producers, queues) = sink::queues();
    (
        IngestionSink::new(producers, session),
        SnapshotAggregator::new(queues),
    )
}

/// Rolling windows plus the consumer ends of the queues feeding them
struct AggregatorState {
    queues: Queues,
    temperature_raw: RollingWindow<RawSample, RAW_WINDOW_CAPACITY>,
    humidity_raw: RollingWindow<RawSample, RAW_WINDOW_CAPACITY>,
    temperature_spectrum: RollingWindow<SpectrumSample, SPECTRUM_WINDOW_CAPACITY>,
    humidity_spectrum: RollingWindow<SpectrumSample, SPECTRUM_WINDOW_CAPACITY>,
    timestamps: RollingWindow<Timestamp, TIMESTAMP_WINDOW_CAPACITY>,
    humidity_timestamps: RollingWindow<Timestamp, TIMESTAMP_WINDOW_CAPACITY>,
    device_status: Option<String>,
}

impl AggregatorState {
    fn new(queues: Queues) -> Self {
        Self {
            queues,
            temperature_raw: RollingWindow::new(),
            humidity_raw: RollingWindow::new(),
            temperature_spectrum: RollingWindow::new(),
            humidity_spectrum: RollingWindow::new(),
            timestamps: RollingWindow::new(),
            humidity_timestamps: RollingWindow::new(),
            device_status: None,
        }
    }

    /// Fold every available item into its window, returning how many were taken
    fn drain(&mut self) -> usize {
        let mut drained = 0;

        for sample in self.queues.temperature_spectrum.drain() {
            self.timestamps.push_if_greater(sample.received_at);
            self.temperature_spectrum.push(sample);
            drained += 1;
        }

        for sample in self.queues.humidity_spectrum.drain() {
            self.humidity_timestamps.push_if_greater(sample.received_at);
            self.humidity_spectrum.push(sample);
            drained += 1;
        }

        for sample in self.queues.temperature_raw.drain() {
            self.temperature_raw.push(sample);
            drained += 1;
        }

        for sample in self.queues.humidity_raw.drain() {
            self.humidity_raw.push(sample);
            drained += 1;
        }

        for status in self.queues.status.drain() {
            self.device_status = Some(status);
            drained += 1;
        }

        drained
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            temperature_raw: self.temperature_raw.to_vec(),
            humidity_raw: self.humidity_raw.to_vec(),
            temperature_spectrum: self.temperature_spectrum.to_vec(),
            humidity_spectrum: self.humidity_spectrum.to_vec(),
            timestamps: self.timestamps.to_vec(),
            humidity_timestamps: self.humidity_timestamps.to_vec(),
            device_status: self.device_status.clone(),
        }
    }
}

/// Drains hand-off queues into rolling windows once per render tick
pub struct SnapshotAggregator {
    state: Mutex<AggregatorState>,
    latest: RwLock<Arc<Snapshot>>,
}

impl SnapshotAggregator {
    fn new(queues: Queues) -> Self {
        Self {
            state: Mutex::new(AggregatorState::new(queues)),
            latest: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    /// Drain all queues, fold them into the windows and publish a snapshot.
    ///
    /// Only one tick runs at a time. A tick that finds every queue empty
    /// returns the previously published snapshot unchanged.
    pub fn tick(&self) -> Arc<Snapshot> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let drained = state.drain();
        if drained == 0 {
            return self.latest();
        }

        let snapshot = Arc::new(state.snapshot());
        // Published while the state lock is still held so that `latest` can
        // never go back to an older tick.
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&snapshot);

        debug!(
            "Tick drained {} records (raw {}/{}, spectra {}/{})",
            drained,
            state.temperature_raw.len(),
            state.humidity_raw.len(),
            state.temperature_spectrum.len(),
            state.humidity_spectrum.len()
        );
        snapshot
    }

    /// Most recently published snapshot, without draining anything
    pub fn latest(&self) -> Arc<Snapshot> {
        Arc::clone(&self.latest.read().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MessageHandler;
    use chrono::{Local, TimeZone};

    fn at(secs: i64) -> Timestamp {
        Local.timestamp_opt(secs, 0).unwrap()
    }

    fn setup() -> (IngestionSink, SnapshotAggregator) {
        pipeline(Arc::new(SessionState::new()))
    }

    fn temperature_values(snapshot: &Snapshot) -> Vec<f64> {
        snapshot.temperature_raw().iter().map(|s| s.value).collect()
    }

    #[test]
    fn test_single_raw_reading() {
        let (sink, aggregator) = setup();
        sink.on_message("temperature", b"21.5", Local::now());

        let snapshot = aggregator.tick();
        assert_eq!(temperature_values(&snapshot), vec![21.5]);
    }

    #[test]
    fn test_spectrum_records_build_timestamp_axis() {
        let (sink, aggregator) = setup();
        let payload = br#"{"freq":0.002,"amplitude":3.1}"#;
        sink.on_message("temperature/fft", payload, at(1_000));
        sink.on_message("temperature/fft", payload, at(1_002));

        let snapshot = aggregator.tick();
        assert_eq!(snapshot.temperature_spectrum().len(), 2);
        assert_eq!(snapshot.timestamps(), &[at(1_000), at(1_002)]);
        assert!(snapshot.humidity_timestamps().is_empty());
    }

    #[test]
    fn test_timestamp_axis_rejects_inversion() {
        let (sink, aggregator) = setup();
        let payload = br#"{"freq":0.002,"amplitude":3.1}"#;
        sink.on_message("/temperature/fft", payload, at(1_005));
        sink.on_message("/temperature/fft", payload, at(1_001));
        sink.on_message("/temperature/fft", payload, at(1_005));
        sink.on_message("/temperature/fft", payload, at(1_006));

        let snapshot = aggregator.tick();
        assert_eq!(snapshot.temperature_spectrum().len(), 4);
        assert_eq!(snapshot.timestamps(), &[at(1_005), at(1_006)]);
    }

    #[test]
    fn test_humidity_spectrum_has_own_axis() {
        let (sink, aggregator) = setup();
        sink.on_message("/humidity/fft", br#"{"freq":0.01,"amplitude":2.0}"#, at(50));

        let snapshot = aggregator.tick();
        assert_eq!(snapshot.humidity_spectrum().len(), 1);
        assert_eq!(snapshot.humidity_timestamps(), &[at(50)]);
        assert!(snapshot.timestamps().is_empty());
    }

    #[test]
    fn test_raw_window_is_bounded() {
        let (sink, aggregator) = setup();
        for i in 1..=105 {
            sink.on_message("/temperature", i.to_string().as_bytes(), Local::now());
        }

        let snapshot = aggregator.tick();
        let expected: Vec<f64> = (6..=105).map(f64::from).collect();
        assert_eq!(temperature_values(&snapshot), expected);
    }

    #[test]
    fn test_malformed_spectrum_leaves_window_untouched() {
        let (sink, aggregator) = setup();
        sink.on_message("/temperature/fft", b"{\"freq\": oops}", Local::now());

        let snapshot = aggregator.tick();
        assert!(snapshot.temperature_spectrum().is_empty());
        assert!(snapshot.timestamps().is_empty());
    }

    #[test]
    fn test_tick_without_data() {
        let (_sink, aggregator) = setup();
        let snapshot = aggregator.tick();
        assert!(snapshot.is_empty());
        assert!(snapshot.timestamps().is_empty());
        assert_eq!(*snapshot, Snapshot::default());
    }

    #[test]
    fn test_empty_tick_is_idempotent() {
        let (sink, aggregator) = setup();
        sink.on_message("/humidity", b"40.5", Local::now());
        sink.on_message("/online", b"online", Local::now());

        let first = aggregator.tick();
        let second = aggregator.tick();
        assert_eq!(first, second);
        assert_eq!(second.device_status(), Some("online"));
    }

    #[test]
    fn test_ticks_accumulate_in_order() {
        let (sink, aggregator) = setup();
        sink.on_message("/temperature", b"1", Local::now());
        aggregator.tick();
        sink.on_message("/temperature", b"2", Local::now());
        sink.on_message("/temperature", b"3", Local::now());

        let snapshot = aggregator.tick();
        assert_eq!(temperature_values(&snapshot), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_latest_tracks_tick() {
        let (sink, aggregator) = setup();
        assert!(aggregator.latest().is_empty());

        sink.on_message("/temperature", b"19", Local::now());
        let ticked = aggregator.tick();
        assert_eq!(aggregator.latest(), ticked);
    }
}
