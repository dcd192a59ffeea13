//! Session-wide counters and connection state
//!
//! Written only from the two transport entry points (message delivery and
//! connection change) and read from anywhere through plain atomic loads, so the
//! console and render contexts never coordinate with ingestion.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use chrono::{Local, TimeDelta, TimeZone};

use crate::Timestamp;

/// Default age in seconds after which the feed is considered stale
pub const DEFAULT_STALE_AFTER_SECS: i64 = 30;

/// Sentinel stored in `last_message_ms` before the first message
const NO_MESSAGE: i64 = i64::MIN;

/// Observability counters shared by the sink, the console and the renderer
#[derive(Debug)]
pub struct SessionState {
    connected: AtomicBool,
    message_count: AtomicU64,
    fft_message_count: AtomicU64,
    dropped_count: AtomicU64,
    last_message_ms: AtomicI64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub const fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            message_count: AtomicU64::new(0),
            fft_message_count: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            last_message_ms: AtomicI64::new(NO_MESSAGE),
        }
    }

    pub(crate) fn record_message(&self, is_spectrum: bool, at: Timestamp) {
        self.message_count.fetch_add(1, Ordering::Relaxed);
        if is_spectrum {
            self.fft_message_count.fetch_add(1, Ordering::Relaxed);
        }
        self.last_message_ms.fetch_max(at.timestamp_millis(), Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn set_connected(&self, connected: bool) -> bool {
        self.connected.swap(connected, Ordering::Relaxed)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Messages accepted since start-up
    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::Relaxed)
    }

    /// Spectrum messages accepted since start-up
    pub fn fft_message_count(&self) -> u64 {
        self.fft_message_count.load(Ordering::Relaxed)
    }

    /// Messages rejected by topic routing or decoding
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    /// Wall-clock time of the last accepted message
    pub fn last_message_at(&self) -> Option<Timestamp> {
        match self.last_message_ms.load(Ordering::Relaxed) {
            NO_MESSAGE => None,
            ms => Local.timestamp_millis_opt(ms).single(),
        }
    }

    /// Time elapsed since the last accepted message, as seen at `now`
    pub fn last_message_age(&self, now: Timestamp) -> Option<TimeDelta> {
        self.last_message_at().map(|at| now - at)
    }

    /// Whether no message has been accepted for longer than `threshold`.
    ///
    /// A session that never received anything is not stale, it is waiting.
    pub fn is_stale(&self, now: Timestamp, threshold: TimeDelta) -> bool {
        self.last_message_age(now).is_some_and(|age| age > threshold)
    }
}
