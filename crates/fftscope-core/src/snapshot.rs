//! Point-in-time copies of the rolling windows

use crate::Timestamp;
use crate::record::SpectrumRecord;

/// A raw reading together with its arrival time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub value: f64,
    pub received_at: Timestamp,
}

impl RawSample {
    pub const fn new(value: f64, received_at: Timestamp) -> Self {
        Self { value, received_at }
    }
}

/// A spectrum record together with its arrival time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumSample {
    pub record: SpectrumRecord,
    pub received_at: Timestamp,
}

impl SpectrumSample {
    pub const fn new(record: SpectrumRecord, received_at: Timestamp) -> Self {
        Self {
            record,
            received_at,
        }
    }
}

/// Immutable copy of every window, taken under one lock
///
/// Produced by [`SnapshotAggregator::tick`](crate::SnapshotAggregator::tick)
/// and shared with the renderer, the console and the exporter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub(crate) temperature_raw: Vec<RawSample>,
    pub(crate) humidity_raw: Vec<RawSample>,
    pub(crate) temperature_spectrum: Vec<SpectrumSample>,
    pub(crate) humidity_spectrum: Vec<SpectrumSample>,
    pub(crate) timestamps: Vec<Timestamp>,
    pub(crate) humidity_timestamps: Vec<Timestamp>,
    pub(crate) device_status: Option<String>,
}

impl Snapshot {
    pub fn temperature_raw(&self) -> &[RawSample] {
        &self.temperature_raw
    }

    pub fn humidity_raw(&self) -> &[RawSample] {
        &self.humidity_raw
    }

    pub fn temperature_spectrum(&self) -> &[SpectrumSample] {
        &self.temperature_spectrum
    }

    pub fn humidity_spectrum(&self) -> &[SpectrumSample] {
        &self.humidity_spectrum
    }

    /// Strictly increasing arrival times of temperature spectrum records
    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    /// Strictly increasing arrival times of humidity spectrum records
    pub fn humidity_timestamps(&self) -> &[Timestamp] {
        &self.humidity_timestamps
    }

    /// Last status string published by the device
    pub fn device_status(&self) -> Option<&str> {
        self.device_status.as_deref()
    }

    /// Whether every data window is empty
    pub fn is_empty(&self) -> bool {
        self.temperature_raw.is_empty()
            && self.humidity_raw.is_empty()
            && self.temperature_spectrum.is_empty()
            && self.humidity_spectrum.is_empty()
    }

    /// Length of the longest data window
    pub fn max_len(&self) -> usize {
        [
            self.temperature_raw.len(),
            self.humidity_raw.len(),
            self.temperature_spectrum.len(),
            self.humidity_spectrum.len(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Summary statistics for one series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl SeriesStats {
    /// Compute statistics over `values`; `None` when there are none
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut count = 0usize;

        for value in values {
            sum += value;
            min = min.min(value);
            max = max.max(value);
            count += 1;
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            mean: sum / count as f64,
            min,
            max,
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn at(secs: i64) -> Timestamp {
        Local.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.max_len(), 0);
        assert_eq!(snapshot.device_status(), None);
    }

    #[test]
    fn test_max_len_spans_all_series() {
        let snapshot = Snapshot {
            temperature_raw: vec![RawSample::new(20.0, at(1)); 3],
            humidity_spectrum: vec![SpectrumSample::new(SpectrumRecord::new(0.1, 1.0), at(1)); 5],
            ..Snapshot::default()
        };
        assert!(!snapshot.is_empty());
        assert_eq!(snapshot.max_len(), 5);
    }

    #[test]
    fn test_max_len_ignores_timestamp_axis() {
        let snapshot = Snapshot {
            temperature_spectrum: vec![SpectrumSample::new(SpectrumRecord::new(0.1, 1.0), at(9)); 2],
            timestamps: (0..10).map(at).collect(),
            ..Snapshot::default()
        };
        assert_eq!(snapshot.max_len(), 2);
    }

    #[test]
    fn test_stats() {
        let stats = SeriesStats::of([20.0, 22.0, 24.0]).unwrap();
        assert_eq!(stats.mean, 22.0);
        assert_eq!(stats.min, 20.0);
        assert_eq!(stats.max, 24.0);
        assert_eq!(stats.count, 3);
    }

    #[test]
    fn test_stats_of_nothing() {
        assert_eq!(SeriesStats::of(std::iter::empty()), None);
    }
}
