//! CSV export of a snapshot
//!
//! The series in a snapshot have independent lengths. Export joins them on
//! their position: row `i` holds the `i`-th element of every series that has
//! one, and leaves the other columns blank.
//!
//! The timestamp column carries the timestamp axis. Row `i` shows the arrival
//! time of the `i`-th temperature spectrum record when that time is on the
//! axis; records the axis rejected as out of order get a blank timestamp.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::SecondsFormat;
use log::info;
use thiserror::Error;

use crate::Timestamp;
use crate::record::SpectrumRecord;
use crate::snapshot::Snapshot;

/// Column header of the export file
pub const EXPORT_HEADER: &str = "index,timestamp,temp_raw,humid_raw,temp_freq,temp_amplitude,temp_period_min,humid_freq,humid_amplitude,humid_period_min";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no data to export yet")]
    NoData,
    #[error("failed to write export: {0}")]
    Io(#[from] io::Error),
}

/// One index-joined row; `None` fields are written blank
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportRow {
    pub index: usize,
    pub timestamp: Option<Timestamp>,
    pub temperature_raw: Option<f64>,
    pub humidity_raw: Option<f64>,
    pub temperature_spectrum: Option<SpectrumRecord>,
    pub humidity_spectrum: Option<SpectrumRecord>,
}

/// Table built from a snapshot, ready to be written out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportTable {
    rows: Vec<ExportRow>,
}

impl ExportTable {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let axis = snapshot.timestamps();
        let rows = (0..snapshot.max_len())
            .map(|index| ExportRow {
                index,
                timestamp: snapshot
                    .temperature_spectrum()
                    .get(index)
                    .map(|s| s.received_at)
                    .filter(|t| axis.binary_search(t).is_ok()),
                temperature_raw: snapshot.temperature_raw().get(index).map(|s| s.value),
                humidity_raw: snapshot.humidity_raw().get(index).map(|s| s.value),
                temperature_spectrum: snapshot.temperature_spectrum().get(index).map(|s| s.record),
                humidity_spectrum: snapshot.humidity_spectrum().get(index).map(|s| s.record),
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[ExportRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the header and every row as comma-separated text
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "{}", EXPORT_HEADER)?;

        for row in &self.rows {
            let timestamp = row
                .timestamp
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, false))
                .unwrap_or_default();

            write!(
                out,
                "{},{},{},{}",
                row.index,
                timestamp,
                field(row.temperature_raw),
                field(row.humidity_raw)
            )?;
            write_spectrum(&mut out, row.temperature_spectrum.as_ref())?;
            write_spectrum(&mut out, row.humidity_spectrum.as_ref())?;
            writeln!(out)?;
        }

        out.flush()
    }
}

fn field(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_spectrum<W: Write>(out: &mut W, spectrum: Option<&SpectrumRecord>) -> io::Result<()> {
    match spectrum {
        Some(s) => write!(
            out,
            ",{},{},{}",
            s.freq,
            s.amplitude,
            field(s.effective_period_min())
        ),
        None => write!(out, ",,,"),
    }
}

/// Default export file name for an export taken at `now`
pub fn default_filename(now: Timestamp) -> String {
    now.format("fft_export_%Y%m%d_%H%M%S.csv").to_string()
}

/// Export `snapshot` into `dir` under the default file name.
///
/// Returns the path written, or [`ExportError::NoData`] when every window is
/// still empty.
pub fn export_snapshot(
    snapshot: &Snapshot,
    dir: &Path,
    now: Timestamp,
) -> Result<PathBuf, ExportError> {
    let table = ExportTable::from_snapshot(snapshot);
    if snapshot.is_empty() || table.is_empty() {
        return Err(ExportError::NoData);
    }

    let path = dir.join(default_filename(now));
    let file = File::create(&path)?;
    table.write_csv(BufWriter::new(file))?;

    info!("Exported {} rows to {}", table.rows().len(), path.display());
    Ok(path)
}
