//! Operator status report

use core::fmt;

use chrono::TimeDelta;

use crate::Timestamp;
use crate::session::SessionState;
use crate::snapshot::Snapshot;

/// Status of the session as seen at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub connected: bool,
    pub message_count: u64,
    pub fft_message_count: u64,
    pub dropped_count: u64,
    pub last_message_age: Option<TimeDelta>,
    pub stale: bool,
    pub device_status: Option<String>,
    pub temperature_samples: usize,
    pub humidity_samples: usize,
    pub temperature_analyses: usize,
    pub humidity_analyses: usize,
}

impl StatusReport {
    pub fn new(
        session: &SessionState,
        snapshot: &Snapshot,
        now: Timestamp,
        stale_after: TimeDelta,
    ) -> Self {
        Self {
            connected: session.is_connected(),
            message_count: session.message_count(),
            fft_message_count: session.fft_message_count(),
            dropped_count: session.dropped_count(),
            last_message_age: session.last_message_age(now),
            stale: session.is_stale(now, stale_after),
            device_status: snapshot.device_status().map(str::to_owned),
            temperature_samples: snapshot.temperature_raw().len(),
            humidity_samples: snapshot.humidity_raw().len(),
            temperature_analyses: snapshot.temperature_spectrum().len(),
            humidity_analyses: snapshot.humidity_spectrum().len(),
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== fftscope status ===")?;
        writeln!(
            f,
            "Broker:        {}",
            if self.connected {
                "connected"
            } else {
                "disconnected"
            }
        )?;
        writeln!(
            f,
            "Device:        {}",
            self.device_status.as_deref().unwrap_or("unknown")
        )?;
        writeln!(f, "Messages:      {}", self.message_count)?;
        writeln!(f, "FFT messages:  {}", self.fft_message_count)?;
        writeln!(f, "Dropped:       {}", self.dropped_count)?;
        match self.last_message_age {
            Some(age) => writeln!(
                f,
                "Last message:  {:.1}s ago",
                age.num_milliseconds() as f64 / 1000.0
            )?,
            None => writeln!(f, "Last message:  never")?,
        }
        writeln!(
            f,
            "Samples:       temperature {}, humidity {}",
            self.temperature_samples, self.humidity_samples
        )?;
        write!(
            f,
            "Analyses:      temperature {}, humidity {}",
            self.temperature_analyses, self.humidity_analyses
        )?;
        if self.stale {
            write!(
                f,
                "\nWARNING: no messages received recently, check the device and broker"
            )?;
        }
        Ok(())
    }
}
