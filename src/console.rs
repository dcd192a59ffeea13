//! Operator console on stdin
//!
//! | Input    | Action                                   |
//! |----------|------------------------------------------|
//! | `s`      | print the status report                  |
//! | `e`      | export the latest snapshot as CSV        |
//! | `p`      | save a PNG screenshot of the dashboard   |
//! | `q`      | quit                                     |
//! | `h`, `?` | print this help                          |
//!
//! Status and export are served directly from the console thread using the
//! latest published snapshot. Requests that need the render loop (quit,
//! screenshot) are handed over through a queue the loop drains every frame.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::Local;
use fftscope_core::export::{ExportError, export_snapshot};
use fftscope_core::handoff::Producer;
use fftscope_core::{SessionState, SnapshotAggregator, StatusReport};
use log::{debug, error};

use crate::config::DashboardConfig;

pub const HELP: &str = "\
Commands:
  s      status report
  e      export data to CSV
  p      save a screenshot
  q      quit
  h, ?   this help";

/// A parsed console line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Status,
    Export,
    Screenshot,
    Quit,
    Help,
}

impl Command {
    /// Parse one input line; case and surrounding whitespace are ignored
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "s" | "status" => Some(Self::Status),
            "e" | "export" => Some(Self::Export),
            "p" | "screenshot" => Some(Self::Screenshot),
            "q" | "quit" | "exit" => Some(Self::Quit),
            "h" | "?" | "help" => Some(Self::Help),
            _ => None,
        }
    }
}

/// Work the console hands to the render loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleRequest {
    Screenshot,
    Quit,
}

pub struct Console {
    session: Arc<SessionState>,
    aggregator: Arc<SnapshotAggregator>,
    config: DashboardConfig,
    requests: Producer<ConsoleRequest>,
}

impl Console {
    pub fn new(
        session: Arc<SessionState>,
        aggregator: Arc<SnapshotAggregator>,
        config: DashboardConfig,
        requests: Producer<ConsoleRequest>,
    ) -> Self {
        Self {
            session,
            aggregator,
            config,
            requests,
        }
    }

    /// Read commands from stdin on a dedicated thread
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new().name("console".into()).spawn(move || {
            let stdin = io::stdin();
            if let Err(e) = self.run(stdin.lock(), io::stdout()) {
                error!("Console stopped: {}", e);
            }
        })
    }

    /// Process lines from `input` until quit or end of input
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut out: W) -> io::Result<()> {
        writeln!(out, "{}", HELP)?;

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match Command::parse(&line) {
                Some(command) => {
                    if !self.execute(command, &mut out)? {
                        break;
                    }
                }
                None => writeln!(out, "Unknown command '{}'\n{}", line.trim(), HELP)?,
            }
            out.flush()?;
        }

        debug!("Console input closed");
        Ok(())
    }

    /// Run one command; returns `false` once the console should stop reading
    pub fn execute<W: Write>(&self, command: Command, out: &mut W) -> io::Result<bool> {
        match command {
            Command::Status => {
                let report = StatusReport::new(
                    &self.session,
                    &self.aggregator.latest(),
                    Local::now(),
                    self.config.stale_after(),
                );
                writeln!(out, "{}", report)?;
            }
            Command::Export => {
                let snapshot = self.aggregator.latest();
                match export_snapshot(&snapshot, &self.config.export_dir, Local::now()) {
                    Ok(path) => writeln!(out, "Exported to {}", path.display())?,
                    Err(ExportError::NoData) => writeln!(out, "No data to export yet")?,
                    Err(e) => {
                        error!("Export failed: {}", e);
                        writeln!(out, "Export failed: {}", e)?;
                    }
                }
            }
            Command::Screenshot => {
                if self.requests.push(ConsoleRequest::Screenshot).is_err() {
                    writeln!(out, "Dashboard is not running")?;
                }
            }
            Command::Quit => {
                // The loop may already be gone; nothing left to do either way
                let _ = self.requests.push(ConsoleRequest::Quit);
                writeln!(out, "Shutting down")?;
                return Ok(false);
            }
            Command::Help => writeln!(out, "{}", HELP)?,
        }

        Ok(true)
    }
}
