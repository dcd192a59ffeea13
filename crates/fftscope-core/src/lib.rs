//! Transport-independent core library for fftscope
//!
//! This crate contains everything between "a message arrived on the bus" and
//! "a frame was drawn": topic routing, payload decoding, the lock-free hand-off
//! queues fed by the transport thread, the fixed-capacity rolling windows owned
//! by the render loop, snapshot publication, CSV export and chart rendering onto
//! any `embedded-graphics` draw target.
//!
//! The data path is split in two halves that only meet at the hand-off queues:
//!
//! - [`sink::IngestionSink`] runs on the transport's delivery context and never
//!   blocks.
//! - [`aggregator::SnapshotAggregator`] runs once per render tick, drains every
//!   queue under a single lock and returns an immutable [`snapshot::Snapshot`].

pub mod aggregator;
pub mod export;
pub mod handoff;
pub mod record;
pub mod session;
pub mod sink;
pub mod snapshot;
pub mod status;
pub mod topic;
pub mod ui;
pub mod window;

pub use aggregator::{SnapshotAggregator, pipeline};
pub use export::{ExportError, export_snapshot};
pub use record::{DecodeError, InboundRecord, Payload, SpectrumRecord};
pub use session::SessionState;
pub use sink::{IngestionSink, MessageHandler};
pub use snapshot::Snapshot;
pub use status::StatusReport;
pub use topic::Topic;

/// Wall-clock timestamp attached to every inbound record.
pub type Timestamp = chrono::DateTime<chrono::Local>;
