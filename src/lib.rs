//! Host side of fftscope: configuration, the MQTT transport, the operator
//! console and frame output. The data path itself lives in `fftscope-core`.

pub mod config;
pub mod console;
pub mod error;
pub mod render;
pub mod transport;

pub use config::{BrokerConfig, DashboardConfig};
pub use error::AppError;
