use thiserror::Error;

/// Errors that end the application or abort an operator command
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable holds a value that cannot be used
    #[error("invalid value for {key}: '{value}'")]
    Config { key: &'static str, value: String },

    #[error("MQTT client error: {0}")]
    Transport(#[from] rumqttc::ClientError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to render frame: {0}")]
    Render(String),
}
