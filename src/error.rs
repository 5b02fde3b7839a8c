//! Startup errors. Everything after the window opens is reported in-app.

use crate::api::TransportError;
use crate::config::ConfigError;
use crate::logging::LoggingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("Cannot reach study server: {0}")]
    Transport(#[from] TransportError),

    #[error("Window error: {0}")]
    Window(#[from] eframe::Error),
}
