use std::any::Any;

use thiserror::Error;
use zenbridge_error::{
    CorrelationError, EnvelopeError, ErrorExt, QosError, QueueError, StatusCode, WaitError,
};

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Общая ошибка моста: объединяет ошибки всех компонентов.
#[derive(Error, Debug)]
pub enum BridgeError {
    // ==== Компоненты ====
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Correlation(#[from] CorrelationError),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error(transparent)]
    Wait(#[from] WaitError),

    #[error(transparent)]
    Qos(#[from] QosError),

    // ==== Конфигурация ====
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ==== Транспорт ====
    #[error("Endpoint '{endpoint}' is shut down")]
    Shutdown { endpoint: String },

    #[error("No queryable declared for key '{key}'")]
    NoRoute { key: String },
}

impl ErrorExt for BridgeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Queue(e) => e.status_code(),
            Self::Correlation(e) => e.status_code(),
            Self::Envelope(e) => e.status_code(),
            Self::Wait(e) => e.status_code(),
            Self::Qos(e) => e.status_code(),
            Self::Config(_) | Self::InvalidConfig(_) => StatusCode::ConfigError,
            Self::Shutdown { .. } => StatusCode::Shutdown,
            Self::NoRoute { .. } => StatusCode::NotFound,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Логирует отброшенное сообщение с уровнем, который задаёт статус ошибки.
///
/// Поле `error` добавляется автоматически:
/// `log_dropped!(&err, client = %key, "dropping unmatched reply")`.
macro_rules! log_dropped {
    ($err:expr, $($rest:tt)+) => {{
        use ::zenbridge_error::{ErrorExt as _, LogLevel};
        let err = $err;
        match err.log_level() {
            LogLevel::Trace => ::tracing::trace!(error = %err, $($rest)+),
            LogLevel::Debug => ::tracing::debug!(error = %err, $($rest)+),
            LogLevel::Info => ::tracing::info!(error = %err, $($rest)+),
            LogLevel::Warn => ::tracing::warn!(error = %err, $($rest)+),
            LogLevel::Error => ::tracing::error!(error = %err, $($rest)+),
        }
    }};
}

pub(crate) use log_dropped;
