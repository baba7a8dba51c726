use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки адаптации профиля QoS.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QosError {
    /// Политика истории не поддерживается (например, keep-all).
    #[error("QoS history policy is not supported: {policy}")]
    UnsupportedHistory { policy: String },
}

impl ErrorExt for QosError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UnsupportedQos
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
