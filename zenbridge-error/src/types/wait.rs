use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки ожидания на наборе источников.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WaitError {
    /// Ни один источник не стал готов за отведённое время.
    #[error("wait timed out: no condition became ready")]
    Timeout,
}

impl ErrorExt for WaitError {
    fn status_code(&self) -> StatusCode {
        StatusCode::Timeout
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
