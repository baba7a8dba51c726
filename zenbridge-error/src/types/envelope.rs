use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки декодирования конверта (метаданных сообщения).
///
/// Все варианты восстановимы: отбрасывается сообщение, а не соединение.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Вложение отсутствует или пустое.
    #[error("received empty envelope")]
    EmptyInput,

    /// Обязательное поле не найдено.
    #[error("{field} is not found in the envelope")]
    MissingField { field: &'static str },

    /// Поле фиксированного размера имеет неверную длину.
    #[error("the length of {field} mismatched: expected {expected}, got {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Поле повреждено или обрезано.
    #[error("failed to deserialize {field}: {reason}")]
    Malformed { field: String, reason: String },
}

impl EnvelopeError {
    /// Имя поля, к которому относится ошибка (если есть).
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::EmptyInput => None,
            Self::MissingField { field } | Self::LengthMismatch { field, .. } => Some(*field),
            Self::Malformed { field, .. } => Some(field.as_str()),
        }
    }
}

impl ErrorExt for EnvelopeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyInput => StatusCode::EmptyInput,
            Self::MissingField { .. } => StatusCode::MissingField,
            Self::LengthMismatch { .. } => StatusCode::LengthMismatch,
            Self::Malformed { .. } => StatusCode::DecodingError,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
