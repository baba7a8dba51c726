use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки таблицы корреляции запросов и ответов.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelationError {
    /// Запрошена таблица нулевой ёмкости.
    #[error("correlation table capacity must be at least 1")]
    ZeroCapacity,

    /// Не удалось выделить память под слоты.
    #[error("failed to allocate correlation table with capacity {capacity}")]
    Allocation { capacity: usize },

    /// Хэш ключа равен 0 и неотличим от пустого слота.
    #[error("computed correlation hash of value 0 is not allowed")]
    DegenerateHash,

    /// Такой ключ уже ожидает ответа.
    #[error("correlation key {hash:#010x} is already pending; is the sender incrementing sequence numbers?")]
    DuplicateKey { hash: u32 },

    /// Свободных слотов нет.
    #[error("correlation table is full (capacity {capacity})")]
    TableFull { capacity: usize },

    /// Ключа нет в таблице: ответ или дубликат не соответствует ни одной
    /// ожидающей операции.
    #[error("no pending operation for correlation key {hash:#010x}")]
    NotFound { hash: u32 },
}

impl ErrorExt for CorrelationError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ZeroCapacity => StatusCode::ZeroCapacity,
            Self::Allocation { .. } => StatusCode::AllocationFailed,
            Self::DegenerateHash => StatusCode::InvalidKey,
            Self::DuplicateKey { .. } => StatusCode::AlreadyExists,
            Self::TableFull { .. } => StatusCode::CapacityExceeded,
            Self::NotFound { .. } => StatusCode::NotFound,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
