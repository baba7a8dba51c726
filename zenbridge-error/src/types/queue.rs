use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки кольцевой очереди сообщений.
///
/// Переполнение ошибкой не является: очередь молча вытесняет самое старое
/// сообщение.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Запрошена очередь нулевой ёмкости.
    #[error("queue capacity must be at least 1")]
    ZeroCapacity,

    /// Не удалось выделить память под слоты.
    #[error("failed to allocate message queue with capacity {capacity}")]
    Allocation { capacity: usize },

    /// Извлечение из пустой очереди.
    #[error("message queue is empty")]
    Empty,
}

impl ErrorExt for QueueError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ZeroCapacity => StatusCode::ZeroCapacity,
            Self::Allocation { .. } => StatusCode::AllocationFailed,
            Self::Empty => StatusCode::Empty,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
