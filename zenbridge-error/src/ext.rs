use std::{any::Any, error::Error};

use crate::{LogLevel, StatusCode};

/// Расширение для ошибок моста (object-safe).
///
/// Каждая ошибка сообщает свой [`StatusCode`]; по нему код, отбрасывающий
/// сообщение, выбирает уровень логирования.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Статус ошибки.
    ///
    /// По умолчанию возвращает [`StatusCode::Internal`].
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    /// Возвращает ошибку как [`Any`](std::any::Any),
    /// чтобы можно было выполнить downcast к конкретному типу.
    fn as_any(&self) -> &dyn Any;

    /// Уровень, с которым стоит логировать эту ошибку.
    fn log_level(&self) -> LogLevel {
        self.status_code().log_level()
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;

    #[derive(Debug)]
    struct Opaque;

    impl fmt::Display for Opaque {
        fn fmt(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            f.write_str("opaque failure")
        }
    }

    impl Error for Opaque {}

    impl ErrorExt for Opaque {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// Тест проверяет значения по умолчанию: `Internal` и уровень `Error`.
    #[test]
    fn test_defaults() {
        assert_eq!(Opaque.status_code(), StatusCode::Internal);
        assert_eq!(Opaque.log_level(), LogLevel::Error);
    }

    /// Тест проверяет downcast через trait-объект.
    #[test]
    fn test_as_any_downcast() {
        let err: Box<dyn ErrorExt> = Box::new(Opaque);
        assert!(err.as_any().downcast_ref::<Opaque>().is_some());
    }
}
