use std::fmt;

use num_enum::TryFromPrimitive;
#[cfg(feature = "serde_repr")]
use serde_repr::{Deserialize_repr, Serialize_repr};
#[cfg(feature = "strum")]
use strum_macros::{AsRefStr, EnumIter};

/// Коды статуса для категоризации ошибок моста.
///
/// # Диапазоны:
/// - 0xxx: Успех
/// - 1xxx: Общие ошибки
/// - 2xxx: Ошибки состояния (очередь, таблица корреляции)
/// - 3xxx: Ошибки ёмкости и ресурсов
/// - 4xxx: Ожидание и синхронизация
/// - 5xxx: Конверт (envelope) и формат данных
/// - 6xxx: Конфигурация и QoS
///
/// # Реализация:
/// - `num_enum::TryFromPrimitive` даёт нативную реализацию `TryFrom<u32>`.
/// - опционально: `strum` для `AsRefStr`/`EnumIter` (feature = "strum").
/// - опционально: `serde_repr` для сериализации в виде числового значения
///   (feature = "serde_repr").
#[cfg_attr(feature = "strum", derive(AsRefStr, EnumIter))]
#[cfg_attr(feature = "serde_repr", derive(Serialize_repr, Deserialize_repr))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 0xxx: Успех ===
    Success = 0,

    // === 1xxx: Общие ошибки ===
    Unknown = 1000,
    Unsupported = 1001,
    Internal = 1002,
    InvalidArgs = 1003,

    // === 2xxx: Ошибки состояния ===
    Empty = 2000,
    NotFound = 2001,
    AlreadyExists = 2002,
    InvalidKey = 2003,
    Shutdown = 2004,

    // === 3xxx: Ёмкость ===
    AllocationFailed = 3000,
    CapacityExceeded = 3001,
    ZeroCapacity = 3002,

    // === 4xxx: Ожидание ===
    Timeout = 4000,

    // === 5xxx: Формат данных ===
    EmptyInput = 5000,
    MissingField = 5001,
    LengthMismatch = 5002,
    DecodingError = 5003,

    // === 6xxx: Конфигурация ===
    ConfigError = 6000,
    UnsupportedQos = 6001,
}

/// Уровень логирования, рекомендуемый для кода статуса.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Пытается получить вариант `StatusCode` из `u32`.
    ///
    /// Использует `TryFrom<u32>` из `num_enum`; возвращает `None`, если
    /// значение не соответствует ни одному варианту.
    pub fn from_u32(v: u32) -> Option<Self> {
        Self::try_from(v).ok()
    }

    /// Вернёт `true`, если переданный `code` означает успешный результат.
    pub fn is_success(code: u32) -> bool {
        Self::Success as u32 == code
    }

    /// Можно ли просто повторить операцию позже ("данных пока нет").
    ///
    /// Пустая очередь и истёкший таймаут ожидания не являются сбоями:
    /// потребитель опрашивает источник снова.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Empty | Self::Timeout)
    }

    /// Ошибка формата входящего сообщения (диапазон 5xxx).
    ///
    /// Такое сообщение отбрасывается, соединение при этом не рвётся.
    pub fn is_decode_error(&self) -> bool {
        (5000..=5999).contains(&self.code())
    }

    /// Ошибка, указывающая на неправильное использование API вызывающей
    /// стороной (например, повтор номера последовательности).
    pub fn is_caller_misuse(&self) -> bool {
        matches!(
            self,
            Self::AlreadyExists | Self::InvalidKey | Self::InvalidArgs | Self::ZeroCapacity
        )
    }

    /// Рекомендуемый уровень логирования для данного кода.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Self::Success => LogLevel::Trace,
            Self::Empty | Self::Timeout => LogLevel::Trace,
            Self::NotFound | Self::Shutdown => LogLevel::Debug,
            Self::EmptyInput | Self::MissingField | Self::LengthMismatch | Self::DecodingError => {
                LogLevel::Warn
            }
            Self::AlreadyExists | Self::InvalidKey | Self::CapacityExceeded => LogLevel::Warn,
            Self::Internal | Self::AllocationFailed => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StatusCode
////////////////////////////////////////////////////////////////////////////////

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        #[cfg(feature = "strum")]
        {
            write!(f, "{} ({})", self.as_ref(), self.code())
        }
        #[cfg(not(feature = "strum"))]
        {
            write!(f, "{:?} ({})", self, self.code())
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
