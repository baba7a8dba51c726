//! Ключи и теги бинарного формата конверта.
//!
//! Каждое поле записывается как `key_len:u8 | key | tag:u8 | value`.
//! Используется в модуле `codec`.

/// Ключ номера последовательности.
pub const KEY_SEQUENCE_NUMBER: &str = "sequence_number";
/// Ключ времени отправки.
pub const KEY_SOURCE_TIMESTAMP: &str = "source_timestamp";
/// Ключ идентификатора отправителя.
pub const KEY_SOURCE_GID: &str = "source_gid";

/// Байтовая строка (`len:u32 BE | bytes`)
pub const TAG_BYTES: u8 = 0x01;
/// Целое число со знаком (i64 BE)
pub const TAG_I64: u8 = 0x02;
