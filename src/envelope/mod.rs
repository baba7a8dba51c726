//! Конверт сообщения (envelope).
//!
//! Небольшая запись метаданных, которая путешествует рядом с полезной
//! нагрузкой каждого сообщения:
//!
//! - `sequence_number`: номер последовательности, монотонный в пределах
//!   одного отправителя (не глобально);
//! - `source_timestamp`: время отправки в наносекундах;
//! - `source_gid`: идентификатор экземпляра отправителя ([`Gid`]).
//!
//! Формат на проводе описан в [`codec`].

pub mod codec;
mod tags;

use std::fmt;

use bytes::Bytes;
use rand::Rng;
use zenbridge_error::EnvelopeError;

pub use codec::{decode, encode};
pub use tags::{KEY_SEQUENCE_NUMBER, KEY_SOURCE_GID, KEY_SOURCE_TIMESTAMP};

use crate::time;

/// Размер идентификатора отправителя в байтах.
pub const GID_SIZE: usize = 16;

/// Непрозрачный идентификатор экземпляра конечной точки.
///
/// Уникален на протяжении жизни экземпляра, который произвёл сообщение.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Gid([u8; GID_SIZE]);

/// Метаданные, сопровождающие полезную нагрузку.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Envelope {
    pub sequence_number: i64,
    pub source_timestamp: i64,
    pub source_gid: Gid,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Gid {
    pub const fn new(bytes: [u8; GID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Генерирует случайный идентификатор для нового экземпляра.
    pub fn random() -> Self {
        let mut bytes = [0u8; GID_SIZE];
        rand::thread_rng().fill(&mut bytes);
        Self(bytes)
    }

    /// Создаёт идентификатор из среза, проверяя длину.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        let array: [u8; GID_SIZE] =
            bytes
                .try_into()
                .map_err(|_| EnvelopeError::LengthMismatch {
                    field: KEY_SOURCE_GID,
                    expected: GID_SIZE,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; GID_SIZE] {
        &self.0
    }
}

impl Envelope {
    pub fn new(
        sequence_number: i64,
        source_timestamp: i64,
        source_gid: Gid,
    ) -> Self {
        Self {
            sequence_number,
            source_timestamp,
            source_gid,
        }
    }

    /// Конверт с текущим временем отправки.
    pub fn stamped(
        sequence_number: i64,
        source_gid: Gid,
    ) -> Self {
        Self::new(sequence_number, time::now_nanos(), source_gid)
    }

    /// Сериализует конверт в самоописывающую последовательность ключ/значение.
    pub fn encode(&self) -> Bytes {
        codec::encode(self)
    }

    /// Десериализует конверт, сообщая, какое поле отсутствует или повреждено.
    pub fn decode(input: &[u8]) -> Result<Self, EnvelopeError> {
        codec::decode(input)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl From<[u8; GID_SIZE]> for Gid {
    fn from(bytes: [u8; GID_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Gid {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Gid {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Gid({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет hex-представление идентификатора.
    #[test]
    fn test_gid_display_hex() {
        let mut bytes = [0u8; GID_SIZE];
        bytes[0] = 0xab;
        bytes[15] = 0x01;
        let gid = Gid::new(bytes);
        assert_eq!(gid.to_string(), "ab000000000000000000000000000001");
        assert_eq!(format!("{gid:?}"), "Gid(ab000000000000000000000000000001)");
    }

    /// Тест проверяет, что срез неправильной длины отклоняется.
    #[test]
    fn test_gid_from_slice_length_mismatch() {
        let err = Gid::from_slice(&[1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            EnvelopeError::LengthMismatch {
                field: KEY_SOURCE_GID,
                expected: GID_SIZE,
                actual: 3,
            }
        );
        assert!(Gid::from_slice(&[7u8; GID_SIZE]).is_ok());
    }

    /// Тест проверяет, что два случайных идентификатора различаются.
    #[test]
    fn test_gid_random_is_unique() {
        assert_ne!(Gid::random(), Gid::random());
    }

    /// Тест проверяет, что `stamped` проставляет время отправки.
    #[test]
    fn test_envelope_stamped_sets_timestamp() {
        let gid = Gid::random();
        let env = Envelope::stamped(5, gid);
        assert_eq!(env.sequence_number, 5);
        assert_eq!(env.source_gid, gid);
        assert!(env.source_timestamp > 0);
    }
}
