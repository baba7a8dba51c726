use std::fmt;

use crate::envelope::{Envelope, Gid};

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Ключ, по которому таблица корреляции сопоставляет ответ с ожидающей
/// операцией.
///
/// Хеш 0 зарезервирован и никогда не считается допустимым.
pub trait CorrelationKey: Eq {
    fn correlation_hash(&self) -> u32;
}

/// Идентификатор запроса: номер последовательности и отправитель.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId {
    pub sequence_number: i64,
    pub writer_gid: Gid,
}

impl RequestId {
    pub fn new(
        sequence_number: i64,
        writer_gid: Gid,
    ) -> Self {
        Self {
            sequence_number,
            writer_gid,
        }
    }
}

impl CorrelationKey for RequestId {
    fn correlation_hash(&self) -> u32 {
        fnv1a(&[
            &self.sequence_number.to_le_bytes()[..],
            &self.writer_gid.as_bytes()[..],
        ])
    }
}

impl From<&Envelope> for RequestId {
    fn from(envelope: &Envelope) -> Self {
        Self::new(envelope.sequence_number, envelope.source_gid)
    }
}

impl fmt::Display for RequestId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}#{}", self.writer_gid, self.sequence_number)
    }
}

/// 32-битный FNV-1a поверх последовательности срезов.
pub fn fnv1a(parts: &[&[u8]]) -> u32 {
    parts
        .iter()
        .flat_map(|part| part.iter())
        .fold(FNV_OFFSET_BASIS, |hash, &b| {
            (hash ^ u32::from(b)).wrapping_mul(FNV_PRIME)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет эталонные значения FNV-1a.
    #[test]
    fn test_fnv1a_reference_vectors() {
        assert_eq!(fnv1a(&[]), FNV_OFFSET_BASIS);
        assert_eq!(fnv1a(&[&b"a"[..]]), 0xe40c_292c);
        assert_eq!(fnv1a(&[&b"foobar"[..]]), 0xbf9c_f968);
        assert_eq!(fnv1a(&[&b"foo"[..], &b"bar"[..]]), fnv1a(&[&b"foobar"[..]]));
    }

    /// Тест проверяет, что номер последовательности и отправитель влияют на
    /// хеш.
    #[test]
    fn test_request_id_hash_depends_on_both_parts() {
        let gid = Gid::new([3u8; 16]);
        let a = RequestId::new(1, gid);
        let b = RequestId::new(2, gid);
        let c = RequestId::new(1, Gid::new([4u8; 16]));
        assert_ne!(a.correlation_hash(), b.correlation_hash());
        assert_ne!(a.correlation_hash(), c.correlation_hash());
        assert_eq!(a.correlation_hash(), RequestId::new(1, gid).correlation_hash());
    }

    /// Тест проверяет построение ключа из конверта.
    #[test]
    fn test_from_envelope() {
        let gid = Gid::new([5u8; 16]);
        let env = Envelope::new(10, 99, gid);
        assert_eq!(RequestId::from(&env), RequestId::new(10, gid));
    }
}
