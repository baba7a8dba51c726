use std::sync::atomic::{AtomicI64, Ordering};

use bytes::Bytes;

use crate::envelope::{Envelope, Gid};

/// Издатель: штампует исходящие сообщения конвертом.
///
/// Номер последовательности начинается с 1 и растёт на каждое сообщение
/// этого экземпляра.
#[derive(Debug)]
pub struct Publisher {
    key: String,
    gid: Gid,
    sequence: AtomicI64,
}

impl Publisher {
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_gid(key, Gid::random())
    }

    pub fn with_gid(
        key: impl Into<String>,
        gid: Gid,
    ) -> Self {
        Self {
            key: key.into(),
            gid,
            sequence: AtomicI64::new(1),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn gid(&self) -> Gid {
        self.gid
    }

    /// Конверт для следующего сообщения.
    pub fn next_envelope(&self) -> Envelope {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        Envelope::stamped(seq, self.gid)
    }

    /// Конверт и его закодированное представление для транспорта.
    pub fn prepare(&self) -> (Envelope, Bytes) {
        let envelope = self.next_envelope();
        let attachment = envelope.encode();
        (envelope, attachment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет, что номера последовательности идут с 1 без пропусков.
    #[test]
    fn test_sequence_starts_at_one() {
        let publisher = Publisher::new("chatter");
        assert_eq!(publisher.next_envelope().sequence_number, 1);
        let (env, attachment) = publisher.prepare();
        assert_eq!(env.sequence_number, 2);
        assert_eq!(env.source_gid, publisher.gid());
        assert_eq!(Envelope::decode(&attachment).unwrap(), env);
    }
}
