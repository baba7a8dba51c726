//! Таблица корреляции запросов и ответов.
//!
//! Таблица фиксированной ёмкости с открытой адресацией и полным линейным
//! просмотром: ёмкость равна глубине очереди конечной точки (десятки
//! элементов), поэтому простой проход по массиву дешевле любой схемы
//! зондирования.
//!
//! Один и тот же тип используется клиентом (ожидающие ответы) и сервисом
//! (ожидающие запросы, на которые нужно ответить).

mod key;

use zenbridge_error::CorrelationError;

pub use key::{fnv1a, CorrelationKey, RequestId};

#[derive(Debug)]
struct Slot<K, V> {
    hash: u32,
    key: K,
    value: V,
}

/// Таблица `ключ -> ожидающая операция`.
///
/// Ключи сравниваются целиком, а не только по хешу: два разных ключа с
/// одинаковым хешем занимают разные слоты.
#[derive(Debug)]
pub struct CorrelationMap<K, V> {
    slots: Vec<Option<Slot<K, V>>>,
    len: usize,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl<K: CorrelationKey, V> CorrelationMap<K, V> {
    pub fn with_capacity(capacity: usize) -> Result<Self, CorrelationError> {
        if capacity == 0 {
            return Err(CorrelationError::ZeroCapacity);
        }
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| CorrelationError::Allocation { capacity })?;
        slots.resize_with(capacity, || None);
        Ok(Self { slots, len: 0 })
    }

    /// Проверяет, что `insert(key, _)` выполнится успешно, ничего не меняя.
    ///
    /// Порядок проверок: нулевой хеш, дубликат, переполнение.
    pub fn check_insert(
        &self,
        key: &K,
    ) -> Result<u32, CorrelationError> {
        let hash = key.correlation_hash();
        if hash == 0 {
            return Err(CorrelationError::DegenerateHash);
        }
        if self.position(hash, key).is_some() {
            return Err(CorrelationError::DuplicateKey { hash });
        }
        if self.is_full() {
            return Err(CorrelationError::TableFull {
                capacity: self.capacity(),
            });
        }
        Ok(hash)
    }

    /// Регистрирует ожидающую операцию.
    ///
    /// При ошибке таблица остаётся в прежнем состоянии, а `value`
    /// уничтожается.
    pub fn insert(
        &mut self,
        key: K,
        value: V,
    ) -> Result<(), CorrelationError> {
        let hash = self.check_insert(&key)?;
        let capacity = self.capacity();
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or(CorrelationError::TableFull { capacity })?;
        *slot = Some(Slot { hash, key, value });
        self.len += 1;
        Ok(())
    }

    /// Извлекает операцию по ключу и освобождает её слот.
    pub fn extract(
        &mut self,
        key: &K,
    ) -> Result<V, CorrelationError> {
        let hash = key.correlation_hash();
        let index = self
            .position(hash, key)
            .ok_or(CorrelationError::NotFound { hash })?;
        let slot = self.slots[index]
            .take()
            .ok_or(CorrelationError::NotFound { hash })?;
        self.len -= 1;
        Ok(slot.value)
    }

    pub fn contains(
        &self,
        key: &K,
    ) -> bool {
        self.position(key.correlation_hash(), key).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Освобождает все слоты, отдавая ключи и значения вызывающему.
    pub fn drain(&mut self) -> Vec<(K, V)> {
        self.len = 0;
        self.slots
            .iter_mut()
            .filter_map(Option::take)
            .map(|slot| (slot.key, slot.value))
            .collect()
    }

    fn position(
        &self,
        hash: u32,
        key: &K,
    ) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.as_ref()
                .is_some_and(|s| s.hash == hash && s.key == *key)
        })
    }
}
