//! Ограниченная очередь сообщений (`MessageQueue`).
//!
//! Кольцевой буфер фиксированной ёмкости. Если очередь заполнена,
//! `push` вытесняет самое старое сообщение: свежие данные сохраняются
//! при любой перегрузке ценой потери истории.
//!
//! Очередь не синхронизирована: конечная точка держит её под своей
//! собственной блокировкой.

use bytes::Bytes;
use tracing::debug;
use zenbridge_error::QueueError;

use crate::{envelope::Envelope, time};

/// Сообщение, находящееся в очереди.
///
/// Слот очереди владеет полезной нагрузкой до вызова `pop_front`, после
/// чего владение целиком переходит к вызывающему.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub envelope: Envelope,
    pub payload: Bytes,
    /// Время приёма в наносекундах.
    pub received_timestamp: i64,
}

/// Кольцевая очередь с вытеснением самого старого элемента.
#[derive(Debug)]
pub struct MessageQueue {
    slots: Vec<Option<QueuedMessage>>,
    /// Индекс самого старого сообщения.
    front: usize,
    /// Индекс слота для следующей вставки.
    back: usize,
    len: usize,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl QueuedMessage {
    /// Создаёт сообщение с текущим временем приёма.
    pub fn received_now(
        envelope: Envelope,
        payload: Bytes,
    ) -> Self {
        Self {
            envelope,
            payload,
            received_timestamp: time::now_nanos(),
        }
    }
}

impl MessageQueue {
    /// Выделяет `capacity` слотов.
    ///
    /// Ёмкость 0 отклоняется: подстановка значения по умолчанию вместо
    /// "без ограничения" лежит на вызывающей стороне (см. `qos`).
    pub fn with_capacity(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| QueueError::Allocation { capacity })?;
        slots.resize_with(capacity, || None);
        Ok(Self {
            slots,
            front: 0,
            back: 0,
            len: 0,
        })
    }

    /// Кладёт сообщение в конец очереди.
    ///
    /// Если очередь полна, сначала извлекает самое старое сообщение и
    /// возвращает его вызывающему (вытеснение). Никогда не блокирует.
    pub fn push(
        &mut self,
        envelope: Envelope,
        payload: Bytes,
    ) -> Option<QueuedMessage> {
        self.push_message(QueuedMessage::received_now(envelope, payload))
    }

    /// То же, что [`push`](Self::push), для готового сообщения.
    pub fn push_message(
        &mut self,
        message: QueuedMessage,
    ) -> Option<QueuedMessage> {
        let evicted = if self.is_full() {
            let old = self.take_front();
            if let Some(old) = &old {
                debug!(
                    sequence_number = old.envelope.sequence_number,
                    source_gid = %old.envelope.source_gid,
                    capacity = self.capacity(),
                    "queue full, evicting oldest message"
                );
            }
            old
        } else {
            None
        };

        self.slots[self.back] = Some(message);
        self.back = self.advance(self.back);
        self.len += 1;
        evicted
    }

    /// Извлекает самое старое сообщение.
    ///
    /// На пустой очереди возвращает `QueueError::Empty` и ничего не меняет.
    pub fn pop_front(&mut self) -> Result<QueuedMessage, QueueError> {
        self.take_front().ok_or(QueueError::Empty)
    }

    /// Извлекает самое старое сообщение и сразу освобождает его.
    pub fn discard_front(&mut self) -> Result<(), QueueError> {
        self.pop_front().map(drop)
    }

    /// Ссылка на самое старое сообщение без извлечения.
    pub fn front(&self) -> Option<&QueuedMessage> {
        if self.len == 0 {
            return None;
        }
        self.slots[self.front].as_ref()
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

    /// Освобождает все сообщения, сохраняя выделенные слоты.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.front = 0;
        self.back = 0;
        self.len = 0;
    }

    /// Итератор от самого старого сообщения к самому новому.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedMessage> + '_ {
        (0..self.len).filter_map(move |i| self.slots[(self.front + i) % self.slots.len()].as_ref())
    }

    fn take_front(&mut self) -> Option<QueuedMessage> {
        if self.len == 0 {
            return None;
        }
        let message = self.slots[self.front].take();
        self.front = self.advance(self.front);
        self.len -= 1;
        message
    }

    #[inline]
    fn advance(
        &self,
        index: usize,
    ) -> usize {
        (index + 1) % self.slots.len()
    }
}
