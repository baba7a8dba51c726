use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::debug;
use zenbridge_error::{EnvelopeError, QueueError};

use super::{EndpointStats, StatsSnapshot};
use crate::{
    envelope::{Envelope, Gid},
    error::{log_dropped, BridgeResult},
    qos::QosProfile,
    queue::{MessageQueue, QueuedMessage},
    waitset::{Attachment, ConditionSource, WaitSignal},
};

/// Метаданные принятого сообщения.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageInfo {
    pub source_timestamp: i64,
    pub received_timestamp: i64,
    pub publication_sequence_number: i64,
    pub publisher_gid: Gid,
}

#[derive(Debug)]
struct SubscriptionState {
    queue: MessageQueue,
    attachment: Attachment,
}

/// Подписка: копит входящие образцы до опроса потребителем.
#[derive(Debug)]
pub struct Subscription {
    key: String,
    state: Mutex<SubscriptionState>,
    stats: EndpointStats,
}

impl Subscription {
    /// Создаёт подписку с очередью глубиной `depth`.
    pub fn new(
        key: impl Into<String>,
        depth: usize,
    ) -> Result<Self, QueueError> {
        Ok(Self {
            key: key.into(),
            state: Mutex::new(SubscriptionState {
                queue: MessageQueue::with_capacity(depth)?,
                attachment: Attachment::default(),
            }),
            stats: EndpointStats::default(),
        })
    }

    /// Создаёт подписку по профилю QoS.
    pub fn from_qos(
        key: impl Into<String>,
        qos: &QosProfile,
    ) -> BridgeResult<Self> {
        let adapted = qos.adapt()?;
        Ok(Self::new(key, adapted.depth)?)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Обратный вызов транспорта для нового образца.
    ///
    /// Образец с повреждённым конвертом отбрасывается и учитывается в
    /// статистике; очередь при этом не меняется.
    pub fn on_sample(
        &self,
        attachment: &[u8],
        payload: Bytes,
    ) -> Result<(), EnvelopeError> {
        let envelope = Envelope::decode(attachment).inspect_err(|err| {
            self.stats.record_malformed();
            log_dropped!(
                err,
                key = %self.key,
                field = ?err.field(),
                "dropping sample with malformed envelope"
            );
        })?;

        let mut state = self.state.lock();
        if state.queue.push(envelope, payload).is_some() {
            self.stats.record_evicted();
        }
        self.stats.record_received();
        debug!(
            key = %self.key,
            sequence_number = envelope.sequence_number,
            queued = state.queue.len(),
            "sample queued"
        );
        state.attachment.notify();
        Ok(())
    }

    /// Забирает самое старое сообщение; `None` означает "данных пока нет".
    pub fn take(&self) -> Option<QueuedMessage> {
        self.state.lock().queue.pop_front().ok()
    }

    /// Как [`take`](Self::take), но отдаёт нагрузку и метаданные раздельно.
    pub fn take_with_info(&self) -> Option<(Bytes, MessageInfo)> {
        self.take().map(|msg| {
            let info = MessageInfo {
                source_timestamp: msg.envelope.source_timestamp,
                received_timestamp: msg.received_timestamp,
                publication_sequence_number: msg.envelope.sequence_number,
                publisher_gid: msg.envelope.source_gid,
            };
            (msg.payload, info)
        })
    }

    /// Забирает до `max` сообщений за один захват блокировки.
    pub fn take_sequence(
        &self,
        max: usize,
    ) -> Vec<QueuedMessage> {
        let mut state = self.state.lock();
        let n = max.min(state.queue.len());
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            match state.queue.pop_front() {
                Ok(msg) => out.push(msg),
                Err(_) => break,
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().queue.is_empty()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

impl ConditionSource for Subscription {
    fn has_data_and_attach_if_not(
        &self,
        signal: &Arc<WaitSignal>,
    ) -> bool {
        let mut state = self.state.lock();
        if !state.queue.is_empty() {
            return true;
        }
        state.attachment.attach(signal);
        false
    }

    fn notify(&self) {
        self.state.lock().attachment.notify();
    }

    fn detach_and_is_ready(&self) -> bool {
        let mut state = self.state.lock();
        state.attachment.detach();
        !state.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Publisher;

    /// Тест проверяет приём, вытеснение и опрос.
    #[test]
    fn test_on_sample_and_take() {
        let publisher = Publisher::new("chatter");
        let sub = Subscription::new("chatter", 2).unwrap();

        for body in ["A", "B", "C"] {
            let (_, attachment) = publisher.prepare();
            sub.on_sample(&attachment, Bytes::from(body)).unwrap();
        }

        let stats = sub.stats();
        assert_eq!(stats.received, 3);
        assert_eq!(stats.evicted, 1);

        let (payload, info) = sub.take_with_info().unwrap();
        assert_eq!(payload, Bytes::from("B"));
        assert_eq!(info.publication_sequence_number, 2);
        assert_eq!(info.publisher_gid, publisher.gid());
        assert_eq!(sub.take().unwrap().payload, Bytes::from("C"));
        assert!(sub.take().is_none());
    }

    /// Тест проверяет, что повреждённый конверт отбрасывается.
    #[test]
    fn test_malformed_sample_is_dropped() {
        let sub = Subscription::new("chatter", 4).unwrap();
        let err = sub.on_sample(&[], Bytes::from("x")).unwrap_err();
        assert_eq!(err, EnvelopeError::EmptyInput);
        assert!(sub.is_empty());
        assert_eq!(sub.stats().malformed, 1);
    }

    /// Тест проверяет пакетный опрос.
    #[test]
    fn test_take_sequence() {
        let publisher = Publisher::new("chatter");
        let sub = Subscription::new("chatter", 8).unwrap();
        for i in 0..5 {
            let (_, attachment) = publisher.prepare();
            sub.on_sample(&attachment, Bytes::from(format!("m{i}")))
                .unwrap();
        }
        assert_eq!(sub.take_sequence(3).len(), 3);
        assert_eq!(sub.take_sequence(10).len(), 2);
        assert!(sub.take_sequence(10).is_empty());
    }

    /// Тест проверяет, что KeepAll отклоняется при создании.
    #[test]
    fn test_from_qos_rejects_keep_all() {
        let qos = QosProfile {
            history: crate::qos::History::KeepAll,
            depth: 1,
        };
        assert!(Subscription::from_qos("chatter", &qos).is_err());
        assert_eq!(
            Subscription::from_qos("chatter", &QosProfile::default())
                .unwrap()
                .len(),
            0
        );
    }
}
