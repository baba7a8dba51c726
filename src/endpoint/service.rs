use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, info};
use zenbridge_error::{CorrelationError, EnvelopeError};

use super::{EndpointStats, StatsSnapshot};
use crate::{
    correlation::{CorrelationMap, RequestId},
    envelope::{Envelope, Gid},
    error::{log_dropped, BridgeResult},
    qos::QosProfile,
    queue::{MessageQueue, QueuedMessage},
    waitset::{Attachment, ConditionSource, WaitSignal},
};

struct ServiceState<Q> {
    requests: MessageQueue,
    /// Запросы, на которые ещё не отправлен ответ.
    pending: CorrelationMap<RequestId, Q>,
    attachment: Attachment,
}

/// Сервис: принимает запросы и хранит транспортный дескриптор каждого
/// запроса (`Q`) до отправки ответа.
pub struct Service<Q> {
    key: String,
    gid: Gid,
    state: Mutex<ServiceState<Q>>,
    stats: EndpointStats,
}

impl<Q> Service<Q> {
    /// Очередь запросов и таблица ожидающих ответа имеют одну глубину.
    pub fn new(
        key: impl Into<String>,
        depth: usize,
    ) -> BridgeResult<Self> {
        Ok(Self {
            key: key.into(),
            gid: Gid::random(),
            state: Mutex::new(ServiceState {
                requests: MessageQueue::with_capacity(depth)?,
                pending: CorrelationMap::with_capacity(depth)?,
                attachment: Attachment::default(),
            }),
            stats: EndpointStats::default(),
        })
    }

    pub fn from_qos(
        key: impl Into<String>,
        qos: &QosProfile,
    ) -> BridgeResult<Self> {
        Self::new(key, qos.adapt()?.depth)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn gid(&self) -> Gid {
        self.gid
    }

    /// Обратный вызов транспорта для входящего запроса.
    ///
    /// Запрос кладётся в очередь, а `query` регистрируется в таблице
    /// одной операцией: при любой ошибке обе структуры остаются как были.
    /// Если очередь полна, вытесненный запрос теряет и свой дескриптор.
    pub fn on_query(
        &self,
        attachment: &[u8],
        payload: Bytes,
        query: Q,
    ) -> BridgeResult<()> {
        let envelope = Envelope::decode(attachment).inspect_err(|err: &EnvelopeError| {
            self.stats.record_malformed();
            log_dropped!(
                err,
                service = %self.key,
                field = ?err.field(),
                "dropping request with malformed envelope"
            );
        })?;
        let id = RequestId::from(&envelope);

        let mut guard = self.state.lock();
        let state = &mut *guard;

        if let Err(err) = state.pending.check_insert(&id) {
            let frees_slot = matches!(err, CorrelationError::TableFull { .. })
                && state.requests.is_full()
                && state
                    .requests
                    .front()
                    .is_some_and(|old| state.pending.contains(&RequestId::from(&old.envelope)));
            if !frees_slot {
                log_dropped!(&err, service = %self.key, request = %id, "rejecting request");
                return Err(err.into());
            }
        }

        if let Some(evicted) = state.requests.push(envelope, payload) {
            self.stats.record_evicted();
            let evicted_id = RequestId::from(&evicted.envelope);
            if state.pending.extract(&evicted_id).is_ok() {
                debug!(service = %self.key, request = %evicted_id, "evicted request will not be answered");
            }
        }
        state.pending.insert(id, query)?;
        self.stats.record_received();
        state.attachment.notify();
        Ok(())
    }

    /// Забирает следующий запрос вместе с его идентификатором.
    pub fn take_request(&self) -> Option<(RequestId, QueuedMessage)> {
        let msg = self.state.lock().requests.pop_front().ok()?;
        Some((RequestId::from(&msg.envelope), msg))
    }

    /// Извлекает дескриптор запроса для отправки ответа.
    pub fn take_query(
        &self,
        id: &RequestId,
    ) -> Result<Q, CorrelationError> {
        self.state.lock().pending.extract(id).inspect_err(|err| {
            self.stats.record_unmatched();
            log_dropped!(err, service = %self.key, request = %id, "no pending query for response");
        })
    }

    /// Конверт ответа: номер и отправитель исходного запроса, текущее время.
    pub fn response_envelope(
        &self,
        id: &RequestId,
    ) -> Envelope {
        Envelope::stamped(id.sequence_number, id.writer_gid)
    }

    /// Число запросов, ожидающих ответа.
    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn queued(&self) -> usize {
        self.state.lock().requests.len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Сбрасывает очередь и все ожидающие дескрипторы.
    pub fn shutdown(&self) -> usize {
        let mut state = self.state.lock();
        state.requests.clear();
        let dropped = state.pending.drain().len();
        if dropped > 0 {
            info!(service = %self.key, dropped, "service shut down with unanswered requests");
        }
        dropped
    }
}

impl<Q: Send> ConditionSource for Service<Q> {
    fn has_data_and_attach_if_not(
        &self,
        signal: &Arc<WaitSignal>,
    ) -> bool {
        let mut state = self.state.lock();
        if !state.requests.is_empty() {
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
        !state.requests.is_empty()
    }
}

impl<Q> std::fmt::Debug for Service<Q> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("key", &self.key)
            .field("gid", &self.gid)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
