use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::info;
use zenbridge_error::CorrelationError;

use super::{EndpointStats, StatsSnapshot};
use crate::{
    correlation::{CorrelationMap, RequestId},
    envelope::{Envelope, Gid},
    error::{log_dropped, BridgeError, BridgeResult},
    qos::QosProfile,
    queue::{MessageQueue, QueuedMessage},
    waitset::{Attachment, ConditionSource, WaitSignal},
};

struct ClientState<P> {
    next_sequence: i64,
    replies: MessageQueue,
    /// Запросы в полёте: ключ -> дескриптор ожидающей операции.
    pending: CorrelationMap<RequestId, P>,
    attachment: Attachment,
    shut_down: bool,
}

/// Клиент: отправляет запросы и сопоставляет ответы с ожидающими
/// операциями.
pub struct Client<P> {
    key: String,
    gid: Gid,
    state: Mutex<ClientState<P>>,
    stats: EndpointStats,
}

impl<P> Client<P> {
    pub fn new(
        key: impl Into<String>,
        depth: usize,
    ) -> BridgeResult<Self> {
        Ok(Self {
            key: key.into(),
            gid: Gid::random(),
            state: Mutex::new(ClientState {
                next_sequence: 1,
                replies: MessageQueue::with_capacity(depth)?,
                pending: CorrelationMap::with_capacity(depth)?,
                attachment: Attachment::default(),
                shut_down: false,
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

    /// Выделяет номер следующего запроса и регистрирует `pending`.
    ///
    /// Регистрация выполняется до отправки, поэтому быстрый ответ не может
    /// обогнать её. Номер последовательности расходуется только при
    /// успешной регистрации.
    pub fn begin_request(
        &self,
        pending: P,
    ) -> BridgeResult<Envelope> {
        let mut state = self.state.lock();
        if state.shut_down {
            return Err(BridgeError::Shutdown {
                endpoint: self.key.clone(),
            });
        }
        let envelope = Envelope::stamped(state.next_sequence, self.gid);
        state
            .pending
            .insert(RequestId::from(&envelope), pending)
            .inspect_err(|err| {
                log_dropped!(err, client = %self.key, "cannot register request");
            })?;
        state.next_sequence += 1;
        Ok(envelope)
    }

    /// Отменяет регистрацию, если запрос не удалось отправить.
    pub fn abort_request(
        &self,
        envelope: &Envelope,
    ) -> Result<P, CorrelationError> {
        self.state
            .lock()
            .pending
            .extract(&RequestId::from(envelope))
    }

    /// Обратный вызов транспорта для входящего ответа.
    ///
    /// Возвращает дескриптор операции, которой принадлежит ответ. Ответ без
    /// ожидающей операции (дубликат или опоздавший) отбрасывается.
    pub fn on_reply(
        &self,
        attachment: &[u8],
        payload: Bytes,
    ) -> BridgeResult<P> {
        let envelope = Envelope::decode(attachment).inspect_err(|err| {
            self.stats.record_malformed();
            log_dropped!(
                err,
                client = %self.key,
                field = ?err.field(),
                "dropping reply with malformed envelope"
            );
        })?;
        let id = RequestId::from(&envelope);

        let mut state = self.state.lock();
        let pending = state.pending.extract(&id).inspect_err(|err| {
            self.stats.record_unmatched();
            log_dropped!(err, client = %self.key, request = %id, "dropping unmatched reply");
        })?;

        if state.replies.push(envelope, payload).is_some() {
            self.stats.record_evicted();
        }
        self.stats.record_received();
        state.attachment.notify();
        Ok(pending)
    }

    /// Забирает самый старый ответ. Конверт ответа несёт номер исходного
    /// запроса.
    pub fn take_response(&self) -> Option<QueuedMessage> {
        self.state.lock().replies.pop_front().ok()
    }

    /// Число запросов, ожидающих ответа.
    pub fn in_flight(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.state.lock().shut_down
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Запрещает новые запросы и освобождает все ожидающие дескрипторы.
    ///
    /// Возвращает число освобождённых дескрипторов.
    pub fn shutdown(&self) -> usize {
        let mut state = self.state.lock();
        state.shut_down = true;
        let released = state.pending.drain().len();
        if released > 0 {
            info!(client = %self.key, released, "client shut down with requests in flight");
        }
        released
    }
}

impl<P: Send> ConditionSource for Client<P> {
    fn has_data_and_attach_if_not(
        &self,
        signal: &Arc<WaitSignal>,
    ) -> bool {
        let mut state = self.state.lock();
        if !state.replies.is_empty() {
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
        !state.replies.is_empty()
    }
}

impl<P> std::fmt::Debug for Client<P> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("key", &self.key)
            .field("gid", &self.gid)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
