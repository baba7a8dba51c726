use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use tracing::trace;

use crate::{
    correlation::RequestId,
    endpoint::{Client, Publisher, Service, Subscription},
    envelope::Envelope,
    error::{log_dropped, BridgeError, BridgeResult},
};

/// Обратный вызов для образца: `(attachment, payload)`.
pub type SampleCallback = Arc<dyn Fn(&[u8], Bytes) + Send + Sync>;
/// Обратный вызов для входящего запроса.
pub type QueryCallback = Arc<dyn Fn(Query) + Send + Sync>;

/// Входящий запрос вместе с каналом для ответа.
pub struct Query {
    key: String,
    attachment: Bytes,
    payload: Bytes,
    reply_to: SampleCallback,
}

/// Транспортная сессия внутри процесса.
///
/// Доставляет образцы и запросы синхронно в потоке отправителя.
#[derive(Default)]
pub struct LoopbackSession {
    subscribers: DashMap<String, Vec<SampleCallback>>,
    queryables: DashMap<String, QueryCallback>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl Query {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn attachment(&self) -> &Bytes {
        &self.attachment
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Отправляет ответ запросившей стороне.
    pub fn reply(
        &self,
        attachment: &[u8],
        payload: Bytes,
    ) {
        (self.reply_to)(attachment, payload);
    }
}

impl LoopbackSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_subscriber(
        &self,
        key: &str,
        callback: SampleCallback,
    ) {
        self.subscribers
            .entry(key.to_string())
            .or_default()
            .push(callback);
    }

    /// Объявляет обработчик запросов. Повторное объявление заменяет
    /// предыдущий обработчик.
    pub fn declare_queryable(
        &self,
        key: &str,
        callback: QueryCallback,
    ) {
        self.queryables.insert(key.to_string(), callback);
    }

    pub fn undeclare(
        &self,
        key: &str,
    ) {
        self.subscribers.remove(key);
        self.queryables.remove(key);
    }

    /// Доставляет образец всем подписчикам ключа. Возвращает их число.
    pub fn put(
        &self,
        key: &str,
        attachment: &[u8],
        payload: Bytes,
    ) -> usize {
        // Копия списка: обратный вызов может объявить нового подписчика.
        let callbacks = match self.subscribers.get(key) {
            Some(entry) => entry.value().clone(),
            None => {
                trace!(key, "no subscribers");
                return 0;
            }
        };
        for callback in &callbacks {
            callback(attachment, payload.clone());
        }
        callbacks.len()
    }

    /// Доставляет запрос обработчику ключа. `false`, если обработчика нет.
    pub fn get(
        &self,
        key: &str,
        attachment: Bytes,
        payload: Bytes,
        reply_to: SampleCallback,
    ) -> bool {
        let Some(callback) = self.queryables.get(key).map(|e| Arc::clone(e.value())) else {
            return false;
        };
        callback(Query {
            key: key.to_string(),
            attachment,
            payload,
            reply_to,
        });
        true
    }

    ////////////////////////////////////////////////////////////////////////////
    // Привязка конечных точек
    ////////////////////////////////////////////////////////////////////////////

    /// Публикует `payload` от имени издателя.
    pub fn publish(
        &self,
        publisher: &Publisher,
        payload: Bytes,
    ) -> Envelope {
        let (envelope, attachment) = publisher.prepare();
        let delivered = self.put(publisher.key(), &attachment, payload);
        trace!(key = publisher.key(), seq = envelope.sequence_number, delivered, "published");
        envelope
    }

    pub fn bind_subscription(
        &self,
        subscription: &Arc<Subscription>,
    ) {
        let sub = Arc::clone(subscription);
        self.declare_subscriber(
            subscription.key(),
            Arc::new(move |attachment: &[u8], payload: Bytes| {
                // Ошибка уже учтена и залогирована подпиской.
                let _ = sub.on_sample(attachment, payload);
            }),
        );
    }

    pub fn bind_service(
        &self,
        service: &Arc<Service<Query>>,
    ) {
        let svc = Arc::clone(service);
        self.declare_queryable(
            service.key(),
            Arc::new(move |query: Query| {
                let attachment = query.attachment.clone();
                let payload = query.payload.clone();
                if let Err(err) = svc.on_query(&attachment, payload, query) {
                    log_dropped!(&err, service = svc.key(), "query not accepted");
                }
            }),
        );
    }

    /// Отправляет запрос клиента. Дескриптор `pending` вернётся из
    /// `Client::on_reply`, когда придёт ответ.
    pub fn send_request<P: Send + 'static>(
        &self,
        client: &Arc<Client<P>>,
        payload: Bytes,
        pending: P,
    ) -> BridgeResult<Envelope> {
        let envelope = client.begin_request(pending)?;
        let reply_client = Arc::clone(client);
        let reply_to: SampleCallback = Arc::new(move |attachment: &[u8], payload: Bytes| {
            // Несопоставленный ответ уже залогирован клиентом.
            let _ = reply_client.on_reply(attachment, payload);
        });

        if !self.get(client.key(), envelope.encode(), payload, reply_to) {
            let _ = client.abort_request(&envelope);
            return Err(BridgeError::NoRoute {
                key: client.key().to_string(),
            });
        }
        Ok(envelope)
    }
}

impl Service<Query> {
    /// Отвечает на запрос `id` через сохранённый дескриптор.
    pub fn respond(
        &self,
        id: &RequestId,
        payload: Bytes,
    ) -> BridgeResult<()> {
        let query = self.take_query(id)?;
        let envelope = self.response_envelope(id);
        query.reply(&envelope.encode(), payload);
        Ok(())
    }
}

impl std::fmt::Debug for Query {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("key", &self.key)
            .field("attachment_len", &self.attachment.len())
            .field("payload_len", &self.payload.len())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for LoopbackSession {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("LoopbackSession")
            .field("subscribers", &self.subscribers.len())
            .field("queryables", &self.queryables.len())
            .finish()
    }
}
