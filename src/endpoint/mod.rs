//! Конечные точки моста: издатель, подписка, сервис и клиент.
//!
//! Каждая принимающая конечная точка владеет одной очередью сообщений и
//! держит её, таблицу корреляции (если есть) и ссылку на подключённый
//! набор ожидания под одной приватной блокировкой. Транспортный обратный
//! вызов и поток-потребитель берут эту блокировку лишь на время короткой
//! операции push/pop/correlate.

mod client;
mod publisher;
mod service;
mod subscription;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

pub use client::Client;
pub use publisher::Publisher;
pub use service::Service;
pub use subscription::{MessageInfo, Subscription};

/// Счётчики событий конечной точки.
#[derive(Debug, Default)]
pub struct EndpointStats {
    received: AtomicU64,
    evicted: AtomicU64,
    malformed: AtomicU64,
    unmatched: AtomicU64,
}

/// Снимок [`EndpointStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Сообщения, принятые в очередь.
    pub received: u64,
    /// Сообщения, вытесненные из полной очереди.
    pub evicted: u64,
    /// Сообщения, отброшенные из-за повреждённого конверта.
    pub malformed: u64,
    /// Ответы и запросы, не сопоставленные ни с одной операцией.
    pub unmatched: u64,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl EndpointStats {
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evicted(&self) {
        self.evicted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unmatched(&self) {
        self.unmatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            unmatched: self.unmatched.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Доля вытесненных сообщений среди принятых.
    pub fn eviction_rate(&self) -> f64 {
        if self.received == 0 {
            0.0
        } else {
            self.evicted as f64 / self.received as f64
        }
    }
}
