//! Набор ожидания (wait-set).
//!
//! Позволяет одному потоку-потребителю блокироваться сразу на многих
//! источниках готовности ([`ConditionSource`]): подписках, сервисах,
//! клиентах и [`GuardCondition`].
//!
//! Ожидание проходит в три шага:
//!
//! 1. каждый источник проверяет, есть ли у него данные, и если нет,
//!    подключает общий [`WaitSignal`]; если хоть один источник готов,
//!    сон пропускается;
//! 2. поток спит на переменной условия, пока источник не выставит
//!    `triggered` или не истечёт таймаут;
//! 3. все источники отключаются, неготовые слоты обнуляются.

mod condition;
mod guard;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::trace;
use zenbridge_error::WaitError;

pub use condition::{Attachment, ConditionSource, WaitSignal};
pub use guard::GuardCondition;

/// Агрегатор источников готовности для одного ожидающего потока.
///
/// `wait` принимает `&mut self`, поэтому два потока не могут ждать на
/// одном наборе одновременно.
#[derive(Debug, Default)]
pub struct WaitSet {
    signal: Arc<WaitSignal>,
}

impl WaitSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) -> &Arc<WaitSignal> {
        &self.signal
    }

    /// Ждёт, пока хотя бы один источник из `slots` не станет готов.
    ///
    /// `timeout`: `None` означает ждать бесконечно, ноль означает опрос без
    /// сна. После возврата в `slots` остаются только готовые источники,
    /// остальные заменяются на `None`. Возвращает число готовых источников
    /// или `WaitError::Timeout`, если готовых нет.
    ///
    /// Подключение идёт по порядку и останавливается на первом готовом
    /// источнике: последующие источники не подключаются, их готовность
    /// только проверяется при отключении.
    pub fn wait(
        &mut self,
        slots: &mut [Option<&dyn ConditionSource>],
        timeout: Option<Duration>,
    ) -> Result<usize, WaitError> {
        // Все источники отключены после предыдущего ожидания, так что
        // поднятый флаг здесь может быть только устаревшим.
        *self.signal.triggered().lock() = false;

        let skip_wait = slots
            .iter()
            .flatten()
            .any(|source| source.has_data_and_attach_if_not(&self.signal));

        if !skip_wait {
            self.block(timeout);
        }

        let mut ready = 0;
        for slot in slots.iter_mut() {
            let Some(source) = *slot else {
                continue;
            };
            if source.detach_and_is_ready() {
                ready += 1;
            } else {
                *slot = None;
            }
        }

        trace!(ready, skip_wait, ?timeout, "wait-set woke up");

        if ready == 0 {
            return Err(WaitError::Timeout);
        }
        Ok(ready)
    }

    /// Удобная обёртка над [`wait`](Self::wait): возвращает индексы готовых
    /// источников в порядке, заданном вызывающим.
    pub fn wait_any(
        &mut self,
        sources: &[&dyn ConditionSource],
        timeout: Option<Duration>,
    ) -> Result<Vec<usize>, WaitError> {
        let mut slots: Vec<Option<&dyn ConditionSource>> =
            sources.iter().copied().map(Some).collect();
        self.wait(&mut slots, timeout)?;
        Ok(slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|_| i))
            .collect())
    }

    /// Спит до сигнала или таймаута, затем сбрасывает `triggered` под
    /// блокировкой.
    fn block(
        &self,
        timeout: Option<Duration>,
    ) {
        let mut triggered = self.signal.triggered().lock();
        let condvar = self.signal.condvar();

        let deadline = match timeout {
            Some(t) if t.is_zero() => {
                *triggered = false;
                return;
            }
            Some(t) => Instant::now().checked_add(t),
            None => None,
        };

        while !*triggered {
            match deadline {
                None => condvar.wait(&mut triggered),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    condvar.wait_for(&mut triggered, deadline - now);
                }
            }
        }
        *triggered = false;
    }
}
