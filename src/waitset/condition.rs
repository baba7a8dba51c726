use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Общее состояние набора ожидания: флаг `triggered` и переменная условия.
///
/// Флаг выставляется только источником под этой блокировкой и сбрасывается
/// только ожидающим потоком, тоже под ней.
#[derive(Debug, Default)]
pub struct WaitSignal {
    triggered: Mutex<bool>,
    condvar: Condvar,
}

/// Источник готовности, на который можно ждать через `WaitSet`.
///
/// Реализации держат собственную блокировку, отличную от блокировки
/// `WaitSignal`; порядок захвата всегда "источник, затем сигнал".
pub trait ConditionSource: Send + Sync {
    /// Атомарно относительно `notify`: если данные уже есть, вернуть `true`
    /// и не подключаться; иначе запомнить `signal` и вернуть `false`.
    fn has_data_and_attach_if_not(
        &self,
        signal: &Arc<WaitSignal>,
    ) -> bool;

    /// Сообщает подключённому ожидающему о новых данных.
    fn notify(&self);

    /// Отключает ожидающего и возвращает текущую готовность.
    fn detach_and_is_ready(&self) -> bool;
}

/// Ссылка источника на подключённый набор ожидания.
///
/// Хранится внутри приватной блокировки источника.
#[derive(Debug, Default)]
pub struct Attachment(Option<Arc<WaitSignal>>);

impl WaitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Выставляет `triggered` и будит ожидающего.
    pub fn raise(&self) {
        let mut triggered = self.triggered.lock();
        *triggered = true;
        self.condvar.notify_one();
    }

    pub fn is_raised(&self) -> bool {
        *self.triggered.lock()
    }

    pub(crate) fn triggered(&self) -> &Mutex<bool> {
        &self.triggered
    }

    pub(crate) fn condvar(&self) -> &Condvar {
        &self.condvar
    }
}

impl Attachment {
    pub fn attach(
        &mut self,
        signal: &Arc<WaitSignal>,
    ) {
        self.0 = Some(Arc::clone(signal));
    }

    pub fn detach(&mut self) {
        self.0 = None;
    }

    pub fn is_attached(&self) -> bool {
        self.0.is_some()
    }

    /// Будит подключённого ожидающего, если он есть.
    pub fn notify(&self) {
        if let Some(signal) = &self.0 {
            signal.raise();
        }
    }
}
