use std::sync::Arc;

use parking_lot::Mutex;

use super::condition::{Attachment, ConditionSource, WaitSignal};

#[derive(Debug, Default)]
struct GuardState {
    has_triggered: bool,
    attachment: Attachment,
}

/// Одноразовый триггер, который пользователь взводит вручную.
///
/// Срабатывание сбрасывается, когда набор ожидания забирает его
/// готовность.
#[derive(Debug, Default)]
pub struct GuardCondition {
    state: Mutex<GuardState>,
}

impl GuardCondition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Взводит триггер и будит подключённого ожидающего.
    pub fn trigger(&self) {
        let mut state = self.state.lock();
        state.has_triggered = true;
        state.attachment.notify();
    }

    pub fn has_triggered(&self) -> bool {
        self.state.lock().has_triggered
    }
}

impl ConditionSource for GuardCondition {
    fn has_data_and_attach_if_not(
        &self,
        signal: &Arc<WaitSignal>,
    ) -> bool {
        let mut state = self.state.lock();
        if state.has_triggered {
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
        std::mem::take(&mut state.has_triggered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет, что сработавший триггер не подключается и
    /// сбрасывается при отключении.
    #[test]
    fn test_triggered_guard_is_ready_once() {
        let guard = GuardCondition::new();
        let signal = Arc::new(WaitSignal::new());
        guard.trigger();

        assert!(guard.has_data_and_attach_if_not(&signal));
        assert!(guard.detach_and_is_ready());
        assert!(!guard.detach_and_is_ready());
        assert!(!guard.has_triggered());
    }

    /// Тест проверяет, что триггер после подключения поднимает сигнал.
    #[test]
    fn test_trigger_raises_attached_signal() {
        let guard = GuardCondition::new();
        let signal = Arc::new(WaitSignal::new());

        assert!(!guard.has_data_and_attach_if_not(&signal));
        assert!(!signal.is_raised());
        guard.trigger();
        assert!(signal.is_raised());
        assert!(guard.detach_and_is_ready());
    }
}
