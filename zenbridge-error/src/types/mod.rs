pub mod correlation;
pub mod envelope;
pub mod qos;
pub mod queue;
pub mod wait;

// Публичный экспорт всех типов ошибок из вложенных модулей, чтобы упростить
// доступ к ним из внешнего кода.
pub use correlation::*;
pub use envelope::*;
pub use qos::*;
pub use queue::*;
pub use wait::*;
