use tracing_appender::non_blocking::WorkerGuard;

/// Управляет временем жизни логирования.
///
/// Держит `WorkerGuard` файлового слоя: пока handle жив, фоновый поток
/// записи работает. Хвост логов дописывается в файл при [`shutdown`].
///
/// [`shutdown`]: LoggingHandle::shutdown
pub struct LoggingHandle {
    file_guard: Option<WorkerGuard>,
}

impl LoggingHandle {
    pub fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self { file_guard }
    }

    pub fn has_file_sink(&self) -> bool {
        self.file_guard.is_some()
    }

    /// Останавливает файловый слой, дожидаясь записи хвоста логов.
    pub fn shutdown(mut self) {
        tracing::info!(file = self.file_guard.is_some(), "shutting down logging");
        drop(self.file_guard.take());
    }
}

impl std::fmt::Debug for LoggingHandle {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("LoggingHandle")
            .field("file_sink_active", &self.file_guard.is_some())
            .finish()
    }
}

impl Drop for LoggingHandle {
    fn drop(&mut self) {
        if self.file_guard.is_some() {
            eprintln!(
                "WARNING: LoggingHandle dropped without shutdown(); \
                 buffered file logs are flushed by the worker guard"
            );
        }
    }
}
