use std::{collections::BTreeMap, env, fmt, fs, io, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Переменная окружения, переопределяющая уровень логирования.
pub const ENV_LOG_LEVEL: &str = "ZENBRIDGE_LOG_LEVEL";
/// Переменная окружения, переопределяющая формат вывода.
pub const ENV_LOG_FORMAT: &str = "ZENBRIDGE_LOG_FORMAT";
/// Переменная окружения, переопределяющая каталог файловых логов.
pub const ENV_LOG_DIR: &str = "ZENBRIDGE_LOG_DIR";

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unknown log level '{0}'")]
    InvalidLevel(String),

    #[error("unknown log format '{0}'")]
    InvalidFormat(String),

    #[error("cannot create log directory: {0}")]
    Io(#[from] io::Error),

    #[error("global subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub with_ansi: bool,
    pub with_target: bool,
    pub with_thread_ids: bool,
    pub with_line_numbers: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    /// Имя файла; ротация добавляет к нему дату.
    pub filename: String,
    /// Формат файла; по умолчанию JSON.
    pub format: LogFormat,
}

/// Настройки логирования.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Базовый уровень (`trace`..`error`, `off`).
    pub level: String,
    /// Формат консольного вывода.
    pub format: LogFormat,
    pub log_dir: PathBuf,
    /// Уровни для отдельных модулей, например `zenbridge::queue = "debug"`.
    pub module_levels: BTreeMap<String, String>,
    pub console: ConsoleConfig,
    pub file: FileConfig,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl LoggingConfig {
    /// Переопределяет поля из `ZENBRIDGE_LOG_*`.
    ///
    /// Некорректный формат из окружения игнорируется с сообщением в stderr:
    /// логирование ещё не поднято.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var(ENV_LOG_LEVEL) {
            self.level = level.trim().to_ascii_lowercase();
        }
        if let Ok(format) = env::var(ENV_LOG_FORMAT) {
            match format.parse() {
                Ok(format) => self.format = format,
                Err(e) => eprintln!("ignoring {ENV_LOG_FORMAT}: {e}"),
            }
        }
        if let Ok(dir) = env::var(ENV_LOG_DIR) {
            self.log_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<(), LoggingError> {
        let check = |level: &str| {
            if LEVELS.contains(&level) {
                Ok(())
            } else {
                Err(LoggingError::InvalidLevel(level.to_string()))
            }
        };
        check(self.level.as_str())?;
        self.module_levels
            .values()
            .try_for_each(|l| check(l.as_str()))
    }

    /// Создаёт каталог логов, если включён файловый вывод.
    pub fn ensure_log_dir(&self) -> Result<(), LoggingError> {
        if self.file.enabled {
            fs::create_dir_all(&self.log_dir)?;
        }
        Ok(())
    }

    /// Директива для `EnvFilter`: `"info,zenbridge::queue=debug"`.
    pub fn build_filter_directive(&self) -> String {
        let mut directive = self.level.clone();
        for (module, level) in &self.module_levels {
            directive.push(',');
            directive.push_str(module);
            directive.push('=');
            directive.push_str(level);
        }
        directive
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            with_ansi: true,
            with_target: true,
            with_thread_ids: false,
            with_line_numbers: false,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filename: "zenbridge.log".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            log_dir: PathBuf::from("logs"),
            module_levels: BTreeMap::new(),
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
        }
    }
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        })
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        env::remove_var(ENV_LOG_LEVEL);
        env::remove_var(ENV_LOG_FORMAT);
        env::remove_var(ENV_LOG_DIR);
    }

    /// Тест проверяет, что переменные окружения переопределяют настройки.
    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var(ENV_LOG_LEVEL, "DEBUG");
        env::set_var(ENV_LOG_FORMAT, "json");
        env::set_var(ENV_LOG_DIR, "/tmp/zenbridge-logs");

        let mut cfg = LoggingConfig::default();
        cfg.apply_env_overrides();
        clear_env();

        assert_eq!(cfg.level, "debug");
        assert_eq!(cfg.format, LogFormat::Json);
        assert_eq!(cfg.log_dir, PathBuf::from("/tmp/zenbridge-logs"));
    }

    /// Тест проверяет, что неизвестный формат из окружения не меняет
    /// настройку.
    #[test]
    #[serial]
    fn test_invalid_env_format_ignored() {
        clear_env();
        env::set_var(ENV_LOG_FORMAT, "xml");
        let mut cfg = LoggingConfig::default();
        cfg.apply_env_overrides();
        clear_env();
        assert_eq!(cfg.format, LogFormat::Compact);
    }

    /// Тест проверяет валидацию уровней.
    #[test]
    fn test_validate_levels() {
        let mut cfg = LoggingConfig::default();
        assert!(cfg.validate().is_ok());

        cfg.module_levels
            .insert("zenbridge::queue".into(), "loud".into());
        assert!(matches!(
            cfg.validate(),
            Err(LoggingError::InvalidLevel(l)) if l == "loud"
        ));
    }

    /// Тест проверяет сборку директивы фильтра.
    #[test]
    fn test_filter_directive() {
        let mut cfg = LoggingConfig::default();
        cfg.module_levels
            .insert("zenbridge::waitset".into(), "trace".into());
        cfg.module_levels
            .insert("zenbridge::queue".into(), "debug".into());
        assert_eq!(
            cfg.build_filter_directive(),
            "info,zenbridge::queue=debug,zenbridge::waitset=trace"
        );
    }

    /// Тест проверяет создание каталога логов только при включённом файле.
    #[test]
    fn test_ensure_log_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = LoggingConfig {
            log_dir: tmp.path().join("nested"),
            ..Default::default()
        };
        cfg.ensure_log_dir().unwrap();
        assert!(!cfg.log_dir.exists());

        cfg.file.enabled = true;
        cfg.ensure_log_dir().unwrap();
        assert!(cfg.log_dir.is_dir());
    }
}
