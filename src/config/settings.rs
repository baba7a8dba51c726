use std::{path::Path, time::Duration};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use zenbridge_error::QosError;

use crate::{
    error::{BridgeError, BridgeResult},
    logging::LoggingConfig,
    qos::{QosProfile, DEFAULT_HISTORY_DEPTH},
};

/// Имя необязательного файла настроек в рабочем каталоге (без расширения).
pub const DEFAULT_CONFIG_FILE: &str = "zenbridge";
/// Префикс переменных окружения.
pub const ENV_PREFIX: &str = "ZENBRIDGE";

/// Настройки моста.
///
/// Источники по возрастанию приоритета: значения по умолчанию,
/// `zenbridge.toml`, явно указанный файл, переменные `ZENBRIDGE_*`
/// (вложенные ключи через `__`, например `ZENBRIDGE_LOGGING__LEVEL`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Глубина истории, подставляемая вместо "по умолчанию".
    pub default_depth: usize,
    /// Таймаут ожидания: отсутствует — ждать бесконечно, 0 — опрос.
    pub wait_timeout_ms: Option<u64>,
    pub logging: LoggingConfig,
}

impl Settings {
    pub fn load() -> BridgeResult<Self> {
        Self::load_from(None)
    }

    pub fn load_from(path: Option<&Path>) -> BridgeResult<Self> {
        let mut builder = Config::builder()
            .set_default("default_depth", DEFAULT_HISTORY_DEPTH as u64)?
            .add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> BridgeResult<()> {
        if self.default_depth == 0 {
            return Err(BridgeError::InvalidConfig(
                "default_depth must be at least 1".to_string(),
            ));
        }
        self.logging
            .validate()
            .map_err(|e| BridgeError::InvalidConfig(e.to_string()))
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_ms.map(Duration::from_millis)
    }

    /// Согласует профиль QoS с настроенной глубиной по умолчанию.
    pub fn adapt_qos(
        &self,
        qos: &QosProfile,
    ) -> Result<QosProfile, QosError> {
        qos.adapt_with_default(self.default_depth)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_depth: DEFAULT_HISTORY_DEPTH,
            wait_timeout_ms: None,
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{env, io::Write};

    use serial_test::serial;

    use super::*;

    /// Тест проверяет значения по умолчанию.
    #[test]
    #[serial]
    fn test_defaults() {
        env::remove_var("ZENBRIDGE_DEFAULT_DEPTH");
        let settings = Settings::load().unwrap();
        assert_eq!(settings.default_depth, DEFAULT_HISTORY_DEPTH);
        assert_eq!(settings.wait_timeout(), None);
        assert_eq!(settings.logging, LoggingConfig::default());
    }

    /// Тест проверяет чтение файла и приоритет окружения над файлом.
    #[test]
    #[serial]
    fn test_file_and_env_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "default_depth = 8\nwait_timeout_ms = 250\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let settings = Settings::load_from(Some(file.path())).unwrap();
        assert_eq!(settings.default_depth, 8);
        assert_eq!(settings.wait_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(settings.logging.level, "debug");

        env::set_var("ZENBRIDGE_DEFAULT_DEPTH", "3");
        let settings = Settings::load_from(Some(file.path()));
        env::remove_var("ZENBRIDGE_DEFAULT_DEPTH");
        assert_eq!(settings.unwrap().default_depth, 3);
    }

    /// Тест проверяет, что нулевая глубина отклоняется.
    #[test]
    #[serial]
    fn test_zero_depth_rejected() {
        env::set_var("ZENBRIDGE_DEFAULT_DEPTH", "0");
        let result = Settings::load();
        env::remove_var("ZENBRIDGE_DEFAULT_DEPTH");
        assert!(matches!(result, Err(BridgeError::InvalidConfig(_))));
    }

    /// Тест проверяет подстановку настроенной глубины в QoS.
    #[test]
    fn test_adapt_qos_uses_default_depth() {
        let settings = Settings {
            default_depth: 5,
            ..Default::default()
        };
        assert_eq!(
            settings.adapt_qos(&QosProfile::default()).unwrap().depth,
            5
        );
    }
}
