//! Согласование политики истории (QoS).
//!
//! Глубина истории после согласования становится ёмкостью очереди и
//! таблицы корреляции конечной точки.

use std::fmt;

use serde::{Deserialize, Serialize};
use zenbridge_error::QosError;

/// Глубина истории, подставляемая вместо "по умолчанию" (0).
pub const DEFAULT_HISTORY_DEPTH: usize = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum History {
    #[default]
    SystemDefault,
    KeepLast,
    KeepAll,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QosProfile {
    pub history: History,
    /// 0 означает "глубина по умолчанию".
    pub depth: usize,
}

impl QosProfile {
    pub fn keep_last(depth: usize) -> Self {
        Self {
            history: History::KeepLast,
            depth,
        }
    }

    /// Согласует профиль с [`DEFAULT_HISTORY_DEPTH`].
    pub fn adapt(&self) -> Result<Self, QosError> {
        self.adapt_with_default(DEFAULT_HISTORY_DEPTH)
    }

    /// `SystemDefault` и `Unknown` становятся `KeepLast`, `KeepAll` не
    /// поддерживается, глубина 0 заменяется на `default_depth`.
    pub fn adapt_with_default(
        &self,
        default_depth: usize,
    ) -> Result<Self, QosError> {
        let history = match self.history {
            History::KeepAll => {
                return Err(QosError::UnsupportedHistory {
                    policy: self.history.to_string(),
                })
            }
            History::SystemDefault | History::Unknown | History::KeepLast => History::KeepLast,
        };
        let depth = if self.depth == 0 {
            default_depth.max(1)
        } else {
            self.depth
        };
        Ok(Self { history, depth })
    }
}

impl fmt::Display for History {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Self::SystemDefault => "system_default",
            Self::KeepLast => "keep_last",
            Self::KeepAll => "keep_all",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет подстановку глубины по умолчанию.
    #[test]
    fn test_zero_depth_becomes_default() {
        let adapted = QosProfile::default().adapt().unwrap();
        assert_eq!(adapted, QosProfile::keep_last(DEFAULT_HISTORY_DEPTH));
    }

    /// Тест проверяет, что заданная глубина сохраняется.
    #[test]
    fn test_explicit_depth_kept() {
        let qos = QosProfile {
            history: History::Unknown,
            depth: 7,
        };
        assert_eq!(qos.adapt().unwrap(), QosProfile::keep_last(7));
        assert_eq!(
            QosProfile::default().adapt_with_default(3).unwrap().depth,
            3
        );
    }

    /// Тест проверяет, что KeepAll отклоняется.
    #[test]
    fn test_keep_all_rejected() {
        let qos = QosProfile {
            history: History::KeepAll,
            depth: 10,
        };
        assert_eq!(
            qos.adapt(),
            Err(QosError::UnsupportedHistory {
                policy: "keep_all".to_string()
            })
        );
    }
}
