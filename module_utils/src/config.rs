use std::path::Path;

use serde::Deserialize;
use tracing::{warn, Level};

use crate::error::UtilsError;

/// Глобальная конфигурация: логирование и сохранение состояния модулей.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct AppConfig {
    /// Конфигурация логирования.
    #[serde(default)]
    pub logging_config: LoggingConfigSub,

    /// Конфигурация сохранения/загрузки записей модулей.
    #[serde(default)]
    pub recorder_config: RecorderConfigSub,
}

/// Конфигурация логирования (под-конфигурация для `AppConfig`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfigSub {
    /// Уровень логирования (`trace`, `debug`, `info`, `warn`, `error`).
    #[serde(default = "default_log_level_app")]
    pub level: String,
    /// Директория для файлов логов (опционально).
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level_app() -> String {
    "info".to_string()
}

impl Default for LoggingConfigSub {
    fn default() -> Self {
        Self {
            level: default_log_level_app(),
            log_dir: None,
        }
    }
}

impl LoggingConfigSub {
    /// Разбирает строковый уровень в `tracing::Level`.
    /// Нераспознанное значение заменяется на `INFO` с предупреждением.
    pub fn level_filter(&self) -> Level {
        self.level.parse().unwrap_or_else(|_| {
            warn!("Неизвестный уровень логирования '{}', используется INFO.", self.level);
            Level::INFO
        })
    }
}

/// Формат файлов, в которые сохраняется запись модуля.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// Текстовый JSON.
    #[default]
    Json,
    /// Бинарный формат safetensors.
    Safetensors,
}

/// Конфигурация сохранения записей модулей (под-конфигурация для `AppConfig`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecorderConfigSub {
    /// Формат файлов записей.
    #[serde(default)]
    pub format: RecordFormat,
    /// Форматировать ли JSON с отступами.
    #[serde(default)]
    pub pretty_json: bool,
    /// Директория для контрольных точек.
    #[serde(default = "default_checkpoint_dir_app")]
    pub checkpoint_dir: String,
}

fn default_checkpoint_dir_app() -> String {
    "./checkpoints".to_string()
}

impl Default for RecorderConfigSub {
    fn default() -> Self {
        Self {
            format: RecordFormat::default(),
            pretty_json: false,
            checkpoint_dir: default_checkpoint_dir_app(),
        }
    }
}

impl AppConfig {
    /// Загружает конфигурацию из TOML файла.
    /// Если файл не найден, возвращается конфигурация по умолчанию.
    ///
    /// # Arguments
    /// * `file_path` - Путь к TOML файлу конфигурации.
    ///
    /// # Errors
    /// Возвращает `UtilsError::Io` при ошибках чтения файла или `UtilsError::Config`
    /// (через `From<toml::de::Error>`) при ошибках парсинга TOML.
    pub fn load_from_toml(file_path: &Path) -> Result<Self, UtilsError> {
        if !file_path.exists() {
            warn!(
                "AppConfig file not found at {:?}, using default configuration.",
                file_path
            );
            return Ok(Self::default());
        }
        let config_str =
            std::fs::read_to_string(file_path).map_err(|e| UtilsError::io(file_path, e))?;
        let config = toml::from_str(&config_str).inspect_err(|e| {
            warn!("Не удалось разобрать конфигурацию {:?}: {}", file_path, e);
        })?;
        Ok(config)
    }
}
