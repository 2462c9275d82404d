#![warn(
    missing_docs, // Предупреждать, если публичные элементы не документированы.
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used, // Предупреждать об использовании .unwrap()
    clippy::expect_used  // Предупреждать об использовании .expect()
)]
#![deny(
    unsafe_code,        // Запретить использование unsafe блоков.
    unused_mut,         // Запретить неиспользуемые изменяемые переменные.
    unused_imports,     // Запретить неиспользуемые импорты.
    unused_attributes   // Запретить неиспользуемые атрибуты.
)]

//! `module_utils` предоставляет общую обработку ошибок, инициализацию логирования,
//! конфигурацию и утилиты для путей, которыми пользуются `core_module`
//! и `module_recorder`.
//!
//! # Основные модули:
//!
//! - [`error`]: Определяет общий тип ошибки `UtilsError`.
//! - [`config`]: (активируется фичей `config_toml`) Предоставляет `AppConfig` для
//!   загрузки настроек логирования и сохранения модулей из TOML-файлов.
//! - [`path`]: (активируется фичей `path_utils_feature`) Утилиты для работы
//!   с путями файловой системы.
//! - [`logger`]: (активируется фичей `logger_utils_feature`) Инициализация
//!   системы логирования на базе `tracing`.
//!
//! Фича `default` включает все модули.

// --- Модуль для общих ошибок ---
pub mod error;
pub use error::UtilsError; // Реэкспорт для удобства использования.

// --- Утилитарные модули (управляются фичами) ---

/// Модуль с утилитами для работы с путями файловой системы.
///
/// Активируется фичей `path_utils_feature`.
#[cfg(feature = "path_utils_feature")]
pub mod path;
#[cfg(feature = "path_utils_feature")]
pub use path::{ensure_dir_exists, sanitize_path_component};

/// Модуль с утилитами для инициализации логирования.
///
/// Активируется фичей `logger_utils_feature`.
#[cfg(feature = "logger_utils_feature")]
pub mod logger;
#[cfg(feature = "logger_utils_feature")]
pub use logger::init_tracing_logger;

/// Модуль для загрузки и управления конфигурацией.
///
/// Активируется фичей `config_toml`.
#[cfg(feature = "config_toml")]
pub mod config;
#[cfg(feature = "config_toml")]
pub use config::{AppConfig, LoggingConfigSub, RecordFormat, RecorderConfigSub};
