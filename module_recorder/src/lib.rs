// module_recorder/src/lib.rs

// Включаем строгие правила линтинга для всего крейта.
#![warn(
    missing_docs, // Предупреждать об отсутствующей документации для публичных элементов.
    clippy::all, // Все стандартные проверки Clippy.
    clippy::pedantic, // Более строгие ("педантичные") проверки Clippy.
    clippy::nursery // Экспериментальные проверки Clippy (могут быть нестабильны).
)]
// Запрещаем использование небезопасных конструкций и потенциально проблемных методов.
#![deny(
    unsafe_code, // Запрет `unsafe` блоков без явного `allow`.
    clippy::unwrap_used, // Запрет использования `.unwrap()`.
    clippy::expect_used // Запрет использования `.expect()`.
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! # `module_recorder`
//!
//! Сохранение и загрузка состояния модулей (`core_module::ModuleRecord`) в файлы.
//!
//! Поддерживаются два формата:
//! - JSON (`serde_json`), компактный или с отступами;
//! - safetensors: параметр `i` хранится как тензор `param.{i}` (F32, little-endian),
//!   режим модуля - в метаданных заголовка под ключом `training`.
//!
//! Формат выбирается из конфигурации (`module_utils::RecorderConfigSub`) через
//! [`RecorderKind::from_config`]. Каждая загруженная запись проходит
//! [`RecordValidator::validate_record`].

pub mod error;
pub mod recorder;
pub mod validation;

pub use error::RecorderError;
pub use recorder::{checkpoint_path, JsonRecorder, Recorder, RecorderKind, SafetensorsRecorder};
pub use validation::RecordValidator;
