// core_module/src/lib.rs

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

//! # `core_module`
//!
//! Базовая абстракция дифференцируемого вычислительного блока ("модуля") поверх
//! фреймворка [Burn](https://burn.dev/). Модуль владеет упорядоченным списком
//! параметров, переключается между режимами обучения и оценки (режим переносится
//! на флаг отслеживания градиента каждого параметра), умеет сбрасывать градиенты
//! и отдает свое состояние для сохранения.
//!
//! ## Структура
//!
//! - `variable`: `Variable` - разделяемый дескриптор тензора Burn с флагом отслеживания
//!   и буфером градиента.
//! - `module`: трейт `Module` и общее состояние `ModuleState`.
//! - `sequential`: контейнер `Sequential`.
//! - `record`: `ModuleRecord` - описание сохраняемого состояния.
//! - `error`: тип ошибки `ModuleError`.

pub mod error;
pub mod module;
pub mod record;
pub mod sequential;
pub mod variable;

// Ошибки
pub use error::ModuleError;

// Абстракция модуля и контейнеры
pub use module::{Module, ModuleState};
pub use sequential::Sequential;
pub use variable::Variable;

// Сохраняемое состояние
pub use record::{ModuleRecord, ParamRecord};
