use std::path::Path;

use thiserror::Error;

/// Ошибки `module_utils`: файловая система, конфигурация, инициализация логгера.
#[derive(Error, Debug)]
pub enum UtilsError {
    /// Сбой ввода-вывода на конкретном пути.
    #[error("Ошибка ввода-вывода по пути '{path}': {source}")]
    Io {
        /// Путь, на котором произошел сбой.
        path: String,
        /// Исходная ошибка.
        #[source]
        source: std::io::Error,
    },

    /// Конфигурация не разобрана или содержит недопустимые значения.
    #[error("Ошибка конфигурации: {0}")]
    Config(String),

    /// Недопустимый аргумент утилиты (например, файл там, где нужна директория).
    #[error("Неверный параметр: {0}")]
    InvalidParameter(String),

    /// Прочие сбои, в том числе повторная инициализация логгера.
    #[error("Произошла общая ошибка утилиты: {0}")]
    Generic(String),
}

/// Синтаксические ошибки и несовпадение типов в TOML считаются ошибками конфигурации.
#[cfg(feature = "config_toml")]
impl From<toml::de::Error> for UtilsError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("не удалось разобрать TOML: {err}"))
    }
}

impl UtilsError {
    /// `UtilsError::Io` с путем для сообщения.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
