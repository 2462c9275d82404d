use std::error::Error; // Стандартный трейт для ошибок

use core_module::ModuleError;
use module_utils::UtilsError;
use thiserror::Error; // Макрос для упрощенного создания типов ошибок

/// Ошибки крейта `module_recorder`.
///
/// Покрывают файловый ввод/вывод, кодирование и разбор записей, а также
/// ошибки нижележащих крейтов (`core_module`, `module_utils`).
#[derive(Error, Debug)]
pub enum RecorderError {
    /// Сбой файлового ввода/вывода.
    #[error("Ошибка ввода/вывода по пути '{path}': {source}")]
    Io {
        /// Путь к файлу, который вызвал ошибку.
        path: String,
        /// Исходная ошибка `std::io::Error`.
        #[source]
        source: std::io::Error,
    },

    /// Не удалось закодировать запись в формат файла.
    #[error("Не удалось закодировать запись модуля для '{path}': {source}")]
    Encoding {
        /// Путь к файлу назначения.
        path: String,
        /// Исходная ошибка кодека.
        #[source]
        source: Box<dyn Error + Send + Sync + 'static>,
    },

    /// Не удалось разобрать содержимое файла записи.
    #[error("Не удалось разобрать запись модуля из '{path}': {source}")]
    Decoding {
        /// Путь к файлу записи.
        path: String,
        /// Исходная ошибка кодека.
        #[source]
        source: Box<dyn Error + Send + Sync + 'static>,
    },

    /// Запись разобрана, но внутренне несогласована.
    #[error("Невалидная запись модуля: {message}")]
    InvalidRecord {
        /// Описание всех найденных нарушений.
        message: String,
    },

    /// Ошибка модуля (несовпадение параметров, чтение данных тензора).
    #[error(transparent)]
    Module(#[from] ModuleError),

    /// Ошибка утилит (создание директорий).
    #[error(transparent)]
    Utils(#[from] UtilsError),
}

impl RecorderError {
    /// Ошибка ввода/вывода с путем.
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Ошибка разбора с путем.
    pub fn decoding(
        path: &std::path::Path,
        source: impl Into<Box<dyn Error + Send + Sync + 'static>>,
    ) -> Self {
        Self::Decoding {
            path: path.display().to_string(),
            source: source.into(),
        }
    }

    /// Ошибка кодирования с путем.
    pub fn encoding(
        path: &std::path::Path,
        source: impl Into<Box<dyn Error + Send + Sync + 'static>>,
    ) -> Self {
        Self::Encoding {
            path: path.display().to_string(),
            source: source.into(),
        }
    }
}
