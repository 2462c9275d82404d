use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{info, trace, warn};

use crate::error::UtilsError;

/// Создает директорию (вместе с родителями), если ее еще нет.
///
/// # Errors
/// `UtilsError::InvalidParameter`, если путь занят файлом;
/// `UtilsError::Io`, если директорию не удалось проверить или создать.
pub fn ensure_dir_exists(dir_path: &Path) -> Result<(), UtilsError> {
    match fs::metadata(dir_path) {
        Ok(meta) if meta.is_dir() => {
            trace!("Директория уже существует: {:?}", dir_path);
            Ok(())
        }
        Ok(_) => {
            let message = format!("путь {dir_path:?} занят файлом, а не директорией");
            warn!("{}", message);
            Err(UtilsError::InvalidParameter(message))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            fs::create_dir_all(dir_path).map_err(|e| UtilsError::io(dir_path, e))?;
            info!("Создана директория: {:?}", dir_path);
            Ok(())
        }
        Err(e) => Err(UtilsError::io(dir_path, e)),
    }
}

/// Превращает произвольную строку (например, `pretty_string` модуля) в безопасное имя файла:
/// все, кроме ASCII-букв, цифр, `-`, `.` и `_`, заменяется на `_`.
pub fn sanitize_path_component(component: &str) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
