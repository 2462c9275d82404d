use std::error::Error as _;
use std::io;
use std::path::Path;

use module_utils::error::UtilsError;

#[test]
fn io_error_keeps_path_and_source() {
    let err = UtilsError::io(
        Path::new("checkpoints/model.json"),
        io::Error::new(io::ErrorKind::PermissionDenied, "доступ запрещен"),
    );
    let message = err.to_string();
    assert!(message.contains("checkpoints/model.json"), "{message}");
    assert!(message.contains("доступ запрещен"), "{message}");

    let source = err.source().and_then(|s| s.downcast_ref::<io::Error>());
    assert_eq!(source.map(io::Error::kind), Some(io::ErrorKind::PermissionDenied));
}

#[cfg(feature = "config_toml")]
#[test]
fn toml_error_becomes_config_error() {
    let toml_err = toml::from_str::<toml::Value>("key = ").unwrap_err();
    match UtilsError::from(toml_err) {
        UtilsError::Config(msg) => assert!(msg.starts_with("не удалось разобрать TOML"), "{msg}"),
        other => panic!("Ожидалась UtilsError::Config, получено {other:?}"),
    }
}

#[test]
fn messages_are_prefixed_by_kind() {
    assert_eq!(
        UtilsError::Config("нет секции".to_string()).to_string(),
        "Ошибка конфигурации: нет секции"
    );
    assert_eq!(
        UtilsError::InvalidParameter("пустое имя".to_string()).to_string(),
        "Неверный параметр: пустое имя"
    );
    assert_eq!(
        UtilsError::Generic("логгер".to_string()).to_string(),
        "Произошла общая ошибка утилиты: логгер"
    );
}
