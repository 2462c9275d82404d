use core_module::ModuleRecord;
use tracing::{debug, warn};

use crate::error::RecorderError;

/// Проверки согласованности записей модулей.
///
/// Отделяет валидацию от кодеков: запись, прочитанная из любого формата,
/// проверяется одинаково.
pub struct RecordValidator;

impl RecordValidator {
    /// Проверяет, что у каждого параметра количество значений равно произведению размерностей.
    ///
    /// Собирает все нарушения, а не только первое.
    ///
    /// # Ошибки
    /// `RecorderError::InvalidRecord` со списком нарушений.
    pub fn validate_record(record: &ModuleRecord) -> Result<(), RecorderError> {
        debug!(params = record.params.len(), "Валидация записи модуля.");
        let errors: Vec<String> = record
            .params
            .iter()
            .enumerate()
            .filter(|(_, param)| !param.is_consistent())
            .map(|(position, param)| {
                format!(
                    "параметр {position}: {} значений при форме {:?} ({} элементов)",
                    param.values.len(),
                    param.dims,
                    param.num_elements()
                )
            })
            .collect();

        if !errors.is_empty() {
            let message = errors.join("; ");
            warn!("Валидация записи модуля не пройдена: {}", message);
            return Err(RecorderError::InvalidRecord { message });
        }

        debug!("Запись модуля успешно валидирована.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_module::ParamRecord;

    #[test]
    fn consistent_record_passes() {
        let record = ModuleRecord {
            params: vec![
                ParamRecord {
                    dims: vec![2, 3],
                    values: vec![0.0; 6],
                },
                ParamRecord {
                    dims: vec![],
                    values: vec![1.0],
                },
            ],
            training: true,
        };
        assert!(RecordValidator::validate_record(&record).is_ok());
    }

    #[test]
    fn all_violations_are_reported() {
        let record = ModuleRecord {
            params: vec![
                ParamRecord {
                    dims: vec![2],
                    values: vec![0.0; 3],
                },
                ParamRecord {
                    dims: vec![1],
                    values: vec![0.0],
                },
                ParamRecord {
                    dims: vec![2, 2],
                    values: vec![],
                },
            ],
            training: false,
        };
        match RecordValidator::validate_record(&record) {
            Err(RecorderError::InvalidRecord { message }) => {
                assert!(message.contains("параметр 0"), "{message}");
                assert!(!message.contains("параметр 1"), "{message}");
                assert!(message.contains("параметр 2"), "{message}");
            }
            other => panic!("Ожидалась InvalidRecord, получено {other:?}"),
        }
    }
}
