// core_module/src/error.rs

/// Перечисление всех возможных ошибок крейта `core_module`.
///
/// Позиционный доступ к параметрам - единственная операция базового контракта модуля,
/// которая может завершиться неудачей. Остальные варианты относятся к работе
/// со значениями переменных и к восстановлению сохраненного состояния.
/// Ни одна из этих ошибок не оставляет модуль в частично измененном состоянии.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)] // Clone, PartialEq, Eq для удобства тестирования.
pub enum ModuleError {
    /// Позиция параметра вне диапазона `[0, len)`.
    #[error("Позиция параметра {position} вне допустимого диапазона [0, {len})")]
    ParamIndexOutOfRange {
        /// Запрошенная позиция.
        position: usize,
        /// Текущее количество параметров модуля.
        len: usize,
    },

    /// Запрошен тензор ранга, отличного от ранга переменной.
    #[error("Несовпадение ранга: у переменной ранг {expected}, запрошен ранг {actual}")]
    RankMismatch {
        /// Ранг, с которым была создана переменная.
        expected: usize,
        /// Ранг, который запросил вызывающий код.
        actual: usize,
    },

    /// Форма параметра в записи не совпадает с формой параметра модуля.
    #[error("Несовпадение формы параметра {position}: ожидалась {expected:?}, получена {actual:?}")]
    ShapeMismatch {
        /// Позиция параметра.
        position: usize,
        /// Форма параметра модуля.
        expected: Vec<usize>,
        /// Форма из записи.
        actual: Vec<usize>,
    },

    /// Количество параметров в записи не совпадает с количеством параметров модуля.
    #[error("Несовпадение количества параметров: у модуля {expected}, в записи {actual}")]
    ParamCountMismatch {
        /// Количество параметров модуля.
        expected: usize,
        /// Количество параметров в записи.
        actual: usize,
    },

    /// Значения не соответствуют форме или не могут быть прочитаны из тензора.
    #[error("Некорректные данные тензора: {0}")]
    InvalidData(String),

    /// Ошибка, возникшая в прямом проходе конкретного модуля.
    #[error("Ошибка прямого прохода: {0}")]
    Forward(String),
}
