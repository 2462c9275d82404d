// core_module/src/record.rs

//! Описание сохраняемого состояния модуля.
//!
//! Состояние модуля - это ровно два поля в фиксированном порядке: упорядоченный список
//! параметров и флаг режима обучения. Структуры ниже реализуют `serde`, поэтому
//! с ними напрямую работает любой serde-кодек (см. крейт `module_recorder`).

use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};

use crate::{error::ModuleError, variable::Variable};

/// Сохраненные значения одного параметра.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamRecord {
    /// Логические размерности параметра.
    pub dims: Vec<usize>,
    /// Значения в порядке row-major.
    pub values: Vec<f32>,
}

impl ParamRecord {
    /// Снимает значения с переменной.
    ///
    /// # Ошибки
    /// `ModuleError::InvalidData`, если данные тензора не удалось прочитать.
    pub fn from_variable<B: Backend>(variable: &Variable<B>) -> Result<Self, ModuleError> {
        Ok(Self {
            dims: variable.dims(),
            values: variable.to_floats()?,
        })
    }

    /// Количество элементов, которое задают размерности.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Совпадает ли количество значений с формой.
    pub fn is_consistent(&self) -> bool {
        self.values.len() == self.num_elements()
    }
}

/// Полное сохраняемое состояние модуля.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// Параметры в порядке, заданном модулем.
    pub params: Vec<ParamRecord>,
    /// Режим обучения (`true`) или оценки (`false`).
    pub training: bool,
}

impl ModuleRecord {
    /// Имена сохраняемых полей в порядке сериализации.
    pub const FIELDS: [&'static str; 2] = ["params", "training"];
}
