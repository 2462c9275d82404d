// core_module/src/module.rs

//! Базовая абстракция дифференцируемого вычислительного блока.
//!
//! [`ModuleState`] хранит состояние, общее для всех модулей: упорядоченный список
//! параметров и флаг режима. Трейт [`Module`] требует от конкретного типа только
//! доступа к этому состоянию, прямого прохода и текстового описания; все остальные
//! операции предоставляются по умолчанию и могут быть переопределены контейнерами.

use burn::tensor::backend::{AutodiffBackend, Backend};
use tracing::{debug, trace, warn};

use crate::{
    error::ModuleError,
    record::{ModuleRecord, ParamRecord},
    variable::Variable,
};

/// Параметры модуля и режим обучения/оценки.
///
/// После создания порядок параметров не меняется: доступна только замена по позиции.
#[derive(Debug)]
pub struct ModuleState<B: Backend> {
    params: Vec<Variable<B>>,
    training: bool,
}

impl<B: Backend> Default for ModuleState<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> ModuleState<B> {
    /// Состояние без параметров в режиме обучения.
    pub fn new() -> Self {
        Self::with_params(Vec::new())
    }

    /// Состояние с заданными параметрами (владение разделяется с вызывающим кодом).
    /// Флаги переменных не трогаются до первого переключения режима.
    pub fn with_params(params: Vec<Variable<B>>) -> Self {
        Self {
            params,
            training: true,
        }
    }

    /// Строит новое состояние из записи: каждая переменная создается заново на `device`.
    ///
    /// # Ошибки
    /// `ModuleError::InvalidData`, если значения параметра не соответствуют его форме.
    pub fn from_record(record: &ModuleRecord, device: &B::Device) -> Result<Self, ModuleError> {
        let params = record
            .params
            .iter()
            .map(|p| Variable::from_floats(p.values.clone(), &p.dims, device, record.training))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            params,
            training: record.training,
        })
    }

    /// Копия списка параметров. Изменение возвращенного `Vec` не влияет на модуль.
    pub fn params(&self) -> Vec<Variable<B>> {
        self.params.clone()
    }

    /// Количество параметров.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Нет ли у модуля параметров.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Находится ли модуль в режиме обучения.
    pub fn is_training(&self) -> bool {
        self.training
    }

    pub(crate) fn out_of_range(&self, position: usize) -> ModuleError {
        warn!(
            position,
            len = self.params.len(),
            "Обращение к параметру вне диапазона"
        );
        ModuleError::ParamIndexOutOfRange {
            position,
            len: self.params.len(),
        }
    }

    /// Параметр по позиции.
    ///
    /// # Ошибки
    /// `ModuleError::ParamIndexOutOfRange`, если `position >= len`.
    pub fn param(&self, position: usize) -> Result<Variable<B>, ModuleError> {
        self.params
            .get(position)
            .cloned()
            .ok_or_else(|| self.out_of_range(position))
    }

    /// Заменяет параметр по позиции.
    ///
    /// Флаг отслеживания новой переменной приводится к текущему режиму модуля;
    /// результат прямого прохода становится листом.
    /// При ошибке список параметров не меняется.
    ///
    /// # Ошибки
    /// `ModuleError::ParamIndexOutOfRange`, если `position >= len`.
    pub fn set_param(&mut self, variable: Variable<B>, position: usize) -> Result<(), ModuleError> {
        if position >= self.params.len() {
            return Err(self.out_of_range(position));
        }
        variable.make_leaf();
        variable.set_requires_grad(self.training);
        debug!(position, dims = ?variable.dims(), "Замена параметра");
        if let Some(slot) = self.params.get_mut(position) {
            *slot = variable;
        }
        Ok(())
    }

    /// Переключает режим и переносит его на флаг отслеживания каждого параметра.
    pub fn set_training(&mut self, training: bool) {
        self.training = training;
        for param in &self.params {
            param.make_leaf();
            param.set_requires_grad(training);
        }
        debug!(training, params = self.params.len(), "Переключение режима модуля");
    }

    /// Сбрасывает буферы градиентов всех параметров.
    pub fn zero_grad(&self) {
        for param in &self.params {
            param.zero_grad();
        }
        trace!(params = self.params.len(), "Градиенты параметров сброшены");
    }

    /// Снимок состояния для сохранения.
    ///
    /// # Ошибки
    /// `ModuleError::InvalidData`, если данные параметра не удалось прочитать.
    pub fn to_record(&self) -> Result<ModuleRecord, ModuleError> {
        Ok(ModuleRecord {
            params: self
                .params
                .iter()
                .map(ParamRecord::from_variable)
                .collect::<Result<Vec<_>, _>>()?,
            training: self.training,
        })
    }

    /// Проверяет, что запись подходит к этому состоянию: совпадают количество параметров,
    /// их формы и количество значений.
    ///
    /// # Ошибки
    /// `ModuleError::ParamCountMismatch`, `ModuleError::ShapeMismatch` или
    /// `ModuleError::InvalidData`.
    pub fn check_record(&self, record: &ModuleRecord) -> Result<(), ModuleError> {
        if record.params.len() != self.params.len() {
            warn!(
                expected = self.params.len(),
                actual = record.params.len(),
                "Запись не подходит к модулю"
            );
            return Err(ModuleError::ParamCountMismatch {
                expected: self.params.len(),
                actual: record.params.len(),
            });
        }
        for (position, (param, saved)) in self.params.iter().zip(&record.params).enumerate() {
            let dims = param.dims();
            if dims != saved.dims {
                warn!(position, "Форма параметра в записи не совпадает");
                return Err(ModuleError::ShapeMismatch {
                    position,
                    expected: dims,
                    actual: saved.dims.clone(),
                });
            }
            if !saved.is_consistent() {
                return Err(ModuleError::InvalidData(format!(
                    "параметр {position}: {} значений для формы {:?}",
                    saved.values.len(),
                    saved.dims
                )));
            }
        }
        Ok(())
    }

    /// Записывает значения из записи в существующие переменные (идентичность сохраняется).
    /// Режим не меняется: его восстанавливает [`Module::load_record`].
    ///
    /// # Ошибки
    /// Ошибки [`ModuleState::check_record`]; в этом случае ничего не меняется.
    pub fn assign_values(&self, record: &ModuleRecord) -> Result<(), ModuleError> {
        self.check_record(record)?;
        for (param, saved) in self.params.iter().zip(&record.params) {
            param.assign(saved.values.clone())?;
        }
        Ok(())
    }

    /// Добавляет параметры в конец списка. Только для сборки контейнеров.
    pub(crate) fn append_params(&mut self, params: Vec<Variable<B>>) {
        self.params.extend(params);
    }
}

/// Трейт дифференцируемого вычислительного блока.
///
/// Конкретный тип обязан предоставить доступ к [`ModuleState`], прямой проход
/// и текстовое описание. Контейнеры переопределяют `train`, `eval`, `zero_grad`
/// и `set_param`, чтобы рекурсивно передавать их дочерним модулям.
pub trait Module<B: Backend> {
    /// Состояние модуля.
    fn state(&self) -> &ModuleState<B>;

    /// Изменяемое состояние модуля.
    fn state_mut(&mut self) -> &mut ModuleState<B>;

    /// Прямой проход: строит выход через операции Burn, записывая ребра графа
    /// от выхода к параметрам.
    ///
    /// # Ошибки
    /// Определяются конкретным модулем.
    fn forward(&self, input: &Variable<B>) -> Result<Variable<B>, ModuleError>;

    /// Человекочитаемое описание модуля.
    fn pretty_string(&self) -> String;

    /// Синоним [`Module::forward`].
    ///
    /// # Ошибки
    /// Ошибки [`Module::forward`].
    fn call(&self, input: &Variable<B>) -> Result<Variable<B>, ModuleError> {
        self.forward(input)
    }

    /// Модуль как унарная функция над переменными.
    fn as_fn(&self) -> Box<dyn Fn(&Variable<B>) -> Result<Variable<B>, ModuleError> + '_> {
        Box::new(move |input| self.forward(input))
    }

    /// Копия списка параметров.
    fn params(&self) -> Vec<Variable<B>> {
        self.state().params()
    }

    /// Количество параметров.
    fn num_params(&self) -> usize {
        self.state().len()
    }

    /// Параметр по позиции.
    ///
    /// # Ошибки
    /// `ModuleError::ParamIndexOutOfRange`, если позиция вне диапазона.
    fn param(&self, position: usize) -> Result<Variable<B>, ModuleError> {
        self.state().param(position)
    }

    /// Заменяет параметр по позиции; флаг новой переменной приводится к режиму модуля.
    ///
    /// # Ошибки
    /// `ModuleError::ParamIndexOutOfRange`, если позиция вне диапазона.
    fn set_param(&mut self, variable: Variable<B>, position: usize) -> Result<(), ModuleError> {
        self.state_mut().set_param(variable, position)
    }

    /// Режим обучения: отслеживание градиента включено у всех параметров.
    fn train(&mut self) {
        self.state_mut().set_training(true);
    }

    /// Режим оценки: отслеживание градиента выключено у всех параметров.
    fn eval(&mut self) {
        self.state_mut().set_training(false);
    }

    /// Находится ли модуль в режиме обучения.
    fn is_training(&self) -> bool {
        self.state().is_training()
    }

    /// Сбрасывает буферы градиентов параметров, не трогая значения и флаги.
    fn zero_grad(&mut self) {
        self.state().zero_grad();
    }

    /// Забирает градиенты параметров из результата обратного прохода Burn.
    /// Возвращает количество параметров, получивших градиент.
    fn accumulate_grads(&self, grads: &<B as AutodiffBackend>::Gradients) -> usize
    where
        B: AutodiffBackend,
    {
        self.state()
            .params
            .iter()
            .filter(|param| param.accumulate_grad(grads))
            .count()
    }

    /// Снимок сохраняемого состояния: параметры и режим.
    ///
    /// # Ошибки
    /// `ModuleError::InvalidData`, если данные параметра не удалось прочитать.
    fn to_record(&self) -> Result<ModuleRecord, ModuleError> {
        self.state().to_record()
    }

    /// Восстанавливает значения параметров (на месте) и режим из записи.
    ///
    /// # Ошибки
    /// `ModuleError::ParamCountMismatch`, `ModuleError::ShapeMismatch` или
    /// `ModuleError::InvalidData`; при ошибке модуль не меняется.
    fn load_record(&mut self, record: &ModuleRecord) -> Result<(), ModuleError> {
        self.state().assign_values(record)?;
        if record.training {
            self.train();
        } else {
            self.eval();
        }
        Ok(())
    }
}
