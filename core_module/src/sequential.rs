// core_module/src/sequential.rs

//! Контейнер, последовательно применяющий дочерние модули.

use std::fmt::Write as _;

use burn::tensor::backend::Backend;
use tracing::debug;

use crate::{
    error::ModuleError,
    module::{Module, ModuleState},
    variable::Variable,
};

/// Последовательный контейнер модулей.
///
/// Параметры контейнера - конкатенация параметров дочерних модулей в порядке добавления
/// (те же разделяемые переменные). Режим и замена параметров передаются дочерним модулям.
pub struct Sequential<B: Backend> {
    state: ModuleState<B>,
    modules: Vec<Box<dyn Module<B>>>,
    /// Для каждой позиции параметра контейнера: (индекс дочернего модуля, позиция в нем).
    owners: Vec<(usize, usize)>,
}

impl<B: Backend> Default for Sequential<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Sequential<B> {
    /// Пустой контейнер в режиме обучения.
    pub fn new() -> Self {
        Self {
            state: ModuleState::new(),
            modules: Vec::new(),
            owners: Vec::new(),
        }
    }

    /// Добавляет дочерний модуль в конец. Модуль переводится в режим контейнера.
    pub fn add(&mut self, mut module: impl Module<B> + 'static) -> &mut Self {
        if self.state.is_training() {
            module.train();
        } else {
            module.eval();
        }
        let index = self.modules.len();
        let params = module.params();
        self.owners
            .extend((0..params.len()).map(|position| (index, position)));
        self.state.append_params(params);
        debug!(
            index,
            module = %module.pretty_string(),
            params = self.state.len(),
            "Модуль добавлен в Sequential"
        );
        self.modules.push(Box::new(module));
        self
    }

    /// Дочерний модуль по индексу.
    pub fn module(&self, index: usize) -> Option<&dyn Module<B>> {
        self.modules.get(index).map(|module| &**module)
    }

    /// Все дочерние модули.
    pub fn modules(&self) -> &[Box<dyn Module<B>>] {
        &self.modules
    }

    /// Количество дочерних модулей.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Пуст ли контейнер.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl<B: Backend> Module<B> for Sequential<B> {
    fn state(&self) -> &ModuleState<B> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ModuleState<B> {
        &mut self.state
    }

    fn forward(&self, input: &Variable<B>) -> Result<Variable<B>, ModuleError> {
        self.modules
            .iter()
            .try_fold(input.clone(), |x, module| module.forward(&x))
    }

    fn pretty_string(&self) -> String {
        let mut out = String::from("Sequential [input -> ");
        for index in 0..self.modules.len() {
            let _ = write!(out, "({index}) -> ");
        }
        out.push_str("output]");
        for (index, module) in self.modules.iter().enumerate() {
            let _ = write!(out, "\n\t({index}): {}", module.pretty_string());
        }
        out
    }

    fn set_param(&mut self, variable: Variable<B>, position: usize) -> Result<(), ModuleError> {
        let Some(&(index, child_position)) = self.owners.get(position) else {
            return Err(self.state.out_of_range(position));
        };
        if let Some(child) = self.modules.get_mut(index) {
            child.set_param(variable.clone(), child_position)?;
        }
        self.state.set_param(variable, position)
    }

    fn train(&mut self) {
        self.state.set_training(true);
        for module in &mut self.modules {
            module.train();
        }
    }

    fn eval(&mut self) {
        self.state.set_training(false);
        for module in &mut self.modules {
            module.eval();
        }
    }

    fn zero_grad(&mut self) {
        for module in &mut self.modules {
            module.zero_grad();
        }
    }
}
