// Тестовый модуль для интеграционных тестов `module_recorder`.
#![allow(dead_code)]

use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};
use core_module::{Module, ModuleError, ModuleState, Variable};

pub type TestBackend = Autodiff<NdArray>;

pub fn var(values: &[f32], dims: &[usize]) -> Variable<TestBackend> {
    Variable::from_floats(values.to_vec(), dims, &NdArrayDevice::Cpu, true).unwrap()
}

/// `x + bias` с матрицей `[rows, cols]`, которая в прямом проходе не участвует:
/// два параметра разных рангов.
pub struct Shift {
    state: ModuleState<TestBackend>,
}

impl Shift {
    pub fn new(bias: &[f32], table: &[f32], rows: usize) -> Self {
        Self {
            state: ModuleState::with_params(vec![
                var(bias, &[bias.len()]),
                var(table, &[rows, table.len() / rows]),
            ]),
        }
    }
}

impl Module<TestBackend> for Shift {
    fn state(&self) -> &ModuleState<TestBackend> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ModuleState<TestBackend> {
        &mut self.state
    }

    fn forward(&self, input: &Variable<TestBackend>) -> Result<Variable<TestBackend>, ModuleError> {
        let out = input.value::<1>()? + self.param(0)?.tensor();
        Ok(Variable::from_output(out, self.is_training() || input.requires_grad()))
    }

    fn pretty_string(&self) -> String {
        "Shift".to_string()
    }
}

pub fn values_of(module: &dyn Module<TestBackend>) -> Vec<Vec<f32>> {
    module
        .params()
        .iter()
        .map(|p| p.to_floats().unwrap())
        .collect()
}
