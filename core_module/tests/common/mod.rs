// Вспомогательные модули для интеграционных тестов `core_module`.
#![allow(dead_code)]

use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};
use core_module::{Module, ModuleError, ModuleState, Variable};

pub type TestBackend = Autodiff<NdArray>;

pub const DEVICE: NdArrayDevice = NdArrayDevice::Cpu;

/// Листовая переменная из значений с заданной формой.
pub fn var(values: &[f32], dims: &[usize]) -> Variable<TestBackend> {
    Variable::from_floats(values.to_vec(), dims, &DEVICE, true).unwrap()
}

/// Поэлементное `x * weight + bias`.
/// Вес хранится с формой `[1, n]`, смещение - `[n]`: параметры разных рангов.
pub struct Affine {
    state: ModuleState<TestBackend>,
}

impl Affine {
    pub fn new(weight: &[f32], bias: &[f32]) -> Self {
        Self {
            state: ModuleState::with_params(vec![
                var(weight, &[1, weight.len()]),
                var(bias, &[bias.len()]),
            ]),
        }
    }

    pub fn from_state(state: ModuleState<TestBackend>) -> Self {
        Self { state }
    }
}

impl Module<TestBackend> for Affine {
    fn state(&self) -> &ModuleState<TestBackend> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ModuleState<TestBackend> {
        &mut self.state
    }

    fn forward(&self, input: &Variable<TestBackend>) -> Result<Variable<TestBackend>, ModuleError> {
        let weight = self.param(0)?;
        let bias = self.param(1)?;
        if input.num_elements() != bias.num_elements() {
            return Err(ModuleError::Forward(format!(
                "вход из {} элементов, ожидалось {}",
                input.num_elements(),
                bias.num_elements()
            )));
        }
        let out = input.value::<1>()? * weight.tensor() + bias.tensor();
        Ok(Variable::from_output(out, self.is_training() || input.requires_grad()))
    }

    fn pretty_string(&self) -> String {
        format!("Affine ({})", self.state.param(1).map_or(0, |b| b.num_elements()))
    }
}

/// Модуль без параметров: `x * factor`.
pub struct Scale {
    state: ModuleState<TestBackend>,
    factor: f32,
}

impl Scale {
    pub fn new(factor: f32) -> Self {
        Self {
            state: ModuleState::new(),
            factor,
        }
    }
}

impl Module<TestBackend> for Scale {
    fn state(&self) -> &ModuleState<TestBackend> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ModuleState<TestBackend> {
        &mut self.state
    }

    fn forward(&self, input: &Variable<TestBackend>) -> Result<Variable<TestBackend>, ModuleError> {
        let out = input.value::<1>()? * self.factor;
        Ok(Variable::from_output(out, input.requires_grad()))
    }

    fn pretty_string(&self) -> String {
        format!("Scale ({})", self.factor)
    }
}

/// Значения всех параметров модуля.
pub fn values_of(module: &dyn Module<TestBackend>) -> Vec<Vec<f32>> {
    module
        .params()
        .iter()
        .map(|p| p.to_floats().unwrap())
        .collect()
}

/// Совпадают ли списки параметров по идентичности.
pub fn same_params(a: &[Variable<TestBackend>], b: &[Variable<TestBackend>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.ptr_eq(y))
}
