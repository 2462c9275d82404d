// core_module/src/variable.rs

//! Разделяемый дескриптор дифференцируемого тензора.
//!
//! `Variable` - это то, чем модуль владеет в качестве параметра. Клонирование копирует
//! ссылку, а не данные: модуль, контейнер, оптимизатор и граф вычислений Burn видят
//! одну и ту же переменную, и время ее жизни равно времени жизни самого долгого владельца.
//!
//! Значение хранится как тензор ранга 1 вместе с логическими размерностями,
//! поэтому один модуль может владеть параметрами разных рангов.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use burn::tensor::{
    backend::{AutodiffBackend, Backend},
    Tensor, TensorData,
};

use crate::error::ModuleError;

struct VariableState<B: Backend> {
    /// Плоское значение. Для листьев это узел, по которому Burn собирает градиенты.
    data: Tensor<B, 1>,
    dims: Vec<usize>,
    requires_grad: bool,
    /// `false` для результатов прямого прохода: у них есть ребра в графе,
    /// и Burn не позволяет превратить их в отслеживаемый лист.
    is_leaf: bool,
    grad: Option<Tensor<B, 1>>,
}

/// Разделяемый дескриптор дифференцируемого тензора (параметра или результата вычисления).
///
/// Без внутренней синхронизации: `Rc<RefCell<..>>` делает тип `!Send`,
/// каждый поток работает со своей копией модуля.
pub struct Variable<B: Backend> {
    inner: Rc<RefCell<VariableState<B>>>,
}

impl<B: Backend> Clone for Variable<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<B: Backend> fmt::Debug for Variable<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("Variable")
            .field("dims", &state.dims)
            .field("requires_grad", &state.requires_grad)
            .field("is_leaf", &state.is_leaf)
            .field("has_grad", &state.grad.is_some())
            .finish()
    }
}

fn num_elements_of(dims: &[usize]) -> usize {
    dims.iter().product()
}

impl<B: Backend> Variable<B> {
    /// Создает листовую переменную из тензора любого ранга.
    ///
    /// Тензор отсоединяется от графа, в котором он мог быть создан, и становится
    /// новым листом; флаг отслеживания градиента выставляется в `requires_grad`.
    pub fn new<const D: usize>(tensor: Tensor<B, D>, requires_grad: bool) -> Self {
        let dims = tensor.dims().to_vec();
        let data = tensor
            .detach()
            .reshape([num_elements_of(&dims)])
            .set_require_grad(requires_grad);
        Self::from_state(VariableState {
            data,
            dims,
            requires_grad,
            is_leaf: true,
            grad: None,
        })
    }

    /// Создает листовую переменную из плоского вектора значений и размерностей.
    ///
    /// # Ошибки
    /// `ModuleError::InvalidData`, если количество значений не равно произведению размерностей.
    pub fn from_floats(
        values: Vec<f32>,
        dims: &[usize],
        device: &B::Device,
        requires_grad: bool,
    ) -> Result<Self, ModuleError> {
        let num_elements = num_elements_of(dims);
        if values.len() != num_elements {
            return Err(ModuleError::InvalidData(format!(
                "{} значений не соответствуют форме {:?} ({} элементов)",
                values.len(),
                dims,
                num_elements
            )));
        }
        let data = Tensor::<B, 1>::from_data(TensorData::new(values, [num_elements]), device)
            .set_require_grad(requires_grad);
        Ok(Self::from_state(VariableState {
            data,
            dims: dims.to_vec(),
            requires_grad,
            is_leaf: true,
            grad: None,
        }))
    }

    /// Оборачивает результат прямого прохода, не разрывая граф вычислений.
    ///
    /// `requires_grad` - флаг, который несет результат: `true`, если хотя бы одна
    /// переменная, участвовавшая в вычислении, отслеживает градиент.
    pub fn from_output<const D: usize>(tensor: Tensor<B, D>, requires_grad: bool) -> Self {
        let dims = tensor.dims().to_vec();
        let data = tensor.reshape([num_elements_of(&dims)]);
        Self::from_state(VariableState {
            data,
            dims,
            requires_grad,
            is_leaf: false,
            grad: None,
        })
    }

    fn from_state(state: VariableState<B>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(state)),
        }
    }

    /// Значение в исходной форме ранга `D`.
    ///
    /// Возвращаемый тензор связан с этой переменной в графе Burn: операции над ним
    /// записывают ребра, по которым обратный проход дойдет до переменной.
    ///
    /// # Ошибки
    /// `ModuleError::RankMismatch`, если `D` не совпадает с рангом переменной.
    pub fn value<const D: usize>(&self) -> Result<Tensor<B, D>, ModuleError> {
        let state = self.inner.borrow();
        let dims: [usize; D] =
            state
                .dims
                .as_slice()
                .try_into()
                .map_err(|_| ModuleError::RankMismatch {
                    expected: state.dims.len(),
                    actual: D,
                })?;
        Ok(state.data.clone().reshape(dims))
    }

    /// Плоское значение (ранг 1) в том виде, в котором его видит Burn.
    pub fn tensor(&self) -> Tensor<B, 1> {
        self.inner.borrow().data.clone()
    }

    /// Логические размерности переменной.
    pub fn dims(&self) -> Vec<usize> {
        self.inner.borrow().dims.clone()
    }

    /// Общее количество элементов.
    pub fn num_elements(&self) -> usize {
        num_elements_of(&self.inner.borrow().dims)
    }

    /// Устройство, на котором лежит значение.
    pub fn device(&self) -> B::Device {
        self.inner.borrow().data.device()
    }

    /// Включено ли отслеживание градиента.
    pub fn requires_grad(&self) -> bool {
        self.inner.borrow().requires_grad
    }

    /// Включает или выключает отслеживание градиента и переносит флаг в тензор Burn.
    ///
    /// Выключение отсоединяет значение от графа. Включение для результата прямого
    /// прохода меняет только флаг: такой тензор уже связан с графом.
    pub fn set_requires_grad(&self, requires_grad: bool) {
        let mut state = self.inner.borrow_mut();
        state.requires_grad = requires_grad;
        if requires_grad {
            if state.is_leaf {
                state.data = state.data.clone().set_require_grad(true);
            }
        } else {
            state.data = state.data.clone().detach();
            state.is_leaf = true;
        }
    }

    /// Отсоединяет результат прямого прохода от графа и делает его листом
    /// с текущим флагом отслеживания. Для листа ничего не меняет.
    ///
    /// Градиенты Burn доходят только до листьев, поэтому параметр модуля
    /// обязан быть листом.
    pub fn make_leaf(&self) {
        let mut state = self.inner.borrow_mut();
        if state.is_leaf {
            return;
        }
        let requires_grad = state.requires_grad;
        state.data = state.data.clone().detach().set_require_grad(requires_grad);
        state.is_leaf = true;
        state.grad = None;
    }

    /// Является ли переменная листом графа.
    pub fn is_leaf(&self) -> bool {
        self.inner.borrow().is_leaf
    }

    /// Накопленный градиент (плоский), если он есть.
    pub fn grad(&self) -> Option<Tensor<B, 1>> {
        self.inner.borrow().grad.clone()
    }

    /// Есть ли накопленный градиент.
    pub fn has_grad(&self) -> bool {
        self.inner.borrow().grad.is_some()
    }

    /// Сбрасывает буфер градиента. Значение и флаг отслеживания не меняются.
    pub fn zero_grad(&self) {
        self.inner.borrow_mut().grad = None;
    }

    /// Значения в виде плоского вектора `f32`.
    ///
    /// # Ошибки
    /// `ModuleError::InvalidData`, если данные тензора не удалось прочитать.
    pub fn to_floats(&self) -> Result<Vec<f32>, ModuleError> {
        let data = self.inner.borrow().data.clone().into_data();
        data.convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| ModuleError::InvalidData(format!("{e:?}")))
    }

    /// Заменяет значение на месте, сохраняя идентичность переменной и флаг отслеживания.
    /// Накопленный градиент сбрасывается: он относится к старому значению.
    ///
    /// # Ошибки
    /// `ModuleError::InvalidData`, если количество значений не совпадает с формой.
    pub fn assign(&self, values: Vec<f32>) -> Result<(), ModuleError> {
        let mut state = self.inner.borrow_mut();
        let num_elements = num_elements_of(&state.dims);
        if values.len() != num_elements {
            return Err(ModuleError::InvalidData(format!(
                "{} значений не соответствуют форме {:?} ({} элементов)",
                values.len(),
                state.dims,
                num_elements
            )));
        }
        let device = state.data.device();
        state.data = Tensor::<B, 1>::from_data(TensorData::new(values, [num_elements]), &device)
            .set_require_grad(state.requires_grad);
        state.is_leaf = true;
        state.grad = None;
        Ok(())
    }

    /// Указывают ли два дескриптора на одну и ту же переменную.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<B: AutodiffBackend> Variable<B> {
    /// Забирает градиент этой переменной из результата обратного прохода Burn
    /// и прибавляет его к буферу.
    ///
    /// Возвращает `false`, если переменная не участвовала в вычислении
    /// (например, отслеживание было выключено).
    pub fn accumulate_grad(&self, grads: &B::Gradients) -> bool {
        let mut state = self.inner.borrow_mut();
        let Some(grad) = state.data.grad(grads) else {
            return false;
        };
        let grad = Tensor::<B, 1>::from_inner(grad);
        state.grad = Some(match state.grad.take() {
            Some(previous) => previous + grad,
            None => grad,
        });
        true
    }
}
