//! Файловые кодеки для записей модулей.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use burn::tensor::backend::Backend;
use core_module::{Module, ModuleRecord, ParamRecord};
use module_utils::{ensure_dir_exists, sanitize_path_component, RecordFormat, RecorderConfigSub};
use safetensors::{tensor::TensorView, Dtype, SafeTensors};
use tracing::{debug, info};

use crate::{error::RecorderError, validation::RecordValidator};

/// Ключ метаданных safetensors с режимом модуля.
const TRAINING_KEY: &str = "training";

/// Сохранение и загрузка [`ModuleRecord`] в файл определенного формата.
pub trait Recorder {
    /// Расширение файла без точки.
    fn extension(&self) -> &'static str;

    /// Кодирует запись в байты. `path` используется только в сообщениях об ошибках.
    ///
    /// # Ошибки
    /// `RecorderError::Encoding`.
    fn encode(&self, record: &ModuleRecord, path: &Path) -> Result<Vec<u8>, RecorderError>;

    /// Разбирает запись из байтов. `path` используется только в сообщениях об ошибках.
    ///
    /// # Ошибки
    /// `RecorderError::Decoding`.
    fn decode(&self, bytes: &[u8], path: &Path) -> Result<ModuleRecord, RecorderError>;

    /// Сохраняет запись в файл, создавая родительскую директорию при необходимости.
    ///
    /// # Ошибки
    /// `RecorderError::Encoding`, `RecorderError::Io` или `RecorderError::Utils`.
    fn save(&self, record: &ModuleRecord, path: &Path) -> Result<(), RecorderError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir_exists(parent)?;
        }
        let bytes = self.encode(record, path)?;
        fs::write(path, &bytes).map_err(|e| RecorderError::io(path, e))?;
        info!(
            "Запись модуля сохранена в {:?} ({} параметров, {} байт)",
            path,
            record.params.len(),
            bytes.len()
        );
        Ok(())
    }

    /// Загружает запись из файла и проверяет ее согласованность.
    ///
    /// # Ошибки
    /// `RecorderError::Io`, `RecorderError::Decoding` или `RecorderError::InvalidRecord`.
    fn load(&self, path: &Path) -> Result<ModuleRecord, RecorderError> {
        debug!("Чтение записи модуля из: {:?}", path);
        let bytes = fs::read(path).map_err(|e| RecorderError::io(path, e))?;
        let record = self.decode(&bytes, path)?;
        RecordValidator::validate_record(&record)?;
        info!(
            "Запись модуля загружена из {:?} ({} параметров)",
            path,
            record.params.len()
        );
        Ok(record)
    }

    /// Снимает состояние модуля и сохраняет его.
    ///
    /// # Ошибки
    /// Ошибки [`Module::to_record`] и [`Recorder::save`].
    fn save_module<B: Backend, M: Module<B> + ?Sized>(
        &self,
        module: &M,
        path: &Path,
    ) -> Result<(), RecorderError>
    where
        Self: Sized,
    {
        let record = module.to_record()?;
        self.save(&record, path)
    }

    /// Загружает запись и восстанавливает из нее значения параметров и режим модуля.
    /// При несовпадении параметров модуль не меняется.
    ///
    /// # Ошибки
    /// Ошибки [`Recorder::load`] и [`Module::load_record`].
    fn load_module<B: Backend, M: Module<B> + ?Sized>(
        &self,
        module: &mut M,
        path: &Path,
    ) -> Result<(), RecorderError>
    where
        Self: Sized,
    {
        let record = self.load(path)?;
        module.load_record(&record)?;
        Ok(())
    }
}

/// Запись в формате JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonRecorder {
    /// Форматировать ли вывод с отступами.
    pub pretty: bool,
}

impl JsonRecorder {
    /// Кодек JSON.
    pub const fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl Recorder for JsonRecorder {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn encode(&self, record: &ModuleRecord, path: &Path) -> Result<Vec<u8>, RecorderError> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(record)
        } else {
            serde_json::to_vec(record)
        };
        encoded.map_err(|e| RecorderError::encoding(path, e))
    }

    fn decode(&self, bytes: &[u8], path: &Path) -> Result<ModuleRecord, RecorderError> {
        serde_json::from_slice(bytes).map_err(|e| RecorderError::decoding(path, e))
    }
}

/// Запись в формате safetensors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SafetensorsRecorder;

impl SafetensorsRecorder {
    /// Имя тензора для параметра на позиции `position`.
    pub fn tensor_name(position: usize) -> String {
        format!("param.{position}")
    }
}

impl Recorder for SafetensorsRecorder {
    fn extension(&self) -> &'static str {
        "safetensors"
    }

    fn encode(&self, record: &ModuleRecord, path: &Path) -> Result<Vec<u8>, RecorderError> {
        let buffers: Vec<(String, &[usize], Vec<u8>)> = record
            .params
            .iter()
            .enumerate()
            .map(|(position, param)| {
                let bytes = param.values.iter().flat_map(|v| v.to_le_bytes()).collect();
                (Self::tensor_name(position), param.dims.as_slice(), bytes)
            })
            .collect();

        let views = buffers
            .iter()
            .map(|(name, dims, bytes)| {
                TensorView::new(Dtype::F32, dims.to_vec(), bytes).map(|view| (name.as_str(), view))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RecorderError::encoding(path, e))?;

        let metadata = HashMap::from([(TRAINING_KEY.to_string(), record.training.to_string())]);
        safetensors::serialize(views, &Some(metadata)).map_err(|e| RecorderError::encoding(path, e))
    }

    fn decode(&self, bytes: &[u8], path: &Path) -> Result<ModuleRecord, RecorderError> {
        let (_, metadata) =
            SafeTensors::read_metadata(bytes).map_err(|e| RecorderError::decoding(path, e))?;
        let training = metadata
            .metadata()
            .as_ref()
            .and_then(|meta| meta.get(TRAINING_KEY))
            .ok_or_else(|| {
                RecorderError::decoding(path, format!("В метаданных отсутствует '{TRAINING_KEY}'"))
            })?
            .parse::<bool>()
            .map_err(|e| RecorderError::decoding(path, e))?;

        let tensors = SafeTensors::deserialize(bytes).map_err(|e| RecorderError::decoding(path, e))?;
        let params = (0..tensors.len())
            .map(|position| {
                let name = Self::tensor_name(position);
                let view = tensors
                    .tensor(&name)
                    .map_err(|e| RecorderError::decoding(path, e))?;
                if view.dtype() != Dtype::F32 {
                    return Err(RecorderError::decoding(
                        path,
                        format!("Тензор '{name}' имеет тип {:?}, ожидался F32", view.dtype()),
                    ));
                }
                let values = view
                    .data()
                    .chunks_exact(4)
                    .map(|chunk| chunk.try_into().map(f32::from_le_bytes))
                    .collect::<Result<Vec<f32>, _>>()
                    .map_err(|e| RecorderError::decoding(path, e))?;
                Ok(ParamRecord {
                    dims: view.shape().to_vec(),
                    values,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ModuleRecord { params, training })
    }
}

/// Кодек, выбранный конфигурацией.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderKind {
    /// JSON.
    Json(JsonRecorder),
    /// safetensors.
    Safetensors(SafetensorsRecorder),
}

impl RecorderKind {
    /// Выбирает кодек по секции `[recorder_config]`.
    pub fn from_config(config: &RecorderConfigSub) -> Self {
        debug!("Выбран формат записей: {:?}", config.format);
        match config.format {
            RecordFormat::Json => Self::Json(JsonRecorder::new(config.pretty_json)),
            RecordFormat::Safetensors => Self::Safetensors(SafetensorsRecorder),
        }
    }

    fn inner(&self) -> &dyn Recorder {
        match self {
            Self::Json(recorder) => recorder,
            Self::Safetensors(recorder) => recorder,
        }
    }
}

impl Recorder for RecorderKind {
    fn extension(&self) -> &'static str {
        self.inner().extension()
    }

    fn encode(&self, record: &ModuleRecord, path: &Path) -> Result<Vec<u8>, RecorderError> {
        self.inner().encode(record, path)
    }

    fn decode(&self, bytes: &[u8], path: &Path) -> Result<ModuleRecord, RecorderError> {
        self.inner().decode(bytes, path)
    }
}

/// Путь контрольной точки `name` в директории из конфигурации.
/// Имя очищается от недопустимых символов, расширение берется из формата.
pub fn checkpoint_path(config: &RecorderConfigSub, name: &str) -> PathBuf {
    let recorder = RecorderKind::from_config(config);
    Path::new(&config.checkpoint_dir).join(format!(
        "{}.{}",
        sanitize_path_component(name),
        recorder.extension()
    ))
}
