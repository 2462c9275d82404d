mod common;

use std::fs;

use common::{values_of, var, Shift, TestBackend};
use core_module::{Module, ModuleError, Sequential};
use module_recorder::{
    checkpoint_path, JsonRecorder, Recorder, RecorderError, RecorderKind, SafetensorsRecorder,
};
use module_utils::{AppConfig, RecordFormat};
use tempfile::tempdir;

fn trained() -> Shift {
    let mut shift = Shift::new(&[0.5, -1.5], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2);
    shift.eval();
    shift
}

fn fresh() -> Shift {
    Shift::new(&[0.0, 0.0], &[0.0; 6], 2)
}

fn round_trip(recorder: &impl Recorder, file_name: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(file_name);
    let source = trained();
    recorder.save_module(&source, &path).unwrap();
    assert!(path.exists());

    let mut target = fresh();
    let bias = target.param(0).unwrap();
    recorder.load_module(&mut target, &path).unwrap();

    assert_eq!(values_of(&target), values_of(&source));
    assert!(!target.is_training());
    assert!(target.params().iter().all(|p| !p.requires_grad()));
    assert!(target.param(0).unwrap().ptr_eq(&bias));
    assert_eq!(target.param(1).unwrap().dims(), vec![2, 3]);

    let out = target.forward(&var(&[1.0, 1.0], &[2])).unwrap();
    assert_eq!(out.to_floats().unwrap(), vec![1.5, -0.5]);
}

#[test]
fn json_round_trip_restores_values_and_mode() {
    round_trip(&JsonRecorder::default(), "shift.json");
    round_trip(&JsonRecorder::new(true), "shift_pretty.json");
}

#[test]
fn safetensors_round_trip_restores_values_and_mode() {
    round_trip(&SafetensorsRecorder, "shift.safetensors");
}

#[test]
fn sequential_round_trip_through_safetensors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("seq.safetensors");

    let mut source = Sequential::<TestBackend>::new();
    source
        .add(Shift::new(&[1.0], &[7.0, 8.0], 1))
        .add(Shift::new(&[2.0], &[9.0], 1));
    SafetensorsRecorder.save_module(&source, &path).unwrap();

    let mut target = Sequential::<TestBackend>::new();
    target
        .add(Shift::new(&[0.0], &[0.0, 0.0], 1))
        .add(Shift::new(&[0.0], &[0.0], 1));
    target.eval();
    SafetensorsRecorder.load_module(&mut target, &path).unwrap();

    assert!(target.is_training());
    assert_eq!(values_of(&target), values_of(&source));
    assert_eq!(values_of(target.module(1).unwrap()), vec![vec![2.0], vec![9.0]]);
}

#[test]
fn save_creates_missing_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a").join("b").join("shift.json");
    JsonRecorder::default().save_module(&trained(), &path).unwrap();
    assert!(path.is_file());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let result = JsonRecorder::default().load(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(RecorderError::Io { .. })));
}

#[test]
fn corrupted_files_are_decoding_errors() {
    let dir = tempdir().unwrap();
    let json = dir.path().join("broken.json");
    fs::write(&json, "{ \"params\": [").unwrap();
    assert!(matches!(
        JsonRecorder::default().load(&json),
        Err(RecorderError::Decoding { .. })
    ));

    let st = dir.path().join("broken.safetensors");
    fs::write(&st, b"\x01\x02\x03").unwrap();
    match SafetensorsRecorder.load(&st) {
        Err(RecorderError::Decoding { path, .. }) => assert!(path.ends_with("broken.safetensors")),
        other => panic!("Ожидалась ошибка разбора, получено {other:?}"),
    }
}

#[test]
fn inconsistent_record_is_rejected_after_decoding() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(
        &path,
        r#"{"params":[{"dims":[2,2],"values":[1.0,2.0,3.0]}],"training":true}"#,
    )
    .unwrap();
    assert!(matches!(
        JsonRecorder::default().load(&path),
        Err(RecorderError::InvalidRecord { .. })
    ));
}

#[test]
fn mismatched_module_is_left_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shift.json");
    JsonRecorder::default().save_module(&trained(), &path).unwrap();

    let mut other = Shift::new(&[0.0, 0.0, 0.0], &[0.0; 6], 3);
    let before = values_of(&other);
    let result = JsonRecorder::default().load_module(&mut other, &path);
    assert!(matches!(
        result,
        Err(RecorderError::Module(ModuleError::ShapeMismatch { position: 0, .. }))
    ));
    assert_eq!(values_of(&other), before);
    assert!(other.is_training());
}

#[test]
fn configured_recorder_writes_into_checkpoint_dir() {
    let dir = tempdir().unwrap();
    let checkpoints = dir.path().join("checkpoints");
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "[recorder_config]\nformat = \"safetensors\"\ncheckpoint_dir = {:?}\n",
            checkpoints.display().to_string()
        ),
    )
    .unwrap();

    let config = AppConfig::load_from_toml(&config_path).unwrap().recorder_config;
    assert_eq!(config.format, RecordFormat::Safetensors);
    let recorder = RecorderKind::from_config(&config);
    let path = checkpoint_path(&config, "shift epoch 1");
    assert_eq!(path, checkpoints.join("shift_epoch_1.safetensors"));

    recorder.save_module(&trained(), &path).unwrap();
    let mut target = fresh();
    recorder.load_module(&mut target, &path).unwrap();
    assert_eq!(values_of(&target), values_of(&trained()));
}
