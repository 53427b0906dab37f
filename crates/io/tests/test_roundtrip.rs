//! Integration tests: traces and selections through Parquet read/write.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray, Float64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Float64Type, Schema, UInt64Type};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use strata_io::{
    Compression, IoError, ReaderConfig, WriterConfig, read_trace, write_blocks, write_trace,
};
use strata_layers::{LayerConfig, SelectionMode, analyze_trace, select_layers};
use strata_wavelet::{Trace, TransformConfig, WaveletError};

fn step_trace() -> Trace {
    let depth: Vec<f64> = (0..64).map(|i| 250.0 + i as f64 * 0.25).collect();
    let values: Vec<f64> = (0..64).map(|i| if i < 32 { 40.0 } else { 90.0 }).collect();
    Trace::new(depth, values).expect("fixture is valid")
}

/// Writes an arbitrary table of `Float64` columns.
fn write_columns(path: &Path, columns: &[(&str, Vec<f64>)]) {
    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, _)| Field::new(*name, DataType::Float64, false))
            .collect::<Vec<_>>(),
    ));
    let arrays = columns
        .iter()
        .map(|(_, v)| Arc::new(Float64Array::from(v.clone())) as Arc<dyn Array>)
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays).expect("valid batch");
    let file = std::fs::File::create(path).expect("create file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("writer");
    writer.write(&batch).expect("write batch");
    writer.close().expect("close writer");
}

fn read_all(path: &Path) -> Vec<RecordBatch> {
    let file = std::fs::File::open(path).expect("open file");
    ParquetRecordBatchReaderBuilder::try_new(file)
        .expect("builder")
        .build()
        .expect("reader")
        .collect::<Result<Vec<_>, _>>()
        .expect("batches")
}

#[test]
fn trace_round_trip() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("trace.parquet");
    let trace = step_trace();

    for comp in [Compression::None, Compression::Snappy, Compression::Zstd] {
        let config = WriterConfig::default().with_compression(comp);
        write_trace(&path, &trace, &config).expect("write succeeds");

        let back = read_trace(&path, &ReaderConfig::default()).expect("read succeeds");
        assert_eq!(back.depth(), trace.depth());
        assert_eq!(back.values(), trace.values());
        assert_eq!(back.depth_step(), trace.depth_step());
    }
}

#[test]
fn custom_column_names_and_preparation() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("well.parquet");
    // Bottom-up log with an odd number of samples and an extra column.
    write_columns(
        &path,
        &[
            ("md", vec![14.0, 13.0, 12.0, 11.0, 10.0]),
            ("gr", vec![5.0, 4.0, 3.0, 2.0, 1.0]),
            ("caliper", vec![0.0; 5]),
        ],
    );

    let config = ReaderConfig::default()
        .with_depth_column("md")
        .with_value_column("gr");
    let trace = read_trace(&path, &config).expect("read succeeds");
    assert!(trace.was_reversed());
    assert!(trace.was_truncated());
    assert_eq!(trace.depth(), &[10.0, 11.0, 12.0, 13.0]);
    assert_eq!(trace.values(), &[1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let err = read_trace(&dir.path().join("nope.parquet"), &ReaderConfig::default())
        .expect_err("should fail");
    assert!(matches!(err, IoError::FileNotFound { .. }));
}

#[test]
fn missing_column() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("partial.parquet");
    write_columns(&path, &[("depth", vec![0.0, 1.0])]);

    let err = read_trace(&path, &ReaderConfig::default()).expect_err("should fail");
    match err {
        IoError::MissingColumn { name, .. } => assert_eq!(name, "value"),
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}

#[test]
fn non_numeric_column() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("text.parquet");
    let schema = Arc::new(Schema::new(vec![
        Field::new("depth", DataType::Float64, false),
        Field::new("value", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(vec![0.0, 1.0])),
            Arc::new(StringArray::from(vec!["a", "b"])),
        ],
    )
    .expect("valid batch");
    let file = std::fs::File::create(&path).expect("create file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("writer");
    writer.write(&batch).expect("write batch");
    writer.close().expect("close writer");

    let err = read_trace(&path, &ReaderConfig::default()).expect_err("should fail");
    assert!(matches!(err, IoError::ColumnType { .. }));
}

#[test]
fn invalid_trace_is_wrapped() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("flat_depth.parquet");
    write_columns(
        &path,
        &[("depth", vec![1.0, 1.0, 2.0, 3.0]), ("value", vec![0.0; 4])],
    );

    let err = read_trace(&path, &ReaderConfig::default()).expect_err("should fail");
    match err {
        IoError::Trace(inner) => assert_eq!(inner, WaveletError::NonMonotonicDepth { index: 1 }),
        other => panic!("expected Trace, got {other:?}"),
    }
}

#[test]
fn blocks_round_trip() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("blocks.parquet");

    let layered =
        analyze_trace(&step_trace(), &TransformConfig::new(), &LayerConfig::new()).unwrap();
    let selection = select_layers(&layered, SelectionMode::TopCount, 2.0).unwrap();
    write_blocks(&path, &selection, &WriterConfig::default()).expect("write succeeds");

    let batches = read_all(&path);
    let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
    assert_eq!(rows, selection.n_layer());

    let batch = &batches[0];
    let starts = batch
        .column_by_name("start_index")
        .expect("start_index column")
        .as_primitive::<UInt64Type>();
    let means = batch
        .column_by_name("mean")
        .expect("mean column")
        .as_primitive::<Float64Type>();
    for (i, block) in selection.blocks().iter().enumerate() {
        assert_eq!(starts.value(i), block.start_index as u64);
        assert_eq!(means.value(i), block.mean);
    }
}

#[test]
fn zero_row_group_size_is_rejected() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("never.parquet");
    let config = WriterConfig::default().with_row_group_size(0);
    let err = write_trace(&path, &step_trace(), &config).expect_err("should fail");
    assert!(matches!(err, IoError::Validation { .. }));
    assert!(!path.exists());
}
