use arrow::array::{Array, Float64Array, StringArray};
use arrow::record_batch::RecordBatch;
use flate2::read::GzDecoder;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use signal_export::domains::export::{
    write_manifest, ExportRun, Manifest, MaterializedSignal, TableSink,
};
use signal_export::domains::recording::{
    BusType, ChannelGroup, Samples, Signal, Source, SourceType,
};
use signal_export::{
    ExportConfig, ExportError, ExportFormat, ExportResult, ExportService, Recording,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn speed_recording() -> Recording {
    let speed = Signal::new(
        "Speed",
        "km/h",
        vec![0.0, 0.1, 0.2],
        Samples::Float(vec![10.0, 20.5, 30.0]),
    )
    .with_source(Source {
        name: "ECU1".to_string(),
        source_type: SourceType::Ecu,
        bus_type: BusType::Can,
    });
    let groups = vec![ChannelGroup {
        acq_name: Some("VehicleDynamics".to_string()),
        acq_source: None,
    }];
    Recording::new("test drive", groups, vec![speed]).unwrap()
}

fn service(target: &Path, format: ExportFormat) -> ExportService {
    ExportService::new(ExportConfig {
        format,
        target: target.to_path_buf(),
        ..ExportConfig::default()
    })
    .unwrap()
}

fn read_manifest(path: &Path) -> serde_json::Value {
    serde_json::from_reader(File::open(path).unwrap()).unwrap()
}

fn read_dataset(dir: &Path) -> Vec<RecordBatch> {
    let mut batches = Vec::new();
    for entry in std::fs::read_dir(dir).unwrap() {
        let file = File::open(entry.unwrap().path()).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        batches.extend(reader.map(|b| b.unwrap()));
    }
    batches
}

#[tokio::test]
async fn row_mode_writes_one_row_per_sample() {
    let tmp = tempfile::tempdir().unwrap();
    let report = service(tmp.path(), ExportFormat::Csv)
        .process_recording(&speed_recording(), "drive")
        .await
        .unwrap();

    let path = report.output_dir.join(report.run.csv_file_name(0));
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.contains(&report.run.id.to_string()));
    assert!(name.contains("-0."));

    let mut reader = csv::Reader::from_reader(GzDecoder::new(File::open(&path).unwrap()));
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        headers.join(","),
        "source_uuid,name,unit,timestamp,value,value_string,source,\
         channel_group_acq_name,acq_source_name,acq_source_path,source_type,bus_type"
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    let values: Vec<f64> = rows.iter().map(|r| r[4].parse().unwrap()).collect();
    assert_eq!(values, vec![10.0, 20.5, 30.0]);
    for row in &rows {
        assert_eq!(&row[0], report.run.id.to_string().as_str());
        assert_eq!(&row[1], "Speed");
        assert_eq!(&row[2], "km/h");
        assert_eq!(&row[5], "");
        assert_eq!(&row[7], "VehicleDynamics");
        assert_eq!(&row[10], "ECU");
        assert_eq!(&row[11], "CAN");
    }
}

#[tokio::test]
async fn columnar_mode_writes_dataset_and_manifest() {
    let tmp = tempfile::tempdir().unwrap();
    let report = service(tmp.path(), ExportFormat::Parquet)
        .process_recording(&speed_recording(), "drive")
        .await
        .unwrap();

    let batches = read_dataset(&report.output_dir);
    assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 3);
    let batch = &batches[0];
    let values = batch
        .column_by_name("value")
        .unwrap()
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert_eq!(values.values().to_vec(), vec![10.0, 20.5, 30.0]);
    let text = batch
        .column_by_name("value_string")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert!(text.iter().all(|s| s == Some("")));

    assert_eq!(
        report.manifest_path,
        tmp.path().join(format!("drive-{}.metadata.json", report.run.id))
    );
    let manifest = read_manifest(&report.manifest_path);
    assert_eq!(manifest["name"], "drive");
    assert_eq!(manifest["number_of_chunks"], 1);
    assert_eq!(manifest["comments"], "test drive");
    assert_eq!(manifest["signals"][0]["name"], "Speed");
    assert_eq!(manifest["signals"][0]["unit"], "km/h");
    assert_eq!(manifest["signals"][0]["channel_group_acq_name"], "VehicleDynamics");
    assert_eq!(manifest["signals"][0]["acq_source_name"], "");
}

/// Sink whose every write fails, standing in for a full disk
struct FailingSink;

impl TableSink for FailingSink {
    fn write_table(&self, _signal: &MaterializedSignal<'_>, _partition: usize) -> ExportResult<usize> {
        Err(ExportError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "no space left on device",
        )))
    }

    fn dataset_dir(&self) -> PathBuf {
        PathBuf::from("/nonexistent")
    }
}

#[tokio::test]
async fn failed_signal_still_counts_toward_manifest() {
    let tmp = tempfile::tempdir().unwrap();
    let recording = speed_recording();
    let service = service(tmp.path(), ExportFormat::Parquet);
    let run = ExportRun::new("drive");

    let summary = service
        .export_columnar(&recording, &run, Arc::new(FailingSink))
        .await;
    assert_eq!(summary.signal_count, 1);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].name, "Speed");
    assert_eq!(summary.failed[0].sample_count, 3);

    let manifest = Manifest::build(&run, &recording, summary.signal_count);
    let path = write_manifest(&run, tmp.path(), &manifest).unwrap();
    assert_eq!(read_manifest(&path)["number_of_chunks"], 1);
}

#[tokio::test]
async fn many_signals_share_one_dataset_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let signals: Vec<Signal> = (0..24)
        .map(|i| {
            Signal::new(
                format!("Signal{}", i),
                "",
                vec![0.0, 1.0],
                Samples::Int(vec![i, i + 1]),
            )
            .with_position(i as usize, 0)
        })
        .collect();
    let recording = Recording::new("", vec![], signals).unwrap();

    let config = ExportConfig {
        target: tmp.path().to_path_buf(),
        max_workers: Some(4),
        ..ExportConfig::default()
    };
    let report = ExportService::new(config)
        .unwrap()
        .process_recording(&recording, "bulk")
        .await
        .unwrap();

    assert_eq!(report.summary.signal_count, 24);
    assert!(report.summary.failed.is_empty());
    assert_eq!(std::fs::read_dir(&report.output_dir).unwrap().count(), 24);
    assert_eq!(
        read_dataset(&report.output_dir)
            .iter()
            .map(|b| b.num_rows())
            .sum::<usize>(),
        48
    );
    assert_eq!(read_manifest(&report.manifest_path)["number_of_chunks"], 24);
}

#[tokio::test]
async fn signal_with_missing_samples_is_isolated() {
    // A container that bypasses recording validation
    struct Unchecked(Vec<Arc<Signal>>);

    impl signal_export::MeasurementContainer for Unchecked {
        fn signals(&self) -> Box<dyn Iterator<Item = Arc<Signal>> + Send + '_> {
            Box::new(self.0.iter().cloned())
        }

        fn channel_group(&self, _group_index: usize) -> Option<&ChannelGroup> {
            None
        }

        fn header_comment(&self) -> &str {
            ""
        }
    }

    let tmp = tempfile::tempdir().unwrap();
    let good = Signal::new("Good", "", vec![0.0], Samples::Float(vec![1.0]));
    let bad = Signal::new("Bad", "", vec![0.0, 1.0], Samples::Float(vec![1.0]));
    let container = Unchecked(vec![Arc::new(bad), Arc::new(good)]);

    for format in [ExportFormat::Parquet, ExportFormat::Csv] {
        let report = service(tmp.path(), format)
            .process_recording(&container, "partial")
            .await
            .unwrap();
        assert_eq!(report.summary.signal_count, 2);
        assert_eq!(report.summary.failed.len(), 1);
        assert_eq!(report.summary.failed[0].index, 0);
        assert_eq!(report.summary.rows_written, 1);
        assert_eq!(read_manifest(&report.manifest_path)["number_of_chunks"], 2);
    }
}
