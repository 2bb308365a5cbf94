//! Integration tests for job and records files.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use collector_cli::config::{JobConfig, RecordBatch};
use collector_model::{Frequency, Period, TimeWindow, Value, keys};
use collector_transform::{JsonLinesWriter, query_for_range};

const JOB: &str = r#"{
    "data-set": { "data-group": "govuk", "data-type": "visitors" },
    "query": { "frequency": "weekly", "empty_data_set": true },
    "options": {
        "mappings": { "customVarValue1": "department" },
        "plugins": ["RemoveKey(\"customVarValue9\")", "ComputeIdFrom(\"department\", \"timeSpan\")"],
        "chunk-size": 2
    }
}"#;

const RECORDS: &str = r#"[
    {
        "start_date": "2013-04-01",
        "end_date": "2013-04-07",
        "dimensions": { "customVarValue1": "hmrc", "customVarValue9": "drop me" },
        "metrics": { "visits": "100", "avgSessionDuration": "2.5" }
    },
    {
        "start_date": "2013-04-08",
        "dimensions": { "customVarValue1": "dfe", "customVarValue9": "drop me" },
        "metrics": { "visits": "7" }
    }
]"#;

fn unique_temp_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "collector-{}-{}-{}",
        name,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    path
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn job_file_resolves_defaults_and_overrides() {
    let job = JobConfig::from_json(JOB).unwrap();
    assert_eq!(job.frequency(), Frequency::Weekly);
    assert_eq!(job.data_type(), Some("visitors"));
    assert_eq!(job.data_set.data_group.as_deref(), Some("govuk"));
    assert_eq!(job.pusher().chunk_size(), 2);

    let minimal = JobConfig::from_json(r#"{"data-set": {"data-type": "x"}}"#).unwrap();
    assert_eq!(minimal.frequency(), Frequency::Weekly);
    assert_eq!(minimal.pusher().chunk_size(), 100);
    assert!(!minimal.query.empty_data_set);
}

#[test]
fn options_data_type_wins_over_data_set() {
    let job = JobConfig::from_json(
        r#"{"data-set": {"data-type": "visitors"}, "options": {"dataType": "devices"}}"#,
    )
    .unwrap();
    assert_eq!(job.data_type(), Some("devices"));
    let parser = job.parser().unwrap();
    assert_eq!(parser.config().data_type.as_deref(), Some("devices"));
}

#[test]
fn unknown_frequency_is_rejected_when_loading() {
    let err = JobConfig::from_json(r#"{"query": {"frequency": "hourly"}}"#).unwrap_err();
    assert!(format!("{err:#}").contains("hourly"));
}

#[test]
fn plain_record_lists_get_coerced_special_fields() {
    let batch = RecordBatch::from_json(RECORDS).unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(
        batch.special_fields[0].get("visits"),
        Some(&Value::Integer(100))
    );
    assert_eq!(
        batch.special_fields[0].get("avgSessionDuration"),
        Some(&Value::Float(2.5))
    );
}

#[test]
fn convert_durations_option_rescales_session_duration() {
    let job = JobConfig::from_json(
        r#"{"data-set": {"data-type": "visitors"}, "options": {"convertDurations": true}}"#,
    )
    .unwrap();
    let path = unique_temp_path("records.json");
    fs::write(&path, RECORDS).unwrap();
    let batch = job.load_records(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(
        batch.special_fields[0].get("avgSessionDuration"),
        Some(&Value::Float(2500.0))
    );
    assert_eq!(
        batch.special_fields[0].get("visits"),
        Some(&Value::Integer(100))
    );
}

#[test]
fn durations_stay_in_seconds_by_default() {
    let job = JobConfig::from_json(JOB).unwrap();
    let path = unique_temp_path("records.json");
    fs::write(&path, RECORDS).unwrap();
    let batch = job.load_records(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(
        batch.special_fields[0].get("avgSessionDuration"),
        Some(&Value::Float(2.5))
    );
}

#[test]
fn explicit_special_fields_must_align() {
    let contents = format!(r#"{{"records": {RECORDS}, "special_fields": [{{}}]}}"#);
    assert!(RecordBatch::from_json(&contents).is_err());

    let contents = format!(r#"{{"records": {RECORDS}, "special_fields": [{{"rank": 1}}, {{}}]}}"#);
    let batch = RecordBatch::from_json(&contents).unwrap();
    assert_eq!(batch.special_fields[0].get("rank"), Some(&Value::Integer(1)));
    assert!(batch.special_fields[1].is_empty());
}

#[test]
fn non_numeric_metrics_fail_loading() {
    let contents = r#"[{"start_date": "2013-04-01", "metrics": {"visits": "many"}}]"#;
    let err = RecordBatch::from_json(contents).unwrap_err();
    assert!(format!("{err:#}").contains("many"));
}

#[test]
fn file_source_selects_records_by_window() {
    let source = RecordBatch::from_json(RECORDS).unwrap().into_source();
    let window = TimeWindow::new(date(2013, 4, 8), date(2013, 4, 14), Period::Week);
    let selected: RecordBatch = match query_for_range(&source, &[window]) {
        Ok(selected) => selected.into_iter().collect(),
        Err(never) => match never {},
    };
    assert_eq!(selected.len(), 1);
    assert_eq!(selected.records[0].start_date, date(2013, 4, 8));
    assert_eq!(
        selected.special_fields[0].get("visits"),
        Some(&Value::Integer(7))
    );
}

#[test]
fn job_runs_end_to_end_into_json_lines() {
    let job = JobConfig::from_json(JOB).unwrap();
    let batch = RecordBatch::from_json(RECORDS).unwrap();
    let documents = job
        .parser()
        .unwrap()
        .get_data(&batch.records, &batch.special_fields)
        .unwrap();

    assert_eq!(documents.len(), 2);
    let first = &documents[0];
    assert!(!first.contains_key("customVarValue9"));
    assert_eq!(first.get("department"), Some(&Value::from("hmrc")));
    assert_eq!(first.get(keys::HUMAN_ID), Some(&Value::from("hmrc_week")));

    let path = unique_temp_path("documents.jsonl");
    let mut writer = JsonLinesWriter::new(fs::File::create(&path).unwrap());
    let summary = job.pusher().push(&mut writer, &documents).unwrap();
    drop(writer);

    assert!(summary.emptied);
    assert_eq!(summary.chunks, 1);
    let written = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], collector_transform::publish::EMPTY_MARKER);
    insta::assert_snapshot!("first_published_line", lines[1]);
    fs::remove_file(&path).unwrap();
}
