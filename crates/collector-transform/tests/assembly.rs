use chrono::NaiveDate;
use collector_model::{
    CollectorError, CollectorOptions, Document, FieldMapping, Frequency, Period, RawRecord, Value,
    keys,
};
use collector_transform::{
    AssemblyConfig, DataParser, PluginChain, build_document, build_document_set,
    metric_special_fields,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn weekly_visits_record() -> RawRecord {
    RawRecord::new(date(2013, 4, 1))
        .with_end_date(date(2013, 4, 7))
        .with_dimension("date", "2013-04-02")
        .with_metric("visits", "100")
}

fn text(document: &Document, key: &str) -> String {
    document
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[test]
fn fallback_identity_from_data_type_timestamp_and_dimensions() {
    let record = weekly_visits_record();
    let special = metric_special_fields(&record).unwrap();
    let config = AssemblyConfig::new("weeklyvisits", Period::Week);

    let document = build_document(&record, &special, &config).unwrap();

    assert_eq!(
        text(&document, keys::HUMAN_ID),
        "weeklyvisits_20130401000000_week_2013-04-02"
    );
    assert_eq!(
        text(&document, keys::ID),
        "d2Vla2x5dmlzaXRzXzIwMTMwNDAxMDAwMDAwX3dlZWtfMjAxMy0wNC0wMg=="
    );
    assert_eq!(document.get("visits"), Some(&Value::Integer(100)));
    assert_eq!(text(&document, keys::TIME_SPAN), "week");
    assert_eq!(
        document.get(keys::TIMESTAMP),
        Some(&Value::midnight_utc(date(2013, 4, 1)))
    );
}

#[test]
fn assembled_document_snapshot() {
    let record = weekly_visits_record();
    let special = metric_special_fields(&record).unwrap();
    let config = AssemblyConfig::new("weeklyvisits", Period::Week);

    let document = build_document(&record, &special, &config).unwrap();

    insta::assert_json_snapshot!("weekly_visits_document", document);
}

#[test]
fn mapping_applies_to_the_whole_merged_document() {
    let record = weekly_visits_record().with_dimension("customVarValue1", "hmrc");
    let mapping: FieldMapping = [("timeSpan", "period"), ("customVarValue1", "department")]
        .into_iter()
        .collect();
    let config = AssemblyConfig::new("weeklyvisits", Period::Week).with_mapping(mapping);

    let document = build_document(&record, &Document::new(), &config).unwrap();

    assert_eq!(text(&document, "period"), "week");
    assert_eq!(text(&document, "department"), "hmrc");
    assert!(!document.contains_key(keys::TIME_SPAN));
    assert!(!document.contains_key("customVarValue1"));
}

#[test]
fn additional_fields_feed_explicit_identity() {
    let additional = Document::from([("idVar".to_string(), Value::from("foo"))]);
    let config = AssemblyConfig::new("weeklyvisits", Period::Week)
        .with_additional_fields(additional)
        .with_id_fields("idVar");

    let document = build_document(&weekly_visits_record(), &Document::new(), &config).unwrap();

    assert_eq!(text(&document, keys::HUMAN_ID), "foo");
    assert_eq!(text(&document, keys::ID), "Zm9v");
}

#[test]
fn explicit_id_fields_concatenate_without_delimiter() {
    let record = RawRecord::new(date(2013, 4, 1))
        .with_dimension("a", "1\u{0601}")
        .with_dimension("b", "2");
    let config = AssemblyConfig::new("people", Period::Week).with_id_fields(vec!["a", "b"]);

    let document = build_document(&record, &Document::new(), &config).unwrap();

    assert_eq!(text(&document, keys::HUMAN_ID), "1\u{0601}2");
    assert_eq!(text(&document, keys::ID), "MdiBMg==");
}

#[test]
fn dimensions_override_additional_fields_and_special_fields_override_both() {
    let record = RawRecord::new(date(2013, 4, 1)).with_dimension("source", "dimension");
    let additional = Document::from([
        ("source".to_string(), Value::from("additional")),
        ("dataType".to_string(), Value::from("constant")),
    ]);
    let special = Document::from([("source".to_string(), Value::from("special"))]);
    let config =
        AssemblyConfig::new("weeklyvisits", Period::Week).with_additional_fields(additional);

    let document = build_document(&record, &special, &config).unwrap();

    assert_eq!(text(&document, "source"), "special");
    assert_eq!(text(&document, keys::DATA_TYPE), "constant");
}

#[test]
fn missing_data_type_fails() {
    let mut config = AssemblyConfig::new("ignored", Period::Week);
    config.data_type = None;

    let err = build_document(&weekly_visits_record(), &Document::new(), &config).unwrap_err();

    assert!(matches!(err, CollectorError::MissingDataType));
}

#[test]
fn misaligned_special_fields_fail() {
    let config = AssemblyConfig::new("weeklyvisits", Period::Week);

    let err = build_document_set(&[weekly_visits_record()], &[], &config).unwrap_err();

    assert!(matches!(
        err,
        CollectorError::MisalignedSpecialFields {
            records: 1,
            special_fields: 0
        }
    ));
}

#[test]
fn reassembly_is_byte_identical() {
    let records = vec![
        weekly_visits_record(),
        RawRecord::new(date(2013, 4, 8)).with_dimension("date", "2013-04-09"),
    ];
    let special = vec![Document::new(), Document::new()];
    let config = AssemblyConfig::new("weeklyvisits", Period::Week);

    let first = build_document_set(&records, &special, &config).unwrap();
    let second = build_document_set(&records, &special, &config).unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn plugin_chain_recomputes_identity_after_removing_keys() {
    let record = weekly_visits_record().with_dimension("customVarValue9", "foo");
    let options = CollectorOptions::default()
        .with_plugins([r#"RemoveKey("customVarValue9")"#, r#"ComputeIdFrom("date")"#]);
    let parser = DataParser::new(&options, Some("weeklyvisits"), Frequency::Weekly).unwrap();

    let documents = parser.get_data(&[record], &[Document::new()]).unwrap();

    assert_eq!(documents.len(), 1);
    let document = &documents[0];
    assert!(!document.contains_key("customVarValue9"));
    assert_eq!(text(document, keys::HUMAN_ID), "2013-04-02");
    assert_eq!(text(document, keys::ID), "MjAxMy0wNC0wMg==");
}

#[test]
fn aggregate_key_sums_visits_across_matching_documents() {
    let records = vec![
        weekly_visits_record(),
        weekly_visits_record().with_metric("visits", "103"),
    ];
    let special: Vec<Document> = records
        .iter()
        .map(|record| metric_special_fields(record).unwrap())
        .collect();
    let options = CollectorOptions::default().with_plugins([
        r#"AggregateKey(sum("visits"))"#,
        r#"ComputeIdFrom("date")"#,
    ]);
    let parser = DataParser::new(&options, Some("weeklyvisits"), Frequency::Weekly).unwrap();

    let documents = parser.get_data(&records, &special).unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].get("visits"), Some(&Value::Integer(203)));
    assert_eq!(text(&documents[0], "date"), "2013-04-02");
    assert_eq!(text(&documents[0], keys::DATA_TYPE), "weeklyvisits");
}

#[test]
fn chain_not_ending_in_compute_id_from_is_rejected() {
    let err = PluginChain::parse(&[r#"ComputeRank("rank")"#]).unwrap_err();
    assert!(matches!(err, CollectorError::InvalidPluginChain { .. }));
}
