//! Aggregation engine tests.

use payreport_core::{
    aggregate::{aggregate, resolve_grouping},
    demo::random_batch,
    error::ReportError,
    record::Record,
    schema::{discover, Schema},
    wide_view::{project, WideRow},
};

fn rec(amount: i64, pairs: &[(&str, &str)]) -> Record {
    Record::new(amount, pairs.iter().copied().collect())
}

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn wide(records: &[Record]) -> (Schema, Vec<WideRow>) {
    let schema = discover(records, &[]);
    let rows = project(records, &schema, &[]);
    (schema, rows)
}

fn consular_sample() -> Vec<Record> {
    vec![
        rec(100, &[("country", "Thailand")]),
        rec(55, &[("country", "Thailand")]),
        rec(100, &[("country", "France")]),
    ]
}

#[test]
fn group_by_country_sorted_by_key() {
    let (schema, rows) = wide(&consular_sample());
    let out = aggregate(&rows, &schema, &cols(&["country"])).unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].group_key, vec![Some("France".to_string())]);
    assert_eq!(out[0].transaction_count, 1);
    assert_eq!(out[0].total_amount, 100);
    assert_eq!(out[1].group_key, vec![Some("Thailand".to_string())]);
    assert_eq!(out[1].transaction_count, 2);
    assert_eq!(out[1].total_amount, 155);
}

#[test]
fn no_grouping_yields_single_combined_row() {
    let (schema, rows) = wide(&consular_sample());
    let out = aggregate(&rows, &schema, &[]).unwrap();

    assert_eq!(out.len(), 1);
    assert!(out[0].group_key.is_empty());
    assert_eq!(out[0].transaction_count, 3);
    assert_eq!(out[0].total_amount, 255);
}

#[test]
fn unknown_column_fails_without_partial_result() {
    let (schema, rows) = wide(&consular_sample());
    let err = aggregate(&rows, &schema, &cols(&["country", "city"])).unwrap_err();
    match err {
        ReportError::InvalidGroupingColumn { column } => assert_eq!(column, "city"),
        other => panic!("expected InvalidGroupingColumn, got {other:?}"),
    }
}

#[test]
fn first_invalid_column_is_reported() {
    let (schema, _) = wide(&consular_sample());
    let err = resolve_grouping(&schema, &cols(&["city", "region"])).unwrap_err();
    assert!(matches!(err, ReportError::InvalidGroupingColumn { ref column } if column == "city"));
    assert_eq!(resolve_grouping(&schema, &cols(&["country"])).unwrap(), vec![0]);
}

#[test]
fn empty_rows_are_no_data() {
    let schema = Schema::from_names(["country"]);
    let err = aggregate(&[], &schema, &[]).unwrap_err();
    assert!(matches!(err, ReportError::NoData));

    // Validation still comes first.
    let err = aggregate(&[], &schema, &cols(&["city"])).unwrap_err();
    assert!(matches!(err, ReportError::InvalidGroupingColumn { .. }));
}

#[test]
fn absent_sorts_first_and_differs_from_empty_string() {
    let records = vec![
        rec(10, &[("tag", "b")]),
        rec(20, &[("tag", "")]),
        rec(30, &[("other", "x")]),
        rec(40, &[("tag", "a")]),
        rec(50, &[]),
    ];
    let (schema, rows) = wide(&records);
    let out = aggregate(&rows, &schema, &cols(&["tag"])).unwrap();

    let keys: Vec<Option<&str>> = out.iter().map(|r| r.group_key[0].as_deref()).collect();
    assert_eq!(keys, vec![None, Some(""), Some("a"), Some("b")]);
    assert_eq!(out[0].transaction_count, 2);
    assert_eq!(out[0].total_amount, 80);
    assert_eq!(out[1].total_amount, 20);
}

#[test]
fn multi_column_keys_follow_request_order() {
    let records = vec![
        rec(1, &[("post", "Paris"), ("country", "France")]),
        rec(2, &[("post", "Ibiza"), ("country", "Spain")]),
        rec(4, &[("post", "Barcelona"), ("country", "Spain")]),
        rec(8, &[("post", "Ibiza"), ("country", "Spain")]),
    ];
    let (schema, rows) = wide(&records);
    let out = aggregate(&rows, &schema, &cols(&["country", "post"])).unwrap();

    let keys: Vec<Vec<Option<String>>> = out.iter().map(|r| r.group_key.clone()).collect();
    assert_eq!(
        keys,
        vec![
            vec![Some("France".into()), Some("Paris".into())],
            vec![Some("Spain".into()), Some("Barcelona".into())],
            vec![Some("Spain".into()), Some("Ibiza".into())],
        ]
    );
    assert_eq!(out[2].transaction_count, 2);
    assert_eq!(out[2].total_amount, 10);
}

#[test]
fn partitions_are_exhaustive_and_sorted() {
    for seed in [3u64, 11, 2024] {
        let records = random_batch(seed, 300);
        let (schema, rows) = wide(&records);
        let batch_total: i64 = records.iter().map(|r| r.amount).sum();

        for grouping in [vec![], cols(&["country"]), cols(&["fee type", "post"])] {
            let out = aggregate(&rows, &schema, &grouping).unwrap();
            let count: u64 = out.iter().map(|r| r.transaction_count).sum();
            let total: i64 = out.iter().map(|r| r.total_amount).sum();
            assert_eq!(count as usize, records.len(), "seed {seed} grouping {grouping:?}");
            assert_eq!(total, batch_total, "seed {seed} grouping {grouping:?}");
            assert!(
                out.windows(2).all(|w| w[0].group_key < w[1].group_key),
                "groups not strictly ascending for seed {seed} grouping {grouping:?}"
            );
        }
    }
}

#[test]
fn totals_stay_exact_over_many_small_amounts() {
    let records: Vec<Record> = (0..10_000).map(|_| rec(1, &[("k", "v")])).collect();
    let (schema, rows) = wide(&records);
    let out = aggregate(&rows, &schema, &cols(&["k"])).unwrap();
    assert_eq!(out[0].total_amount, 10_000);
}
