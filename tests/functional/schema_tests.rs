//! Table-set and column-set reconciliation across two in-memory sides

use crate::common::MemorySource;
use schemadiff::output::{JsonReporter, PrettyPrinter};
use schemadiff::reconcile::ReconcileOptions;
use schemadiff::schema::RunOptions;
use schemadiff::value::Value;
use schemadiff::{SchemaReconciler, SchemadiffError};

fn order_rows(amounts: &[i64]) -> Vec<Vec<Value>> {
    amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| {
            vec![
                Value::Int(1000 + i as i64),
                Value::Int(i as i64),
                Value::Int(*amount),
                Value::Int(i as i64),
            ]
        })
        .collect()
}

const ORDER_COLUMNS: [&str; 4] = ["_id", "id", "amount", "endtime"];

#[test]
fn test_table_set_mismatch_halts_before_fetch() {
    let left = MemorySource::new("left")
        .with_table("orders", &ORDER_COLUMNS, order_rows(&[1]))
        .with_table("users", &["id", "endtime"], vec![]);
    let right = MemorySource::new("right").with_table("orders", &ORDER_COLUMNS, order_rows(&[1]));

    let mut sink = JsonReporter::new(None);
    let err = SchemaReconciler::new(RunOptions::default())
        .run(&left, &right, &mut sink)
        .unwrap_err();

    assert!(err.is_structural());
    assert!(matches!(err, SchemadiffError::TableSetMismatch { .. }));
    assert_eq!(left.fetch_count(), 0);
    assert_eq!(right.fetch_count(), 0);
    assert!(sink.reports().is_empty());
}

#[test]
fn test_table_order_does_not_matter() {
    let left = MemorySource::new("left")
        .with_table("orders", &ORDER_COLUMNS, order_rows(&[1]))
        .with_table("users", &["id", "endtime"], vec![vec![Value::Int(1), Value::Int(1)]]);
    let right = MemorySource::new("right")
        .with_table("users", &["id", "endtime"], vec![vec![Value::Int(1), Value::Int(1)]])
        .with_table("orders", &ORDER_COLUMNS, order_rows(&[1]));

    let mut sink = JsonReporter::new(None);
    let summary = SchemaReconciler::new(RunOptions::default())
        .run(&left, &right, &mut sink)
        .unwrap();

    assert_eq!(summary.tables_compared(), 2);
    assert!(!summary.has_differences());
    assert_eq!(sink.reports()[0].table, "orders");
}

#[test]
fn test_column_mismatch_halts_whole_run() {
    let left = MemorySource::new("left")
        .with_table("accounts", &["id", "endtime"], vec![vec![Value::Int(1), Value::Int(1)]])
        .with_table("payments", &["id", "amount", "endtime"], vec![]);
    let right = MemorySource::new("right")
        .with_table("accounts", &["id", "endtime"], vec![vec![Value::Int(1), Value::Int(1)]])
        .with_table("payments", &["id", "amount", "currency", "endtime"], vec![]);

    let mut sink = JsonReporter::new(None);
    let err = SchemaReconciler::new(RunOptions::default())
        .run(&left, &right, &mut sink)
        .unwrap_err();

    match err {
        SchemadiffError::ColumnMismatch { table, left, right } => {
            assert_eq!(table, "payments");
            assert_eq!(left, vec!["id", "amount", "endtime"]);
            assert_eq!(right, vec!["id", "amount", "currency", "endtime"]);
        }
        other => panic!("Expected ColumnMismatch, got {other:?}"),
    }
    // the matching table before it was still reported
    assert_eq!(sink.reports().len(), 1);
}

#[test]
fn test_column_order_must_match() {
    let left = MemorySource::new("left").with_table("t", &["a", "b", "endtime"], vec![]);
    let right = MemorySource::new("right").with_table("t", &["b", "a", "endtime"], vec![]);

    let mut sink = JsonReporter::new(None);
    let err = SchemaReconciler::new(RunOptions::default())
        .run(&left, &right, &mut sink)
        .unwrap_err();
    assert!(matches!(err, SchemadiffError::ColumnMismatch { .. }));
}

#[test]
fn test_ignored_columns_never_reported() {
    let left = MemorySource::new("left").with_table(
        "orders",
        &["_id", "id", "capturetime", "amount", "endtime"],
        vec![vec![Value::Int(1), Value::Int(7), Value::from("t1"), Value::Int(5), Value::Int(1)]],
    );
    let right = MemorySource::new("right").with_table(
        "orders",
        &["_id", "id", "capturetime", "amount", "endtime"],
        vec![vec![Value::Int(2), Value::Int(7), Value::from("t2"), Value::Int(6), Value::Int(1)]],
    );

    let mut sink = JsonReporter::new(None);
    SchemaReconciler::new(RunOptions::default())
        .run(&left, &right, &mut sink)
        .unwrap();

    let report = &sink.reports()[0];
    assert_eq!(report.header.names(), &["id", "amount", "endtime"]);
    assert_eq!(report.mismatch_count(), 1);
    assert_eq!(report.mismatches[0].to_strings(), vec!["7", "5 -> 6", "1"]);
}

#[test]
fn test_ignored_columns_may_differ_between_sides() {
    let left = MemorySource::new("left").with_table(
        "orders",
        &["_id", "id", "endtime"],
        vec![vec![Value::Int(1), Value::Int(7), Value::Int(1)]],
    );
    let right = MemorySource::new("right").with_table(
        "orders",
        &["id", "endtime"],
        vec![vec![Value::Int(7), Value::Int(1)]],
    );

    let mut sink = JsonReporter::new(None);
    let summary = SchemaReconciler::new(RunOptions::default())
        .run(&left, &right, &mut sink)
        .unwrap();
    assert!(!summary.has_differences());
}

#[test]
fn test_missing_sort_column_is_fatal() {
    let left = MemorySource::new("left").with_table("orders", &["id", "amount"], vec![]);
    let right = MemorySource::new("right").with_table("orders", &["id", "amount"], vec![]);

    let mut sink = JsonReporter::new(None);
    let err = SchemaReconciler::new(RunOptions::default())
        .run(&left, &right, &mut sink)
        .unwrap_err();

    match err {
        SchemadiffError::SortColumnMissing { table, column, side } => {
            assert_eq!(table, "orders");
            assert_eq!(column, "endtime");
            assert_eq!(side, "left");
        }
        other => panic!("Expected SortColumnMissing, got {other:?}"),
    }
}

#[test]
fn test_row_mismatches_are_not_fatal() {
    let left = MemorySource::new("left")
        .with_table("a", &ORDER_COLUMNS, order_rows(&[1, 2]))
        .with_table("b", &ORDER_COLUMNS, order_rows(&[1, 2, 3]));
    let right = MemorySource::new("right")
        .with_table("a", &ORDER_COLUMNS, order_rows(&[1, 9]))
        .with_table("b", &ORDER_COLUMNS, order_rows(&[1, 2]));

    let mut sink = JsonReporter::new(None);
    let summary = SchemaReconciler::new(RunOptions::default())
        .run(&left, &right, &mut sink)
        .unwrap();

    assert_eq!(summary.tables_compared(), 2);
    assert_eq!(summary.tables_with_differences(), 2);
    assert_eq!(summary.tables[0].mismatches, 1);
    assert_eq!((summary.tables[1].left_rows, summary.tables[1].right_rows), (3, 2));
}

#[test]
fn test_pretty_output_for_run() {
    let left = MemorySource::new("left").with_table("orders", &ORDER_COLUMNS, order_rows(&[1, 2]));
    let right = MemorySource::new("right").with_table("orders", &ORDER_COLUMNS, order_rows(&[1, 3]));

    let mut printer = PrettyPrinter::new(Vec::new());
    SchemaReconciler::new(RunOptions::default())
        .run(&left, &right, &mut printer)
        .unwrap();
    let text = String::from_utf8(printer.into_inner()).unwrap();

    assert!(text.starts_with("Comparing orders\nCount matches: 2\n"));
    assert!(text.contains("2 -> 3"));
    assert!(!text.contains("_id"));
    assert!(text.contains("Compared 1 tables, 1 with differences."));
}

#[test]
fn test_count_only_run() {
    let left = MemorySource::new("left").with_table("orders", &ORDER_COLUMNS, order_rows(&[1, 2]));
    let right = MemorySource::new("right").with_table("orders", &ORDER_COLUMNS, order_rows(&[5, 6]));

    let options = RunOptions {
        reconcile: ReconcileOptions {
            count_only: true,
            ..ReconcileOptions::default()
        },
        ..RunOptions::default()
    };
    let mut sink = JsonReporter::new(None);
    let summary = SchemaReconciler::new(options).run(&left, &right, &mut sink).unwrap();

    assert!(sink.reports()[0].mismatches.is_empty());
    assert!(!summary.has_differences());
}
