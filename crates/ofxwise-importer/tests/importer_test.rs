//! Integration tests for the importer crate.

use ofxwise_core::TransactionType;
use ofxwise_importer::{
    parse_file, ImportError, Importer, ImporterConfig, ImporterRegistry, RowErrorPolicy,
};
use proptest::prelude::*;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

fn fixtures_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

const LEGACY_HEADER: &str = "TransferWise ID,Date,Amount,Currency,Description,Payment Reference,Running Balance,Exchange From,Exchange To,Exchange Rate,Payer Name,Payee Name,Payee Account Number,Merchant";

#[test]
fn test_sample_statement() {
    let config = ImporterConfig::transferwise().build();
    let result = parse_file(&fixtures_path("sample-statement.csv"), &config)
        .expect("should parse sample statement");

    let lines = &result.statement.lines;
    assert_eq!(lines.len(), 5);

    // All ids are unique and no amount is zero
    let ids: HashSet<&str> = lines.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids.len(), 5);
    assert!(lines.iter().all(|l| !l.amount.is_zero()));
    assert!(result.statement.validate().is_ok());
}

#[test]
fn test_sample_statement_fields() {
    let config = ImporterConfig::transferwise().currency("EUR").build();
    let result = parse_file(&fixtures_path("sample-statement.csv"), &config).unwrap();
    let lines = &result.statement.lines;

    assert_eq!(lines[0].memo, "Sent money to Jane Doe (March rent share)");
    assert_eq!(lines[0].amount, dec!(-25.00));
    assert_eq!(lines[0].trntype, TransactionType::Credit);
    assert_eq!(lines[0].refnum.as_deref(), Some("TRANSFER-101"));
    assert_eq!(
        lines[0].bank_account_to.as_ref().map(|a| a.acct_id.as_str()),
        Some("DE89370400440532013000")
    );

    // Rows 1 and 2 share date, memo and amount
    assert_eq!(lines[1].id, format!("{}-1", lines[0].id));

    assert_eq!(
        lines[3].memo,
        "Converted 140.00 USD to 120.00 EUR, 0.857143 USD/EUR"
    );
    assert_eq!(lines[3].trntype, TransactionType::Debit);
    assert!(lines[3].bank_account_to.is_none());

    assert_eq!(
        lines[4].memo,
        "Received money from ACME GmbH (Invoice 2021-17)"
    );
    assert_eq!(result.statement.total(), dec!(1065.80));
}

#[test]
fn test_currency_filter_drops_everything() {
    let config = ImporterConfig::transferwise().currency("USD").build();
    let result = parse_file(&fixtures_path("sample-statement.csv"), &config).unwrap();
    assert!(result.statement.is_empty());
    assert_eq!(result.skipped, 5);
}

#[test]
fn test_wise_statement() {
    let config = ImporterConfig::wise().currency("USD").build();
    let result = parse_file(&fixtures_path("wise-statement.csv"), &config).unwrap();
    let lines = &result.statement.lines;

    assert_eq!(lines.len(), 4);
    assert_eq!(result.skipped, 1);

    let ids: Vec<&str> = lines.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["TRANSFER-2001", "TRANSFER-2002", "TRANSFER-2002-1", "TRANSFER-2005"]
    );

    assert_eq!(
        lines[0].date.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        "2024-01-15 13:45:10.123"
    );
    assert_eq!(lines[0].trntype, TransactionType::Debit);
    assert_eq!(
        lines[0].memo,
        "Card transaction of 12.50 USD issued by Corner Cafe"
    );
    assert_eq!(lines[1].memo, "Sent money to John Smith (Loan)");

    // Empty transaction type falls back to the amount sign
    assert_eq!(lines[3].amount, dec!(0.00));
    assert_eq!(lines[3].trntype, TransactionType::Credit);
}

#[test]
fn test_wise_conversion_row() {
    let config = ImporterConfig::wise().currency("EUR").build();
    let result = parse_file(&fixtures_path("wise-statement.csv"), &config).unwrap();
    let lines = &result.statement.lines;

    assert_eq!(lines.len(), 1);
    assert_eq!(
        lines[0].memo,
        "Converted 92.00 USD to 85.00 EUR, 0.923913 USD/EUR"
    );
    assert_eq!(lines[0].trntype, TransactionType::Credit);
}

#[test]
fn test_reparse_is_identical() {
    let config = ImporterConfig::transferwise().build();
    let path = fixtures_path("sample-statement.csv");
    let first = parse_file(&path, &config).unwrap();
    let second = parse_file(&path, &config).unwrap();
    assert_eq!(first.statement, second.statement);
}

#[test]
fn test_missing_header_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("statement.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "TransferWise ID,Date,Amount,Currency,Description").unwrap();
    writeln!(file, "T1,15-01-2024,1.00,USD,Top up").unwrap();
    drop(file);

    let config = ImporterConfig::wise().build();
    let err = parse_file(&path, &config).unwrap_err();
    assert_eq!(
        err.to_string(),
        "missing expected column 'Date Time' in header"
    );
}

#[test]
fn test_missing_file() {
    let config = ImporterConfig::transferwise().build();
    let err = parse_file(Path::new("/nonexistent/statement.csv"), &config).unwrap_err();
    assert!(matches!(err, ImportError::Io { .. }));
}

#[test]
fn test_empty_file_yields_empty_statement() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let config = ImporterConfig::transferwise().currency("EUR").build();
    let result = parse_file(file.path(), &config).unwrap();
    assert!(result.statement.is_empty());
    assert_eq!(result.statement.currency.as_deref(), Some("EUR"));
    assert!(result.row_errors.is_empty());
}

#[test]
fn test_abort_vs_collect() {
    let content = format!(
        "{LEGACY_HEADER}\n\
         T1,15-01-2024,-1.00,USD,Good,,0,,,,,,,\n\
         T2,16-01-2024,,USD,No amount,,0,,,,,,,\n\
         T3,17-01-2024,-3.00,USD,Also good,,0,,,,,,,\n"
    );

    let abort = ImporterConfig::transferwise().build();
    let err = abort.parse_str(&content).unwrap_err();
    assert_eq!(err.to_string(), "row 2: missing required field amount");

    let collect = ImporterConfig::transferwise()
        .error_policy(RowErrorPolicy::Collect)
        .build();
    let result = collect.parse_str(&content).unwrap();
    assert_eq!(result.statement.len(), 2);
    assert_eq!(result.row_errors.len(), 1);
}

#[test]
fn test_bad_row_in_other_currency_still_fails() {
    let content = format!("{LEGACY_HEADER}\nT1,15-01-2024,abc,EUR,Bad,,0,,,,,,,\n");
    let config = ImporterConfig::transferwise().currency("USD").build();
    assert!(matches!(
        config.parse_str(&content),
        Err(ImportError::InvalidAmount { row: 1, .. })
    ));
}

#[test]
fn test_registry_picks_preset_for_fixtures() {
    let registry = ImporterRegistry::with_builtin();

    let legacy = registry
        .identify(&fixtures_path("sample-statement.csv"))
        .unwrap();
    assert_eq!(legacy.name(), "transferwise");

    let wise = registry
        .identify(&fixtures_path("wise-statement.csv"))
        .unwrap();
    assert_eq!(wise.name(), "wise");

    let result = wise
        .configure()
        .currency("USD")
        .build()
        .parse_file(&fixtures_path("wise-statement.csv"))
        .unwrap();
    assert_eq!(result.statement.len(), 4);
}

proptest! {
    #[test]
    fn prop_memo_shape(
        desc in "[A-Za-z][A-Za-z ]{0,20}",
        reference in proptest::option::of("[A-Za-z0-9]{1,10}"),
    ) {
        let row = format!(
            "T1,15-01-2024,-1.00,USD,{desc},{},0,USD,EUR,0.9,,,,",
            reference.as_deref().unwrap_or("")
        );
        let content = format!("{LEGACY_HEADER}\n{row}\n");
        let config = ImporterConfig::transferwise().build();
        let result = config.parse_str(&content).unwrap();
        let memo = &result.statement.lines[0].memo;

        prop_assert!(memo.starts_with(&desc));
        prop_assert!(memo.ends_with(", 0.9 USD/EUR"));
        match reference {
            Some(r) => {
                let suffix = format!(" ({r})");
                prop_assert!(memo.contains(&suffix), "memo {:?} lacks {:?}", memo, suffix);
            }
            None => prop_assert!(!memo.contains('(')),
        }
    }

    #[test]
    fn prop_ids_unique_for_identical_rows(count in 1usize..20) {
        let mut content = format!("{LEGACY_HEADER}\n");
        for _ in 0..count {
            content.push_str("T1,15-01-2024,-1.00,USD,Same,,0,,,,,,,\n");
        }
        let config = ImporterConfig::transferwise().build();
        let result = config.parse_str(&content).unwrap();
        let ids: HashSet<&str> = result.statement.lines.iter().map(|l| l.id.as_str()).collect();
        prop_assert_eq!(ids.len(), count);
    }
}
