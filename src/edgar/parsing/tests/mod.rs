use std::fs;
use std::path::PathBuf;

use crate::edgar::extract::{ExtractionStats, Extractor, Termination};
use crate::edgar::fields::FieldType;
use crate::edgar::keywords::classify;
use crate::edgar::parsing::rows::RowTokenizer;
use crate::edgar::parsing::scale::{detect_scale, ScaleContext};
use crate::edgar::records::{BsData, CfData, EntityData, FinancialRecord, OpsData};

pub fn get_test_file_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("src/edgar/parsing/tests/data")
        .join(filename)
}

pub fn read_test_file(filename: &str) -> String {
    fs::read_to_string(get_test_file_path(filename))
        .unwrap_or_else(|e| panic!("Failed to read test file {}: {}", filename, e))
}

fn run_fixture<R: FinancialRecord>(filename: &str) -> (R, ExtractionStats) {
    let content = read_test_file(filename);
    let mut record = R::default();
    let stats = Extractor::default()
        .run(&mut record, content.as_bytes())
        .unwrap_or_else(|e| panic!("{} did not extract: {}", filename, e));
    (record, stats)
}

#[test]
fn test_fixture_scales_come_from_the_header_cell() {
    let cases = [
        ("ops_r4.htm", ScaleContext { money: 1_000, shares: 1 }),
        ("balance_sheet_r2.htm", ScaleContext { money: 1_000_000, shares: 1 }),
        ("cash_flow_r7.htm", ScaleContext { money: 1_000_000, shares: 1 }),
        ("entity_r1.htm", ScaleContext { money: 1_000_000, shares: 1 }),
    ];
    for (filename, expected) in cases {
        let content = read_test_file(filename);
        let mut tokenizer = RowTokenizer::new(content.as_bytes());
        let detection = detect_scale(&mut tokenizer, 3).unwrap();
        assert_eq!(detection.scale, expected, "{}", filename);
        assert!(detection.disclosed, "{}", filename);
        assert_eq!(detection.consumed.len(), 1, "{}", filename);
    }
}

#[test]
fn test_operations_statement() {
    let (ops, stats) = run_fixture::<OpsData>("ops_r4.htm");

    assert_eq!(
        ops,
        OpsData {
            revenue: 96_773_000,
            cost_of_revenue: 79_113_000,
            gross_margin: 17_660_000,
            operating_income: 8_891_000,
            operating_expense: 8_769_000,
            net_income: 15_001_000,
        }
    );
    assert_eq!(stats.termination, Termination::Complete);
    // the attributable net income line after "Net income" is never read
    assert_eq!(stats.rows_scanned, 10);
    assert_eq!(stats.fields_set, 6);
}

#[test]
fn test_balance_sheet_statement() {
    let (bs, stats) = run_fixture::<BsData>("balance_sheet_r2.htm");

    assert_eq!(
        bs,
        BsData {
            long_term_debt: 95_281_000_000,
            short_term_debt: 9_822_000_000,
            current_liabilities: 145_308_000_000,
            deferred_revenue: 8_061_000_000,
            retained_earnings: -214_000_000,
        }
    );
    assert!(stats.completed_early());
    assert_eq!(stats.rows_scanned, 8);
}

#[test]
fn test_cash_flow_statement() {
    let (cf, stats) = run_fixture::<CfData>("cash_flow_r7.htm");

    assert_eq!(
        cf,
        CfData {
            operating_cash_flow: 13_256_000_000,
            capital_expenditure: -8_898_000_000,
        }
    );
    assert!(stats.completed_early());
    // stops on the investing purchase line; the trailing rows are never read
    assert_eq!(stats.rows_scanned, 11);
    assert_eq!(stats.fields_set, 2);
}

#[test]
fn test_cash_flow_adjustments_do_not_claim_capital_expenditure() {
    let content = read_test_file("cash_flow_r7.htm");
    let rows: Vec<_> = RowTokenizer::new(content.as_bytes())
        .collect::<Result<_, _>>()
        .unwrap();
    let fields: Vec<_> = rows
        .iter()
        .map(|row| row.label().map_or(FieldType::Unknown, classify))
        .collect();

    let capex_rows: Vec<_> = rows
        .iter()
        .zip(&fields)
        .filter(|(_, field)| **field == FieldType::CapitalExpenditure)
        .map(|(row, _)| row.label().unwrap())
        .collect();
    assert_eq!(
        capex_rows,
        [
            "Purchases of property and equipment excluding finance leases",
            "Capital expenditures"
        ]
    );
    assert_eq!(fields[5], FieldType::Unknown, "{:?}", rows[5].label());
    assert_eq!(fields[6], FieldType::Unknown, "{:?}", rows[6].label());
}

#[test]
fn test_entity_statement_keeps_share_counts_unscaled() {
    let (entity, stats) = run_fixture::<EntityData>("entity_r1.htm");

    assert_eq!(entity.share_count, 15_552_752_000);
    assert_eq!(stats.scale.for_field(FieldType::SharesOutstanding), 1);
    assert_eq!(stats.termination, Termination::Complete);
}

#[test]
fn test_fixture_rows_decode_entities_and_labels() {
    let content = read_test_file("cash_flow_r7.htm");
    let rows: Vec<_> = RowTokenizer::new(content.as_bytes())
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(rows.len(), 13);
    let caption = &rows[3];
    assert!(caption.label().unwrap().starts_with("Adjustments to reconcile"));
    assert!(!caption.has_values());
    assert_eq!(rows[8].values().collect::<Vec<_>>(), ["13,256", "14,724"]);
}
