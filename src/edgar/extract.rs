use serde::Serialize;
use std::io::BufRead;

use super::keywords::{KeywordTable, KEYWORD_TABLE};
use super::parsing::rows::{RowTokenizer, TableRow};
use super::parsing::scale::{detect_scale, ScaleContext};
use super::records::FinancialRecord;
use crate::core::config::ExtractorConfig;
use crate::error::{ExtractError, Result};

/// How the row loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    /// Every required attribute was satisfied before the stream ran out.
    Complete,
    /// The stream was read to the end.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub scale: ScaleContext,
    pub rows_scanned: usize,
    pub fields_set: usize,
    pub termination: Termination,
}

impl ExtractionStats {
    pub fn completed_early(&self) -> bool {
        self.termination == Termination::Complete
    }
}

/// Drives tokenizer, scale detection, classification and population for
/// one document at a time.
///
/// An `Extractor` only reads shared tables, so one instance can serve any
/// number of concurrent calls; each call owns its record and scale.
#[derive(Debug, Clone)]
pub struct Extractor<'a> {
    keywords: &'a KeywordTable,
    config: ExtractorConfig,
}

impl Default for Extractor<'static> {
    fn default() -> Self {
        Self::with_config(ExtractorConfig::default())
    }
}

impl Extractor<'static> {
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self {
            keywords: &KEYWORD_TABLE,
            config,
        }
    }
}

impl<'a> Extractor<'a> {
    pub fn new(keywords: &'a KeywordTable, config: ExtractorConfig) -> Self {
        Self { keywords, config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts a fresh `R` from `source`.
    pub fn extract<R, S>(&self, source: S) -> Result<R>
    where
        R: FinancialRecord,
        S: BufRead,
    {
        let mut record = R::default();
        self.run(&mut record, source)?;
        Ok(record)
    }

    /// Populates `record` from `source` and validates it.
    ///
    /// On error the record keeps whatever was populated (and derived) before
    /// the failure, for diagnostics.
    pub fn run<R, S>(&self, record: &mut R, source: S) -> Result<ExtractionStats>
    where
        R: FinancialRecord,
        S: BufRead,
    {
        let mut tokenizer = RowTokenizer::new(source);
        let detection = detect_scale(&mut tokenizer, self.config.scale_scan_rows)?;
        let scale = detection.scale;

        let mut stats = ExtractionStats {
            scale,
            rows_scanned: 0,
            fields_set: 0,
            termination: Termination::Exhausted,
        };

        let rows = detection.consumed.into_iter().map(Ok).chain(&mut tokenizer);
        for row in rows {
            let row = row?;
            stats.rows_scanned += 1;
            if !self.apply_row(record, &row, &scale) {
                continue;
            }
            stats.fields_set += 1;
            if self.config.stop_when_complete && record.is_complete() {
                stats.termination = Termination::Complete;
                break;
            }
        }

        log::debug!(
            "{} extraction {:?} after {} row(s), {} field(s) set",
            R::KIND,
            stats.termination,
            stats.rows_scanned,
            stats.fields_set
        );

        record.finalize()?;
        Ok(stats)
    }

    /// Classifies `row` and offers its value cells to the record, left to
    /// right, until one is accepted. Returns whether a field was set.
    fn apply_row<R: FinancialRecord>(&self, record: &mut R, row: &TableRow, scale: &ScaleContext) -> bool {
        let Some(label) = row.label() else {
            return false;
        };
        let field = self.keywords.classify(label);
        if !field.is_known() {
            return false;
        }

        for value in row.values() {
            match record.set_field(field, value, scale) {
                Ok(set) => {
                    log::trace!("{} <- {:?} ('{}'): set={}", field, value, label, set);
                    return set;
                }
                Err(ExtractError::InvalidNumber(raw)) => {
                    log::trace!("Ignoring non-numeric cell {:?} for {}", raw, field);
                }
                Err(e) => {
                    log::trace!("Skipping row '{}': {}", label, e);
                    return false;
                }
            }
        }
        false
    }
}

/// Extracts `R` with the default keyword table and configuration.
pub fn extract<R, S>(source: S) -> Result<R>
where
    R: FinancialRecord,
    S: BufRead,
{
    Extractor::default().extract(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edgar::fields::FieldType;
    use crate::edgar::records::{CfData, OpsData};

    fn table(rows: &[&[&str]]) -> String {
        let mut html = String::from("<table>");
        for row in rows {
            html.push_str("<tr>");
            for cell in row.iter() {
                html.push_str(&format!("<td>{}</td>", cell));
            }
            html.push_str("</tr>");
        }
        html.push_str("</table>");
        html
    }

    #[test]
    fn test_value_cells_tried_left_to_right() {
        let html = table(&[
            &["Net cash provided by operating activities", "$", "", "1,200", "1,100"],
            &["Capital expenditures", "(300)", "(250)"],
        ]);
        let cf: CfData = extract(html.as_bytes()).unwrap();
        assert_eq!(cf.operating_cash_flow, 1200);
        assert_eq!(cf.capital_expenditure, -300);
    }

    #[test]
    fn test_rows_for_other_statements_are_ignored() {
        let html = table(&[
            &["Net income", "90"],
            &["Net cash provided by operating activities", "500"],
            &["Total revenues", "1,000"],
            &["Purchases of property and equipment", "(40)"],
        ]);
        let cf: CfData = extract(html.as_bytes()).unwrap();
        assert_eq!(cf, CfData { operating_cash_flow: 500, capital_expenditure: -40 });
    }

    #[test]
    fn test_adjustment_rows_naming_fixed_assets_leave_capex_alone() {
        let html = format!(
            "<p>$ in Thousands</p>{}",
            table(&[
                &["Depreciation of property and equipment", "120"],
                &["Loss on disposal of property and equipment", "4"],
                &["Net cash provided by operating activities", "900"],
                &["Purchases of property and equipment", "(300)"],
            ])
        );
        let cf: CfData = extract(html.as_bytes()).unwrap();
        assert_eq!(cf.capital_expenditure, -300_000);
        assert_eq!(cf.operating_cash_flow, 900_000);
    }

    #[test]
    fn test_cost_of_net_revenue_row_fills_cost() {
        let html = table(&[
            &["Net revenues", "500"],
            &["Cost of net revenues", "200"],
            &["Total operating expenses", "100"],
            &["Operating income", "200"],
            &["Net income", "150"],
        ]);
        let ops: OpsData = extract(html.as_bytes()).unwrap();
        assert_eq!(ops.revenue, 500);
        assert_eq!(ops.cost_of_revenue, 200);
        assert_eq!(ops.gross_margin, 300);
    }

    #[test]
    fn test_rows_without_end_tags_are_all_read() {
        let html = "<table>\
            <tr><td>Total revenues<td>1,000\
            <tr><td>Cost of revenue<td>600\
            <tr><td>Total operating expenses<td>150\
            <tr><td>Operating income<td>250\
            <tr><td>Net income<td>200\
            </table>";
        let ops: OpsData = extract(html.as_bytes()).unwrap();
        assert_eq!(
            ops,
            OpsData {
                revenue: 1000,
                cost_of_revenue: 600,
                gross_margin: 400,
                operating_income: 250,
                operating_expense: 150,
                net_income: 200,
            }
        );
    }

    #[test]
    fn test_label_only_rows_contribute_nothing() {
        let html = table(&[
            &["Net cash provided by operating activities"],
            &["Net cash provided by operating activities", "", ""],
            &["Net cash provided by operating activities", "75"],
            &["Capital expenditures", "5"],
        ]);
        let cf: CfData = extract(html.as_bytes()).unwrap();
        assert_eq!(cf.operating_cash_flow, 75);
    }

    #[test]
    fn test_early_stop_can_be_disabled() {
        let html = table(&[
            &["Net cash provided by operating activities", "10"],
            &["Capital expenditures", "5"],
            &["Unrelated", "1"],
            &["Unrelated", "2"],
        ]);
        let eager = Extractor::default();
        let mut cf = CfData::default();
        let stats = eager.run(&mut cf, html.as_bytes()).unwrap();
        assert!(stats.completed_early());
        assert_eq!(stats.rows_scanned, 2);

        let exhaustive = Extractor::with_config(ExtractorConfig {
            stop_when_complete: false,
            ..Default::default()
        });
        let mut cf = CfData::default();
        let stats = exhaustive.run(&mut cf, html.as_bytes()).unwrap();
        assert_eq!(stats.termination, Termination::Exhausted);
        assert_eq!(stats.rows_scanned, 4);
        assert_eq!(stats.fields_set, 2);
    }

    #[test]
    fn test_custom_keyword_table() {
        let keywords = KeywordTable::new([
            (FieldType::Revenue, "turnover"),
            (FieldType::CostOfRevenue, "cost of turnover"),
        ]);
        let extractor = Extractor::new(&keywords, ExtractorConfig::default());
        let html = table(&[&["Turnover", "100"], &["Cost of turnover", "40"]]);
        let mut ops = OpsData::default();
        let err = extractor.run(&mut ops, html.as_bytes()).unwrap_err();
        // "turnover" sits first, so the cost row lands on revenue and is ignored
        assert_eq!(ops.revenue, 100);
        assert_eq!(ops.cost_of_revenue, 0);
        assert!(err.missing_fields().unwrap().contains(&"cost_of_revenue".to_string()));
    }
}
