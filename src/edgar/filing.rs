use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;

use super::extract::Extractor;
use super::records::{BsData, CfData, EntityData, FinancialRecord, OpsData};
use super::report::{FilingType, StatementKind};
use crate::error::ExtractError;

/// Supplies the markup of one statement page. Implemented by whatever
/// fetches or caches filings; the extraction core never does I/O itself.
pub trait DocumentSource {
    fn open(&self, filing_id: &str, kind: StatementKind) -> Result<Box<dyn BufRead + '_>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialReport {
    #[serde(rename = "Filing Type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<FilingType>,
    #[serde(rename = "Entity Information", skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityData>,
    #[serde(rename = "Operational Information", skip_serializing_if = "Option::is_none")]
    pub ops: Option<OpsData>,
    #[serde(rename = "Balance Sheet Information", skip_serializing_if = "Option::is_none")]
    pub bs: Option<BsData>,
    #[serde(rename = "Cash Flow Information", skip_serializing_if = "Option::is_none")]
    pub cf: Option<CfData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filing {
    #[serde(rename = "Report date")]
    pub date: String,
    #[serde(rename = "Financial Data")]
    pub fin_data: FinancialReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    #[serde(rename = "Company")]
    pub ticker: String,
    #[serde(rename = "Financial Reports")]
    pub reports: Vec<Filing>,
}

macro_rules! json_display {
    ($($ty:ty),+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    let json = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
                    f.write_str(&json)
                }
            }
        )+
    };
}

json_display!(Company, Filing, FinancialReport, EntityData, OpsData, BsData, CfData);

impl FinancialReport {
    pub fn new(doc_type: FilingType) -> Self {
        Self {
            doc_type: Some(doc_type),
            ..Default::default()
        }
    }
}

/// A statement that could not be extracted while assembling a report.
#[derive(Debug)]
pub struct StatementFailure {
    pub kind: StatementKind,
    pub error: ExtractError,
}

fn extract_into<R, S>(extractor: &Extractor<'_>, slot: &mut Option<R>, source: S) -> std::result::Result<(), ExtractError>
where
    R: FinancialRecord,
    S: BufRead,
{
    *slot = Some(extractor.extract(source)?);
    Ok(())
}

/// Runs the pipeline once per requested statement kind and gathers the
/// results into one report.
///
/// Retrieval failures abort the whole report. Extraction failures are
/// returned next to the report and leave that statement empty.
pub fn collect_report<D: DocumentSource + ?Sized>(
    extractor: &Extractor<'_>,
    source: &D,
    filing_id: &str,
    doc_type: FilingType,
    kinds: &[StatementKind],
) -> Result<(FinancialReport, Vec<StatementFailure>)> {
    let mut report = FinancialReport::new(doc_type);
    let mut failures = Vec::new();

    for &kind in kinds {
        let document = source
            .open(filing_id, kind)
            .with_context(|| format!("Failed to open {} statement of {}", kind, filing_id))?;

        let outcome = match kind {
            StatementKind::Entity => extract_into(extractor, &mut report.entity, document),
            StatementKind::Operations => extract_into(extractor, &mut report.ops, document),
            StatementKind::BalanceSheet => extract_into(extractor, &mut report.bs, document),
            StatementKind::CashFlow => extract_into(extractor, &mut report.cf, document),
        };

        match outcome {
            Ok(()) => info!("Extracted {} statement of {}", kind, filing_id),
            Err(error) => {
                warn!("Could not extract {} statement of {}: {}", kind, filing_id, error);
                failures.push(StatementFailure { kind, error });
            }
        }
    }

    Ok((report, failures))
}
