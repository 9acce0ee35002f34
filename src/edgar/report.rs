use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use strum::{EnumIter, IntoEnumIterator};

/// Periodic filing form a statement page was rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(try_from = "String", into = "String")]
pub enum FilingType {
    Form10K,
    Form10Q,
    Form20F,
    Other(String),
}

impl TryFrom<String> for FilingType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        FilingType::from_str(&s)
    }
}

impl From<FilingType> for String {
    fn from(t: FilingType) -> Self {
        t.to_string()
    }
}

impl fmt::Display for FilingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilingType::Form10K => write!(f, "10-K"),
            FilingType::Form10Q => write!(f, "10-Q"),
            FilingType::Form20F => write!(f, "20-F"),
            FilingType::Other(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for FilingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "10-K" | "10K" => Ok(FilingType::Form10K),
            "10-Q" | "10Q" => Ok(FilingType::Form10Q),
            "20-F" | "20F" => Ok(FilingType::Form20F),
            "" => Err("filing type cannot be empty".to_string()),
            _ => Ok(FilingType::Other(s.trim().to_string())),
        }
    }
}

/// Statement shape requested from a single extraction call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter)]
pub enum StatementKind {
    Entity,
    Operations,
    BalanceSheet,
    CashFlow,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Entity => write!(f, "entity"),
            StatementKind::Operations => write!(f, "operations"),
            StatementKind::BalanceSheet => write!(f, "balance sheet"),
            StatementKind::CashFlow => write!(f, "cash flow"),
        }
    }
}

impl FromStr for StatementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "entity" | "entity information" | "cover" => Ok(StatementKind::Entity),
            "operations" | "ops" | "income statement" => Ok(StatementKind::Operations),
            "balance sheet" | "bs" => Ok(StatementKind::BalanceSheet),
            "cash flow" | "cash flows" | "cf" => Ok(StatementKind::CashFlow),
            other => Err(format!(
                "unknown statement kind '{}', expected one of: {}",
                other,
                StatementKind::list_kinds()
            )),
        }
    }
}

static STATEMENT_KINDS: Lazy<String> = Lazy::new(|| {
    StatementKind::iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
});

impl StatementKind {
    pub fn list_kinds() -> &'static str {
        &STATEMENT_KINDS
    }
}
