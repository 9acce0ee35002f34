use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

/// Canonical financial line items recognised by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum FieldType {
    SharesOutstanding,
    Revenue,
    CostOfRevenue,
    GrossMargin,
    OperatingIncome,
    OperatingExpense,
    NetIncome,
    OperatingCashFlow,
    CapitalExpenditure,
    LongTermDebt,
    ShortTermDebt,
    CurrentLiabilities,
    DeferredRevenue,
    RetainedEarnings,
    Unknown,
}

impl FieldType {
    /// Name used for this field in serialized reports.
    pub fn canonical_name(self) -> &'static str {
        match self {
            FieldType::SharesOutstanding => "Shares Outstanding",
            FieldType::Revenue => "Revenue",
            FieldType::CostOfRevenue => "Cost Of Revenue",
            FieldType::GrossMargin => "Gross Margin",
            FieldType::OperatingIncome => "Operational Income",
            FieldType::OperatingExpense => "Operational Expense",
            FieldType::NetIncome => "Net Income",
            FieldType::OperatingCashFlow => "Operating Cash Flow",
            FieldType::CapitalExpenditure => "Capital Expenditure",
            FieldType::LongTermDebt => "Long-Term debt",
            FieldType::ShortTermDebt => "Short-Term debt",
            FieldType::CurrentLiabilities => "Current Liabilities",
            FieldType::DeferredRevenue => "Deferred revenue",
            FieldType::RetainedEarnings => "Retained Earnings",
            FieldType::Unknown => "Unknown",
        }
    }

    pub fn is_known(self) -> bool {
        self != FieldType::Unknown
    }

    /// Share counts take the share multiplier; everything else is money.
    pub fn is_share_count(self) -> bool {
        self == FieldType::SharesOutstanding
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}
