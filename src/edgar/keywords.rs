use once_cell::sync::Lazy;

use super::fields::FieldType;

/// Ordered (field, keyword) pairs. The first keyword contained in a
/// lower-cased label decides its field, so narrower phrases must sit above
/// any broader phrase they contain or are contained by.
const DEFAULT_KEYWORDS: &[(FieldType, &str)] = &[
    // cost and deferred lines mention revenue or sales too
    (FieldType::CostOfRevenue, "cost of revenue"),
    (FieldType::CostOfRevenue, "cost of net revenue"),
    (FieldType::CostOfRevenue, "cost of sales"),
    (FieldType::CostOfRevenue, "cost of net sales"),
    (FieldType::CostOfRevenue, "cost of goods sold"),
    (FieldType::DeferredRevenue, "deferred revenue"),
    (FieldType::Revenue, "total revenue"),
    (FieldType::Revenue, "net revenue"),
    (FieldType::Revenue, "net sales"),
    (FieldType::Revenue, "total sales"),
    (FieldType::GrossMargin, "gross margin"),
    (FieldType::GrossMargin, "gross profit"),
    (FieldType::SharesOutstanding, "shares outstanding"),
    (FieldType::OperatingExpense, "operating expenses"),
    (FieldType::OperatingIncome, "operating income"),
    (FieldType::OperatingIncome, "operating (loss)"),
    (FieldType::OperatingIncome, "operating loss"),
    (FieldType::OperatingIncome, "income from operations"),
    (FieldType::OperatingIncome, "loss from operations"),
    (FieldType::NetIncome, "net income"),
    (FieldType::NetIncome, "net loss"),
    (FieldType::OperatingCashFlow, "operating activities"),
    // only the investing outflow; depreciation and disposal rows name the same assets
    (FieldType::CapitalExpenditure, "purchases of property"),
    (FieldType::CapitalExpenditure, "purchase of property"),
    (FieldType::CapitalExpenditure, "additions to property"),
    (FieldType::CapitalExpenditure, "capital expen"),
    (FieldType::LongTermDebt, "non-current portion of long-term"),
    (FieldType::ShortTermDebt, "current portion of long-term"),
    (FieldType::ShortTermDebt, "short-term debt"),
    (FieldType::LongTermDebt, "long term debt"),
    (FieldType::LongTermDebt, "long-term debt"),
    (FieldType::CurrentLiabilities, "total current liabilities"),
    (FieldType::RetainedEarnings, "retained earnings"),
    (FieldType::RetainedEarnings, "accumulated deficit"),
];

/// Process-wide default table, built once and only ever read.
pub static KEYWORD_TABLE: Lazy<KeywordTable> =
    Lazy::new(|| KeywordTable::new(DEFAULT_KEYWORDS.iter().copied()));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordEntry {
    pub field: FieldType,
    pub keyword: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    entries: Vec<KeywordEntry>,
}

impl KeywordTable {
    /// Builds a table from entries in priority order. Keywords are stored
    /// lower-cased.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (FieldType, S)>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|(field, keyword)| KeywordEntry {
                field,
                keyword: keyword.as_ref().to_lowercase(),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn classify(&self, label: &str) -> FieldType {
        self.find(label)
            .map(|entry| entry.field)
            .unwrap_or(FieldType::Unknown)
    }

    /// Returns the entry that decided `label`, if any.
    pub fn find(&self, label: &str) -> Option<&KeywordEntry> {
        let label = label.to_lowercase();
        self.entries
            .iter()
            .find(|entry| label.contains(entry.keyword.as_str()))
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        KEYWORD_TABLE.clone()
    }
}

/// Classifies `label` against the default keyword table.
pub fn classify(label: &str) -> FieldType {
    KEYWORD_TABLE.classify(label)
}
