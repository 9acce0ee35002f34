//! Statement record shapes and the static tables that bind classifier output
//! to record attributes.
//!
//! Every record type lists its attributes once, in a `FieldSlot` table:
//! which `FieldType` feeds it, whether it must end up non-zero, and an
//! optional rule that derives it from sibling attributes. Population and
//! validation are written once against that table.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::fields::FieldType;
use super::parsing::number::normalize;
use super::parsing::scale::ScaleContext;
use super::report::StatementKind;
use crate::error::{ExtractError, Result};

pub type Getter<R> = fn(&R) -> i64;
pub type Setter<R> = fn(&mut R, i64);
pub type Derivation<R> = fn(&R) -> i64;

/// One attribute of a record shape.
pub struct FieldSlot<R> {
    pub field: FieldType,
    pub name: &'static str,
    pub required: bool,
    pub get: Getter<R>,
    pub set: Setter<R>,
    pub derive: Option<Derivation<R>>,
}

impl<R> FieldSlot<R> {
    /// Value currently held, falling back to the derivation rule when the
    /// attribute is unset. Never writes.
    fn effective_value(&self, record: &R) -> i64 {
        match ((self.get)(record), self.derive) {
            (0, Some(derive)) => derive(record),
            (value, _) => value,
        }
    }
}

pub trait FinancialRecord: Default + Debug + Clone + Serialize + Send + 'static {
    const KIND: StatementKind;

    fn slots() -> &'static [FieldSlot<Self>];

    fn slot(field: FieldType) -> Option<&'static FieldSlot<Self>> {
        Self::slots().iter().find(|slot| slot.field == field)
    }

    /// Stores `raw` in the attribute bound to `field` unless that attribute
    /// already holds a value. Returns whether the record changed.
    ///
    /// The first matching row wins: a later row for the same field, such as
    /// a restated comparative line, never overwrites it.
    fn set_field(&mut self, field: FieldType, raw: &str, scale: &ScaleContext) -> Result<bool> {
        let slot = Self::slot(field).ok_or(ExtractError::FieldNotApplicable {
            field,
            kind: Self::KIND,
        })?;
        if (slot.get)(self) != 0 {
            return Ok(false);
        }
        let value = normalize(raw, scale.for_field(field))?;
        (slot.set)(self, value);
        Ok(value != 0)
    }

    /// True once every required attribute is non-zero or derivable to a
    /// non-zero value.
    fn is_complete(&self) -> bool {
        Self::slots()
            .iter()
            .filter(|slot| slot.required)
            .all(|slot| slot.effective_value(self) != 0)
    }

    /// Applies derivation rules to unset required attributes and reports
    /// every required attribute still at zero.
    fn finalize(&mut self) -> Result<()> {
        let mut missing = Vec::new();
        for slot in Self::slots().iter().filter(|slot| slot.required) {
            if (slot.get)(self) != 0 {
                continue;
            }
            match slot.derive.map(|derive| derive(self)) {
                Some(derived) if derived != 0 => (slot.set)(self, derived),
                _ => missing.push(slot.name.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ExtractError::MissingFields(missing))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityData {
    #[serde(rename = "Shares Outstanding")]
    pub share_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpsData {
    #[serde(rename = "Revenue")]
    pub revenue: i64,
    #[serde(rename = "Cost Of Revenue")]
    pub cost_of_revenue: i64,
    #[serde(rename = "Gross Margin")]
    pub gross_margin: i64,
    #[serde(rename = "Operational Income")]
    pub operating_income: i64,
    #[serde(rename = "Operational Expense")]
    pub operating_expense: i64,
    #[serde(rename = "Net Income")]
    pub net_income: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfData {
    #[serde(rename = "Operating Cash Flow")]
    pub operating_cash_flow: i64,
    #[serde(rename = "Capital Expenditure")]
    pub capital_expenditure: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BsData {
    #[serde(rename = "Long-Term debt")]
    pub long_term_debt: i64,
    #[serde(rename = "Short-Term debt")]
    pub short_term_debt: i64,
    #[serde(rename = "Current Liabilities")]
    pub current_liabilities: i64,
    #[serde(rename = "Deferred revenue")]
    pub deferred_revenue: i64,
    #[serde(rename = "Retained Earnings")]
    pub retained_earnings: i64,
}

fn gross_margin(ops: &OpsData) -> i64 {
    ops.revenue.saturating_sub(ops.cost_of_revenue)
}

static ENTITY_SLOTS: [FieldSlot<EntityData>; 1] = [FieldSlot {
    field: FieldType::SharesOutstanding,
    name: "share_count",
    required: true,
    get: |r: &EntityData| r.share_count,
    set: |r: &mut EntityData, v| r.share_count = v,
    derive: None,
}];

static OPS_SLOTS: [FieldSlot<OpsData>; 6] = [
    FieldSlot {
        field: FieldType::Revenue,
        name: "revenue",
        required: true,
        get: |r: &OpsData| r.revenue,
        set: |r: &mut OpsData, v| r.revenue = v,
        derive: None,
    },
    FieldSlot {
        field: FieldType::CostOfRevenue,
        name: "cost_of_revenue",
        required: true,
        get: |r: &OpsData| r.cost_of_revenue,
        set: |r: &mut OpsData, v| r.cost_of_revenue = v,
        derive: None,
    },
    FieldSlot {
        field: FieldType::GrossMargin,
        name: "gross_margin",
        required: true,
        get: |r: &OpsData| r.gross_margin,
        set: |r: &mut OpsData, v| r.gross_margin = v,
        derive: Some(gross_margin),
    },
    FieldSlot {
        field: FieldType::OperatingIncome,
        name: "operating_income",
        required: true,
        get: |r: &OpsData| r.operating_income,
        set: |r: &mut OpsData, v| r.operating_income = v,
        derive: None,
    },
    FieldSlot {
        field: FieldType::OperatingExpense,
        name: "operating_expense",
        required: true,
        get: |r: &OpsData| r.operating_expense,
        set: |r: &mut OpsData, v| r.operating_expense = v,
        derive: None,
    },
    FieldSlot {
        field: FieldType::NetIncome,
        name: "net_income",
        required: true,
        get: |r: &OpsData| r.net_income,
        set: |r: &mut OpsData, v| r.net_income = v,
        derive: None,
    },
];

static CF_SLOTS: [FieldSlot<CfData>; 2] = [
    FieldSlot {
        field: FieldType::OperatingCashFlow,
        name: "operating_cash_flow",
        required: true,
        get: |r: &CfData| r.operating_cash_flow,
        set: |r: &mut CfData, v| r.operating_cash_flow = v,
        derive: None,
    },
    FieldSlot {
        field: FieldType::CapitalExpenditure,
        name: "capital_expenditure",
        required: true,
        get: |r: &CfData| r.capital_expenditure,
        set: |r: &mut CfData, v| r.capital_expenditure = v,
        derive: None,
    },
];

static BS_SLOTS: [FieldSlot<BsData>; 5] = [
    FieldSlot {
        field: FieldType::LongTermDebt,
        name: "long_term_debt",
        required: true,
        get: |r: &BsData| r.long_term_debt,
        set: |r: &mut BsData, v| r.long_term_debt = v,
        derive: None,
    },
    FieldSlot {
        field: FieldType::ShortTermDebt,
        name: "short_term_debt",
        required: true,
        get: |r: &BsData| r.short_term_debt,
        set: |r: &mut BsData, v| r.short_term_debt = v,
        derive: None,
    },
    FieldSlot {
        field: FieldType::CurrentLiabilities,
        name: "current_liabilities",
        required: true,
        get: |r: &BsData| r.current_liabilities,
        set: |r: &mut BsData, v| r.current_liabilities = v,
        derive: None,
    },
    FieldSlot {
        field: FieldType::DeferredRevenue,
        name: "deferred_revenue",
        required: false,
        get: |r: &BsData| r.deferred_revenue,
        set: |r: &mut BsData, v| r.deferred_revenue = v,
        derive: None,
    },
    FieldSlot {
        field: FieldType::RetainedEarnings,
        name: "retained_earnings",
        required: true,
        get: |r: &BsData| r.retained_earnings,
        set: |r: &mut BsData, v| r.retained_earnings = v,
        derive: None,
    },
];

impl FinancialRecord for EntityData {
    const KIND: StatementKind = StatementKind::Entity;

    fn slots() -> &'static [FieldSlot<Self>] {
        &ENTITY_SLOTS
    }
}

impl FinancialRecord for OpsData {
    const KIND: StatementKind = StatementKind::Operations;

    fn slots() -> &'static [FieldSlot<Self>] {
        &OPS_SLOTS
    }
}

impl FinancialRecord for CfData {
    const KIND: StatementKind = StatementKind::CashFlow;

    fn slots() -> &'static [FieldSlot<Self>] {
        &CF_SLOTS
    }
}

impl FinancialRecord for BsData {
    const KIND: StatementKind = StatementKind::BalanceSheet;

    fn slots() -> &'static [FieldSlot<Self>] {
        &BS_SLOTS
    }
}
