use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

use super::rows::{RowTokenizer, TableRow};
use crate::edgar::fields::FieldType;
use crate::error::Result;

static UNIT_DISCLOSURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\$\s*|dollars\s+|usd\s+|shares?\s+)?\bin\s+(thousands|millions|billions)\b")
        .expect("unit disclosure pattern is valid")
});

static SHARE_EXCEPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)except\s+(?:for\s+)?(?:per[\s-]+)?share")
        .expect("share exception pattern is valid")
});

/// Unit multipliers in force for one document. Set once before the first
/// field is populated and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleContext {
    pub money: i64,
    pub shares: i64,
}

impl Default for ScaleContext {
    fn default() -> Self {
        Self::uniform(1)
    }
}

impl ScaleContext {
    pub fn uniform(scale: i64) -> Self {
        Self {
            money: scale,
            shares: scale,
        }
    }

    pub fn for_field(&self, field: FieldType) -> i64 {
        if field.is_share_count() {
            self.shares
        } else {
            self.money
        }
    }

    /// Parses a unit disclosure such as `$ in Thousands, shares in Millions`
    /// or `(In millions, except per share data)`. Returns `None` when the
    /// text carries no disclosure.
    pub fn from_disclosure(text: &str) -> Option<Self> {
        let mut money = None;
        let mut shares = None;
        let mut generic = None;

        for caps in UNIT_DISCLOSURE.captures_iter(text) {
            let multiplier = match caps[2].to_lowercase().as_str() {
                "thousands" => 1_000,
                "millions" => 1_000_000,
                _ => 1_000_000_000,
            };
            match caps.get(1).map(|p| p.as_str().trim().to_lowercase()) {
                Some(prefix) if prefix.starts_with("share") => {
                    shares.get_or_insert(multiplier);
                }
                Some(_) => {
                    money.get_or_insert(multiplier);
                }
                None => {
                    generic.get_or_insert(multiplier);
                }
            }
        }

        if money.is_none() && shares.is_none() && generic.is_none() {
            return None;
        }

        let money_scale = money.or(generic).unwrap_or(1);
        // a bare "in millions" covers share counts too unless they are carved out
        let share_scale = match (shares, generic) {
            (Some(s), _) => s,
            (None, Some(g)) if !SHARE_EXCEPTION.is_match(text) => g,
            _ => 1,
        };
        Some(Self {
            money: money_scale,
            shares: share_scale,
        })
    }
}

/// Outcome of scanning the head of a document for its unit disclosure.
#[derive(Debug)]
pub struct ScaleDetection {
    pub scale: ScaleContext,
    pub disclosed: bool,
    /// Rows read while looking; they still need to be classified.
    pub consumed: Vec<TableRow>,
}

/// Looks for a unit disclosure in the text before the first row and then in
/// up to `max_rows` leading rows. Defaults to a scale of 1.
///
/// The preamble is only complete once the first row has arrived, so that row
/// is always read and returned in `consumed`, even when `max_rows` is 0.
pub fn detect_scale<R: BufRead>(
    tokenizer: &mut RowTokenizer<R>,
    max_rows: usize,
) -> Result<ScaleDetection> {
    let mut consumed = Vec::new();

    let first = tokenizer.next_row()?;
    let mut found = ScaleContext::from_disclosure(tokenizer.preamble());
    if let Some(row) = first {
        if found.is_none() && max_rows > 0 {
            found = ScaleContext::from_disclosure(&row.text());
        }
        consumed.push(row);

        while found.is_none() && consumed.len() < max_rows {
            let Some(row) = tokenizer.next_row()? else {
                break;
            };
            found = ScaleContext::from_disclosure(&row.text());
            consumed.push(row);
        }
    }

    if let Some(scale) = found {
        log::debug!(
            "Detected unit disclosure after {} row(s): money x{}, shares x{}",
            consumed.len(),
            scale.money,
            scale.shares
        );
        return Ok(ScaleDetection {
            scale,
            disclosed: true,
            consumed,
        });
    }

    log::debug!("No unit disclosure in the first {} row(s), using x1", consumed.len());
    Ok(ScaleDetection {
        scale: ScaleContext::default(),
        disclosed: false,
        consumed,
    })
}
