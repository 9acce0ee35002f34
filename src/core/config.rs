use anyhow::{anyhow, Result};

pub const SCALE_SCAN_ROWS_VAR: &str = "STATEMENT_SCALE_SCAN_ROWS";
pub const STOP_WHEN_COMPLETE_VAR: &str = "STATEMENT_STOP_WHEN_COMPLETE";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Leading rows inspected for a unit disclosure. Text before the first
    /// row is inspected even when this is 0.
    pub scale_scan_rows: usize,
    /// Stop reading as soon as every required attribute is satisfied.
    pub stop_when_complete: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            scale_scan_rows: 3,
            stop_when_complete: true,
        }
    }
}

impl ExtractorConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let scale_scan_rows = match lookup(SCALE_SCAN_ROWS_VAR) {
            Some(value) => value.trim().parse::<usize>().map_err(|e| {
                anyhow!("{} must be a non-negative integer, got '{}': {}", SCALE_SCAN_ROWS_VAR, value, e)
            })?,
            None => defaults.scale_scan_rows,
        };

        let stop_when_complete = match lookup(STOP_WHEN_COMPLETE_VAR) {
            Some(value) => parse_flag(&value)
                .ok_or_else(|| anyhow!("{} must be true or false, got '{}'", STOP_WHEN_COMPLETE_VAR, value))?,
            None => defaults.stop_when_complete,
        };

        Ok(Self {
            scale_scan_rows,
            stop_when_complete,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
