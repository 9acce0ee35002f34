use crate::edgar::fields::FieldType;
use crate::edgar::report::StatementKind;

/// Failure modes of a single statement extraction.
///
/// `InvalidNumber` and `FieldNotApplicable` are recovered row by row inside
/// the extraction loop and only surface when the populator or normalizer is
/// called directly. `MissingFields` and `Stream` are terminal.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("could not parse a number from {0:?}")]
    InvalidNumber(String),

    #[error("{field} has no slot in {kind} records")]
    FieldNotApplicable { field: FieldType, kind: StatementKind },

    #[error("[{}] attributes did not parse", .0.join(", "))]
    MissingFields(Vec<String>),

    /// Transport failures of the underlying reader arrive here as
    /// `quick_xml::Error::Io`.
    #[error("markup stream failed: {0}")]
    Stream(#[from] quick_xml::Error),
}

impl ExtractError {
    /// True for the per-row conditions the extraction loop skips over.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExtractError::InvalidNumber(_) | ExtractError::FieldNotApplicable { .. }
        )
    }

    pub fn missing_fields(&self) -> Option<&[String]> {
        match self {
            ExtractError::MissingFields(names) => Some(names),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
