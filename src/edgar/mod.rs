pub mod extract;
pub mod fields;
pub mod filing;
pub mod keywords;
pub mod parsing;
pub mod records;
pub mod report;

pub use extract::{extract, ExtractionStats, Extractor, Termination};
pub use fields::FieldType;
pub use filing::{collect_report, Company, DocumentSource, Filing, FinancialReport, StatementFailure};
pub use keywords::{classify, KeywordTable, KEYWORD_TABLE};
pub use records::{BsData, CfData, EntityData, FinancialRecord, OpsData};
pub use report::{FilingType, StatementKind};
