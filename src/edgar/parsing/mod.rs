pub mod number;
pub mod rows;
pub mod scale;

#[cfg(test)]
pub(crate) mod tests;

pub use number::normalize;
pub use rows::{RowTokenizer, TableRow};
pub use scale::{detect_scale, ScaleContext, ScaleDetection};
