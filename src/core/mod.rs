pub mod config;

pub use config::ExtractorConfig;
