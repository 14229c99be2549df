pub mod analyzer;
pub mod types;

pub use analyzer::FraudAnalyzer;
