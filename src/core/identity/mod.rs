pub mod biometric;
pub mod similarity;
pub mod types;
