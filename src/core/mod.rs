pub mod fraud;
pub mod identity;
pub mod interfaces;
pub mod services;
