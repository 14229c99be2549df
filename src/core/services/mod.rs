pub mod attendance;
pub mod duplicate;
pub mod verification;
