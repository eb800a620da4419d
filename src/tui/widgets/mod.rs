pub mod bank;
pub mod quiz;
pub mod sources;
