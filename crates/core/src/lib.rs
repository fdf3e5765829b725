pub mod campaign;
pub mod error;
pub mod generation;
pub mod parse;
pub mod retry;
pub mod sanitize;
pub mod status;
pub mod strategy;
pub mod types;
