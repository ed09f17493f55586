//! Action Execution

pub mod executor;

pub use executor::{ActionExecutor, ExecutionLimits, ExecutionReport};
