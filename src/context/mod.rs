//! Scenario context: the per-scenario value store threaded through every step.

pub mod current;
mod placeholder;
pub mod store;

pub use placeholder::substitute;
pub use store::ScenarioContext;
