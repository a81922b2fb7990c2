//! Step library for an external BDD engine.
//!
//! Steps read and write the scenario context of the calling thread, so a scenario's
//! steps and hooks must all run on one thread.

mod api;
mod database;
mod hooks;
mod pending;

pub use api::ApiSteps;
pub use database::DatabaseSteps;
pub use hooks::{DB_TAG, ScenarioHooks, ScenarioInfo};
pub use pending::PendingRequest;
