//! Diagnostic record of a run: attachments captured per scenario and an optional
//! JSON-lines log of finished scenarios for an external reporter to pick up.

pub mod model;
mod recorder;
pub mod storage;

pub use model::{Attachment, ScenarioRecord};
pub use recorder::{attach, discard, pending, take};
pub use storage::ScenarioLog;
