use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named artefact captured while a scenario runs (e.g. a response body).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub name: String,
    pub mime: String,
    pub content: String,
    pub recorded_at: DateTime<Utc>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            mime: mime.into(),
            content: content.into(),
            recorded_at: Utc::now(),
        }
    }
}

/// Outcome of one scenario together with everything attached during it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub id: Uuid,
    pub name: String,
    pub tags: Vec<String>,
    pub passed: bool,
    pub finished_at: DateTime<Utc>,
    pub attachments: Vec<Attachment>,
}

impl ScenarioRecord {
    pub fn new(
        name: impl Into<String>,
        tags: Vec<String>,
        passed: bool,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            tags,
            passed,
            finished_at: Utc::now(),
            attachments,
        }
    }
}
