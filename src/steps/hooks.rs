use tracing::info;

use crate::Result;
use crate::config::ConfigStore;
use crate::context::current;
use crate::db::DatabaseGateway;
use crate::diagnostics::{self, ScenarioLog, ScenarioRecord};

/// The tag that marks a scenario as touching the database.
pub const DB_TAG: &str = "db";

/// Name and tags of a scenario, as reported by the BDD engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScenarioInfo {
    pub name: String,
    pub tags: Vec<String>,
}

impl ScenarioInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Tag lookup that ignores a leading `@` on either side.
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim_start_matches('@');
        self.tags.iter().any(|t| t.trim_start_matches('@') == tag)
    }
}

/// Scenario lifecycle: reset state before, record and release it after.
#[derive(Debug, Clone, Default)]
pub struct ScenarioHooks {
    log: Option<ScenarioLog>,
}

impl ScenarioHooks {
    pub fn new(log: Option<ScenarioLog>) -> Self {
        Self { log }
    }

    /// Hooks that write scenario records when `diagnostics.dir` is configured.
    pub fn from_config(config: &ConfigStore) -> Self {
        Self::new(ScenarioLog::from_config(config))
    }

    pub fn before(&self, scenario: &ScenarioInfo) {
        info!(
            "======== STARTING: {} [Tags: {:?}] ========",
            scenario.name, scenario.tags
        );
        current::clear();
        diagnostics::discard();
    }

    /// Detach the scenario context and write the scenario record.
    ///
    /// The context is released even when writing the record fails.
    pub fn after(&self, scenario: &ScenarioInfo, passed: bool) -> Result<()> {
        let status = if passed { "PASSED" } else { "FAILED" };
        info!(
            "======== FINISHED: {} [Status: {}] ========",
            scenario.name, status
        );

        let attachments = diagnostics::take();
        current::remove();

        if let Some(log) = &self.log {
            let record = ScenarioRecord::new(
                scenario.name.clone(),
                scenario.tags.clone(),
                passed,
                attachments,
            );
            log.append(&record)?;
        }
        Ok(())
    }

    /// Close the shared database connection after a scenario tagged `@db`.
    pub async fn after_db(&self, scenario: &ScenarioInfo, gateway: &DatabaseGateway) {
        if scenario.has_tag(DB_TAG) {
            gateway.close_connection().await;
        }
    }
}
