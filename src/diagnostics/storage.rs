use super::model::ScenarioRecord;
use crate::Result;
use crate::config::ConfigStore;
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

const LOG_FILE: &str = "scenarios.jsonl";

/// Append-only JSON-lines log of finished scenarios.
#[derive(Debug, Clone)]
pub struct ScenarioLog {
    file_path: PathBuf,
}

impl ScenarioLog {
    pub const DIR_KEY: &'static str = "diagnostics.dir";

    /// Log inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            file_path: dir.as_ref().join(LOG_FILE),
        }
    }

    pub fn new_with_path(path: PathBuf) -> Self {
        Self { file_path: path }
    }

    /// Log configured by `diagnostics.dir`, if any.
    pub fn from_config(config: &ConfigStore) -> Option<Self> {
        config.get(Self::DIR_KEY).map(Self::in_dir)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.file_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append one record.
    ///
    /// The exclusive lock keeps lines whole when several runner processes share a log.
    pub fn append(&self, record: &ScenarioRecord) -> Result<()> {
        self.ensure_dir()?;
        let json = serde_json::to_string(record)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        file.lock_exclusive()?;
        writeln!(file, "{}", json)?;
        drop(file);

        Ok(())
    }

    /// All records in the order they were written. Unreadable lines are skipped.
    pub fn list(&self) -> Result<Vec<ScenarioRecord>> {
        if !self.file_path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.file_path)?;
        file.lock_shared()?;

        let reader = BufReader::new(file);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(record) = serde_json::from_str::<ScenarioRecord>(&line) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::model::Attachment;
    use tempfile::TempDir;

    fn record(name: &str, passed: bool) -> ScenarioRecord {
        ScenarioRecord::new(
            name,
            vec!["@smoke".to_string()],
            passed,
            vec![Attachment::new("Response Body", "application/json", "{}")],
        )
    }

    #[test]
    fn test_append_and_list() {
        let temp_dir = TempDir::new().unwrap();
        let log = ScenarioLog::in_dir(temp_dir.path().join("results"));

        log.append(&record("create user", true)).unwrap();
        log.append(&record("delete user", false)).unwrap();

        let list = log.list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "create user");
        assert!(list[0].passed);
        assert_eq!(list[1].name, "delete user");
        assert_eq!(list[1].attachments.len(), 1);
    }

    #[test]
    fn test_list_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let log = ScenarioLog::in_dir(temp_dir.path());
        assert!(log.list().unwrap().is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = ConfigStore::from_properties([("diagnostics.dir", "target/results")]);
        let log = ScenarioLog::from_config(&config).unwrap();
        assert_eq!(log.path(), Path::new("target/results/scenarios.jsonl"));

        let empty = ConfigStore::from_properties(Vec::<(String, String)>::new());
        assert!(ScenarioLog::from_config(&empty).is_none());
    }
}
