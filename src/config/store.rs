use crate::config::resolver::{override_variable, resolve_env_vars};
use crate::{HarnessError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where and how configuration is loaded.
#[derive(Debug, Clone)]
pub struct ConfigOptions {
    /// Directory holding `config-<env>.toml` files
    pub config_dir: PathBuf,

    /// Selected environment name
    pub environment: String,

    /// Explicit overrides, highest priority
    pub overrides: HashMap<String, String>,

    /// Consult `APICHECK_<KEY>` process variables on every lookup
    pub process_overrides: bool,
}

impl ConfigOptions {
    pub const DEFAULT_ENVIRONMENT: &'static str = "qa";
    pub const DEFAULT_DIR: &'static str = "config";

    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            environment: Self::DEFAULT_ENVIRONMENT.to_string(),
            overrides: HashMap::new(),
            process_overrides: false,
        }
    }

    /// Options for the process-wide store.
    ///
    /// - `APICHECK_CONFIG_DIR` selects the directory (default `config`)
    /// - `APICHECK_ENV` selects the environment (default `qa`)
    pub fn from_env() -> Self {
        let dir = std::env::var("APICHECK_CONFIG_DIR").unwrap_or_else(|_| Self::DEFAULT_DIR.into());
        let environment = std::env::var("APICHECK_ENV")
            .ok()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_ENVIRONMENT.to_string());

        Self::new(dir)
            .environment(environment)
            .process_overrides(true)
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    pub fn process_overrides(mut self, enabled: bool) -> Self {
        self.process_overrides = enabled;
        self
    }

    fn file_for(&self, environment: &str) -> PathBuf {
        self.config_dir.join(format!("config-{}.toml", environment))
    }
}

/// Immutable, environment-specific settings.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    environment: String,
    source: Option<PathBuf>,
    properties: HashMap<String, String>,
    overrides: HashMap<String, String>,
    process_overrides: bool,
}

impl ConfigStore {
    /// Load the environment's file, falling back to the default environment's file.
    ///
    /// A missing file is not an error: every lookup then resolves to absent.
    /// A file that exists but cannot be read or parsed is.
    pub fn load(options: ConfigOptions) -> Result<Self> {
        let file = options.file_for(&options.environment);
        info!(
            environment = %options.environment,
            file = %file.display(),
            "Loading API config"
        );

        let source = if file.is_file() {
            Some(file)
        } else {
            let fallback = options.file_for(ConfigOptions::DEFAULT_ENVIRONMENT);
            warn!(
                "Config file '{}' not found, trying '{}'",
                file.display(),
                fallback.display()
            );
            if fallback.is_file() {
                Some(fallback)
            } else {
                warn!("No config file found; all settings resolve to absent");
                None
            }
        };

        let properties = match &source {
            Some(path) => Self::read_properties(path)?,
            None => HashMap::new(),
        };

        let store = Self {
            environment: options.environment,
            source,
            properties,
            overrides: options.overrides,
            process_overrides: options.process_overrides,
        };

        info!(
            base_url = store.get("api.base.url").as_deref().unwrap_or("<unset>"),
            "Config loaded"
        );
        Ok(store)
    }

    /// Build a store directly from key/value pairs.
    pub fn from_properties<I, K, V>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            environment: ConfigOptions::DEFAULT_ENVIRONMENT.to_string(),
            source: None,
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            overrides: HashMap::new(),
            process_overrides: false,
        }
    }

    fn read_properties(path: &Path) -> Result<HashMap<String, String>> {
        let content = fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(format!("Could not load config {}: {}", path.display(), e))
        })?;

        let table: toml::Table = toml::from_str(&content)?;
        let mut properties = HashMap::new();
        flatten("", &table, &mut properties);
        Ok(properties)
    }

    /// Look up a setting: explicit overrides, then process overrides, then the file.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.overrides.get(key) {
            return Some(value.clone());
        }

        if self.process_overrides
            && let Ok(value) = std::env::var(override_variable(key))
        {
            return Some(value);
        }

        self.properties.get(key).cloned()
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Look up a setting that must be present.
    pub fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .ok_or_else(|| HarnessError::MissingSetting(key.to_string()))
    }

    /// Environment that was requested (even when a fallback file was loaded).
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// File the properties were read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Nested tables become dotted keys: `[api.base] url = ".."` is `api.base.url`.
fn flatten(prefix: &str, table: &toml::Table, out: &mut HashMap<String, String>) {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            toml::Value::Table(inner) => flatten(&full_key, inner, out),
            toml::Value::String(s) => {
                out.insert(full_key, resolve_env_vars(s));
            }
            other => {
                out.insert(full_key, other.to_string());
            }
        }
    }
}
