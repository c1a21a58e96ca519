//! Pipeline configuration, keyed by filter type.
//!
//! The configuration is a JSON object mapping each filter type to its
//! [`FilterConfig`]:
//!
//! ```json
//! {
//!   "org.openedx.templates.fetch.requested.v1": {
//!     "pipeline": ["fetch_templates"],
//!     "fail_silently": false,
//!     "extra_config": {}
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::ConfigError;

/// Environment variable holding the path of the filters config file.
pub const CONFIG_ENV_VAR: &str = "OPENFILTERS_CONFIG";

/// Step configuration for a single filter type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Step identifiers, run in this order.
    #[serde(default)]
    pub pipeline: Vec<String>,
    /// If true, step execution failures are logged and skipped.
    #[serde(default)]
    pub fail_silently: bool,
    /// Free-form parameters handed to every step of this filter.
    #[serde(default)]
    pub extra_config: Map<String, JsonValue>,
}

impl FilterConfig {
    pub fn new<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pipeline: steps.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn fail_silently(mut self, fail_silently: bool) -> Self {
        self.fail_silently = fail_silently;
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extra_config.insert(key.into(), value.into());
        self
    }
}

/// Supplies the [`FilterConfig`] for a filter type.
///
/// `Ok(None)` means nothing is configured and the filter is a no-op.
pub trait ConfigProvider: Send + Sync {
    fn filter_config(&self, filter_type: &str) -> Result<Option<FilterConfig>, ConfigError>;
}

/// In-memory configuration for every filter type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FiltersConfig {
    filters: HashMap<String, FilterConfig>,
}

impl FiltersConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a filter's pipeline.
    pub fn with_filter(mut self, filter_type: impl Into<String>, config: FilterConfig) -> Self {
        self.filters.insert(filter_type.into(), config);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Load configuration from the file named by `OPENFILTERS_CONFIG`.
    ///
    /// An unset or empty variable yields an empty configuration, so every
    /// filter passes its inputs through unchanged.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::from_file(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn get(&self, filter_type: &str) -> Option<&FilterConfig> {
        self.filters.get(filter_type)
    }

    /// Iterate over `(filter_type, config)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterConfig)> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl ConfigProvider for FiltersConfig {
    fn filter_config(&self, filter_type: &str) -> Result<Option<FilterConfig>, ConfigError> {
        Ok(self.filters.get(filter_type).cloned())
    }
}

/// Reads the config file on every lookup, so edits apply to the next invocation.
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    path: PathBuf,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigProvider for FileConfigProvider {
    fn filter_config(&self, filter_type: &str) -> Result<Option<FilterConfig>, ConfigError> {
        let config = FiltersConfig::from_file(&self.path)?;
        Ok(config.filters.get(filter_type).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use std::sync::Mutex;

    // Tests touching OPENFILTERS_CONFIG must hold this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_parse_defaults() {
        let config = FiltersConfig::from_json_str(
            r#"{"org.example.filter.v1": {"pipeline": ["a", "b"]}}"#,
        )
        .unwrap();

        let filter = config.get("org.example.filter.v1").unwrap();
        assert_eq!(filter.pipeline, vec!["a", "b"]);
        assert!(!filter.fail_silently);
        assert!(filter.extra_config.is_empty());
    }

    #[test]
    fn test_parse_extra_config() {
        let config = FiltersConfig::from_json_str(
            r#"{"f": {"pipeline": [], "fail_silently": true, "extra_config": {"limit": 3}}}"#,
        )
        .unwrap();

        let filter = config.get("f").unwrap();
        assert!(filter.fail_silently);
        assert_eq!(filter.extra_config.get("limit"), Some(&json!(3)));
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = FiltersConfig::from_json_str(r#"{"f": {"pipeline": "not-a-list"}}"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_filter_is_none() {
        let config = FiltersConfig::new().with_filter("a", FilterConfig::new(["x"]));
        assert!(config.filter_config("b").unwrap().is_none());
        assert!(config.filter_config("a").unwrap().is_some());
    }

    #[test]
    fn test_file_provider_rereads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"f": {{"pipeline": ["one"]}}}}"#).unwrap();
        file.flush().unwrap();

        let provider = FileConfigProvider::new(file.path());
        let first = provider.filter_config("f").unwrap().unwrap();
        assert_eq!(first.pipeline, vec!["one"]);

        fs::write(file.path(), r#"{"f": {"pipeline": ["one", "two"]}}"#).unwrap();
        let second = provider.filter_config("f").unwrap().unwrap();
        assert_eq!(second.pipeline, vec!["one", "two"]);
    }

    #[test]
    fn test_file_provider_missing_file() {
        let provider = FileConfigProvider::new("/nonexistent/openfilters.json");
        assert!(matches!(
            provider.filter_config("f"),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_from_env_unset_is_empty() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::remove_var(CONFIG_ENV_VAR);
        assert!(FiltersConfig::from_env().unwrap().is_empty());
    }

    #[test]
    fn test_from_env_empty_value_is_empty() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var(CONFIG_ENV_VAR, "");
        let config = FiltersConfig::from_env();
        env::remove_var(CONFIG_ENV_VAR);
        assert!(config.unwrap().is_empty());
    }

    #[test]
    fn test_from_env_reads_named_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"f": {{"pipeline": ["one"], "fail_silently": true}}}}"#).unwrap();
        file.flush().unwrap();

        env::set_var(CONFIG_ENV_VAR, file.path());
        let config = FiltersConfig::from_env();
        env::remove_var(CONFIG_ENV_VAR);

        let config = config.unwrap();
        assert!(!config.is_empty());
        assert_eq!(
            config.get("f"),
            Some(&FilterConfig::new(["one"]).fail_silently(true))
        );
    }
}
