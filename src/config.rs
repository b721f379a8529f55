use crate::constants::{
    DEFAULT_BLOB_PREFIX, DEFAULT_CONNECTION_STRING_ENV, DEFAULT_CONTAINER, DEFAULT_FS_ROOT,
    DEFAULT_IMAGE_PREFIX, DEFAULT_LOG_DIR, DEFAULT_SOURCE_URL, DEFAULT_TABLE_CLASSES,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::error::{EtlError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_seconds: u64,
    pub table_classes: Vec<String>,
    pub image_prefix: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            table_classes: DEFAULT_TABLE_CLASSES.iter().map(|c| c.to_string()).collect(),
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Azure,
    Filesystem,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub container: String,
    pub prefix: String,
    /// Root directory for the filesystem backend.
    pub root: PathBuf,
    /// Name of the environment variable holding the connection string.
    pub connection_string_env: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Filesystem,
            container: DEFAULT_CONTAINER.to_string(),
            prefix: DEFAULT_BLOB_PREFIX.to_string(),
            root: PathBuf::from(DEFAULT_FS_ROOT),
            connection_string_env: DEFAULT_CONNECTION_STRING_ENV.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl Config {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.source.table_classes.is_empty() {
            return Err(EtlError::Config("source.table_classes must not be empty".into()));
        }
        // Each entry becomes one `.class` of a compound selector
        if let Some(bad) = self.source.table_classes.iter().find(|c| !is_class_name(c)) {
            return Err(EtlError::Config(format!(
                "source.table_classes entry {:?} is not a single CSS class name",
                bad
            )));
        }
        if self.source.timeout_seconds == 0 {
            return Err(EtlError::Config("source.timeout_seconds must be positive".into()));
        }
        if self.storage.container.trim().is_empty() {
            return Err(EtlError::Config("storage.container must not be empty".into()));
        }
        Ok(())
    }
}

fn is_class_name(class: &str) -> bool {
    let mut chars = class.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '-' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.source.timeout_seconds, 10);
        assert_eq!(config.source.table_classes, vec!["sortable", "sticky-header"]);
        assert_eq!(config.storage.backend, StorageBackend::Filesystem);
        assert_eq!(config.storage.container, "dateng");
        assert_eq!(config.storage.prefix, "data");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = Config::from_toml(
            r#"
            [source]
            url = "https://example.org/wiki/Stadiums"

            [storage]
            backend = "azure"
            container = "stadiums"
            "#,
        )
        .unwrap();
        assert_eq!(config.source.url, "https://example.org/wiki/Stadiums");
        assert_eq!(config.source.image_prefix, "https://");
        assert_eq!(config.storage.backend, StorageBackend::Azure);
        assert_eq!(config.storage.container, "stadiums");
        assert_eq!(config.storage.connection_string_env, "STADIUM_ETL_STORAGE_CONNECTION_STRING");
    }

    #[test]
    fn rejects_empty_table_classes() {
        let err = Config::from_toml("[source]\ntable_classes = []\n").unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
    }

    #[test]
    fn rejects_class_entries_that_are_not_single_names() {
        for entry in ["wikitable sortable", "sortable.sticky-header", "a>b", "", "1st"] {
            let doc = format!("[source]\ntable_classes = [\"sortable\", {:?}]\n", entry);
            let err = Config::from_toml(&doc).unwrap_err();
            assert!(matches!(err, EtlError::Config(_)), "entry {entry:?}");
        }
        assert!(Config::from_toml("[source]\ntable_classes = [\"wikitable\", \"sticky-header\", \"_x\"]\n").is_ok());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.logging.dir, PathBuf::from("logs"));
    }
}
