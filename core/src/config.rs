use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Upper bound for `logic.delay`, in seconds.
pub const MAX_DELAY_SECS: f64 = 3_600.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level configuration. Every section falls back to its defaults, so an
/// empty file (or no file at all) yields a runnable setup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub db: DbConfig,
    pub logic: LogicConfig,
    pub http: HttpConfig,
    pub state: StateConfig,
    pub sources: Vec<SourceConfig>,
}

/// Location of the embedded document store: `{path}/{name}`, documents kept
/// in the tree named `collection`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub path: PathBuf,
    pub name: String,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogicConfig {
    /// Seconds to wait between two article fetches.
    pub delay: f64,
    /// A stored document younger than this is not fetched again.
    pub reindex_days: f64,
    /// Extracted bodies must be strictly longer than this (in characters).
    pub min_body_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    pub path: PathBuf,
}

/// One paginated catalog, listed at `{base}/{section}/?page={n}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub base: String,
    pub section: String,
    #[serde(default = "default_link_marker")]
    pub link_marker: String,
}

fn default_link_marker() -> String {
    "/reviews/".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db: DbConfig::default(),
            logic: LogicConfig::default(),
            http: HttpConfig::default(),
            state: StateConfig::default(),
            sources: vec![SourceConfig::default()],
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("./data"), name: "ir_lab".into(), collection: "documents".into() }
    }
}

impl Default for LogicConfig {
    fn default() -> Self {
        Self { delay: 2.0, reindex_days: 7.0, min_body_chars: 100 }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8".into(),
            accept_language: "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7".into(),
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("crawler_state.json") }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            name: "kanobu".into(),
            base: "https://kanobu.ru".into(),
            section: "anime-reviews".into(),
            link_marker: default_link_marker(),
        }
    }
}

impl Config {
    /// Load the config at `path`, or the defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=MAX_DELAY_SECS).contains(&self.logic.delay) {
            return Err(ConfigError::Validation(format!("logic.delay must be between 0 and {MAX_DELAY_SECS} seconds, got {}", self.logic.delay)));
        }
        if !(self.logic.reindex_days >= 0.0) || !self.logic.reindex_days.is_finite() {
            return Err(ConfigError::Validation(format!("logic.reindex_days must be a non-negative number, got {}", self.logic.reindex_days)));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Validation("http.timeout_secs must be greater than 0".into()));
        }
        if self.db.name.is_empty() || self.db.collection.is_empty() {
            return Err(ConfigError::Validation("db.name and db.collection must not be empty".into()));
        }
        if self.sources.is_empty() {
            return Err(ConfigError::Validation("at least one [[sources]] entry is required".into()));
        }
        for source in &self.sources {
            if source.name.is_empty() || source.section.is_empty() {
                return Err(ConfigError::Validation("source name and section must not be empty".into()));
            }
            if url::Url::parse(&source.base).is_err() {
                return Err(ConfigError::Validation(format!("source {} has an invalid base url: {}", source.name, source.base)));
            }
        }
        Ok(())
    }

    /// Staleness threshold in seconds.
    pub fn reindex_threshold_secs(&self) -> f64 {
        self.logic.reindex_days * SECONDS_PER_DAY
    }

    /// Delay between requests. Out-of-range values (only possible on an
    /// unvalidated config) are clamped into `0..=MAX_DELAY_SECS`.
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.logic.delay.clamp(0.0, MAX_DELAY_SECS)).unwrap_or_default()
    }
}

impl DbConfig {
    pub fn store_path(&self) -> PathBuf {
        self.path.join(&self.name)
    }
}

impl SourceConfig {
    pub fn catalog_url(&self, page: u32) -> String {
        format!("{}/{}/?page={}", self.base.trim_end_matches('/'), self.section, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(Path::new("/nonexistent/reviewdex.toml")).unwrap();
        assert_eq!(config.db.name, "ir_lab");
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].name, "kanobu");
        assert_eq!(config.reindex_threshold_secs(), 7.0 * 86_400.0);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = temp_config(
            r#"
[db]
path = "/tmp/store"
name = "reviews"
collection = "docs"

[logic]
delay = 0.5
reindex_days = 1.5

[[sources]]
name = "site"
base = "https://example.com/"
section = "game-reviews"
"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.db.store_path(), PathBuf::from("/tmp/store/reviews"));
        assert_eq!(config.logic.min_body_chars, 100);
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.delay(), Duration::from_millis(500));
        assert_eq!(config.sources[0].link_marker, "/reviews/");
        assert_eq!(config.sources[0].catalog_url(3), "https://example.com/game-reviews/?page=3");
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let file = temp_config("this is not valid TOML {{{");
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn negative_delay_fails_validation() {
        let file = temp_config("[logic]\ndelay = -1.0\n");
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn huge_delay_fails_validation() {
        let file = temp_config("[logic]\ndelay = 1e30\n");
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Validation(_))));

        let mut config = Config::default();
        config.logic.delay = 1e30;
        assert_eq!(config.delay(), Duration::from_secs_f64(MAX_DELAY_SECS));
        config.logic.delay = f64::NAN;
        assert_eq!(config.delay(), Duration::ZERO);
    }

    #[test]
    fn bad_source_base_fails_validation() {
        let file = temp_config("[[sources]]\nname = \"x\"\nbase = \"not a url\"\nsection = \"s\"\n");
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Validation(_))));
    }
}
