use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::domain::{Category, FeedInfo, Source};
use crate::errors::{TourfeedError, TourfeedResult};

pub const CONFIG_FILE_NAME: &str = "tourfeed.toml";
pub const CONFIG_ENV_VAR: &str = "TOURFEED_CONFIG";
pub const OUTPUT_ENV_VAR: &str = "TOURFEED_OUTPUT";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub feed: FeedConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    /// Log level used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Optional OPML file with additional sources, relative to the config file
    #[serde(default)]
    pub opml: Option<PathBuf>,
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Directory of the loaded config file
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    pub title: String,
    pub link: String,
    pub description: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub max_items: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            concurrency: default_concurrency(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    #[serde(default = "default_blocked_keywords")]
    pub blocked_keywords: Vec<String>,
    /// When non-empty, an article must mention at least one of these
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            blocked_keywords: default_blocked_keywords(),
            keywords: Vec::new(),
            categories: default_categories(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("feed.xml")
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_user_agent() -> String {
    format!("tourfeed/{}", env!("CARGO_PKG_VERSION"))
}

fn default_concurrency() -> usize {
    4
}

fn default_blocked_keywords() -> Vec<String> {
    vec![
        "news".to_string(),
        "crime".to_string(),
        "politics".to_string(),
    ]
}

fn default_categories() -> Vec<Category> {
    Category::ALL.to_vec()
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve the config path: explicit path, then the working directory,
    /// then the executable's directory.
    fn resolve_path(explicit: Option<&str>) -> TourfeedResult<PathBuf> {
        if let Some(path) = explicit {
            return Ok(PathBuf::from(path));
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Ok(local);
        }

        if let Some(dir) = Self::exe_dir() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        Err(TourfeedError::Config(format!(
            "no configuration file found (pass --config or create {})",
            CONFIG_FILE_NAME
        )))
    }

    /// Load configuration. `path` comes from `--config` / `TOURFEED_CONFIG`.
    pub fn load(path: Option<&str>) -> TourfeedResult<Self> {
        let path = Self::resolve_path(path)?;

        let content = std::fs::read_to_string(&path).map_err(|e| {
            TourfeedError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_toml_str(&content)?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.feed.output = config.relative_to_base(&config.feed.output);

        if let Ok(output) = std::env::var(OUTPUT_ENV_VAR) {
            if !output.is_empty() {
                config.feed.output = PathBuf::from(output);
            }
        }

        Ok(config)
    }

    /// Load `.env` from the executable's directory, then the working directory.
    pub fn load_dotenv() {
        if let Some(dir) = Self::exe_dir() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        dotenvy::dotenv().ok();
    }

    pub fn from_toml_str(content: &str) -> TourfeedResult<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| TourfeedError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> TourfeedResult<()> {
        if self.feed.title.trim().is_empty() {
            return Err(TourfeedError::Config("feed.title must not be empty".to_string()));
        }

        Url::parse(&self.feed.link).map_err(|e| {
            TourfeedError::Config(format!("feed.link {:?}: {}", self.feed.link, e))
        })?;

        if self.fetch.concurrency == 0 {
            return Err(TourfeedError::Config(
                "fetch.concurrency must be at least 1".to_string(),
            ));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(TourfeedError::Config(
                "fetch.timeout_secs must be at least 1".to_string(),
            ));
        }

        if self.feed.max_items == Some(0) {
            return Err(TourfeedError::Config(
                "feed.max_items must be at least 1".to_string(),
            ));
        }

        for source in &self.sources {
            validate_source_url(&source.url)?;
        }

        Ok(())
    }

    /// Relative paths in the config file are relative to the file itself
    fn relative_to_base(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn opml_path(&self) -> Option<PathBuf> {
        self.opml.as_ref().map(|p| self.relative_to_base(p))
    }

    pub fn feed_info(&self) -> FeedInfo {
        FeedInfo {
            title: self.feed.title.clone(),
            link: self.feed.link.clone(),
            description: self.feed.description.clone(),
            language: self.feed.language.clone(),
        }
    }
}

/// Sources must be absolute http(s) URLs.
pub fn validate_source_url(raw: &str) -> TourfeedResult<Url> {
    let url = Url::parse(raw).map_err(|e| TourfeedError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TourfeedError::InvalidUrl(format!(
            "{}: unsupported scheme {}",
            raw, other
        ))),
    }
}
