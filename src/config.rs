use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

const CONFIG_CANDIDATES: [&str; 4] = [
    "concourse-feed.toml",
    "concourse-feed.json",
    "concourse-feed.yaml",
    "concourse-feed.yml",
];

/// Configuration file structure for concourse-feed.
///
/// Every value can also be given on the command line, which takes precedence
/// over the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Upstream Concourse settings
    #[serde(default)]
    pub concourse: ConcourseConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConcourseConfig {
    /// Concourse base URL, used both for the API and for web links
    #[serde(default = "default_concourse_url")]
    pub url: String,

    /// Local user for the team token request
    pub username: Option<String>,

    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

impl Default for ConcourseConfig {
    fn default() -> Self {
        Self {
            url: default_concourse_url(),
            username: None,
            password: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_concourse_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl ConcourseConfig {
    /// Parses the configured Concourse URL.
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.url).with_context(|| format!("Invalid Concourse URL: {}", self.url))
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Uses `path` when given; otherwise searches the current directory for
    /// `concourse-feed.{toml,json,yaml,yml}` in that order.
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::discover(Path::new(".")),
        }
    }

    fn discover(dir: &Path) -> Result<Self> {
        for candidate in &CONFIG_CANDIDATES {
            let path = dir.join(candidate);
            if path.exists() {
                log::debug!("Loading configuration from {}", path.display());
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}
