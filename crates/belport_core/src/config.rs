use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::fetch::{DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT, FetchSettings};
use crate::labels::PageLabels;
use crate::output::{DEFAULT_CSV_FILE, DEFAULT_JSON_FILE, OutputPaths};
use crate::pipeline::ParseStrategy;

pub const DEFAULT_CONFIG_FILENAME: &str = "belport.toml";

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ScrapeConfig {
    #[serde(default)]
    pub source: SourceSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub parse: ParseSection,
    #[serde(default)]
    pub labels: PageLabels,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct SourceSection {
    pub url: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct OutputSection {
    pub dir: Option<PathBuf>,
    pub csv_file: Option<String>,
    pub json_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ParseSection {
    pub strategy: Option<String>,
    pub dedupe: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Flag,
    Env,
    Config,
    Default,
}

impl ValueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Env => "env",
            Self::Config => "config",
            Self::Default => "default",
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn resolve<T>(
    env_key: &str,
    parse_env: impl Fn(&str) -> Option<T>,
    config: Option<T>,
    default: T,
) -> (T, ValueSource) {
    pick(env_value(env_key), parse_env, config, default)
}

/// env > config > default. An env value that does not parse falls through.
fn pick<T>(
    env: Option<String>,
    parse_env: impl Fn(&str) -> Option<T>,
    config: Option<T>,
    default: T,
) -> (T, ValueSource) {
    if let Some(value) = env.as_deref().and_then(parse_env) {
        return (value, ValueSource::Env);
    }
    match config {
        Some(value) => (value, ValueSource::Config),
        None => (default, ValueSource::Default),
    }
}

/// Unlike `pick`, a strategy name that does not parse is an error wherever
/// it comes from.
fn strategy_from(
    env: Option<String>,
    config: Option<&str>,
) -> Result<(ParseStrategy, ValueSource)> {
    if let Some(value) = env {
        return Ok((ParseStrategy::parse(&value)?, ValueSource::Env));
    }
    match config {
        Some(value) => Ok((ParseStrategy::parse(value)?, ValueSource::Config)),
        None => Ok((ParseStrategy::default(), ValueSource::Default)),
    }
}

impl ScrapeConfig {
    /// Resolve the page URL: env BELPORT_URL > config > DEFAULT_SOURCE_URL.
    pub fn source_url(&self) -> (String, ValueSource) {
        resolve(
            "BELPORT_URL",
            |value| Some(value.to_string()),
            self.source.url.clone(),
            DEFAULT_SOURCE_URL.to_string(),
        )
    }

    /// Resolve user agent: env BELPORT_USER_AGENT > config > DEFAULT_USER_AGENT.
    pub fn user_agent(&self) -> (String, ValueSource) {
        resolve(
            "BELPORT_USER_AGENT",
            |value| Some(value.to_string()),
            self.source.user_agent.clone(),
            DEFAULT_USER_AGENT.to_string(),
        )
    }

    /// Unparsable env values fall through to the config file.
    pub fn timeout_ms(&self) -> (u64, ValueSource) {
        resolve(
            "BELPORT_HTTP_TIMEOUT_MS",
            |value| value.parse::<u64>().ok(),
            self.source.timeout_ms,
            DEFAULT_TIMEOUT_MS,
        )
    }

    pub fn output_dir(&self) -> (PathBuf, ValueSource) {
        resolve(
            "BELPORT_OUTPUT_DIR",
            |value| Some(PathBuf::from(value)),
            self.output.dir.clone(),
            PathBuf::from("."),
        )
    }

    /// Strategy names are validated here so a typo fails the run instead of
    /// silently falling back.
    pub fn strategy(&self) -> Result<(ParseStrategy, ValueSource)> {
        strategy_from(env_value("BELPORT_STRATEGY"), self.parse.strategy.as_deref())
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            user_agent: self.user_agent().0,
            timeout_ms: self.timeout_ms().0,
        }
    }

    pub fn output_paths(&self, dir: &Path) -> OutputPaths {
        OutputPaths::in_dir(
            dir,
            self.output.csv_file.as_deref().unwrap_or(DEFAULT_CSV_FILE),
            self.output.json_file.as_deref().unwrap_or(DEFAULT_JSON_FILE),
        )
    }
}

/// Load and parse a ScrapeConfig from a TOML file. Returns default if file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<ScrapeConfig> {
    if !config_path.exists() {
        return Ok(ScrapeConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: ScrapeConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}
