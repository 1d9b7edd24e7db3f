use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::fetcher::HttpFetcher;
use crate::job::{default_jobs, SourceJob};
use crate::orchestrator::Orchestrator;

pub const DEFAULT_CONFIG_FILE: &str = "film_scraper.toml";
const ENV_PREFIX: &str = "FILMS";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Pause after each successful page fetch.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_jobs")]
    pub jobs: Vec<SourceJob>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            user_agent: default_user_agent(),
            request_delay_ms: default_request_delay_ms(),
            timeout_secs: default_timeout_secs(),
            jobs: default_jobs(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data/films.sqlite")
}

fn default_user_agent() -> String {
    String::from("WikipediaFilmScraper/1.0 (Educational)")
}

fn default_request_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    10
}

impl Settings {
    /// Defaults, then the optional TOML file, then `FILMS_*` environment variables.
    pub fn load(file: Option<&str>) -> Result<Self> {
        Self::from_sources(file, env_source())
    }

    fn from_sources(file: Option<&str>, env: ::config::Environment) -> Result<Self> {
        let path = file.unwrap_or(DEFAULT_CONFIG_FILE);
        ::config::Config::builder()
            .add_source(::config::File::with_name(path).required(file.is_some()))
            .add_source(env)
            .build()
            .with_context(|| format!("Failed to load settings from {}", path))?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn fetcher(&self) -> Result<HttpFetcher> {
        HttpFetcher::new(
            &self.user_agent,
            Duration::from_secs(self.timeout_secs),
            Duration::from_millis(self.request_delay_ms),
        )
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.jobs.clone())
    }
}

fn env_source() -> ::config::Environment {
    ::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true)
}
