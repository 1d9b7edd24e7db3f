pub mod config;
pub mod db;
pub mod fetcher;
pub mod film;
pub mod job;
pub mod orchestrator;
pub mod parser;

pub use fetcher::{Fetcher, HttpFetcher};
pub use film::{dedup_films, Film, ScrapeResult};
pub use job::SourceJob;
pub use orchestrator::Orchestrator;
