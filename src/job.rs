use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::fetcher::Fetcher;
use crate::film::Film;
use crate::parser;

/// One page to scrape plus the fixed facts every row on it shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceJob {
    /// Used in logs and error messages.
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub year: Option<i32>,
    pub country: String,
    /// Rows with fewer `td` cells are skipped.
    #[serde(default = "default_min_cells")]
    pub min_cells: usize,
    /// Treat a short second cell as the director's name.
    #[serde(default)]
    pub director_from_second_cell: bool,
}

fn default_min_cells() -> usize {
    1
}

impl SourceJob {
    /// Root of the site the page lives on; film links resolve against it.
    pub fn origin(&self) -> Result<Url> {
        Url::parse(&self.url)
            .and_then(|url| url.join("/"))
            .with_context(|| format!("Invalid URL {}", self.url))
    }

    /// Fetch the page and extract its films.
    pub async fn run(&self, fetcher: &dyn Fetcher) -> Result<Vec<Film>> {
        let base = self.origin()?;
        let html = fetcher.fetch(&self.url).await?;

        let films = parser::extract_films(&html, self, &base);
        info!("Found {} films from {}", films.len(), self.label);
        Ok(films)
    }
}

const WIKI: &str = "https://en.wikipedia.org/wiki";

pub fn default_jobs() -> Vec<SourceJob> {
    vec![
        SourceJob {
            label: "American films 2023".into(),
            url: format!("{}/List_of_American_films_of_2023", WIKI),
            year: Some(2023),
            country: "United States".into(),
            min_cells: 2,
            director_from_second_cell: true,
        },
        SourceJob {
            label: "American films 2022".into(),
            url: format!("{}/List_of_American_films_of_2022", WIKI),
            year: Some(2022),
            country: "United States".into(),
            min_cells: 2,
            director_from_second_cell: false,
        },
        SourceJob {
            label: "British films 2023".into(),
            url: format!("{}/List_of_British_films_of_2023", WIKI),
            year: Some(2023),
            country: "United Kingdom".into(),
            min_cells: 1,
            director_from_second_cell: false,
        },
    ]
}
