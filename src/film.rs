use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One normalized film row. Only `title` and `country` are guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Film {
    pub title: String,
    pub year: Option<i32>,
    pub country: String,
    pub director: Option<String>,
    pub cast_members: Option<Vec<String>>,
    pub genre: Option<String>,
    pub release_date: Option<String>,
    pub source_url: Option<String>,
}

impl Film {
    pub fn new(title: impl Into<String>, year: Option<i32>, country: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year,
            country: country.into(),
            director: None,
            cast_members: None,
            genre: None,
            release_date: None,
            source_url: None,
        }
    }

    /// Two films with the same key are the same film.
    pub fn dedup_key(&self) -> (&str, Option<i32>) {
        (&self.title, self.year)
    }
}

/// Outcome of one orchestrator run.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeResult {
    pub success: bool,
    pub films: Vec<Film>,
    pub errors: Vec<String>,
    pub total_scraped: usize,
}

impl ScrapeResult {
    pub fn completed(films: Vec<Film>, errors: Vec<String>) -> Self {
        Self {
            success: true,
            total_scraped: films.len(),
            films,
            errors,
        }
    }

    /// The run was cut short outside any job; keep whatever was gathered.
    pub fn aborted(films: Vec<Film>, mut errors: Vec<String>, cause: String) -> Self {
        errors.push(cause);
        Self {
            success: false,
            total_scraped: films.len(),
            films,
            errors,
        }
    }
}

/// Keep the first film for every `(title, year)`, preserving order.
pub fn dedup_films(films: &[Film]) -> Vec<Film> {
    let mut seen = HashSet::new();
    films
        .iter()
        .filter(|f| seen.insert(f.dedup_key()))
        .cloned()
        .collect()
}
