pub mod normalize;
pub mod table;

use url::Url;

use crate::film::Film;
use crate::job::SourceJob;
use table::{TableView, WikiDocument};

/// Two-step pipeline: html → wikitable rows → films, in table then row order.
pub fn extract_films(html: &str, job: &SourceJob, base: &Url) -> Vec<Film> {
    let doc = WikiDocument::parse(html);
    let mut films = Vec::new();
    for table in doc.tables() {
        films.extend(
            table
                .rows()
                .iter()
                .filter_map(|row| normalize::normalize_row(row, job, base)),
        );
    }
    films
}
