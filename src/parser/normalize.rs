use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use super::table::{CellView, RowView};
use crate::film::Film;
use crate::job::SourceJob;

/// Anything that is not an ASCII word character or whitespace.
static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\s]").unwrap());

const MIN_TITLE_CHARS: usize = 3;
const MAX_DIRECTOR_CHARS: usize = 100;

/// Strip punctuation and symbols from a title, then trim.
///
/// Lossy on purpose: "Spider-Man" becomes "SpiderMan" and accented letters
/// are dropped. Stored titles and dedup keys depend on this exact output.
pub fn normalize_title(raw: &str) -> String {
    NON_WORD_RE.replace_all(raw, "").trim().to_string()
}

/// Turn one table row into a film, or `None` when the row is not a film row.
///
/// `base` is the site origin; the title link's `href` is resolved against it.
pub fn normalize_row<R: RowView>(row: &R, job: &SourceJob, base: &Url) -> Option<Film> {
    let cells = row.cells();
    let first = cells.first()?;
    if cells.len() < job.min_cells {
        return None;
    }

    let candidate = first
        .first_link_text()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| first.text().trim().to_string());
    if candidate.chars().count() < MIN_TITLE_CHARS {
        debug!(label = %job.label, candidate = %candidate, "Skipping row: title too short");
        return None;
    }

    let title = normalize_title(&candidate);
    if title.is_empty() {
        debug!(label = %job.label, candidate = %candidate, "Skipping row: nothing left after cleanup");
        return None;
    }

    let mut film = Film::new(title, job.year, job.country.as_str());
    film.source_url = first
        .first_link_href()
        .filter(|href| !href.is_empty())
        .and_then(|href| base.join(&href).ok())
        .map(|u| u.to_string());

    if job.director_from_second_cell {
        film.director = cells
            .get(1)
            .map(|c| c.text().trim().to_string())
            .filter(|d| !d.is_empty() && d.chars().count() < MAX_DIRECTOR_CHARS);
    }

    Some(film)
}
