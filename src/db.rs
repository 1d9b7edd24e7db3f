use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::film::Film;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS films (
            id            INTEGER PRIMARY KEY,
            title         TEXT NOT NULL,
            year          INTEGER,
            country       TEXT NOT NULL,
            director      TEXT,
            cast_members  TEXT,
            genre         TEXT,
            release_date  TEXT,
            source_url    TEXT,
            scraped_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );
        -- NULL years would never collide in a plain (title, year) index.
        DROP INDEX IF EXISTS idx_films_title_year;
        CREATE UNIQUE INDEX IF NOT EXISTS idx_films_key ON films(title, IFNULL(year, -1));
        CREATE INDEX IF NOT EXISTS idx_films_country ON films(country);
        ",
    )?;
    Ok(())
}

// ── Writes ──

/// Store films, skipping any `(title, year)` already in the table. Films
/// without a year collide with each other on title alone.
/// Returns how many rows were new.
pub fn save_films(conn: &Connection, films: &[Film]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO films
             (title, year, country, director, cast_members, genre, release_date, source_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for f in films {
            let cast = f.cast_members.as_ref().map(serde_json::to_string).transpose()?;
            count += stmt
                .execute(rusqlite::params![
                    f.title, f.year, f.country, f.director, cast, f.genre, f.release_date, f.source_url,
                ])
                .with_context(|| format!("Failed to save: {}", f.title))?;
        }
    }
    tx.commit()?;
    Ok(count)
}

// ── Reads ──

pub fn film_count(conn: &Connection) -> Result<usize> {
    let n: usize = conn.query_row("SELECT COUNT(*) FROM films", [], |r| r.get(0))?;
    Ok(n)
}

/// Most recently scraped films first.
pub fn recent_films(conn: &Connection, limit: usize) -> Result<Vec<Film>> {
    let mut stmt = conn.prepare(
        "SELECT title, year, country, director, cast_members, genre, release_date, source_url
         FROM films
         ORDER BY scraped_at DESC, id DESC
         LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok((
                Film {
                    title: row.get(0)?,
                    year: row.get(1)?,
                    country: row.get(2)?,
                    director: row.get(3)?,
                    cast_members: None,
                    genre: row.get(5)?,
                    release_date: row.get(6)?,
                    source_url: row.get(7)?,
                },
                row.get::<_, Option<String>>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(mut film, cast)| {
            film.cast_members = cast
                .map(|json| serde_json::from_str(&json))
                .transpose()
                .with_context(|| format!("Bad cast_members for {}", film.title))?;
            Ok::<_, anyhow::Error>(film)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn film(title: &str, year: i32) -> Film {
        Film::new(title, Some(year), "United States")
    }

    #[test]
    fn save_skips_already_stored_films() {
        let conn = memory();
        assert_eq!(save_films(&conn, &[film("Dune", 2023), film("Barbie", 2023)]).unwrap(), 2);
        assert_eq!(save_films(&conn, &[film("Dune", 2023), film("Dune", 2021)]).unwrap(), 1);
        assert_eq!(film_count(&conn).unwrap(), 3);
    }

    #[test]
    fn film_without_year_is_stored_once() {
        let conn = memory();
        let saltburn = Film::new("Saltburn", None, "United Kingdom");
        assert_eq!(save_films(&conn, &[saltburn.clone()]).unwrap(), 1);
        assert_eq!(save_films(&conn, &[saltburn.clone(), saltburn]).unwrap(), 0);
        assert_eq!(film_count(&conn).unwrap(), 1);

        // A dated film with the same title is a different film.
        assert_eq!(save_films(&conn, &[Film::new("Saltburn", Some(2023), "United Kingdom")]).unwrap(), 1);
    }

    #[test]
    fn schema_init_is_repeatable() {
        let conn = memory();
        save_films(&conn, &[film("Dune", 2023)]).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(save_films(&conn, &[film("Dune", 2023)]).unwrap(), 0);
    }

    #[test]
    fn recent_films_round_trips_every_field() {
        let conn = memory();
        let mut full = film("Oppenheimer", 2023);
        full.director = Some("Christopher Nolan".into());
        full.cast_members = Some(vec!["Cillian Murphy".into(), "Emily Blunt".into()]);
        full.genre = Some("Drama".into());
        full.release_date = Some("2023-07-21".into());
        full.source_url = Some("https://en.wikipedia.org/wiki/Oppenheimer_(film)".into());
        let bare = Film::new("Saltburn", None, "United Kingdom");
        save_films(&conn, &[full.clone(), bare.clone()]).unwrap();

        // Same timestamp within one run; newest id first.
        assert_eq!(recent_films(&conn, 10).unwrap(), vec![bare, full]);
    }

    #[test]
    fn recent_films_honors_limit() {
        let conn = memory();
        save_films(&conn, &[film("Dune", 2023), film("Barbie", 2023), film("Wonka", 2023)]).unwrap();
        assert_eq!(recent_films(&conn, 2).unwrap().len(), 2);
    }

    #[test]
    fn connect_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("films.sqlite");
        let conn = connect(&path).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(film_count(&conn).unwrap(), 0);
        assert!(path.exists());
    }
}
