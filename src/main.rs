use std::time::Instant;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;

use film_scraper::config::Settings;
use film_scraper::{db, Film, ScrapeResult};

#[derive(Parser)]
#[command(name = "film_scraper", about = "Scrape film lists from Wikipedia into SQLite")]
struct Cli {
    /// Settings file (default: film_scraper.toml when present)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every configured page and save new films
    Scrape {
        /// Scrape and report, but don't touch the database
        #[arg(long)]
        dry_run: bool,
        /// Print the scrape result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Scrape only when the database is still empty
    Seed,
    /// Show how many films are stored
    Stats,
    /// Most recently scraped films
    List {
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
    /// Show the configured source pages
    Jobs,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Scrape { dry_run, json } => scrape(&settings, dry_run, json).await,
        Commands::Seed => {
            let conn = open(&settings)?;
            let count = db::film_count(&conn)?;
            if count > 0 {
                println!("Database already has {} films. Run 'scrape' to add more.", count);
                return Ok(());
            }
            scrape(&settings, false, false).await
        }
        Commands::Stats => {
            let conn = open(&settings)?;
            println!("Films in database: {}", db::film_count(&conn)?);
            Ok(())
        }
        Commands::List { limit } => {
            let conn = open(&settings)?;
            let films = db::recent_films(&conn, limit)?;
            if films.is_empty() {
                println!("No films stored yet. Run 'scrape' first.");
            }
            print_films(&films);
            Ok(())
        }
        Commands::Jobs => {
            for (i, job) in settings.jobs.iter().enumerate() {
                let year = job.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into());
                println!(
                    "{:>2}. {:<24} {:>4} {:<16} min_cells={} director={}",
                    i + 1, job.label, year, job.country, job.min_cells, job.director_from_second_cell
                );
                println!("    {}", job.url);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn open(settings: &Settings) -> Result<Connection> {
    let conn = db::connect(&settings.database_path)?;
    db::init_schema(&conn)?;
    Ok(conn)
}

async fn scrape(settings: &Settings, dry_run: bool, json: bool) -> Result<()> {
    let fetcher = settings.fetcher()?;
    println!("Scraping {} pages...", settings.jobs.len());
    let interrupted = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler: never interrupt.
            std::future::pending::<()>().await;
        }
    };
    let result = settings
        .orchestrator()
        .scrape_all_until(&fetcher, interrupted)
        .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }

    if !result.success {
        bail!("Scraping failed: {}", result.errors.join("; "));
    }
    if dry_run || result.films.is_empty() {
        return Ok(());
    }

    let conn = open(settings)?;
    let saved = db::save_films(&conn, &result.films)?;
    println!("Saved {} new films ({} total)", saved, db::film_count(&conn)?);

    if !json {
        println!("\nRecent films in database:");
        print_films(&db::recent_films(&conn, 10)?);
    }
    Ok(())
}

fn print_summary(result: &ScrapeResult) {
    println!("Found {} unique films", result.total_scraped);
    if !result.errors.is_empty() {
        println!("\n{} errors occurred:", result.errors.len());
        for e in &result.errors {
            println!("  - {}", e);
        }
    }
}

fn print_films(films: &[Film]) {
    for (i, f) in films.iter().enumerate() {
        let year = f.year.map(|y| y.to_string()).unwrap_or_else(|| "Unknown".into());
        println!("{:>3}. {} ({}) - {}", i + 1, f.title, year, f.country);
        if let Some(director) = &f.director {
            println!("     Director: {}", director);
        }
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
