mod db;
mod error;
mod extractor;
mod fetcher;
mod pipeline;
mod server;
mod summarizer;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::db::TextCollection;
use crate::summarizer::TruncatingSummarizer;

const DB_PATH_ENV: &str = "PAGESTASH_DB";

#[derive(Parser)]
#[command(
    name = "pagestash",
    about = "Scrape a web page into SQLite and serve it back as JSON"
)]
struct Cli {
    /// SQLite database file (falls back to $PAGESTASH_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one page and store its extracted content
    Scrape {
        /// Page URL to scrape
        url: String,
    },
    /// Serve the stored content over HTTP
    Serve {
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Show row counts per collection
    Stats,
    /// Dump stored headings and paragraphs
    View {
        /// Insert sample rows into empty tables first
        #[arg(long)]
        seed: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let db_path = cli
        .db
        .or_else(|| std::env::var(DB_PATH_ENV).ok().map(PathBuf::from))
        .with_context(|| format!("database path required: pass --db or set {}", DB_PATH_ENV))?;

    match cli.command {
        Commands::Scrape { url } => {
            let conn = db::connect(&db_path)?;
            let client = fetcher::client()?;
            let outcome = pipeline::run(&client, &conn, &url).await;
            match outcome.reason {
                None => println!("Stored content from {}", url),
                Some(reason) => println!("Nothing stored: {}", reason),
            }
        }
        Commands::Serve { port } => {
            // Fail now if the database path is unusable, not on first request.
            db::connect(&db_path)?;
            let state = server::AppState {
                db_path,
                summarizer: Arc::new(TruncatingSummarizer),
            };
            server::serve(port, state).await?;
        }
        Commands::Stats => {
            let conn = db::connect(&db_path)?;
            let counts = db::counts(&conn)?;
            println!("Headings:   {}", counts.headings);
            println!("Paragraphs: {}", counts.paragraphs);
            println!("Images:     {}", counts.images);
            println!("Links:      {}", counts.links);
        }
        Commands::View { seed } => {
            let conn = db::connect(&db_path)?;
            if seed {
                let inserted = db::seed_samples(&conn)?;
                if inserted > 0 {
                    println!("Seeded {} sample rows.", inserted);
                }
            }

            let headings = db::fetch_entries(&conn, TextCollection::Headings)?;
            let paragraphs = db::fetch_entries(&conn, TextCollection::Paragraphs)?;
            if headings.is_empty() && paragraphs.is_empty() {
                println!("No data available in the database.");
                return Ok(());
            }

            println!("Headings:");
            for (id, content) in &headings {
                println!("  {:>4}  {}", id, content);
            }
            println!("\nParagraphs:");
            for (id, content) in &paragraphs {
                println!("  {:>4}  {}", id, content);
            }
        }
    }

    Ok(())
}
