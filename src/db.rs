use std::path::Path;

use rusqlite::Connection;
use tracing::warn;

use crate::error::{Error, Result};
use crate::extractor::PageContent;

/// Open (creating if needed) the backing database and ensure the schema.
///
/// An existing file that fails schema introspection is discarded and
/// recreated empty rather than aborting the run.
pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| unavailable(path, &e))?;
        }
    }

    if path.exists() && !is_valid_database(path) {
        warn!(
            "Invalid database file at {}; replacing with a new one",
            path.display()
        );
        std::fs::remove_file(path).map_err(|e| unavailable(path, &e))?;
    }

    let conn = Connection::open(path).map_err(|e| unavailable(path, &e))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")
        .map_err(|e| unavailable(path, &e))?;
    init_schema(&conn).map_err(|e| unavailable(path, &e))?;
    Ok(conn)
}

fn unavailable(path: &Path, source: &dyn std::fmt::Display) -> Error {
    Error::StorageUnavailable {
        path: path.to_path_buf(),
        reason: source.to_string(),
    }
}

/// A readable database answers schema introspection; anything else is junk.
fn is_valid_database(path: &Path) -> bool {
    let Ok(conn) = Connection::open(path) else {
        return false;
    };
    conn.prepare("SELECT name FROM sqlite_master WHERE type='table'")
        .and_then(|mut stmt| stmt.query([]).map(|_| ()))
        .is_ok()
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS headings (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS paragraphs (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS images (
            id  INTEGER PRIMARY KEY AUTOINCREMENT,
            src TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS links (
            id   INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            href TEXT NOT NULL
        );
        ",
    )
}

/// Append one page's extracted records, each into its own collection.
///
/// Best-effort by contract: no transaction, so a mid-batch failure leaves
/// the rows written so far in place and surfaces as `StorageWrite`.
pub fn append(conn: &Connection, content: &PageContent) -> Result<()> {
    let mut stmt = conn
        .prepare("INSERT INTO headings (content) VALUES (?1)")
        .map_err(Error::StorageWrite)?;
    for heading in &content.headings {
        stmt.execute([heading]).map_err(Error::StorageWrite)?;
    }

    let mut stmt = conn
        .prepare("INSERT INTO paragraphs (content) VALUES (?1)")
        .map_err(Error::StorageWrite)?;
    for paragraph in &content.paragraphs {
        stmt.execute([paragraph]).map_err(Error::StorageWrite)?;
    }

    let mut stmt = conn
        .prepare("INSERT INTO images (src) VALUES (?1)")
        .map_err(Error::StorageWrite)?;
    for src in &content.images {
        stmt.execute([src]).map_err(Error::StorageWrite)?;
    }

    let mut stmt = conn
        .prepare("INSERT INTO links (text, href) VALUES (?1, ?2)")
        .map_err(Error::StorageWrite)?;
    for link in &content.links {
        stmt.execute(rusqlite::params![link.text, link.href])
            .map_err(Error::StorageWrite)?;
    }

    Ok(())
}

/// The two collections the query service projects as plain text.
#[derive(Debug, Clone, Copy)]
pub enum TextCollection {
    Headings,
    Paragraphs,
}

impl TextCollection {
    fn table(self) -> &'static str {
        match self {
            TextCollection::Headings => "headings",
            TextCollection::Paragraphs => "paragraphs",
        }
    }
}

/// All stored content strings for one collection, in insertion order.
pub fn fetch_texts(conn: &Connection, collection: TextCollection) -> Result<Vec<String>> {
    let sql = format!("SELECT content FROM {} ORDER BY id", collection.table());
    let mut stmt = conn.prepare(&sql).map_err(Error::StorageRead)?;
    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(Error::StorageRead)?
        .collect::<rusqlite::Result<Vec<String>>>()
        .map_err(Error::StorageRead)?;
    Ok(rows)
}

/// (id, content) listings for the diagnostic `view` subcommand.
pub fn fetch_entries(conn: &Connection, collection: TextCollection) -> Result<Vec<(i64, String)>> {
    let sql = format!("SELECT id, content FROM {} ORDER BY id", collection.table());
    let mut stmt = conn.prepare(&sql).map_err(Error::StorageRead)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(Error::StorageRead)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(Error::StorageRead)?;
    Ok(rows)
}

pub struct Counts {
    pub headings: usize,
    pub paragraphs: usize,
    pub images: usize,
    pub links: usize,
}

pub fn counts(conn: &Connection) -> Result<Counts> {
    Ok(Counts {
        headings: count_rows(conn, "headings")?,
        paragraphs: count_rows(conn, "paragraphs")?,
        images: count_rows(conn, "images")?,
        links: count_rows(conn, "links")?,
    })
}

fn count_rows(conn: &Connection, table: &str) -> Result<usize> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
        .map_err(Error::StorageRead)
}

/// Insert sample rows into empty text collections so `view` has something
/// to show on a fresh database.
pub fn seed_samples(conn: &Connection) -> Result<usize> {
    let mut inserted = 0;
    if count_rows(conn, "headings")? == 0 {
        inserted += conn
            .execute(
                "INSERT INTO headings (content) VALUES ('Sample Heading 1'), ('Sample Heading 2')",
                [],
            )
            .map_err(Error::StorageWrite)?;
    }
    if count_rows(conn, "paragraphs")? == 0 {
        inserted += conn
            .execute(
                "INSERT INTO paragraphs (content)
                 VALUES ('Sample paragraph content 1.'), ('Sample paragraph content 2.')",
                [],
            )
            .map_err(Error::StorageWrite)?;
    }
    Ok(inserted)
}
