//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::SiteStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{LemmaRecord, PageRecord, SiteRecord};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

const SITE_COLUMNS: &str = "id, url, name, status, status_time, last_error";
const PAGE_COLUMNS: &str = "id, site_id, path, status_code, content";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(LexiError)` - Failed to open database
    pub fn new(path: &Path) -> crate::Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> crate::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Counts every page in the index
    pub fn count_all_pages(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Counts every lemma in the index
    pub fn count_all_lemmas(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM lemmas", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn site_from_row(row: &Row<'_>) -> rusqlite::Result<SiteRecord> {
    let status_time: String = row.get(4)?;
    let status_time = DateTime::parse_from_rfc3339(&status_time)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    Ok(SiteRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        name: row.get(2)?,
        status: SiteStatus::from_db_string(&row.get::<_, String>(3)?)
            .unwrap_or(SiteStatus::Failed),
        status_time,
        last_error: row.get(5)?,
    })
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        id: row.get(0)?,
        site_id: row.get(1)?,
        path: row.get(2)?,
        status_code: row.get(3)?,
        content: row.get(4)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Site Management =====

    fn insert_site(&mut self, url: &str, name: &str, status: SiteStatus) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO sites (url, name, status, status_time) VALUES (?1, ?2, ?3, ?4)",
            params![url, name, status.to_db_string(), now()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn find_site_by_url(&self, url: &str) -> StorageResult<Option<SiteRecord>> {
        let site = self
            .conn
            .query_row(
                &format!("SELECT {} FROM sites WHERE url = ?1 ORDER BY id LIMIT 1", SITE_COLUMNS),
                params![url],
                site_from_row,
            )
            .optional()?;
        Ok(site)
    }

    fn get_site(&self, site_id: i64) -> StorageResult<SiteRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM sites WHERE id = ?1", SITE_COLUMNS),
                params![site_id],
                site_from_row,
            )
            .optional()?
            .ok_or(StorageError::SiteNotFound(site_id))
    }

    fn list_sites(&self) -> StorageResult<Vec<SiteRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM sites ORDER BY id", SITE_COLUMNS))?;
        let sites = stmt
            .query_map([], site_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sites)
    }

    fn sites_with_status(&self, status: SiteStatus) -> StorageResult<Vec<SiteRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM sites WHERE status = ?1 ORDER BY id",
            SITE_COLUMNS
        ))?;
        let sites = stmt
            .query_map(params![status.to_db_string()], site_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sites)
    }

    fn count_sites_with_status(&self, status: SiteStatus) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sites WHERE status = ?1",
            params![status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn update_site_status(&mut self, site_id: i64, status: SiteStatus) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE sites SET status = ?1, status_time = ?2 WHERE id = ?3",
            params![status.to_db_string(), now(), site_id],
        )?;
        if updated == 0 {
            return Err(StorageError::SiteNotFound(site_id));
        }
        Ok(())
    }

    fn touch_site(&mut self, site_id: i64) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE sites SET status_time = ?1 WHERE id = ?2",
            params![now(), site_id],
        )?;
        Ok(())
    }

    fn update_site_error(&mut self, site_id: i64, error: Option<&str>) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE sites SET last_error = ?1 WHERE id = ?2",
            params![error, site_id],
        )?;
        Ok(())
    }

    // ===== Page Management =====

    fn insert_page(
        &mut self,
        site_id: i64,
        path: &str,
        status_code: u16,
        content: &str,
    ) -> StorageResult<Option<i64>> {
        let inserted = self.conn.execute(
            "INSERT INTO pages (site_id, path, status_code, content) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(site_id, path) DO NOTHING",
            params![site_id, path, status_code, content],
        )?;

        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(self.conn.last_insert_rowid()))
    }

    fn find_page(&self, site_id: i64, path: &str) -> StorageResult<Option<PageRecord>> {
        let page = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM pages WHERE site_id = ?1 AND path = ?2",
                    PAGE_COLUMNS
                ),
                params![site_id, path],
                page_from_row,
            )
            .optional()?;
        Ok(page)
    }

    fn get_page(&self, page_id: i64) -> StorageResult<PageRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM pages WHERE id = ?1", PAGE_COLUMNS),
                params![page_id],
                page_from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::PageNotFound(format!("Page ID {}", page_id)))
    }

    fn page_ids_for_site(&self, site_id: i64) -> StorageResult<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM pages WHERE site_id = ?1 ORDER BY id")?;
        let ids = stmt
            .query_map(params![site_id], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    fn count_pages(&self, site_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE site_id = ?1",
            params![site_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Lemma Management =====

    fn find_lemma(&self, site_id: i64, lemma: &str) -> StorageResult<Option<LemmaRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, site_id, lemma, frequency FROM lemmas WHERE site_id = ?1 AND lemma = ?2",
                params![site_id, lemma],
                |row| {
                    Ok(LemmaRecord {
                        id: row.get(0)?,
                        site_id: row.get(1)?,
                        lemma: row.get(2)?,
                        frequency: row.get::<_, i64>(3)?.max(0) as u64,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn count_lemmas(&self, site_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM lemmas WHERE site_id = ?1",
            params![site_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Link Management =====

    fn link_weight(&self, page_id: i64, lemma_id: i64) -> StorageResult<Option<f64>> {
        let weight = self
            .conn
            .query_row(
                "SELECT weight FROM links WHERE page_id = ?1 AND lemma_id = ?2",
                params![page_id, lemma_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(weight)
    }

    fn pages_with_lemma(&self, lemma_id: i64) -> StorageResult<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT page_id FROM links WHERE lemma_id = ?1 AND weight > 0 ORDER BY page_id")?;
        let ids = stmt
            .query_map(params![lemma_id], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    // ===== Index Maintenance =====

    fn index_page_lemmas(
        &mut self,
        site_id: i64,
        page_id: i64,
        counts: &HashMap<String, usize>,
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        for (lemma, &count) in counts {
            tx.execute(
                "INSERT INTO lemmas (site_id, lemma, frequency) VALUES (?1, ?2, 0)
                 ON CONFLICT(site_id, lemma) DO NOTHING",
                params![site_id, lemma],
            )?;
            let lemma_id: i64 = tx.query_row(
                "SELECT id FROM lemmas WHERE site_id = ?1 AND lemma = ?2",
                params![site_id, lemma],
                |row| row.get(0),
            )?;

            let weight = count as f64;
            let linked = tx.execute(
                "INSERT INTO links (page_id, lemma_id, weight) VALUES (?1, ?2, ?3)
                 ON CONFLICT(page_id, lemma_id) DO NOTHING",
                params![page_id, lemma_id, weight],
            )?;

            if linked == 1 {
                tx.execute(
                    "UPDATE lemmas SET frequency = frequency + 1 WHERE id = ?1",
                    params![lemma_id],
                )?;
            } else {
                tx.execute(
                    "UPDATE links SET weight = weight + ?1 WHERE page_id = ?2 AND lemma_id = ?3",
                    params![weight, page_id, lemma_id],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn remove_page(&mut self, page_id: i64) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        let lemma_ids = {
            let mut stmt = tx.prepare("SELECT lemma_id FROM links WHERE page_id = ?1")?;
            let ids = stmt
                .query_map(params![page_id], |row| row.get(0))?
                .collect::<Result<Vec<i64>, _>>()?;
            ids
        };

        tx.execute("DELETE FROM links WHERE page_id = ?1", params![page_id])?;

        for lemma_id in lemma_ids {
            tx.execute(
                "UPDATE lemmas SET frequency = frequency - 1 WHERE id = ?1",
                params![lemma_id],
            )?;
            tx.execute(
                "DELETE FROM lemmas WHERE id = ?1 AND frequency <= 0",
                params![lemma_id],
            )?;
        }

        tx.execute("DELETE FROM pages WHERE id = ?1", params![page_id])?;

        tx.commit()?;
        Ok(())
    }

    fn clear_site(&mut self, site_id: i64) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "DELETE FROM links WHERE page_id IN (SELECT id FROM pages WHERE site_id = ?1)",
            params![site_id],
        )?;
        tx.execute("DELETE FROM pages WHERE site_id = ?1", params![site_id])?;
        tx.execute("DELETE FROM lemmas WHERE site_id = ?1", params![site_id])?;
        tx.execute("DELETE FROM sites WHERE id = ?1", params![site_id])?;

        tx.commit()?;
        Ok(())
    }
}
