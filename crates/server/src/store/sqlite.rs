// Record persistence using SQLite

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use xss_core::{IngestRecord, NewRecord};

use super::{RecordStore, StoreError, NO_SUCH_ID};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        // AUTOINCREMENT keeps ids monotonic even after delete-all
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS xss (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL,
                cookie TEXT NOT NULL,
                screenshot TEXT,
                trigger_time TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_xss_url
                ON xss(url);
        "#,
        )?;
        Ok(())
    }

    fn row_to_record(row: &Row<'_>) -> Result<IngestRecord, rusqlite::Error> {
        Ok(IngestRecord {
            id: row.get(0)?,
            url: row.get(1)?,
            cookie: row.get(2)?,
            screenshot: row.get(3)?,
            trigger_time: row.get(4)?,
        })
    }

    fn select_where(
        conn: &Connection,
        clause: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<IngestRecord>, StoreError> {
        let sql = format!(
            "SELECT id, url, cookie, screenshot, trigger_time FROM xss {clause} ORDER BY id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params, Self::row_to_record)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert(&self, record: NewRecord) -> Result<IngestRecord, StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO xss (url, cookie, screenshot, trigger_time) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.url,
                record.cookie,
                record.screenshot,
                record.trigger_time
            ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(record.with_id(id))
    }

    async fn update_screenshot_by_url(
        &self,
        url: &str,
        screenshot: Option<&str>,
    ) -> Result<Vec<IngestRecord>, StoreError> {
        let conn = self.lock()?;
        let count = conn.execute(
            "UPDATE xss SET screenshot = ?1 WHERE url = ?2",
            params![screenshot, url],
        )?;
        if count == 0 {
            return Ok(Vec::new());
        }
        Self::select_where(&conn, "WHERE url = ?1", params![url])
    }

    async fn update_screenshot_by_id(
        &self,
        id: i64,
        url: &str,
        screenshot: Option<&str>,
    ) -> Result<Vec<IngestRecord>, StoreError> {
        let conn = self.lock()?;
        let count = conn.execute(
            "UPDATE xss SET screenshot = ?1 WHERE id = ?2 AND url = ?3",
            params![screenshot, id, url],
        )?;
        if count == 0 {
            return Ok(Vec::new());
        }
        Self::select_where(&conn, "WHERE id = ?1", params![id])
    }

    async fn list(&self) -> Result<Vec<IngestRecord>, StoreError> {
        let conn = self.lock()?;
        Self::select_where(&conn, "", [])
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let count = conn.execute("DELETE FROM xss WHERE id = ?1", params![id])?;
        Ok(count > 0)
    }

    async fn delete_all(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count = conn.execute("DELETE FROM xss WHERE id <> ?1", params![NO_SUCH_ID])?;
        Ok(count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM xss", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}
