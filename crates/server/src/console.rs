//! Operator console over a record store.
//!
//! Holds the locally displayed record list and keeps it in step with the
//! store: every mutation is one store round trip, and the local list only
//! changes after the store confirms. A failed operation leaves the local
//! list exactly as it was.

use std::sync::Arc;

use thiserror::Error;
use xss_core::{cell_text, IngestRecord, PayloadSettings};

use crate::store::{RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("record store error: {0}")]
    Store(#[from] StoreError),

    #[error("record {0} is not in the list")]
    UnknownRecord(i64),

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}

/// Interactive yes/no prompt.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Answers every prompt the same way (`--yes`, tests).
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

/// Reads `y`/`yes` from stdin; anything else declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        use std::io::Write;

        eprint!("{prompt} [y/N] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ConsoleError>;
}

/// The desktop clipboard.
pub struct SystemClipboard(arboard::Clipboard);

impl SystemClipboard {
    pub fn open() -> Result<Self, ConsoleError> {
        arboard::Clipboard::new()
            .map(Self)
            .map_err(|e| ConsoleError::Clipboard(e.to_string()))
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ConsoleError> {
        self.0
            .set_text(text.to_string())
            .map_err(|e| ConsoleError::Clipboard(e.to_string()))
    }
}

/// A displayed record with its per-row expansion state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleRow {
    pub record: IngestRecord,
    pub url_expanded: bool,
    pub cookie_expanded: bool,
}

impl ConsoleRow {
    fn new(record: IngestRecord) -> Self {
        Self {
            record,
            url_expanded: false,
            cookie_expanded: false,
        }
    }

    pub fn url_text(&self) -> String {
        cell_text(&self.record.url, self.url_expanded)
    }

    pub fn cookie_text(&self) -> String {
        cell_text(&self.record.cookie, self.cookie_expanded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// Operator declined; the store was not contacted.
    Cancelled,
    Purged(usize),
}

pub struct AdminConsole {
    store: Arc<dyn RecordStore>,
    rows: Vec<ConsoleRow>,
}

impl AdminConsole {
    /// Fetch the full record set.
    pub async fn load(store: Arc<dyn RecordStore>) -> Result<Self, ConsoleError> {
        let rows = store.list().await?.into_iter().map(ConsoleRow::new).collect();
        Ok(Self { store, rows })
    }

    pub fn rows(&self) -> &[ConsoleRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn row_mut(&mut self, id: i64) -> Result<&mut ConsoleRow, ConsoleError> {
        self.rows
            .iter_mut()
            .find(|r| r.record.id == id)
            .ok_or(ConsoleError::UnknownRecord(id))
    }

    /// Flip full/truncated display of the url. Returns the new state.
    pub fn toggle_url(&mut self, id: i64) -> Result<bool, ConsoleError> {
        let row = self.row_mut(id)?;
        row.url_expanded = !row.url_expanded;
        Ok(row.url_expanded)
    }

    /// Flip full/truncated display of the cookie. Returns the new state.
    pub fn toggle_cookie(&mut self, id: i64) -> Result<bool, ConsoleError> {
        let row = self.row_mut(id)?;
        row.cookie_expanded = !row.cookie_expanded;
        Ok(row.cookie_expanded)
    }

    pub fn expand_all(&mut self) {
        for row in &mut self.rows {
            row.url_expanded = true;
            row.cookie_expanded = true;
        }
    }

    /// Delete `id` in the store, then drop it from the local list.
    ///
    /// Returns whether the store actually had the record.
    pub async fn delete_one(&mut self, id: i64) -> Result<bool, ConsoleError> {
        let deleted = self.store.delete_by_id(id).await?;
        self.rows.retain(|r| r.record.id != id);
        Ok(deleted)
    }

    /// Delete every record after `confirm` agrees.
    pub async fn delete_all(
        &mut self,
        confirm: &mut dyn Confirm,
    ) -> Result<PurgeOutcome, ConsoleError> {
        let prompt = format!("Delete all {} records?", self.rows.len());
        if !confirm.confirm(&prompt) {
            return Ok(PurgeOutcome::Cancelled);
        }
        let count = self.store.delete_all().await?;
        self.rows.clear();
        Ok(PurgeOutcome::Purged(count))
    }

    /// Decode the canned snippet and put it on `clipboard`. Returns the
    /// copied text.
    pub fn copy_payload(
        payload: &PayloadSettings,
        clipboard: &mut dyn Clipboard,
    ) -> Result<String, ConsoleError> {
        let text = payload.snippet();
        clipboard.set_text(&text)?;
        Ok(text)
    }

    /// Plain-text table of the current rows.
    pub fn render_table(&self) -> String {
        if self.rows.is_empty() {
            return "No records\n".to_string();
        }

        let mut out = format!(
            "{:<6} {:<19} {:<4} {:<36} {}\n",
            "ID", "TRIGGER TIME", "SHOT", "URL", "COOKIE"
        );
        for row in &self.rows {
            out.push_str(&format!(
                "{:<6} {:<19} {:<4} {:<36} {}\n",
                row.record.id,
                row.record.trigger_time,
                if row.record.has_screenshot() { "yes" } else { "-" },
                row.url_text(),
                row.cookie_text(),
            ));
        }
        out
    }
}
