//! Pending prompt registry
//!
//! Maps a prompt message (chat id + message id) to the kind of answer it expects.

use chrono::{Duration, SecondsFormat, Utc};
use rusqlite::{OptionalExtension, Result as SqliteResult};

use crate::models::PromptKind;
use super::super::Database;

/// Prompts nobody answered within this window are forgotten
pub const PROMPT_TTL_DAYS: i64 = 7;

fn timestamp(at: chrono::DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl Database {
    /// Record a prompt and drop the ones that expired
    pub fn record_pending_prompt(&self, chat_id: i64, message_id: i32, kind: PromptKind) -> SqliteResult<()> {
        let now = Utc::now();
        let conn = self.conn();
        conn.execute(
            "DELETE FROM pending_prompts WHERE created_at < ?1",
            [timestamp(now - Duration::days(PROMPT_TTL_DAYS))],
        )?;
        conn.execute(
            "INSERT OR REPLACE INTO pending_prompts (chat_id, message_id, kind, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![chat_id, message_id, kind.tag(), timestamp(now)],
        )?;
        Ok(())
    }

    /// Forget a prompt once its answer went through
    pub fn delete_pending_prompt(&self, chat_id: i64, message_id: i32) -> SqliteResult<()> {
        let conn = self.conn();
        conn.execute(
            "DELETE FROM pending_prompts WHERE chat_id = ?1 AND message_id = ?2",
            rusqlite::params![chat_id, message_id],
        )?;
        Ok(())
    }

    /// Unknown tags (e.g. from a newer build) read as no record
    pub fn get_pending_prompt(&self, chat_id: i64, message_id: i32) -> SqliteResult<Option<PromptKind>> {
        let conn = self.conn();
        let tag: Option<String> = conn
            .query_row(
                "SELECT kind FROM pending_prompts WHERE chat_id = ?1 AND message_id = ?2",
                rusqlite::params![chat_id, message_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(tag.and_then(|t| PromptKind::from_tag(&t)))
    }
}
