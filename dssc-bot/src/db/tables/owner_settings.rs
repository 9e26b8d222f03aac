//! Owner settings database operations

use chrono::Utc;
use rusqlite::{OptionalExtension, Result as SqliteResult};

use crate::models::OwnerSettings;
use super::super::Database;

impl Database {
    /// Get owner settings (there's at most one row)
    pub fn get_owner_settings(&self) -> SqliteResult<OwnerSettings> {
        let conn = self.conn();

        let settings = conn
            .query_row(
                "SELECT owner_address, owner_private_key FROM settings ORDER BY id LIMIT 1",
                [],
                |row| {
                    Ok(OwnerSettings {
                        address: row.get(0)?,
                        private_key: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(settings.unwrap_or_default())
    }

    pub fn get_owner_address(&self) -> SqliteResult<Option<String>> {
        Ok(self.get_owner_settings()?.address)
    }

    /// Insert the settings row if absent, else update the row holding the current address
    pub fn set_owner_address(&self, address: &str) -> SqliteResult<()> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();

        let current: Option<(i64, Option<String>)> = conn
            .query_row(
                "SELECT id, owner_address FROM settings ORDER BY id LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match current {
            None => {
                conn.execute(
                    "INSERT INTO settings (owner_address, updated_at) VALUES (?1, ?2)",
                    rusqlite::params![address, &now],
                )?;
            }
            Some((_, Some(old))) => {
                conn.execute(
                    "UPDATE settings SET owner_address = ?1, updated_at = ?2 WHERE owner_address = ?3",
                    rusqlite::params![address, &now, &old],
                )?;
            }
            Some((id, None)) => {
                conn.execute(
                    "UPDATE settings SET owner_address = ?1, updated_at = ?2 WHERE id = ?3",
                    rusqlite::params![address, &now, id],
                )?;
            }
        }
        Ok(())
    }

    pub fn set_owner_private_key(&self, private_key: &str) -> SqliteResult<()> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();

        let updated = conn.execute(
            "UPDATE settings SET owner_private_key = ?1, updated_at = ?2",
            rusqlite::params![private_key, &now],
        )?;
        if updated == 0 {
            conn.execute(
                "INSERT INTO settings (owner_private_key, updated_at) VALUES (?1, ?2)",
                rusqlite::params![private_key, &now],
            )?;
        }
        Ok(())
    }

    pub fn clear_owner_private_key(&self) -> SqliteResult<()> {
        let conn = self.conn();
        conn.execute(
            "UPDATE settings SET owner_private_key = NULL, updated_at = ?1",
            [Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    const ALICE: &str = "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th";
    const BOB: &str = "erd16adfsqvzky9t042tlmfujeq88g8wzuhnm2nzxfd0qgdx3ac82ydqr3ns5u";

    fn row_count(db: &Database) -> i64 {
        db.conn()
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_empty_settings() {
        let db = Database::new(":memory:").unwrap();
        let settings = db.get_owner_settings().unwrap();
        assert!(settings.address.is_none());
        assert!(settings.private_key.is_none());
    }

    #[test]
    fn test_owner_address_upsert_keeps_single_row() {
        let db = Database::new(":memory:").unwrap();

        db.set_owner_address(ALICE).unwrap();
        assert_eq!(row_count(&db), 1);
        assert_eq!(db.get_owner_address().unwrap().as_deref(), Some(ALICE));

        db.set_owner_address(BOB).unwrap();
        assert_eq!(row_count(&db), 1);
        assert_eq!(db.get_owner_address().unwrap().as_deref(), Some(BOB));
    }

    #[test]
    fn test_private_key_before_and_after_address() {
        let db = Database::new(":memory:").unwrap();

        db.set_owner_private_key("aa").unwrap();
        db.set_owner_address(ALICE).unwrap();
        assert_eq!(row_count(&db), 1);

        let settings = db.get_owner_settings().unwrap();
        assert_eq!(settings.address.as_deref(), Some(ALICE));
        assert_eq!(settings.private_key.as_deref(), Some("aa"));

        db.set_owner_private_key("bb").unwrap();
        assert_eq!(db.get_owner_settings().unwrap().private_key.as_deref(), Some("bb"));

        db.clear_owner_private_key().unwrap();
        assert!(db.get_owner_settings().unwrap().private_key.is_none());
        assert_eq!(db.get_owner_address().unwrap().as_deref(), Some(ALICE));
    }
}
