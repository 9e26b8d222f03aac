//! User wallet database operations

use chrono::Utc;
use rusqlite::{OptionalExtension, Result as SqliteResult, Row};

use crate::models::Wallet;
use super::super::Database;

fn wallet_from_row(row: &Row) -> SqliteResult<Wallet> {
    let deleted: i64 = row.get(3)?;
    Ok(Wallet {
        id: row.get(0)?,
        user_id: row.get(1)?,
        address: row.get(2)?,
        deleted: deleted != 0,
        created_at: row.get(4)?,
    })
}

impl Database {
    pub fn add_wallet(&self, user_id: i64, address: &str) -> SqliteResult<Wallet> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO user_wallets (user_id, address, deleted, created_at) VALUES (?1, ?2, 0, ?3)",
            rusqlite::params![user_id, address, now],
        )?;

        Ok(Wallet {
            id: conn.last_insert_rowid(),
            user_id,
            address: address.to_string(),
            deleted: false,
            created_at: now,
        })
    }

    /// Soft delete. Returns false when the wallet does not exist or is already deleted.
    pub fn remove_wallet(&self, wallet_id: i64) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE user_wallets SET deleted = 1 WHERE id = ?1 AND deleted = 0",
            [wallet_id],
        )?;
        Ok(rows > 0)
    }

    /// Lookup by id, including deleted wallets
    pub fn get_wallet(&self, wallet_id: i64) -> SqliteResult<Option<Wallet>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, user_id, address, deleted, created_at FROM user_wallets WHERE id = ?1",
            [wallet_id],
            wallet_from_row,
        )
        .optional()
    }

    /// Active wallets of a user, oldest first
    pub fn list_wallets(&self, user_id: i64) -> SqliteResult<Vec<Wallet>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, address, deleted, created_at FROM user_wallets
             WHERE user_id = ?1 AND deleted = 0 ORDER BY id",
        )?;
        let rows = stmt.query_map([user_id], wallet_from_row)?;
        rows.collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;
    use crate::models::UserProfile;

    const ALICE: &str = "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th";
    const BOB: &str = "erd16adfsqvzky9t042tlmfujeq88g8wzuhnm2nzxfd0qgdx3ac82ydqr3ns5u";

    fn setup() -> (Database, i64) {
        let db = Database::new(":memory:").unwrap();
        let user = db
            .add_user(&UserProfile {
                tg_id: 1,
                username: None,
                first_name: "A".into(),
                last_name: None,
            })
            .unwrap();
        (db, user.id)
    }

    #[test]
    fn test_wallets_listed_in_insert_order() {
        let (db, user_id) = setup();
        let first = db.add_wallet(user_id, ALICE).unwrap();
        let second = db.add_wallet(user_id, BOB).unwrap();
        assert!(second.id > first.id);

        let wallets = db.list_wallets(user_id).unwrap();
        let addresses: Vec<&str> = wallets.iter().map(|w| w.address.as_str()).collect();
        assert_eq!(addresses, vec![ALICE, BOB]);
    }

    #[test]
    fn test_remove_is_soft_delete() {
        let (db, user_id) = setup();
        let wallet = db.add_wallet(user_id, ALICE).unwrap();

        assert!(db.remove_wallet(wallet.id).unwrap());
        assert!(db.list_wallets(user_id).unwrap().is_empty());

        let kept = db.get_wallet(wallet.id).unwrap().expect("row must survive removal");
        assert!(kept.deleted);
        assert_eq!(kept.address, ALICE);

        // second removal is a no-op
        assert!(!db.remove_wallet(wallet.id).unwrap());
        assert!(db.get_wallet(9999).unwrap().is_none());
    }
}
