//! User registry database operations

use chrono::Utc;
use rusqlite::{OptionalExtension, Result as SqliteResult, Row};

use crate::models::{User, UserProfile};
use super::super::Database;

const USER_COLUMNS: &str =
    "id, tg_id, username, first_name, last_name, last_menu_id, created_at";

fn user_from_row(row: &Row) -> SqliteResult<User> {
    Ok(User {
        id: row.get(0)?,
        profile: UserProfile {
            tg_id: row.get(1)?,
            username: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
        },
        last_menu_id: row.get(5)?,
        wallets: Vec::new(),
        created_at: row.get(6)?,
    })
}

impl Database {
    /// Look up a user by Telegram id, with their active wallets
    pub fn get_user_by_tg_id(&self, tg_id: i64) -> SqliteResult<Option<User>> {
        let user = {
            let conn = self.conn();
            conn.query_row(
                &format!("SELECT {} FROM users WHERE tg_id = ?1", USER_COLUMNS),
                [tg_id],
                user_from_row,
            )
            .optional()?
        };

        match user {
            Some(mut user) => {
                user.wallets = self.list_wallets(user.id)?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    pub fn add_user(&self, profile: &UserProfile) -> SqliteResult<User> {
        {
            let conn = self.conn();
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO users (tg_id, username, first_name, last_name, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                rusqlite::params![
                    profile.tg_id,
                    profile.username,
                    profile.first_name,
                    profile.last_name,
                    now
                ],
            )?;
        }
        self.get_user_by_tg_id(profile.tg_id)?
            .ok_or(rusqlite::Error::QueryReturnedNoRows)
    }

    /// Refresh names when the platform reports a change. Returns whether a row changed.
    pub fn update_user_profile(&self, profile: &UserProfile) -> SqliteResult<bool> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE users SET username = ?2, first_name = ?3, last_name = ?4, updated_at = ?5
             WHERE tg_id = ?1
               AND (username IS NOT ?2 OR first_name IS NOT ?3 OR last_name IS NOT ?4)",
            rusqlite::params![
                profile.tg_id,
                profile.username,
                profile.first_name,
                profile.last_name,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn set_last_menu_id(&self, user_id: i64, message_id: Option<i32>) -> SqliteResult<()> {
        let conn = self.conn();
        conn.execute(
            "UPDATE users SET last_menu_id = ?1 WHERE id = ?2",
            rusqlite::params![message_id, user_id],
        )?;
        Ok(())
    }

    pub fn list_users(&self) -> SqliteResult<Vec<User>> {
        let mut users = {
            let conn = self.conn();
            let mut stmt = conn.prepare(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))?;
            let rows = stmt.query_map([], user_from_row)?;
            rows.collect::<SqliteResult<Vec<_>>>()?
        };

        for user in users.iter_mut() {
            user.wallets = self.list_wallets(user.id)?;
        }
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;
    use crate::models::UserProfile;

    fn profile(tg_id: i64) -> UserProfile {
        UserProfile {
            tg_id,
            username: Some(format!("user{}", tg_id)),
            first_name: "First".to_string(),
            last_name: None,
        }
    }

    #[test]
    fn test_add_and_get_user() {
        let db = Database::new(":memory:").unwrap();
        assert!(db.get_user_by_tg_id(7).unwrap().is_none());

        let user = db.add_user(&profile(7)).unwrap();
        assert_eq!(user.tg_id(), 7);
        assert!(user.wallets.is_empty());
        assert!(user.last_menu_id.is_none());

        let loaded = db.get_user_by_tg_id(7).unwrap().unwrap();
        assert_eq!(loaded.id, user.id);
        assert_eq!(loaded.profile, profile(7));
    }

    #[test]
    fn test_duplicate_user_rejected() {
        let db = Database::new(":memory:").unwrap();
        db.add_user(&profile(7)).unwrap();
        assert!(db.add_user(&profile(7)).is_err());
    }

    #[test]
    fn test_update_profile_only_when_changed() {
        let db = Database::new(":memory:").unwrap();
        db.add_user(&profile(7)).unwrap();

        assert!(!db.update_user_profile(&profile(7)).unwrap());

        let mut renamed = profile(7);
        renamed.last_name = Some("Last".to_string());
        assert!(db.update_user_profile(&renamed).unwrap());
        assert_eq!(db.get_user_by_tg_id(7).unwrap().unwrap().profile, renamed);
    }

    #[test]
    fn test_last_menu_id_and_listing() {
        let db = Database::new(":memory:").unwrap();
        let a = db.add_user(&profile(1)).unwrap();
        db.add_user(&profile(2)).unwrap();

        db.set_last_menu_id(a.id, Some(99)).unwrap();
        assert_eq!(db.get_user_by_tg_id(1).unwrap().unwrap().last_menu_id, Some(99));

        db.add_wallet(a.id, "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th")
            .unwrap();
        let users = db.list_users().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].wallets.len(), 1);
        assert!(users[1].wallets.is_empty());
    }
}
