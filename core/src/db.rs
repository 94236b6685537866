use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use rusqlite::{Connection, OptionalExtension, params};

use crate::auth;
use crate::models::{
    ConsumptionRecord, DEFAULT_DRINK_TYPE, NewConsumption, NewUser, Session, UpdateConsumption,
    UpdateProfile, UserProfile,
};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE,
                    password_hash TEXT NOT NULL,
                    age INTEGER,
                    weight_kg REAL,
                    daily_goal_liters REAL NOT NULL DEFAULT 2.0,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS consumption (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id INTEGER NOT NULL REFERENCES users(id),
                    quantity_ml INTEGER NOT NULL,
                    drink_type TEXT NOT NULL,
                    recorded_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS sessions (
                    token TEXT PRIMARY KEY,
                    user_id INTEGER NOT NULL REFERENCES users(id),
                    created_at TEXT NOT NULL,
                    expires_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_consumption_user_time
                    ON consumption(user_id, recorded_at);
                CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Users ---

    pub fn email_exists(&self, email: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM users WHERE email = ?1",
                params![email.trim().to_lowercase()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Insert a new user. The caller validates the input and checks for a
    /// duplicate email first; the UNIQUE constraint is the backstop.
    pub fn register_user(&self, user: &NewUser) -> Result<UserProfile> {
        let email = user.email.trim().to_lowercase();
        if self.email_exists(&email)? {
            bail!("Email '{email}' is already registered");
        }

        let password_hash = auth::hash_password(&user.password);
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO users (name, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user.name.trim(), email, password_hash, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_profile(id)?
            .context("Failed to read back new user")
    }

    /// Check credentials. Returns the profile on success, `None` for an
    /// unknown email or a wrong password — the caller cannot tell which.
    pub fn verify_login(&self, email: &str, password: &str) -> Result<Option<UserProfile>> {
        let email = email.trim().to_lowercase();
        let row: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT id, password_hash FROM users WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((id, stored)) = row else {
            return Ok(None);
        };
        if !auth::verify_password(password, &stored) {
            return Ok(None);
        }
        self.get_profile(id)
    }

    pub fn get_profile(&self, user_id: i64) -> Result<Option<UserProfile>> {
        self.conn
            .query_row(
                "SELECT id, name, email, age, weight_kg, daily_goal_liters
                 FROM users WHERE id = ?1",
                params![user_id],
                |row| {
                    Ok(UserProfile {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        age: row.get(3)?,
                        weight_kg: row.get(4)?,
                        daily_goal_liters: row.get(5)?,
                    })
                },
            )
            .optional()
            .context("database error")
    }

    /// Partial profile update: fields left `None` keep their value.
    pub fn update_profile(&self, user_id: i64, update: &UpdateProfile) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE users SET
                name = COALESCE(?1, name),
                age = COALESCE(?2, age),
                weight_kg = COALESCE(?3, weight_kg),
                daily_goal_liters = COALESCE(?4, daily_goal_liters)
             WHERE id = ?5",
            params![
                update.name.as_ref().map(|n| n.trim()),
                update.age,
                update.weight_kg,
                update.daily_goal_liters,
                user_id
            ],
        )?;
        Ok(changed > 0)
    }

    // --- Sessions ---

    pub fn create_session(&self, user_id: i64) -> Result<Session> {
        let token = auth::generate_token();
        let now = Local::now();
        let expires_at = (now + chrono::Duration::days(auth::SESSION_TTL_DAYS)).to_rfc3339();
        self.conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![token, user_id, now.to_rfc3339(), expires_at],
        )?;
        Ok(Session {
            token,
            user_id,
            expires_at,
        })
    }

    /// Resolve a session token to its user id. Expired sessions are
    /// treated as absent and removed on sight.
    pub fn session_user(&self, token: &str) -> Result<Option<i64>> {
        let row: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token = ?1",
                params![token],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((user_id, expires_at)) = row else {
            return Ok(None);
        };

        let expired = DateTime::parse_from_rfc3339(&expires_at)
            .map(|t| t <= Local::now())
            .unwrap_or(true);
        if expired {
            self.delete_session(token)?;
            return Ok(None);
        }
        Ok(Some(user_id))
    }

    pub fn delete_session(&self, token: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(deleted > 0)
    }

    pub fn purge_expired_sessions(&self) -> Result<usize> {
        let mut stmt = self
            .conn
            .prepare("SELECT token, expires_at FROM sessions")?;
        let rows: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        let now = Local::now();
        let mut purged = 0;
        for (token, expires_at) in rows {
            let expired = DateTime::parse_from_rfc3339(&expires_at)
                .map(|t| t <= now)
                .unwrap_or(true);
            if expired && self.delete_session(&token)? {
                purged += 1;
            }
        }
        Ok(purged)
    }

    // --- Consumption ---

    pub fn insert_consumption(
        &self,
        user_id: i64,
        new: &NewConsumption,
    ) -> Result<ConsumptionRecord> {
        let drink_type = if new.drink_type.trim().is_empty() {
            DEFAULT_DRINK_TYPE.to_string()
        } else {
            new.drink_type.trim().to_string()
        };
        let recorded_at = Local::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO consumption (user_id, quantity_ml, drink_type, recorded_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, new.quantity_ml, drink_type, recorded_at],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_consumption(id)?
            .context("Failed to read back new consumption record")
    }

    pub fn get_consumption(&self, id: i64) -> Result<Option<ConsumptionRecord>> {
        self.conn
            .query_row(
                "SELECT id, user_id, quantity_ml, drink_type, recorded_at
                 FROM consumption WHERE id = ?1",
                params![id],
                row_to_record,
            )
            .optional()
            .context("database error")
    }

    /// Full history for one user, most recent first.
    pub fn list_consumption(&self, user_id: i64) -> Result<Vec<ConsumptionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, quantity_ml, drink_type, recorded_at
             FROM consumption WHERE user_id = ?1 ORDER BY recorded_at DESC",
        )?;
        let records = stmt
            .query_map(params![user_id], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Update quantity and/or drink type of a record owned by `user_id`.
    /// Returns `None` when the id does not exist or belongs to someone else.
    pub fn update_consumption(
        &self,
        id: i64,
        user_id: i64,
        update: &UpdateConsumption,
    ) -> Result<Option<ConsumptionRecord>> {
        let changed = self.conn.execute(
            "UPDATE consumption SET
                quantity_ml = COALESCE(?1, quantity_ml),
                drink_type = COALESCE(?2, drink_type)
             WHERE id = ?3 AND user_id = ?4",
            params![
                update.quantity_ml,
                update.drink_type.as_ref().map(|d| d.trim()),
                id,
                user_id
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        self.get_consumption(id)
    }

    /// Delete a record owned by `user_id`. Returns false when absent or
    /// foreign.
    pub fn delete_consumption(&self, id: i64, user_id: i64) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM consumption WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(deleted > 0)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConsumptionRecord> {
    Ok(ConsumptionRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        quantity_ml: row.get(2)?,
        drink_type: row.get(3)?,
        recorded_at: row.get(4)?,
    })
}
