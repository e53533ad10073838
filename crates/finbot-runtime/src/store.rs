//! Session store: saved financial profiles, keyed by an integer id.
//!
//! SQLite-backed. Amount columns have no declared type, so each value keeps
//! its own storage class: REAL for numbers, TEXT for text exactly as
//! written, NULL when missing. Reading a session back returns the profile
//! that was saved.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use finbot_core::{AmountInput, FinancialProfile, UserType};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session {id}: {reason}")]
    Corrupt { id: i64, reason: String },
}

/// A saved profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub profile: FinancialProfile,
    pub created_at: DateTime<Utc>,
}

/// Append-only profile storage.
pub trait SessionStore: Send + Sync {
    /// Save a profile and return its new id.
    fn append(&self, profile: &FinancialProfile) -> Result<i64, StoreError>;

    /// Find a saved session; `None` when the id is unknown.
    fn lookup(&self, id: i64) -> Result<Option<Session>, StoreError>;
}

pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
}

impl SqliteSessionStore {
    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let store = Self {
            conn: Mutex::new(Connection::open(path)?),
        };
        store.init_schema()?;
        tracing::info!(path = %path.display(), "Session store opened");
        Ok(store)
    }

    /// A private in-memory database.
    pub fn in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_type TEXT NOT NULL,
                chat_history TEXT NOT NULL DEFAULT '',
                income,
                expenses,
                goal TEXT NOT NULL DEFAULT '',
                goal_amount,
                created_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        Ok(())
    }
}

impl SessionStore for SqliteSessionStore {
    fn append(&self, profile: &FinancialProfile) -> Result<i64, StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO sessions (user_type, chat_history, income, expenses, goal, goal_amount, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                profile.user_type.as_str(),
                profile.chat_history,
                amount_to_sql(&profile.income),
                amount_to_sql(&profile.expenses),
                profile.goal,
                amount_to_sql(&profile.goal_amount),
                Utc::now(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(session_id = id, "Session saved");
        Ok(id)
    }

    fn lookup(&self, id: i64) -> Result<Option<Session>, StoreError> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                "SELECT id, user_type, chat_history, income, expenses, goal, goal_amount, created_at
                 FROM sessions WHERE id = ?1",
                params![id],
                read_row,
            )
            .optional()?;

        let Some(raw) = row else {
            return Ok(None);
        };

        let user_type = raw.user_type.parse::<UserType>().map_err(|e| StoreError::Corrupt {
            id,
            reason: e.to_string(),
        })?;

        Ok(Some(Session {
            id: raw.id,
            profile: FinancialProfile {
                user_type,
                income: amount_from_sql(raw.income),
                expenses: amount_from_sql(raw.expenses),
                goal: raw.goal,
                goal_amount: amount_from_sql(raw.goal_amount),
                chat_history: raw.chat_history,
            },
            created_at: raw.created_at,
        }))
    }
}

/// A row before its user type is validated.
struct RawSession {
    id: i64,
    user_type: String,
    chat_history: String,
    income: Value,
    expenses: Value,
    goal: String,
    goal_amount: Value,
    created_at: DateTime<Utc>,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawSession> {
    Ok(RawSession {
        id: row.get(0)?,
        user_type: row.get(1)?,
        chat_history: row.get(2)?,
        income: row.get(3)?,
        expenses: row.get(4)?,
        goal: row.get(5)?,
        goal_amount: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn amount_to_sql(amount: &Option<AmountInput>) -> Value {
    match amount {
        None => Value::Null,
        // SQLite binds NaN as NULL
        Some(AmountInput::Number(n)) if !n.is_finite() => Value::Text(n.to_string()),
        Some(AmountInput::Number(n)) => Value::Real(*n),
        Some(AmountInput::Text(s)) => Value::Text(s.clone()),
    }
}

fn amount_from_sql(value: Value) -> Option<AmountInput> {
    match value {
        Value::Null => None,
        Value::Real(n) => Some(AmountInput::Number(n)),
        Value::Integer(n) => Some(AmountInput::Number(n as f64)),
        Value::Text(s) => Some(AmountInput::Text(s)),
        Value::Blob(bytes) => Some(AmountInput::Text(String::from_utf8_lossy(&bytes).into_owned())),
    }
}
