pub mod migrations;
pub mod models;
pub mod queries;
pub mod repository;

use rusqlite::{Connection, ErrorCode, Transaction};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing::info;

pub use repository::{Patch, Record, Repository};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{table} record {id} already exists")]
    AlreadyExists { table: &'static str, id: String },

    #[error("{table} record {id} not found")]
    NotFound { table: &'static str, id: String },

    #[error("unknown attribute '{attribute}' on {table}")]
    UnknownAttribute { table: &'static str, attribute: String },

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("DB lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
                Self::Constraint(msg.clone().unwrap_or_else(|| e.to_string()))
            }
            _ => Self::Sqlite(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Single SQLite connection behind a mutex. Every access is serialized, which
/// is also what keeps an in-memory database coherent across handlers.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let db = Self::init(conn)?;

        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Self::init(Connection::open_in_memory()?)?;
        info!("In-memory database opened");
        Ok(db)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Runs `f` against the connection. Statements auto-commit individually.
    pub fn with_conn<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Connection) -> std::result::Result<T, E>,
        E: From<DbError>,
    {
        let conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&conn)
    }

    /// Runs `f` inside one transaction: committed when `f` returns `Ok`,
    /// rolled back when it returns `Err`.
    pub fn transaction<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> std::result::Result<T, E>,
        E: From<DbError>,
    {
        let mut conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        let tx = conn.transaction().map_err(DbError::from)?;
        let value = f(&tx)?;
        tx.commit().map_err(DbError::from)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AmenityRow, now};

    fn amenity(id: &str, name: &str) -> AmenityRow {
        let ts = now();
        AmenityRow {
            id: id.into(),
            name: name.into(),
            created_at: ts.clone(),
            updated_at: ts,
        }
    }

    #[test]
    fn transaction_commits_on_ok() {
        let db = Database::open_in_memory().unwrap();
        db.transaction(|tx| Repository::<AmenityRow>::new(tx).add(&amenity("a1", "Pool")))
            .unwrap();

        let count = db
            .with_conn(|conn| Repository::<AmenityRow>::new(conn).count())
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn transaction_rolls_back_on_err() {
        let db = Database::open_in_memory().unwrap();
        let result: Result<()> = db.transaction(|tx| {
            let repo = Repository::<AmenityRow>::new(tx);
            repo.add(&amenity("a1", "Pool"))?;
            repo.add(&amenity("a2", "Sauna"))?;
            Err(DbError::Constraint("forced".into()))
        });
        assert!(result.is_err());

        let count = db
            .with_conn(|conn| Repository::<AmenityRow>::new(conn).count())
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn unique_violation_maps_to_constraint() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| Repository::<AmenityRow>::new(conn).add(&amenity("a1", "Pool")))
            .unwrap();

        let err = db
            .with_conn(|conn| Repository::<AmenityRow>::new(conn).add(&amenity("a2", "POOL")))
            .unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)));
    }

    #[test]
    fn open_on_disk_runs_migrations_once() {
        let path = std::env::temp_dir().join(format!("hbnb-db-test-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        {
            let db = Database::open(&path).unwrap();
            db.with_conn(|conn| Repository::<AmenityRow>::new(conn).add(&amenity("a1", "Pool")))
                .unwrap();
        }
        let db = Database::open(&path).unwrap();
        let count = db
            .with_conn(|conn| Repository::<AmenityRow>::new(conn).count())
            .unwrap();
        assert_eq!(count, 1);

        drop(db);
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }
}
