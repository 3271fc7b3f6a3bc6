//! Id-keyed CRUD over any table described by a [`Record`].
//!
//! SQL is assembled only from the `TABLE`/`COLUMNS` constants; caller-provided
//! attribute names are checked against them before use.

use std::marker::PhantomData;

use rusqlite::types::{ToSql, Value};
use rusqlite::{Connection, OptionalExtension, Row, params_from_iter};
use tracing::debug;

use crate::models::now;
use crate::{DbError, Result};

pub trait Record: Sized {
    const TABLE: &'static str;
    /// Every column, `id` first, `created_at`/`updated_at` last.
    const COLUMNS: &'static [&'static str];
    /// Columns a [`Patch`] may touch.
    const MUTABLE: &'static [&'static str];

    fn id(&self) -> &str;
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
    /// Values in `COLUMNS` order.
    fn to_values(&self) -> Vec<Value>;
}

/// Named field changes for [`Repository::update`].
#[derive(Debug, Default, Clone)]
pub struct Patch {
    fields: Vec<(String, Value)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub struct Repository<'c, R> {
    conn: &'c Connection,
    _record: PhantomData<R>,
}

impl<'c, R: Record> Repository<'c, R> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            _record: PhantomData,
        }
    }

    fn select_sql(filter: &str) -> String {
        format!(
            "SELECT {} FROM {} {} ORDER BY rowid",
            R::COLUMNS.join(", "),
            R::TABLE,
            filter
        )
    }

    fn check_attribute(name: &str) -> Result<()> {
        if R::COLUMNS.contains(&name) {
            Ok(())
        } else {
            Err(DbError::UnknownAttribute {
                table: R::TABLE,
                attribute: name.to_string(),
            })
        }
    }

    fn exists(&self, id: &str) -> Result<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?1", R::TABLE);
        let found = self
            .conn
            .query_row(&sql, [id], |_| Ok(()))
            .optional()?
            .is_some();
        Ok(found)
    }

    /// Inserts a new record. Fails if the id is already taken.
    pub fn add(&self, record: &R) -> Result<()> {
        if self.exists(record.id())? {
            return Err(DbError::AlreadyExists {
                table: R::TABLE,
                id: record.id().to_string(),
            });
        }

        let placeholders: Vec<String> = (1..=R::COLUMNS.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            R::TABLE,
            R::COLUMNS.join(", "),
            placeholders.join(", ")
        );
        self.conn.execute(&sql, params_from_iter(record.to_values()))?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<R>> {
        let sql = Self::select_sql("WHERE id = ?1");
        let row = self.conn.query_row(&sql, [id], R::from_row).optional()?;
        Ok(row)
    }

    /// All records in insertion order.
    pub fn get_all(&self) -> Result<Vec<R>> {
        let mut stmt = self.conn.prepare(&Self::select_sql(""))?;
        let rows = stmt
            .query_map([], R::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Applies the mutable fields of `patch` and refreshes `updated_at`.
    /// Names that are not mutable columns of this table are skipped.
    pub fn update(&self, id: &str, patch: &Patch) -> Result<R> {
        if !self.exists(id)? {
            return Err(DbError::NotFound {
                table: R::TABLE,
                id: id.to_string(),
            });
        }

        let mut assignments = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        for (name, value) in &patch.fields {
            if !R::MUTABLE.contains(&name.as_str()) {
                debug!("Skipping non-updatable field '{}' on {}", name, R::TABLE);
                continue;
            }
            values.push(value.clone());
            assignments.push(format!("{} = ?{}", name, values.len()));
        }

        values.push(now().into());
        assignments.push(format!("updated_at = ?{}", values.len()));
        values.push(id.to_string().into());

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            R::TABLE,
            assignments.join(", "),
            values.len()
        );
        self.conn.execute(&sql, params_from_iter(values))?;

        self.get(id)?.ok_or_else(|| DbError::NotFound {
            table: R::TABLE,
            id: id.to_string(),
        })
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", R::TABLE);
        let affected = self.conn.execute(&sql, [id])?;
        if affected == 0 {
            return Err(DbError::NotFound {
                table: R::TABLE,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// First record, in insertion order, whose `name` column equals `value`.
    pub fn get_by_attribute(&self, name: &str, value: impl ToSql) -> Result<Option<R>> {
        Self::check_attribute(name)?;
        let sql = Self::select_sql(&format!("WHERE {} = ?1", name));
        let row = self.conn.query_row(&sql, [value], R::from_row).optional()?;
        Ok(row)
    }

    pub fn count(&self) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", R::TABLE);
        let count: i64 = self.conn.query_row(&sql, [], |r| r.get(0))?;
        Ok(count.max(0) as u64)
    }

    pub fn count_by_attribute(&self, name: &str, value: impl ToSql) -> Result<u64> {
        Self::check_attribute(name)?;
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", R::TABLE, name);
        let count: i64 = self.conn.query_row(&sql, [value], |r| r.get(0))?;
        Ok(count.max(0) as u64)
    }
}
