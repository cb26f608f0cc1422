//! Database connection management.
//!
//! [`DbConnection`] wraps a `rusqlite` connection opened from a DSN. The DSN
//! is kept so a derived engine can re-open its own connection to the same
//! database; derivation shares clause state, never the live handle.
//!
//! Executed statements are materialized into an owned [`ResultSet`] because
//! rusqlite rows borrow their statement; the result set is what engines
//! memoize between executions.

use std::rc::Rc;

use rusqlite::types::Value;
use tracing::debug;

use crate::error::{DbError, Result};

/// A connection to a SQLite database, opened from a DSN.
///
/// The DSN is either `":memory:"` or a filesystem path. The underlying
/// connection is released when the value is dropped, on every exit path.
#[derive(Debug)]
pub struct DbConnection {
    conn: rusqlite::Connection,
    dsn: String,
}

impl DbConnection {
    /// Opens a connection to the database identified by `dsn`.
    pub fn open(dsn: &str) -> Result<Self> {
        let conn = rusqlite::Connection::open(dsn)
            .map_err(|e| DbError::Connection(e.to_string()))?;

        // WAL mode for better concurrent access. The pragma reports the
        // resulting mode, so it has to be read as a query.
        let _mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .map_err(|e| DbError::Connection(e.to_string()))?;

        Ok(Self {
            conn,
            dsn: dsn.to_string(),
        })
    }

    /// Opens a fresh connection to the same DSN.
    pub fn reopen(&self) -> Result<Self> {
        Self::open(&self.dsn)
    }

    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    /// Executes a single SQL statement and materializes every row it
    /// produces. Statements that return no rows (DDL, INSERT, UPDATE,
    /// DELETE) yield an empty result set carrying the change count.
    pub fn run(&self, sql: &str) -> Result<ResultSet> {
        debug!(%sql, "executing statement");
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Rc<Vec<String>> = Rc::new(
            stmt.column_names().into_iter().map(String::from).collect(),
        );

        let mut collected = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                values.push(row.get::<_, Value>(idx)?);
            }
            collected.push(Row {
                columns: Rc::clone(&columns),
                values,
            });
        }
        drop(rows);

        Ok(ResultSet {
            columns,
            rows: collected,
            changes: self.conn.changes() as usize,
        })
    }
}

/// The materialized outcome of one executed statement.
#[derive(Debug, Clone)]
pub struct ResultSet {
    columns: Rc<Vec<String>>,
    rows: Vec<Row>,
    changes: usize,
}

impl ResultSet {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows affected by the statement, as reported by the driver.
    pub fn changes(&self) -> usize {
        self.changes
    }
}

/// One materialized result row.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Rc<Vec<String>>,
    values: Vec<Value>,
}

impl Row {
    /// Looks a value up by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }

    /// Looks a value up by position.
    pub fn value(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_materializes_rows_and_columns() {
        let conn = DbConnection::open(":memory:").unwrap();
        conn.run("CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();
        conn.run("INSERT INTO people (name) VALUES ('Bob')").unwrap();

        let set = conn.run("SELECT id, name FROM people").unwrap();
        assert_eq!(set.columns().to_vec(), vec!["id", "name"]);
        assert_eq!(set.len(), 1);

        let row = set.first().unwrap();
        assert_eq!(row.get("name"), Some(&Value::Text("Bob".to_string())));
        assert_eq!(row.value(0), Some(&Value::Integer(1)));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn run_reports_change_counts() {
        let conn = DbConnection::open(":memory:").unwrap();
        conn.run("CREATE TABLE t (n INTEGER)").unwrap();
        conn.run("INSERT INTO t VALUES (1)").unwrap();
        conn.run("INSERT INTO t VALUES (2)").unwrap();

        let set = conn.run("UPDATE t SET n = n + 1").unwrap();
        assert!(set.is_empty());
        assert_eq!(set.changes(), 2);
    }

    #[test]
    fn driver_errors_propagate() {
        let conn = DbConnection::open(":memory:").unwrap();
        let err = conn.run("SELECT * FROM missing_table").unwrap_err();
        assert!(matches!(err, crate::error::DbError::Sqlite(_)));
    }

    #[test]
    fn reopen_targets_the_same_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let dsn = path.to_str().unwrap();

        let conn = DbConnection::open(dsn).unwrap();
        conn.run("CREATE TABLE t (n INTEGER)").unwrap();
        conn.run("INSERT INTO t VALUES (7)").unwrap();

        let other = conn.reopen().unwrap();
        assert_eq!(other.dsn(), dsn);
        let set = other.run("SELECT n FROM t").unwrap();
        assert_eq!(set.len(), 1);
    }
}
