//! The caller-facing database facade.

use crate::{
    connection::{ResultSet, Row},
    error::Result,
    query::{DeleteQuery, Engine, InsertQuery, SelectQuery, UpdateQuery},
    value::SqlValue,
};

/// A SELECT-shaped engine that also dispatches INSERT, UPDATE, and DELETE by
/// deriving the matching statement engine from itself. The derived engine
/// inherits the facade's table target and filter predicates, so
/// `db.table("people").filter("id", 5).delete()` deletes exactly what the
/// same chain would select.
///
/// This is the entry point callers construct directly from a DSN.
///
/// # Example
///
/// ```no_run
/// use quill_db::Database;
///
/// # fn main() -> quill_db::Result<()> {
/// let mut db = Database::open("people.db")?;
/// db.table("people", None).filter("age", 30);
/// let rows = db.fetch()?;
/// let remaining = db.count()?;
/// db.delete()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Database {
    inner: SelectQuery,
}

impl Database {
    /// Opens a database facade on the database identified by `dsn`.
    pub fn open(dsn: &str) -> Result<Self> {
        Ok(Self {
            inner: SelectQuery::open(dsn)?,
        })
    }

    pub fn table(&mut self, name: &str, alias: Option<&str>) -> &mut Self {
        self.inner.table(name, alias);
        self
    }

    pub fn filter(&mut self, column: &str, argument: impl Into<SqlValue>) -> &mut Self {
        self.inner.filter(column, argument);
        self
    }

    pub fn filter_raw(&mut self, predicate: &str) -> &mut Self {
        self.inner.filter_raw(predicate);
        self
    }

    pub fn filter_each(&mut self, columns: &[&str], arguments: Vec<SqlValue>) -> &mut Self {
        self.inner.filter_each(columns, arguments);
        self
    }

    pub fn filter_all(&mut self, columns: &[&str], argument: impl Into<SqlValue>) -> &mut Self {
        self.inner.filter_all(columns, argument);
        self
    }

    pub fn select(&mut self, column: &str) -> &mut Self {
        self.inner.select(column);
        self
    }

    pub fn select_all(&mut self) -> &mut Self {
        self.inner.select_all();
        self
    }

    pub fn group_by(&mut self, column: &str) -> &mut Self {
        self.inner.group_by(column);
        self
    }

    pub fn order_by(&mut self, column: &str) -> &mut Self {
        self.inner.order_by(column);
        self
    }

    pub fn to_sql(&self) -> String {
        self.inner.to_sql()
    }

    pub fn result(&mut self) -> Result<&ResultSet> {
        self.inner.result()
    }

    pub fn fetch(&mut self) -> Result<Vec<Row>> {
        self.inner.fetch()
    }

    pub fn fetch_one(&mut self) -> Result<Option<Row>> {
        self.inner.fetch_one()
    }

    pub fn count(&self) -> Result<u64> {
        self.inner.count()
    }

    /// Drops the memoized result set; the next fetch re-executes. Call this
    /// after `insert`/`update`/`delete` if previously fetched rows are still
    /// needed fresh.
    pub fn refresh(&mut self) -> &mut Self {
        self.inner.refresh();
        self
    }

    /// Inserts one object-shaped record via a derived INSERT engine. A
    /// non-object record does nothing and returns `Ok(None)`.
    pub fn insert(&mut self, record: &serde_json::Value) -> Result<Option<ResultSet>> {
        let mut insert = InsertQuery::derive(self.inner.engine())?;
        insert.insert(record)
    }

    /// Applies one object-shaped record as assignments via a derived UPDATE
    /// engine, constrained by the facade's current filters.
    pub fn update(&mut self, record: &serde_json::Value) -> Result<Option<ResultSet>> {
        let mut update = UpdateQuery::derive(self.inner.engine())?;
        update.update(record)
    }

    /// Deletes whatever the facade's current table and filters select.
    pub fn delete(&mut self) -> Result<ResultSet> {
        let mut delete = DeleteQuery::derive(self.inner.engine())?;
        delete.delete()
    }

    /// Runs arbitrary SQL on the facade's own connection.
    pub fn execute_raw(&self, sql: &str) -> Result<ResultSet> {
        self.inner.engine().execute_raw(sql)
    }

    pub fn engine(&self) -> &Engine {
        self.inner.engine()
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        self.inner.engine_mut()
    }
}

impl From<&Database> for SqlValue {
    fn from(db: &Database) -> Self {
        SqlValue::from(db.engine())
    }
}
