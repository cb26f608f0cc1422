//! The engine core shared by every statement type.
//!
//! An [`Engine`] owns a connection, an ordered registry of named clauses,
//! and a memoized result set. Builder calls route into named clauses; the
//! statement is the concatenation of every non-empty clause in registration
//! order; execution is lazy and cached until a clause mutates or
//! [`Engine::refresh`] is called.

use rusqlite::types::Value;
use tracing::warn;

use crate::{
    clause::{Clause, SharedFragments},
    connection::{DbConnection, ResultSet, Row},
    error::{DbError, Result},
    query::select::SelectQuery,
    value::SqlValue,
};

/// Clause composition, SQL assembly, and lazy cached execution.
///
/// Engines are single-threaded: clause stores shared across derived engines
/// are reference-counted, not synchronized.
#[derive(Debug)]
pub struct Engine {
    conn: DbConnection,
    clauses: Vec<(&'static str, Clause)>,
    refresh_rev: u64,
    cached_rev: Option<u64>,
    cached: Option<ResultSet>,
}

impl Engine {
    pub(crate) fn open(dsn: &str) -> Result<Self> {
        Ok(Self {
            conn: DbConnection::open(dsn)?,
            clauses: Vec::new(),
            refresh_rev: 0,
            cached_rev: None,
            cached: None,
        })
    }

    /// Opens a sibling engine over a fresh connection to the source's DSN.
    /// Clause sharing is decided by the statement type; the live connection
    /// handle is never shared.
    pub(crate) fn derive(source: &Engine) -> Result<Self> {
        Ok(Self {
            conn: source.conn.reopen()?,
            clauses: Vec::new(),
            refresh_rev: 0,
            cached_rev: None,
            cached: None,
        })
    }

    pub(crate) fn register(&mut self, name: &'static str, clause: Clause) {
        self.clauses.push((name, clause));
    }

    fn clause(&self, name: &str) -> Option<&Clause> {
        self.clauses
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| c)
    }

    /// Hands out the fragment store behind a registered clause, for sharing
    /// with a derived engine.
    pub(crate) fn share(&self, name: &str) -> Option<SharedFragments> {
        self.clause(name).map(Clause::store)
    }

    pub fn dsn(&self) -> &str {
        self.conn.dsn()
    }

    /// Routes one builder call into the named clause:
    ///
    /// - no column and no argument: reset the clause;
    /// - column only: positional add of the column text (raw fragment);
    /// - argument only: positional add of the value;
    /// - both: keyed add, upserting on the column name.
    ///
    /// An unknown clause name is a silent no-op.
    pub fn route(&mut self, name: &str, column: Option<&str>, argument: Option<SqlValue>) {
        let Some(clause) = self.clause(name) else {
            warn!(clause = name, "routing to unregistered clause; ignoring");
            return;
        };
        match (column, argument) {
            (None, None) => clause.reset(),
            (Some(col), None) => clause.add(None, SqlValue::Raw(col.to_string())),
            (None, Some(value)) => clause.add(None, value),
            (Some(col), Some(value)) => clause.add(Some(col.to_string()), value),
        }
    }

    /// Routes column/argument pairs pairwise. Mismatched lengths are a
    /// silent no-op: no clause changes at all.
    pub fn route_each(&mut self, name: &str, columns: &[&str], arguments: Vec<SqlValue>) {
        if columns.len() != arguments.len() {
            warn!(
                clause = name,
                columns = columns.len(),
                arguments = arguments.len(),
                "mismatched column/argument pair lengths; ignoring"
            );
            return;
        }
        for (column, argument) in columns.iter().zip(arguments) {
            self.route(name, Some(column), Some(argument));
        }
    }

    /// Routes one argument against every listed column.
    pub fn route_all(&mut self, name: &str, columns: &[&str], argument: SqlValue) {
        for column in columns {
            self.route(name, Some(column), Some(argument.clone()));
        }
    }

    /// Concatenates every registered clause's serialized text in
    /// registration order, skipping empty clauses.
    pub fn to_sql(&self) -> String {
        self.clauses
            .iter()
            .filter_map(|(_, clause)| clause.serialize())
            .collect()
    }

    fn revision(&self) -> u64 {
        self.clauses
            .iter()
            .map(|(_, clause)| clause.rev())
            .fold(self.refresh_rev, u64::wrapping_add)
    }

    /// Executes the assembled statement, memoizing the result set. While no
    /// clause has mutated since the last execution the cached result is
    /// returned and nothing touches the database; any mutation — including
    /// one made through a sibling engine sharing a clause store — forces
    /// re-execution, as does [`Engine::refresh`].
    pub fn result(&mut self) -> Result<&ResultSet> {
        let rev = self.revision();
        if self.cached_rev != Some(rev) || self.cached.is_none() {
            let set = self.conn.run(&self.to_sql())?;
            self.cached = Some(set);
            self.cached_rev = Some(rev);
        }
        Ok(self.cached.as_ref().expect("cache populated above"))
    }

    /// `result()` then every row.
    pub fn fetch(&mut self) -> Result<Vec<Row>> {
        Ok(self.result()?.rows().to_vec())
    }

    /// `result()` then the first row, if any.
    pub fn fetch_one(&mut self) -> Result<Option<Row>> {
        Ok(self.result()?.first().cloned())
    }

    /// Drops the memoized result set and forces the next `result()` call to
    /// re-execute. Use when the underlying data may have changed out from
    /// under the engine.
    pub fn refresh(&mut self) -> &mut Self {
        self.refresh_rev = self.refresh_rev.wrapping_add(1);
        self.cached = None;
        self.cached_rev = None;
        self
    }

    /// Runs arbitrary SQL (DDL, pragmas) on this engine's connection,
    /// bypassing clause assembly and the memoization layer. Call
    /// [`Engine::refresh`] afterwards if the statement modified data the
    /// engine has already fetched.
    pub fn execute_raw(&self, sql: &str) -> Result<ResultSet> {
        self.conn.run(sql)
    }

    /// Counts the rows the engine's source and filters select, via a derived
    /// SELECT statement projecting `count(*) as count`.
    pub fn count(&self) -> Result<u64> {
        let mut select = SelectQuery::derive(self)?;
        Self::count_with(&mut select)
    }

    /// Like [`Engine::count`], but reuses a caller-provided SELECT engine
    /// (typically one already derived from the same source). The engine's
    /// projection is replaced by the count column.
    pub fn count_with(select: &mut SelectQuery) -> Result<u64> {
        let engine = select.engine_mut();
        engine.route("select", None, None);
        engine.route("select", Some("count(*) as count"), None);
        let set = engine.result()?;
        let row = set.first().ok_or(DbError::MissingCount)?;
        match row.get("count") {
            Some(Value::Integer(n)) => u64::try_from(*n).map_err(|_| DbError::MalformedCount),
            _ => Err(DbError::MalformedCount),
        }
    }
}

impl From<&Engine> for SqlValue {
    /// Captures the engine's SQL as a subquery value. The SQL is rendered at
    /// capture time; later mutations of the engine do not flow into filters
    /// the value was attached to.
    fn from(engine: &Engine) -> Self {
        SqlValue::Subquery(engine.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::ClauseKind;

    fn test_engine() -> Engine {
        let mut engine = Engine::open(":memory:").unwrap();
        engine.register(
            "select",
            Clause::new(ClauseKind::Projection, "SELECT ", ", ", ""),
        );
        engine.register("from", Clause::new(ClauseKind::Source, " FROM ", ", ", ""));
        engine.register(
            "search",
            Clause::new(ClauseKind::Filter, " WHERE ", " AND ", ""),
        );
        engine
    }

    #[test]
    fn to_sql_concatenates_in_registration_order() {
        let mut engine = test_engine();
        engine.route("search", Some("age"), Some(SqlValue::from(30)));
        engine.route("from", Some("people"), None);
        assert_eq!(engine.to_sql(), "SELECT * FROM people WHERE age=30");
    }

    #[test]
    fn route_without_column_resets_the_clause() {
        let mut engine = test_engine();
        engine.route("search", Some("age"), Some(SqlValue::from(30)));
        engine.route("search", None, None);
        engine.route("from", Some("people"), None);
        assert_eq!(engine.to_sql(), "SELECT * FROM people");
    }

    #[test]
    fn route_to_unknown_clause_is_a_no_op() {
        let mut engine = test_engine();
        let rev = engine.revision();
        engine.route("nope", Some("age"), Some(SqlValue::from(30)));
        assert_eq!(engine.revision(), rev);
    }

    #[test]
    fn route_each_is_pairwise_from_the_first_pair() {
        let mut engine = test_engine();
        engine.route("from", Some("people"), None);
        engine.route_each(
            "search",
            &["age", "name"],
            vec![SqlValue::from(30), SqlValue::from("Bob")],
        );
        assert_eq!(
            engine.to_sql(),
            "SELECT * FROM people WHERE age=30 AND name LIKE 'Bob'"
        );
    }

    #[test]
    fn route_each_with_mismatched_lengths_changes_nothing() {
        let mut engine = test_engine();
        engine.route("from", Some("people"), None);
        engine.route_each("search", &["age", "name"], vec![SqlValue::from(30)]);
        assert_eq!(engine.to_sql(), "SELECT * FROM people");
    }

    #[test]
    fn route_all_broadcasts_one_argument() {
        let mut engine = test_engine();
        engine.route("from", Some("people"), None);
        engine.route_all("search", &["age", "retries"], SqlValue::from(0));
        assert_eq!(
            engine.to_sql(),
            "SELECT * FROM people WHERE age=0 AND retries=0"
        );
    }

    #[test]
    fn result_memoizes_until_a_clause_mutates() {
        let mut engine = test_engine();
        engine
            .execute_raw("CREATE TABLE people (id INTEGER PRIMARY KEY, age INTEGER)")
            .unwrap();
        engine
            .execute_raw("INSERT INTO people (age) VALUES (30), (40)")
            .unwrap();
        engine.route("from", Some("people"), None);

        assert_eq!(engine.fetch().unwrap().len(), 2);

        // Data changes behind the cache are invisible until invalidation.
        engine
            .execute_raw("INSERT INTO people (age) VALUES (50)")
            .unwrap();
        assert_eq!(engine.fetch().unwrap().len(), 2);

        // A clause mutation re-executes.
        engine.route("search", Some("age"), Some(SqlValue::from(50)));
        assert_eq!(engine.fetch().unwrap().len(), 1);
    }

    #[test]
    fn refresh_forces_re_execution() {
        let mut engine = test_engine();
        engine
            .execute_raw("CREATE TABLE t (n INTEGER)")
            .unwrap();
        engine.route("from", Some("t"), None);

        assert_eq!(engine.fetch().unwrap().len(), 0);
        engine.execute_raw("INSERT INTO t VALUES (1)").unwrap();
        assert_eq!(engine.fetch().unwrap().len(), 0);
        assert_eq!(engine.refresh().fetch().unwrap().len(), 1);
    }

    #[test]
    fn subquery_value_snapshots_the_engine_sql() {
        let mut sub = test_engine();
        sub.route("select", Some("id"), None);
        sub.route("from", Some("banned"), None);

        let value = SqlValue::from(&sub);
        assert_eq!(
            value,
            SqlValue::Subquery("SELECT id FROM banned".to_string())
        );

        let mut engine = test_engine();
        engine.route("from", Some("people"), None);
        engine.route("search", Some("id"), Some(value));
        assert_eq!(
            engine.to_sql(),
            "SELECT * FROM people WHERE id IN (SELECT id FROM banned)"
        );
    }
}
