//! DELETE statement engine.

use crate::{
    clause::{Clause, ClauseKind, SharedFragments},
    connection::ResultSet,
    error::Result,
    query::engine::Engine,
    value::SqlValue,
};

/// Builds and executes `DELETE FROM <table> WHERE ...` statements. Derived
/// from a SELECT-shaped engine it adopts that engine's table target and
/// filter predicates, deleting exactly what the source selects.
#[derive(Debug)]
pub struct DeleteQuery {
    engine: Engine,
}

impl DeleteQuery {
    pub fn open(dsn: &str) -> Result<Self> {
        let mut engine = Engine::open(dsn)?;
        Self::register(&mut engine, None, None);
        Ok(Self { engine })
    }

    /// Derives a DELETE engine sharing the source's table target and filter
    /// predicates.
    pub fn derive(source: &Engine) -> Result<Self> {
        let mut engine = Engine::derive(source)?;
        Self::register(&mut engine, source.share("from"), source.share("search"));
        Ok(Self { engine })
    }

    fn register(
        engine: &mut Engine,
        from: Option<SharedFragments>,
        search: Option<SharedFragments>,
    ) {
        engine.register(
            "from",
            match from {
                Some(store) => {
                    Clause::with_store(ClauseKind::Source, "DELETE FROM ", ", ", "", store)
                }
                None => Clause::new(ClauseKind::Source, "DELETE FROM ", ", ", ""),
            },
        );
        engine.register(
            "search",
            match search {
                Some(store) => {
                    Clause::with_store(ClauseKind::Filter, " WHERE ", " AND ", "", store)
                }
                None => Clause::new(ClauseKind::Filter, " WHERE ", " AND ", ""),
            },
        );
    }

    pub fn table(&mut self, name: &str) -> &mut Self {
        self.engine.route("from", Some(name), None);
        self
    }

    pub fn filter(&mut self, column: &str, argument: impl Into<SqlValue>) -> &mut Self {
        self.engine.route("search", Some(column), Some(argument.into()));
        self
    }

    pub fn filter_raw(&mut self, predicate: &str) -> &mut Self {
        self.engine.route("search", Some(predicate), None);
        self
    }

    /// Executes the deletion; filters are already in place (inherited or
    /// added here).
    pub fn delete(&mut self) -> Result<ResultSet> {
        Ok(self.engine.result()?.clone())
    }

    pub fn to_sql(&self) -> String {
        self.engine.to_sql()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::select::SelectQuery;

    #[test]
    fn delete_renders_table_and_filters() {
        let mut query = DeleteQuery::open(":memory:").unwrap();
        query.table("t").filter("id", 5);
        assert_eq!(query.to_sql(), "DELETE FROM t WHERE id=5");
    }

    #[test]
    fn derived_delete_inherits_the_selection() {
        let mut select = SelectQuery::open(":memory:").unwrap();
        select.table("t", None).filter("id", 5);

        let delete = DeleteQuery::derive(select.engine()).unwrap();
        assert_eq!(delete.to_sql(), "DELETE FROM t WHERE id=5");
    }

    #[test]
    fn sibling_mutation_is_visible_through_shared_clauses() {
        let mut select = SelectQuery::open(":memory:").unwrap();
        select.table("t", None);

        let delete = DeleteQuery::derive(select.engine()).unwrap();
        assert_eq!(delete.to_sql(), "DELETE FROM t");

        // Filter added through the SELECT side after derivation.
        select.filter("id", 5);
        assert_eq!(delete.to_sql(), "DELETE FROM t WHERE id=5");

        // And through the DELETE side, visible to the SELECT.
        let mut delete = delete;
        delete.filter("age", 30);
        assert_eq!(select.to_sql(), "SELECT * FROM t WHERE id=5 AND age=30");
    }

    #[test]
    fn delete_executes_against_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let dsn = path.to_str().unwrap();

        let mut select = SelectQuery::open(dsn).unwrap();
        select
            .engine()
            .execute_raw("CREATE TABLE people (id INTEGER PRIMARY KEY)")
            .unwrap();
        select
            .engine()
            .execute_raw("INSERT INTO people VALUES (1), (2), (3)")
            .unwrap();
        select.table("people", None).filter("id", 2);

        let mut delete = DeleteQuery::derive(select.engine()).unwrap();
        let set = delete.delete().unwrap();
        assert_eq!(set.changes(), 1);

        let remaining = select
            .engine()
            .execute_raw("SELECT * FROM people")
            .unwrap();
        assert_eq!(remaining.len(), 2);
    }
}
