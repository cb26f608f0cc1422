//! SELECT statement engine.

use crate::{
    clause::{Clause, ClauseKind, SharedFragments},
    connection::{ResultSet, Row},
    error::Result,
    query::engine::Engine,
    value::SqlValue,
};

/// Builds and executes `SELECT` statements.
///
/// Clauses render in registration order: projection, source, filters,
/// grouping, ordering. With no projected columns the statement falls back to
/// `SELECT *`.
///
/// # Example
///
/// ```no_run
/// use quill_db::SelectQuery;
///
/// # fn main() -> quill_db::Result<()> {
/// let mut people = SelectQuery::open("people.db")?;
/// people
///     .table("people", None)
///     .select("name")
///     .filter("age", 30)
///     .order_by("name");
/// assert_eq!(people.to_sql(), "SELECT name FROM people WHERE age=30 ORDER BY name");
/// let rows = people.fetch()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SelectQuery {
    engine: Engine,
}

impl SelectQuery {
    /// Opens a new SELECT engine on the database identified by `dsn`.
    pub fn open(dsn: &str) -> Result<Self> {
        let mut engine = Engine::open(dsn)?;
        Self::register(&mut engine, None, None);
        Ok(Self { engine })
    }

    /// Derives a SELECT engine from another engine: fresh connection to the
    /// same DSN, sharing the source's table target and filter predicates by
    /// reference. Mutations through either engine are visible to both.
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
            "select",
            Clause::new(ClauseKind::Projection, "SELECT ", ", ", ""),
        );
        engine.register(
            "from",
            match from {
                Some(store) => Clause::with_store(ClauseKind::Source, " FROM ", ", ", "", store),
                None => Clause::new(ClauseKind::Source, " FROM ", ", ", ""),
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
        engine.register(
            "group",
            Clause::new(ClauseKind::Plain, " GROUP BY ", ", ", ""),
        );
        engine.register(
            "sort",
            Clause::new(ClauseKind::Plain, " ORDER BY ", ", ", ""),
        );
    }

    /// Sets the source table, optionally aliased (`table AS alias`).
    pub fn table(&mut self, name: &str, alias: Option<&str>) -> &mut Self {
        match alias {
            Some(alias) => {
                self.engine
                    .route("from", Some(name), Some(SqlValue::Raw(alias.to_string())))
            }
            None => self.engine.route("from", Some(name), None),
        }
        self
    }

    /// Adds a filter predicate. The rendered shape follows the argument:
    /// text becomes `LIKE`, a list becomes `IN (...)`, an engine becomes an
    /// `IN (<subquery>)`, anything else an equality.
    pub fn filter(&mut self, column: &str, argument: impl Into<SqlValue>) -> &mut Self {
        self.engine.route("search", Some(column), Some(argument.into()));
        self
    }

    /// Adds a pre-built boolean predicate, rendered verbatim.
    pub fn filter_raw(&mut self, predicate: &str) -> &mut Self {
        self.engine.route("search", Some(predicate), None);
        self
    }

    /// Adds filters pairwise from equal-length column and argument lists.
    /// Mismatched lengths are a silent no-op.
    pub fn filter_each(&mut self, columns: &[&str], arguments: Vec<SqlValue>) -> &mut Self {
        self.engine.route_each("search", columns, arguments);
        self
    }

    /// Filters every listed column against the same argument.
    pub fn filter_all(&mut self, columns: &[&str], argument: impl Into<SqlValue>) -> &mut Self {
        self.engine.route_all("search", columns, argument.into());
        self
    }

    /// Projects a column (or any selectable expression).
    pub fn select(&mut self, column: &str) -> &mut Self {
        self.engine.route("select", Some(column), None);
        self
    }

    /// Clears the projection back to the wildcard default.
    pub fn select_all(&mut self) -> &mut Self {
        self.engine.route("select", None, None);
        self
    }

    pub fn group_by(&mut self, column: &str) -> &mut Self {
        self.engine.route("group", Some(column), None);
        self
    }

    pub fn order_by(&mut self, column: &str) -> &mut Self {
        self.engine.route("sort", Some(column), None);
        self
    }

    pub fn to_sql(&self) -> String {
        self.engine.to_sql()
    }

    pub fn result(&mut self) -> Result<&ResultSet> {
        self.engine.result()
    }

    pub fn fetch(&mut self) -> Result<Vec<Row>> {
        self.engine.fetch()
    }

    pub fn fetch_one(&mut self) -> Result<Option<Row>> {
        self.engine.fetch_one()
    }

    pub fn count(&self) -> Result<u64> {
        self.engine.count()
    }

    pub fn refresh(&mut self) -> &mut Self {
        self.engine.refresh();
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }
}

impl From<&SelectQuery> for SqlValue {
    fn from(query: &SelectQuery) -> Self {
        SqlValue::from(query.engine())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select() -> SelectQuery {
        SelectQuery::open(":memory:").unwrap()
    }

    #[test]
    fn empty_projection_selects_wildcard() {
        let mut query = select();
        query.table("people", None);
        assert_eq!(query.to_sql(), "SELECT * FROM people");
    }

    #[test]
    fn full_statement_shape() {
        let mut query = select();
        query
            .table("people", Some("p"))
            .select("name")
            .select("age")
            .filter("age", 30)
            .filter("name", "Bob")
            .group_by("age")
            .order_by("name");
        assert_eq!(
            query.to_sql(),
            "SELECT name, age FROM people AS p WHERE age=30 AND name LIKE 'Bob' \
             GROUP BY age ORDER BY name"
        );
    }

    #[test]
    fn list_filter_renders_in_clause() {
        let mut query = select();
        query.table("people", None).filter("id", vec![1, 2, 3]);
        assert_eq!(query.to_sql(), "SELECT * FROM people WHERE id IN (1, 2, 3)");
    }

    #[test]
    fn subquery_filter_embeds_nested_sql() {
        let mut banned = select();
        banned.table("banned", None).select("id");

        let mut query = select();
        query.table("people", None).filter("id", &banned);
        assert_eq!(
            query.to_sql(),
            "SELECT * FROM people WHERE id IN (SELECT id FROM banned)"
        );
    }

    #[test]
    fn select_all_resets_the_projection() {
        let mut query = select();
        query.table("people", None).select("name").select_all();
        assert_eq!(query.to_sql(), "SELECT * FROM people");
    }

    #[test]
    fn raw_predicates_render_verbatim() {
        let mut query = select();
        query.table("people", None).filter_raw("age > 21 OR vip = 1");
        assert_eq!(
            query.to_sql(),
            "SELECT * FROM people WHERE age > 21 OR vip = 1"
        );
    }
}
