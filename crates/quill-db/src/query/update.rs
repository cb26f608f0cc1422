//! UPDATE statement engine.

use tracing::warn;

use crate::{
    clause::{Clause, ClauseKind, SharedFragments},
    connection::ResultSet,
    error::Result,
    query::engine::Engine,
    value::SqlValue,
};

/// Builds and executes `UPDATE <table> SET ... WHERE ...` statements.
/// Derivation shares the source's table target and filter predicates, so
/// "update what I just selected" needs no re-stated WHERE clause.
#[derive(Debug)]
pub struct UpdateQuery {
    engine: Engine,
}

impl UpdateQuery {
    pub fn open(dsn: &str) -> Result<Self> {
        let mut engine = Engine::open(dsn)?;
        Self::register(&mut engine, None, None);
        Ok(Self { engine })
    }

    /// Derives an UPDATE engine sharing the source's table target and
    /// filter predicates.
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
                Some(store) => Clause::with_store(ClauseKind::Source, "UPDATE ", ", ", "", store),
                None => Clause::new(ClauseKind::Source, "UPDATE ", ", ", ""),
            },
        );
        engine.register("set", Clause::new(ClauseKind::Assign, " SET ", ", ", ""));
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

    /// Adds one `column=value` assignment, upserting on the column name.
    pub fn set(&mut self, column: &str, value: impl Into<SqlValue>) -> &mut Self {
        self.engine.route("set", Some(column), Some(value.into()));
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

    /// Applies every entry of an object-shaped record as an assignment and
    /// executes. Anything other than an object does nothing and returns
    /// `Ok(None)`.
    pub fn update(&mut self, record: &serde_json::Value) -> Result<Option<ResultSet>> {
        let Some(object) = record.as_object() else {
            warn!("update record is not an object; nothing executed");
            return Ok(None);
        };
        for (key, value) in object {
            self.engine
                .route("set", Some(key.as_str()), Some(SqlValue::from(value)));
        }
        let set = self.engine.result()?.clone();
        Ok(Some(set))
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
