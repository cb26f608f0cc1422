//! INSERT statement engine.

use tracing::warn;

use crate::{
    clause::{Clause, ClauseKind, SharedFragments},
    connection::ResultSet,
    error::Result,
    query::engine::Engine,
    value::SqlValue,
};

/// Builds and executes `INSERT INTO <table> (<keys>) VALUES (<values>)`
/// statements. Usually derived from a SELECT-shaped engine so the table
/// target comes along by reference.
#[derive(Debug)]
pub struct InsertQuery {
    engine: Engine,
}

impl InsertQuery {
    pub fn open(dsn: &str) -> Result<Self> {
        let mut engine = Engine::open(dsn)?;
        Self::register(&mut engine, None);
        Ok(Self { engine })
    }

    /// Derives an INSERT engine sharing the source's table target.
    pub fn derive(source: &Engine) -> Result<Self> {
        let mut engine = Engine::derive(source)?;
        Self::register(&mut engine, source.share("from"));
        Ok(Self { engine })
    }

    fn register(engine: &mut Engine, from: Option<SharedFragments>) {
        engine.register(
            "from",
            match from {
                Some(store) => {
                    Clause::with_store(ClauseKind::Source, "INSERT INTO ", ", ", "", store)
                }
                None => Clause::new(ClauseKind::Source, "INSERT INTO ", ", ", ""),
            },
        );
        engine.register("keys", Clause::new(ClauseKind::Plain, " (", ", ", ")"));
        engine.register(
            "values",
            Clause::new(ClauseKind::Values, " VALUES (", ", ", ")"),
        );
    }

    pub fn table(&mut self, name: &str) -> &mut Self {
        self.engine.route("from", Some(name), None);
        self
    }

    /// Inserts one record. Only object-shaped records are accepted; anything
    /// else does nothing and returns `Ok(None)`. Keys and values land in the
    /// statement in the record's insertion order.
    pub fn insert(&mut self, record: &serde_json::Value) -> Result<Option<ResultSet>> {
        let Some(object) = record.as_object() else {
            warn!("insert record is not an object; nothing executed");
            return Ok(None);
        };
        for (key, value) in object {
            self.engine.route("keys", Some(key.as_str()), None);
            self.engine.route("values", None, Some(SqlValue::from(value)));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_renders_keys_and_values_in_record_order() {
        let mut query = InsertQuery::open(":memory:").unwrap();
        query
            .engine()
            .execute_raw("CREATE TABLE people (name TEXT, age INTEGER)")
            .unwrap();
        query.table("people");

        let set = query
            .insert(&serde_json::json!({"name": "Bob", "age": 30}))
            .unwrap()
            .expect("object record executes");
        assert_eq!(set.changes(), 1);
        assert_eq!(
            query.to_sql(),
            "INSERT INTO people (name, age) VALUES ('Bob', 30)"
        );
    }

    #[test]
    fn non_object_record_is_a_silent_no_op() {
        let mut query = InsertQuery::open(":memory:").unwrap();
        query.table("people");

        assert!(query.insert(&serde_json::json!([1, 2])).unwrap().is_none());
        assert!(query.insert(&serde_json::json!("Bob")).unwrap().is_none());
        // No keys or values accumulated either.
        assert_eq!(query.to_sql(), "INSERT INTO people");
    }
}
