//! Fluent SQL statement builder with statement derivation.
//!
//! quill-db assembles SELECT / INSERT / UPDATE / DELETE statements through
//! chained builder calls that accumulate typed clause fragments, serializes
//! them into a single SQL string, and executes it through SQLite
//! (`rusqlite`), memoizing the result set until a clause mutates.
//!
//! # Overview
//!
//! - [`Database`] — the facade callers construct from a DSN. SELECT-shaped,
//!   with `insert`/`update`/`delete` dispatched through derived engines.
//! - [`SelectQuery`], [`InsertQuery`], [`UpdateQuery`], [`DeleteQuery`] —
//!   the individual statement engines.
//! - [`SqlValue`] — the tagged value type every filter argument and record
//!   field converts into.
//!
//! # Statement derivation
//!
//! An engine built with `derive` opens its own connection to the source's
//! DSN but shares the source's table target and filter predicates *by
//! reference*: adding a filter through either engine changes both rendered
//! statements. "Delete what I just selected" therefore needs no re-stated
//! WHERE clause.
//!
//! # Literal SQL and quoting
//!
//! Statements are rendered as literal SQL text; there is no parameter
//! binding. Text values are wrapped in single quotes **without escaping**,
//! so values (and table or column names) containing quote characters or SQL
//! metacharacters are embedded as-is. Do not feed untrusted input to this
//! builder.
//!
//! # Example
//!
//! ```no_run
//! use quill_db::Database;
//!
//! # fn main() -> quill_db::Result<()> {
//! let mut db = Database::open("people.db")?;
//! db.table("people", None)
//!     .select("name")
//!     .filter("age", 30)
//!     .order_by("name");
//! assert_eq!(db.to_sql(), "SELECT name FROM people WHERE age=30 ORDER BY name");
//!
//! for row in db.fetch()? {
//!     println!("{:?}", row.get("name"));
//! }
//! # Ok(())
//! # }
//! ```

mod clause;
pub mod connection;
pub mod database;
pub mod error;
pub mod query;
pub mod value;

pub use connection::{DbConnection, ResultSet, Row};
pub use database::Database;
pub use error::{DbError, Result};
pub use query::{DeleteQuery, Engine, InsertQuery, SelectQuery, UpdateQuery};
pub use value::SqlValue;
