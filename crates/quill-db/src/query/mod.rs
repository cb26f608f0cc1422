//! The statement engines.
//!
//! Each statement kind (SELECT, INSERT, UPDATE, DELETE) has its own engine
//! with chainable builder methods that accumulate clause fragments; the
//! statement is serialized and executed lazily, with the last result set
//! memoized until a clause mutates.
//!
//! Engines can be *derived* from one another: a derived engine opens its own
//! connection to the source's DSN but shares the source's table target and
//! filter predicates by reference, so `DeleteQuery::derive(select.engine())`
//! deletes exactly what the SELECT side currently filters — including
//! filters added after derivation.
//!
//! # Submodules
//!
//! - [`engine`] — the core shared by every statement type: clause routing,
//!   SQL assembly, memoized execution.
//! - [`select`] — [`SelectQuery`].
//! - [`insert`] — [`InsertQuery`].
//! - [`update`] — [`UpdateQuery`].
//! - [`delete`] — [`DeleteQuery`].

pub mod delete;
pub mod engine;
pub mod insert;
pub mod select;
pub mod update;

pub use delete::DeleteQuery;
pub use engine::Engine;
pub use insert::InsertQuery;
pub use select::SelectQuery;
pub use update::UpdateQuery;
