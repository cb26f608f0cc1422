//! Internal representation of statement clauses.
//!
//! A [`Clause`] is an ordered collection of fragments with a keyword prefix,
//! a joiner, and an optional suffix. Fragments live in a [`FragmentStore`]
//! behind `Rc<RefCell<..>>` so that a derived statement engine can share the
//! source engine's table target and filter predicates by reference: a
//! mutation through either engine is visible to both.
//!
//! These types are used internally by the engines and are not part of the
//! public API.

use std::{cell::RefCell, rc::Rc};

use crate::value::SqlValue;

/// One stored entry in a clause: positional (raw, rendered verbatim) when
/// `key` is `None`, or a keyed column/value pair.
#[derive(Debug, Clone)]
pub(crate) struct Fragment {
    pub key: Option<String>,
    pub value: SqlValue,
}

/// Ordered fragments plus a monotonic revision counter.
///
/// The revision is bumped on every mutation; engines compare the sum of
/// their clause revisions against the revision they last executed at, so a
/// mutation through a sibling engine sharing this store also invalidates
/// the sibling's memoized result.
#[derive(Debug, Default)]
pub(crate) struct FragmentStore {
    items: Vec<Fragment>,
    rev: u64,
}

impl FragmentStore {
    fn push(&mut self, key: Option<String>, value: SqlValue) {
        self.rev = self.rev.wrapping_add(1);
        if let Some(k) = key.as_deref() {
            // Keyed adds upsert: keys stay unique within one clause.
            if let Some(existing) = self
                .items
                .iter_mut()
                .find(|f| f.key.as_deref() == Some(k))
            {
                existing.value = value;
                return;
            }
        }
        self.items.push(Fragment { key, value });
    }

    fn clear(&mut self) {
        self.rev = self.rev.wrapping_add(1);
        self.items.clear();
    }
}

/// Shared handle to a clause's fragments, held by every engine that
/// registered a clause over the store.
pub(crate) type SharedFragments = Rc<RefCell<FragmentStore>>;

/// Selects the rendering transform applied to each fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClauseKind {
    /// Statement target: `table` or `table AS alias`.
    Source,
    /// Verbatim fragment list (GROUP BY, ORDER BY, key list).
    Plain,
    /// SELECT column list, falling back to `*` when empty.
    Projection,
    /// WHERE predicates, one of five shapes per fragment.
    Filter,
    /// UPDATE assignments, `key=value`.
    Assign,
    /// INSERT value list, text quoted.
    Values,
}

/// A named, serializable fragment of a SQL statement.
#[derive(Debug, Clone)]
pub(crate) struct Clause {
    kind: ClauseKind,
    prefix: &'static str,
    joiner: &'static str,
    suffix: &'static str,
    store: SharedFragments,
}

impl Clause {
    pub fn new(kind: ClauseKind, prefix: &'static str, joiner: &'static str, suffix: &'static str) -> Self {
        Self::with_store(kind, prefix, joiner, suffix, SharedFragments::default())
    }

    /// Builds a clause over an existing store. The keyword prefix belongs to
    /// the statement, so a derived engine renders shared fragments under its
    /// own keyword (`DELETE FROM t` sharing the store behind ` FROM t`).
    pub fn with_store(
        kind: ClauseKind,
        prefix: &'static str,
        joiner: &'static str,
        suffix: &'static str,
        store: SharedFragments,
    ) -> Self {
        Self {
            kind,
            prefix,
            joiner,
            suffix,
            store,
        }
    }

    pub fn add(&self, key: Option<String>, value: SqlValue) {
        self.store.borrow_mut().push(key, value);
    }

    pub fn reset(&self) {
        self.store.borrow_mut().clear();
    }

    pub fn rev(&self) -> u64 {
        self.store.borrow().rev
    }

    pub fn store(&self) -> SharedFragments {
        Rc::clone(&self.store)
    }

    /// Serializes to `prefix + joined fragments + suffix`, or `None` when
    /// empty so the clause contributes nothing to the statement. The empty
    /// projection is the exception and yields the wildcard form.
    ///
    /// Rendering is pure; stored fragments are never rewritten.
    pub fn serialize(&self) -> Option<String> {
        let store = self.store.borrow();
        if store.items.is_empty() {
            return match self.kind {
                ClauseKind::Projection => Some(format!("{}*", self.prefix)),
                _ => None,
            };
        }
        let parts: Vec<String> = store.items.iter().map(|f| self.render(f)).collect();
        Some(format!(
            "{}{}{}",
            self.prefix,
            parts.join(self.joiner),
            self.suffix
        ))
    }

    fn render(&self, fragment: &Fragment) -> String {
        match self.kind {
            ClauseKind::Source => match &fragment.key {
                None => fragment.value.bare(),
                Some(table) => format!("{table} AS {}", fragment.value.bare()),
            },
            ClauseKind::Plain | ClauseKind::Projection => fragment.value.bare(),
            ClauseKind::Filter => Self::render_predicate(fragment),
            ClauseKind::Assign => match &fragment.key {
                Some(key) => format!("{key}={}", fragment.value.literal()),
                None => fragment.value.bare(),
            },
            ClauseKind::Values => fragment.value.literal(),
        }
    }

    /// The five WHERE predicate shapes. A positional fragment wins over all
    /// keyed shapes and renders verbatim.
    fn render_predicate(fragment: &Fragment) -> String {
        let Some(key) = &fragment.key else {
            return fragment.value.bare();
        };
        match &fragment.value {
            SqlValue::Text(text) => format!("{key} LIKE '{text}'"),
            SqlValue::List(items) => {
                let joined = items
                    .iter()
                    .map(SqlValue::literal)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{key} IN ({joined})")
            }
            SqlValue::Subquery(sql) => format!("{key} IN ({sql})"),
            SqlValue::Raw(v) | SqlValue::Scalar(v) => format!("{key}={v}"),
        }
    }
}
