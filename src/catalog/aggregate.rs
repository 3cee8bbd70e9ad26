//! Row aggregation
//!
//! Joined queries return one flat row per combination of a root entity and its
//! children (book x author x genre x tag x series ...). The functions here fold
//! such a row stream back into nested entities:
//!
//! - a root is created the first time its key is seen and folded on every
//!   later row carrying the same key;
//! - children are de-duplicated by their own key inside [`Keyed`] collections;
//! - roots and children keep first-seen order.
//!
//! The aggregator never sorts. Rows must arrive grouped by root key (the
//! `ORDER BY` of the producing query), otherwise entities can be registered
//! twice or merged out of place.

use std::hash::Hash;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// A row did not carry a column the entity shape requires.
///
/// This is a contract violation between the query producing the rows and the
/// builder consuming them, not a recoverable runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed row: required column `{column}` is null")]
pub struct MalformedRow {
    pub column: &'static str,
}

impl MalformedRow {
    pub fn new(column: &'static str) -> Self {
        Self { column }
    }
}

/// Unwrap a nullable column that must be present for the entity being built.
pub fn required<T: Clone>(value: &Option<T>, column: &'static str) -> Result<T, MalformedRow> {
    value.clone().ok_or(MalformedRow::new(column))
}

/// String flavour of [`required`] that avoids a clone of the whole option.
pub fn required_str(value: &Option<String>, column: &'static str) -> Result<String, MalformedRow> {
    value
        .as_deref()
        .map(str::to_owned)
        .ok_or(MalformedRow::new(column))
}

// ============================================================================
// Keyed collections
// ============================================================================

/// Insertion-ordered collection of child entities keyed by their natural id.
///
/// Serializes as a JSON array of the values in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyed<K: Hash + Eq, V> {
    items: IndexMap<K, V>,
}

impl<K: Hash + Eq, V> Default for Keyed<K, V> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }
}

impl<K: Hash + Eq, V> Keyed<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.items.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.items.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.items.get_mut(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.items.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.items.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.items.iter()
    }

    pub fn into_values(self) -> Vec<V> {
        self.items.into_values().collect()
    }

    /// Insert a flat child the first time its key is seen.
    ///
    /// An absent key (no match on the LEFT JOIN) is skipped, and a key that is
    /// already present is left untouched. `build` only runs for new keys.
    pub fn insert_new<F>(&mut self, key: Option<K>, build: F) -> Result<(), MalformedRow>
    where
        F: FnOnce() -> Result<V, MalformedRow>,
    {
        let Some(key) = key else {
            return Ok(());
        };
        if let Entry::Vacant(slot) = self.items.entry(key) {
            slot.insert(build()?);
        }
        Ok(())
    }

    /// Insert `value` under `key` unless the key is already present.
    pub fn insert_if_absent<F>(&mut self, key: K, value: F)
    where
        F: FnOnce() -> V,
    {
        self.items.entry(key).or_insert_with(value);
    }

    /// Fetch the child for `key`, building it first if it is new.
    ///
    /// Used for nested children that fold further columns of the same row
    /// (a genre folding its tags). Returns `None` for an absent key.
    pub fn upsert<F>(&mut self, key: Option<K>, build: F) -> Result<Option<&mut V>, MalformedRow>
    where
        F: FnOnce() -> Result<V, MalformedRow>,
    {
        let Some(key) = key else {
            return Ok(None);
        };
        let child = match self.items.entry(key) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => slot.insert(build()?),
        };
        Ok(Some(child))
    }
}

impl<K: Hash + Eq, V: Serialize> Serialize for Keyed<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.values())
    }
}

// ============================================================================
// Root aggregation
// ============================================================================

/// A root entity rebuilt from a grouped stream of flat rows.
pub trait Aggregate: Sized {
    /// Grouping key identifying which root a row belongs to.
    type Key: Hash + Eq + Clone;
    /// Strongly-typed row produced by the data store for this query shape.
    type Row;
    /// Build-time options threaded through construction (naming policy etc).
    type Context;

    fn root_key(row: &Self::Row) -> Result<Self::Key, MalformedRow>;

    /// Construct the root from its own columns. Child columns of the same row
    /// are applied afterwards through [`Aggregate::fold`].
    fn new(row: &Self::Row, ctx: &Self::Context) -> Result<Self, MalformedRow>;

    /// Merge one row's child columns into this root.
    fn fold(&mut self, row: &Self::Row, ctx: &Self::Context) -> Result<(), MalformedRow>;
}

/// Fold a single row into `roots`, registering a new root if needed.
pub(crate) fn fold_row<T: Aggregate>(
    roots: &mut Keyed<T::Key, T>,
    row: &T::Row,
    ctx: &T::Context,
) -> Result<(), MalformedRow> {
    let key = T::root_key(row)?;
    if let Some(root) = roots.get_mut(&key) {
        return root.fold(row, ctx);
    }

    let mut root = T::new(row, ctx)?;
    root.fold(row, ctx)?;
    roots.items.insert(key, root);
    Ok(())
}

/// Aggregate every row, keeping the roots keyed for a further pass.
pub fn aggregate_keyed<T: Aggregate>(
    rows: &[T::Row],
    ctx: &T::Context,
) -> Result<Keyed<T::Key, T>, MalformedRow> {
    let mut roots = Keyed::new();
    for row in rows {
        fold_row(&mut roots, row, ctx)?;
    }
    Ok(roots)
}

/// Aggregate every row into roots in first-seen order.
pub fn aggregate<T: Aggregate>(rows: &[T::Row], ctx: &T::Context) -> Result<Vec<T>, MalformedRow> {
    aggregate_keyed(rows, ctx).map(Keyed::into_values)
}

/// Aggregate the rows of a single-entity fetch. `None` means no rows.
pub fn aggregate_one<T: Aggregate>(
    rows: &[T::Row],
    ctx: &T::Context,
) -> Result<Option<T>, MalformedRow> {
    Ok(aggregate(rows, ctx)?.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Minimal root: an order with de-duplicated line items.
    #[derive(Debug, Serialize)]
    struct Order {
        id: i64,
        items: Keyed<i64, String>,
    }

    struct OrderRow {
        id: Option<i64>,
        item_id: Option<i64>,
        item: Option<String>,
    }

    fn row(id: i64, item_id: Option<i64>, item: &str) -> OrderRow {
        OrderRow {
            id: Some(id),
            item_id,
            item: Some(item.to_string()),
        }
    }

    impl Aggregate for Order {
        type Key = i64;
        type Row = OrderRow;
        type Context = ();

        fn root_key(row: &OrderRow) -> Result<i64, MalformedRow> {
            required(&row.id, "id")
        }

        fn new(row: &OrderRow, _: &()) -> Result<Self, MalformedRow> {
            Ok(Self {
                id: required(&row.id, "id")?,
                items: Keyed::new(),
            })
        }

        fn fold(&mut self, row: &OrderRow, _: &()) -> Result<(), MalformedRow> {
            self.items
                .insert_new(row.item_id, || required_str(&row.item, "item"))
        }
    }

    #[test]
    fn test_roots_keep_first_seen_order() {
        let rows = vec![
            row(3, Some(1), "a"),
            row(3, Some(2), "b"),
            row(1, Some(1), "c"),
            row(2, None, ""),
        ];
        let orders: Vec<Order> = aggregate(&rows, &()).unwrap();
        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_repeated_child_key_is_kept_once() {
        let rows = vec![
            row(1, Some(7), "first"),
            row(1, Some(8), "other"),
            row(1, Some(7), "second"),
        ];
        let orders: Vec<Order> = aggregate(&rows, &()).unwrap();
        assert_eq!(orders.len(), 1);
        let items: Vec<&String> = orders[0].items.values().collect();
        assert_eq!(items, vec!["first", "other"]);
    }

    #[test]
    fn test_null_child_key_creates_nothing() {
        let rows = vec![row(1, None, "ignored")];
        let orders: Vec<Order> = aggregate(&rows, &()).unwrap();
        assert!(orders[0].items.is_empty());
    }

    #[test]
    fn test_missing_root_key_is_malformed() {
        let rows = vec![OrderRow {
            id: None,
            item_id: None,
            item: None,
        }];
        let err = aggregate::<Order>(&rows, &()).unwrap_err();
        assert_eq!(err, MalformedRow::new("id"));
    }

    #[test]
    fn test_present_child_key_with_missing_columns_is_malformed() {
        let rows = vec![OrderRow {
            id: Some(1),
            item_id: Some(4),
            item: None,
        }];
        let err = aggregate::<Order>(&rows, &()).unwrap_err();
        assert_eq!(err.column, "item");
    }

    #[test]
    fn test_aggregate_one_on_empty_rows() {
        let rows: Vec<OrderRow> = Vec::new();
        assert!(aggregate_one::<Order>(&rows, &()).unwrap().is_none());
    }

    #[test]
    fn test_ungrouped_input_merges_out_of_place() {
        // Rows for root 1 are split by root 2; the second run still folds into
        // the first entity because roots are keyed, but order follows first sight.
        let rows = vec![row(1, Some(1), "a"), row(2, Some(1), "b"), row(1, Some(2), "c")];
        let orders: Vec<Order> = aggregate(&rows, &()).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].items.len(), 2);
    }

    #[test]
    fn test_keyed_serializes_as_array() {
        let mut keyed: Keyed<i64, &str> = Keyed::new();
        keyed.insert_new(Some(2), || Ok("two")).unwrap();
        keyed.insert_new(Some(1), || Ok("one")).unwrap();
        keyed.insert_new(Some(2), || Ok("again")).unwrap();
        assert_eq!(serde_json::to_string(&keyed).unwrap(), r#"["two","one"]"#);
    }

    #[test]
    fn test_insert_if_absent_keeps_first_value() {
        let mut keyed: Keyed<i64, String> = Keyed::new();
        keyed.insert_if_absent(3, || "first".to_string());
        keyed.insert_if_absent(3, || "second".to_string());
        assert_eq!(keyed.values().collect::<Vec<_>>(), vec!["first"]);
    }

    #[test]
    fn test_upsert_returns_existing_child() {
        let mut keyed: Keyed<i64, Vec<i64>> = Keyed::new();
        keyed.upsert(Some(1), || Ok(Vec::new())).unwrap().unwrap().push(10);
        keyed.upsert(Some(1), || Ok(vec![99])).unwrap().unwrap().push(11);
        assert_eq!(keyed.get(&1), Some(&vec![10, 11]));
        assert!(keyed.upsert(None, || Ok(Vec::new())).unwrap().is_none());
    }
}
