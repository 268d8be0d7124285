//! In-memory reference collection
//!
//! Records are kept in id order in a `BTreeMap` behind a `RwLock`. Locks are
//! never held across an await point; every method does its work
//! synchronously and returns.
//!
//! Records describe themselves through [`MemoryRecord`] and serde: filters,
//! ordering and attribute assignment all work on the record's JSON form.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{PoisonError, RwLock};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use super::query::{FilterCondition, FilterOperator, OrderDirection, OrderTerm, Pagination, Scope};
use super::traits::{Attributes, Collection};
use crate::errors::{Failure, FieldErrors};

/// A record that can live in a [`MemoryCollection`]
pub trait MemoryRecord: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Relations that may be preloaded
    const RELATIONS: &'static [&'static str] = &[];

    /// Identifier, `None` while unsaved
    fn id(&self) -> Option<u64>;

    fn set_id(&mut self, id: u64);

    /// Validation errors; empty means valid
    fn validate(&self) -> FieldErrors {
        FieldErrors::new()
    }

    /// Populate a named relation (one of [`MemoryRecord::RELATIONS`])
    fn load_relation(&mut self, _relation: &str) {}
}

/// Ordered-by-id in-memory store
#[derive(Debug)]
pub struct MemoryCollection<R> {
    name: String,
    rows: RwLock<BTreeMap<u64, R>>,
    next_id: AtomicU64,
}

impl<R: MemoryRecord> MemoryCollection<R> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Insert records directly, bypassing validation
    pub fn seed(&self, records: impl IntoIterator<Item = R>) -> Result<Vec<R>, Failure> {
        records.into_iter().map(|r| self.store_new(r)).collect()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored record by id, without relations
    pub fn get(&self, id: u64) -> Option<R> {
        self.rows.read().ok().and_then(|rows| rows.get(&id).cloned())
    }

    fn store_new(&self, mut record: R) -> Result<R, Failure> {
        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);
        record.set_id(id);
        self.rows
            .write()
            .map_err(poisoned)?
            .insert(id, record.clone());
        Ok(record)
    }

    /// Reject order fields missing from the default record's document
    fn check_order(&self, order: &[OrderTerm]) -> Result<(), Failure> {
        if order.is_empty() {
            return Ok(());
        }
        let known = document(&R::default())?;
        match order.iter().find(|term| !known.contains_key(&term.field)) {
            Some(term) => Err(Failure::server(format!(
                "{}: cannot order by unknown field `{}` (keys: {:?})",
                self.name,
                term.field,
                known.keys().collect::<Vec<_>>()
            ))),
            None => Ok(()),
        }
    }

    /// Matching records in scope order
    fn select(&self, scope: &Scope) -> Result<Vec<R>, Failure> {
        self.check_order(&scope.order)?;

        let mut matched = Vec::new();
        {
            let rows = self.rows.read().map_err(poisoned)?;
            for record in rows.values() {
                let doc = document(record)?;
                if scope.filters.iter().all(|c| matches(&doc, c)) {
                    matched.push((doc, record.clone()));
                }
            }
        }

        if !scope.order.is_empty() {
            matched.sort_by(|(a, _), (b, _)| compare_documents(a, b, &scope.order));
        }

        Ok(matched.into_iter().map(|(_, record)| record).collect())
    }

    fn with_relations(&self, mut record: R, scope: &Scope) -> R {
        for relation in &scope.includes {
            record.load_relation(relation);
        }
        record
    }
}

impl<R: MemoryRecord> Collection for MemoryCollection<R> {
    type Id = u64;
    type Record = R;

    fn name(&self) -> &str {
        &self.name
    }

    fn relations(&self) -> &[&str] {
        R::RELATIONS
    }

    async fn count(&self, scope: &Scope) -> Result<u64, Failure> {
        Ok(self.select(scope)?.len() as u64)
    }

    async fn fetch(&self, scope: &Scope, window: Pagination) -> Result<Vec<R>, Failure> {
        let offset = usize::try_from(window.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);

        Ok(self
            .select(scope)?
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|record| self.with_relations(record, scope))
            .collect())
    }

    async fn find(&self, scope: &Scope, id: &u64) -> Result<Option<R>, Failure> {
        let found = self.rows.read().map_err(poisoned)?.get(id).cloned();
        let Some(record) = found else {
            return Ok(None);
        };

        let doc = document(&record)?;
        if !scope.filters.iter().all(|c| matches(&doc, c)) {
            return Ok(None);
        }
        Ok(Some(self.with_relations(record, scope)))
    }

    async fn build(&self, attributes: Attributes) -> Result<R, Failure> {
        assign(R::default(), &attributes)
    }

    async fn insert(&self, record: R) -> Result<R, Failure> {
        let errors = record.validate();
        if !errors.is_empty() {
            return Err(Failure::RecordInvalid(errors));
        }
        let record = self.store_new(record)?;
        tracing::debug!(collection = %self.name, id = ?record.id(), "record inserted");
        Ok(record)
    }

    async fn update(&self, record: R, attributes: Attributes) -> Result<R, Failure> {
        let id = record
            .id()
            .ok_or_else(|| Failure::server(format!("{}: cannot update an unsaved record", self.name)))?;

        let record = assign(record, &attributes)?;
        let errors = record.validate();
        if !errors.is_empty() {
            return Err(Failure::RecordInvalid(errors));
        }

        let mut rows = self.rows.write().map_err(poisoned)?;
        match rows.get_mut(&id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(record)
            }
            None => Err(Failure::record_not_found(&self.name, id)),
        }
    }

    async fn delete(&self, record: R) -> Result<(), Failure> {
        let id = record
            .id()
            .ok_or_else(|| Failure::server(format!("{}: cannot delete an unsaved record", self.name)))?;

        match self.rows.write().map_err(poisoned)?.remove(&id) {
            Some(_) => Ok(()),
            None => Err(Failure::record_not_found(&self.name, id)),
        }
    }
}

fn poisoned<T>(_: PoisonError<T>) -> Failure {
    Failure::server("memory collection lock poisoned")
}

fn document<R: Serialize>(record: &R) -> Result<Map<String, Value>, Failure> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(Failure::server(format!(
            "record serialized to {} instead of an object",
            other
        ))),
    }
}

/// Overlay attributes on a record's JSON form. `id` is never assigned.
fn assign<R: MemoryRecord>(record: R, attributes: &Attributes) -> Result<R, Failure> {
    let id = record.id();
    let mut doc = document(&record)?;
    for (field, value) in attributes {
        if field != "id" {
            doc.insert(field.clone(), value.clone());
        }
    }

    let mut assigned: R = serde_json::from_value(Value::Object(doc))
        .map_err(|e| Failure::RecordInvalid(FieldErrors::new().with("base", e.to_string())))?;
    if let Some(id) = id {
        assigned.set_id(id);
    }
    Ok(assigned)
}

fn matches(doc: &Map<String, Value>, condition: &FilterCondition) -> bool {
    let actual = doc.get(&condition.field).unwrap_or(&Value::Null);
    let expected = &condition.value;

    match condition.operator {
        FilterOperator::Equal => actual == expected,
        FilterOperator::NotEqual => actual != expected,
        FilterOperator::GreaterThan => ordered(actual, expected, |o| o == Ordering::Greater),
        FilterOperator::GreaterThanOrEqual => ordered(actual, expected, |o| o != Ordering::Less),
        FilterOperator::LessThan => ordered(actual, expected, |o| o == Ordering::Less),
        FilterOperator::LessThanOrEqual => ordered(actual, expected, |o| o != Ordering::Greater),
        FilterOperator::In => expected
            .as_array()
            .is_some_and(|values| values.contains(actual)),
        FilterOperator::IsNull => actual.is_null(),
        FilterOperator::IsNotNull => !actual.is_null(),
    }
}

// Null never satisfies an ordering comparison
fn ordered(actual: &Value, expected: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    !actual.is_null() && !expected.is_null() && accept(compare_values(actual, expected))
}

fn compare_documents(a: &Map<String, Value>, b: &Map<String, Value>, order: &[OrderTerm]) -> Ordering {
    order
        .iter()
        .map(|term| {
            let left = a.get(&term.field).unwrap_or(&Value::Null);
            let right = b.get(&term.field).unwrap_or(&Value::Null);
            match term.direction {
                OrderDirection::Ascending => compare_values(left, right),
                OrderDirection::Descending => compare_values(right, left),
            }
        })
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Total order over JSON values; nulls sort first
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::parse_order;
    use crate::errors::ErrorKey;
    use crate::testing::{example, examples, Example};
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_seed_assigns_sequential_ids() {
        let store = examples(3);
        assert_eq!(store.len(), 3);
        let ids: Vec<_> = store
            .fetch(&Scope::default(), Pagination::new(0, 10))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn test_fetch_window() {
        let store = examples(10);
        let page = store
            .fetch(&Scope::default(), Pagination::new(5, 3))
            .await
            .unwrap();
        let foos: Vec<_> = page.iter().map(|e| e.foo.clone().unwrap()).collect();
        assert_eq!(foos, vec!["foo-5", "foo-6", "foo-7"]);
    }

    #[tokio::test]
    async fn test_fetch_past_end_is_empty() {
        let store = examples(2);
        let page = store
            .fetch(&Scope::default(), Pagination::new(5, 3))
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_filters() {
        let store = examples(6);
        let scope = Scope::default().filter(FilterCondition::gte("rank", 4));
        assert_eq!(store.count(&scope).await.unwrap(), 2);

        let scope = Scope::default().filter(FilterCondition::is_in(
            "foo",
            vec![json!("foo-0"), json!("foo-3")],
        ));
        assert_eq!(store.count(&scope).await.unwrap(), 2);

        let scope = Scope::default().filter(FilterCondition::is_null("bar"));
        assert_eq!(store.count(&scope).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_multi_key_ordering() {
        let store = MemoryCollection::new("examples");
        store
            .seed([
                example("b", 1),
                example("a", 2),
                example("a", 1),
                example("c", 2),
            ])
            .unwrap();

        let scope = Scope::default().order_by(parse_order("-rank, foo"));
        let rows = store.fetch(&scope, Pagination::new(0, 10)).await.unwrap();
        let keys: Vec<_> = rows
            .iter()
            .map(|e| format!("{}{}", e.foo.clone().unwrap(), e.rank))
            .collect();
        assert_eq!(keys, vec!["a2", "c2", "a1", "b1"]);
    }

    #[tokio::test]
    async fn test_unknown_order_field_is_server_error() {
        let store = examples(2);
        let scope = Scope::default().order_by(parse_order("nope"));
        let err = store.count(&scope).await.unwrap_err();
        assert_eq!(err.key(), ErrorKey::ServerError);
    }

    #[tokio::test]
    async fn test_unknown_order_field_does_not_depend_on_rows() {
        let empty: MemoryCollection<Example> = MemoryCollection::new("examples");
        let scope = Scope::default().order_by(parse_order("nope"));
        assert_eq!(
            empty.count(&scope).await.unwrap_err().key(),
            ErrorKey::ServerError
        );

        let store = examples(3);
        let hidden = Scope::default()
            .filter(FilterCondition::eq("foo", "missing"))
            .order_by(parse_order("nope"));
        assert!(store.fetch(&hidden, Pagination::new(0, 10)).await.is_err());

        // Skipped when unset on the default record, so never orderable
        let scope = Scope::default().include("widgets").order_by(parse_order("widgets"));
        assert!(store.count(&scope).await.is_err());
        assert!(empty.count(&scope).await.is_err());
    }

    #[tokio::test]
    async fn test_find_respects_scope_and_loads_relations() {
        let store = examples(3);
        let scope = Scope::default().include("widgets");
        let found = store.find(&scope, &2).await.unwrap().unwrap();
        assert_eq!(found.widgets.as_ref().map(Vec::len), Some(2));

        let hidden = Scope::default().filter(FilterCondition::eq("foo", "foo-0"));
        assert!(store.find(&hidden, &2).await.unwrap().is_none());
        assert!(store.find(&Scope::default(), &99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_validates() {
        let store: MemoryCollection<Example> = MemoryCollection::new("examples");
        let record = store.build(attrs(json!({ "bar": "x" }))).await.unwrap();
        let err = store.insert(record).await.unwrap_err();
        match err {
            Failure::RecordInvalid(fields) => assert!(fields.get("foo").is_some()),
            other => panic!("unexpected {other:?}"),
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_build_never_assigns_id() {
        let store: MemoryCollection<Example> = MemoryCollection::new("examples");
        let record = store
            .build(attrs(json!({ "id": 77, "foo": "x" })))
            .await
            .unwrap();
        assert_eq!(record.id, None);
        let saved = store.insert(record).await.unwrap();
        assert_eq!(saved.id, Some(1));
    }

    #[tokio::test]
    async fn test_type_mismatch_is_record_invalid() {
        let store: MemoryCollection<Example> = MemoryCollection::new("examples");
        let err = store.build(attrs(json!({ "rank": "high" }))).await.unwrap_err();
        assert_eq!(err.key(), ErrorKey::RecordInvalid);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = examples(2);
        let record = store.get(1).unwrap();
        let updated = store
            .update(record, attrs(json!({ "bar": "changed" })))
            .await
            .unwrap();
        assert_eq!(updated.bar.as_deref(), Some("changed"));
        assert_eq!(store.get(1).unwrap().bar.as_deref(), Some("changed"));

        let record = store.get(2).unwrap();
        store.delete(record.clone()).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.delete(record).await.unwrap_err().key(),
            ErrorKey::RecordNotFound
        );
    }

    #[test]
    fn test_compare_values_nulls_first() {
        assert_eq!(compare_values(&Value::Null, &json!(1)), Ordering::Less);
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!("b"), &json!("a")), Ordering::Greater);
    }
}
