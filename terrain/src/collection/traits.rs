//! The store contract consumed by the pipeline
//!
//! This trait uses RPITIT (Return Position Impl Trait In Traits), so
//! implementations write plain `async fn`s.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde_json::{Map, Value};

use super::query::{Pagination, Scope};
use crate::errors::Failure;

/// Permitted write attributes, already filtered by the permit list
pub type Attributes = Map<String, Value>;

/// A queryable, mutable, ordered-by-identity set of records of one kind
///
/// The pipeline never owns a collection; it borrows one for the duration of
/// a request. Every method reports problems as a [`Failure`]: a validation
/// problem on write is [`Failure::RecordInvalid`], anything the store cannot
/// classify is [`Failure::Server`].
///
/// # Example
///
/// ```rust,ignore
/// impl Collection for ArticleStore {
///     type Id = i64;
///     type Record = Article;
///
///     fn name(&self) -> &str { "articles" }
///
///     fn relations(&self) -> &[&str] { &["author", "comments"] }
///
///     async fn count(&self, scope: &Scope) -> Result<u64, Failure> {
///         let sql = self.select_count(scope);
///         self.pool.fetch_one(sql).await.map_err(|e| Failure::Server(e.into()))
///     }
///
///     // ... other methods
/// }
/// ```
pub trait Collection: Send + Sync {
    /// Record identifier, parsed from the request path
    type Id: fmt::Display + FromStr + Send + Sync;

    /// Record type
    type Record: Send + Sync;

    /// Resource name, used in logs and failures
    fn name(&self) -> &str;

    /// Relations that may be requested through `include`
    fn relations(&self) -> &[&str] {
        &[]
    }

    /// Count records matching the scope
    fn count(&self, scope: &Scope) -> impl Future<Output = Result<u64, Failure>> + Send;

    /// Fetch a window of records matching the scope, in scope order
    fn fetch(
        &self,
        scope: &Scope,
        window: Pagination,
    ) -> impl Future<Output = Result<Vec<Self::Record>, Failure>> + Send;

    /// Look up one record by id within the scope
    fn find(
        &self,
        scope: &Scope,
        id: &Self::Id,
    ) -> impl Future<Output = Result<Option<Self::Record>, Failure>> + Send;

    /// Build a new, unsaved record from attributes
    fn build(
        &self,
        attributes: Attributes,
    ) -> impl Future<Output = Result<Self::Record, Failure>> + Send;

    /// Persist a new record
    fn insert(
        &self,
        record: Self::Record,
    ) -> impl Future<Output = Result<Self::Record, Failure>> + Send;

    /// Apply attributes to a stored record and persist it
    fn update(
        &self,
        record: Self::Record,
        attributes: Attributes,
    ) -> impl Future<Output = Result<Self::Record, Failure>> + Send;

    /// Delete a stored record
    fn delete(&self, record: Self::Record) -> impl Future<Output = Result<(), Failure>> + Send;
}
