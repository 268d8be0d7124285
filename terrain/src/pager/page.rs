//! Pages over a collection
//!
//! A [`Page`] is built at the start of a list request, consumed once and
//! dropped. Its count, bounds and record slice are each computed at most
//! once, so the count and slice describe the same snapshot of the store.

use std::fmt;

use super::range::{resolve_bounds, Bounds};
use crate::collection::{Collection, Pagination, Scope};
use crate::config::PaginationConfig;
use crate::errors::Failure;

/// Page size policy
///
/// Caps how many records one list request returns, whatever range was
/// requested. Defaults to unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pager {
    max_records: Option<u64>,
}

impl Pager {
    /// No cap
    #[must_use]
    pub const fn unbounded() -> Self {
        Self { max_records: None }
    }

    /// Cap pages at `max` records
    #[must_use]
    pub const fn with_max_records(max: u64) -> Self {
        Self {
            max_records: Some(max),
        }
    }

    pub fn from_config(config: &PaginationConfig) -> Self {
        Self {
            max_records: config.max_records,
        }
    }

    pub fn max_records(&self) -> Option<u64> {
        self.max_records
    }

    /// Offset and limit for resolved bounds
    ///
    /// The limit is `min(to - from + 1, max_records)`.
    #[must_use]
    pub fn window(&self, bounds: Bounds) -> Pagination {
        let offset = u64::try_from(bounds.from).unwrap_or(0);
        let limit = match self.max_records {
            Some(max) => bounds.span().min(max),
            None => bounds.span(),
        };
        Pagination::new(offset, limit)
    }

    /// Start a page over `scope` for an optional range specifier
    pub fn page<'a, C: Collection>(
        &self,
        collection: &'a C,
        scope: Scope,
        range: Option<&str>,
    ) -> Page<'a, C> {
        Page {
            collection,
            scope,
            range: range.map(str::to_string),
            pager: *self,
            count: None,
            bounds: None,
            records: None,
        }
    }
}

/// Outbound `Content-Range` descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRange {
    /// Empty collection, `*/0`
    Empty,
    /// Returned slice of a non-empty collection, `from-to/count`
    Span { from: i64, to: i64, count: u64 },
}

impl ContentRange {
    /// Describe the records actually returned
    ///
    /// `to` is pulled back to the last returned record when fewer records
    /// exist than were requested.
    #[must_use]
    pub fn describe(count: u64, bounds: Bounds, returned: u64) -> Self {
        if count == 0 {
            return Self::Empty;
        }
        let last_returned = i128::from(bounds.from) + i128::from(returned) - 1;
        let to = i128::from(bounds.to).min(last_returned);
        Self::Span {
            from: bounds.from,
            to: i64::try_from(to).unwrap_or(i64::MIN),
            count,
        }
    }
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "*/0"),
            Self::Span { from, to, count } => write!(f, "{}-{}/{}", from, to, count),
        }
    }
}

/// One page of a scoped collection
pub struct Page<'a, C: Collection> {
    collection: &'a C,
    scope: Scope,
    range: Option<String>,
    pager: Pager,
    count: Option<u64>,
    bounds: Option<Bounds>,
    records: Option<Vec<C::Record>>,
}

impl<'a, C: Collection> Page<'a, C> {
    /// Number of records in the scope
    pub async fn count(&mut self) -> Result<u64, Failure> {
        if let Some(count) = self.count {
            return Ok(count);
        }
        let count = self.collection.count(&self.scope).await?;
        self.count = Some(count);
        Ok(count)
    }

    /// Resolved inclusive bounds
    pub async fn bounds(&mut self) -> Result<Bounds, Failure> {
        if let Some(bounds) = self.bounds {
            return Ok(bounds);
        }
        let count = self.count().await?;
        let bounds = resolve_bounds(self.range.as_deref(), count)?;
        tracing::debug!(
            collection = self.collection.name(),
            range = ?self.range,
            count,
            %bounds,
            "page bounds resolved"
        );
        self.bounds = Some(bounds);
        Ok(bounds)
    }

    /// The records inside the bounds, capped by the pager
    pub async fn records(&mut self) -> Result<&[C::Record], Failure> {
        if self.records.is_none() {
            let bounds = self.bounds().await?;
            let window = self.pager.window(bounds);
            let rows = if window.limit == 0 {
                Vec::new()
            } else {
                self.collection.fetch(&self.scope, window).await?
            };
            self.records = Some(rows);
        }
        Ok(self.records.as_deref().unwrap_or_default())
    }

    /// Descriptor for the records actually returned
    pub async fn content_range(&mut self) -> Result<ContentRange, Failure> {
        let count = self.count().await?;
        if count == 0 {
            return Ok(ContentRange::Empty);
        }
        let bounds = self.bounds().await?;
        let returned = self.records().await?.len() as u64;
        Ok(ContentRange::describe(count, bounds, returned))
    }

    /// Consume the page, yielding its records and descriptor
    pub async fn into_parts(mut self) -> Result<(Vec<C::Record>, ContentRange), Failure> {
        let content_range = self.content_range().await?;
        self.records().await?;
        Ok((self.records.take().unwrap_or_default(), content_range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{FilterCondition, MemoryCollection};
    use crate::errors::ErrorKey;
    use crate::pager::RangeError;
    use crate::testing::{examples, Example};

    fn foos(records: &[Example]) -> Vec<String> {
        records.iter().filter_map(|e| e.foo.clone()).collect()
    }

    fn expected(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("foo-{i}")).collect()
    }

    #[test]
    fn test_window_is_capped() {
        let bounds = Bounds::new(5, 14);
        assert_eq!(Pager::unbounded().window(bounds), Pagination::new(5, 10));
        assert_eq!(Pager::with_max_records(3).window(bounds), Pagination::new(5, 3));
        assert_eq!(Pager::unbounded().window(Bounds::new(0, -1)), Pagination::new(0, 0));
    }

    #[test]
    fn test_pager_from_config() {
        let config = PaginationConfig {
            max_records: Some(50),
        };
        assert_eq!(Pager::from_config(&config).max_records(), Some(50));
        assert_eq!(Pager::default().max_records(), None);
    }

    #[test]
    fn test_content_range_display() {
        assert_eq!(ContentRange::Empty.to_string(), "*/0");
        assert_eq!(
            ContentRange::describe(10, Bounds::new(0, 4), 5).to_string(),
            "0-4/10"
        );
        assert_eq!(
            ContentRange::describe(10, Bounds::new(5, 14), 5).to_string(),
            "5-9/10"
        );
        assert_eq!(ContentRange::describe(0, Bounds::new(0, -1), 0), ContentRange::Empty);
    }

    #[tokio::test]
    async fn test_default_range() {
        let store = examples(10);
        let mut page = Pager::unbounded().page(&store, Scope::default(), Some("0-4"));
        assert_eq!(page.bounds().await.unwrap(), Bounds::new(0, 4));
        assert_eq!(page.count().await.unwrap(), 10);
        assert_eq!(foos(page.records().await.unwrap()), expected(0..5));
        assert_eq!(page.content_range().await.unwrap().to_string(), "0-4/10");
    }

    #[tokio::test]
    async fn test_no_range_returns_everything() {
        let store = examples(10);
        let mut page = Pager::unbounded().page(&store, Scope::default(), None);
        assert_eq!(page.records().await.unwrap().len(), 10);
        assert_eq!(page.content_range().await.unwrap().to_string(), "0-9/10");
    }

    #[tokio::test]
    async fn test_fewer_records_than_requested() {
        let store = examples(10);
        let mut page = Pager::unbounded().page(&store, Scope::default(), Some("5-14"));
        assert_eq!(foos(page.records().await.unwrap()), expected(5..10));
        assert_eq!(page.content_range().await.unwrap().to_string(), "5-9/10");
    }

    #[tokio::test]
    async fn test_range_starting_past_end_is_empty() {
        let store = examples(10);
        let mut page = Pager::unbounded().page(&store, Scope::default(), Some("20-29"));
        assert_eq!(page.bounds().await.unwrap(), Bounds::new(20, 29));
        assert!(page.records().await.unwrap().is_empty());
        assert_eq!(page.content_range().await.unwrap().to_string(), "20-19/10");
    }

    #[tokio::test]
    async fn test_largest_range_end() {
        let store = examples(10);
        let mut page =
            Pager::unbounded().page(&store, Scope::default(), Some("0-9223372036854775807"));
        assert_eq!(foos(page.records().await.unwrap()), expected(0..10));
        assert_eq!(page.content_range().await.unwrap().to_string(), "0-9/10");

        let mut page = Pager::with_max_records(2).page(
            &store,
            Scope::default(),
            Some("9223372036854775807-9223372036854775807"),
        );
        assert!(page.records().await.unwrap().is_empty());
        assert_eq!(
            page.content_range().await.unwrap().to_string(),
            "9223372036854775807-9223372036854775806/10"
        );
    }

    #[test]
    fn test_describe_at_extremes() {
        assert_eq!(
            ContentRange::describe(3, Bounds::new(i64::MAX, i64::MAX), 1),
            ContentRange::Span {
                from: i64::MAX,
                to: i64::MAX,
                count: 3
            }
        );
    }

    #[tokio::test]
    async fn test_max_records_caps_slice_and_descriptor() {
        let store = examples(10);
        let mut page = Pager::with_max_records(3).page(&store, Scope::default(), None);
        assert_eq!(foos(page.records().await.unwrap()), expected(0..3));
        assert_eq!(page.content_range().await.unwrap().to_string(), "0-2/10");
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let store: MemoryCollection<Example> = MemoryCollection::new("examples");
        let mut page = Pager::unbounded().page(&store, Scope::default(), None);
        assert_eq!(page.count().await.unwrap(), 0);
        assert_eq!(page.bounds().await.unwrap(), Bounds::new(0, -1));
        assert!(page.records().await.unwrap().is_empty());
        assert_eq!(page.content_range().await.unwrap(), ContentRange::Empty);
    }

    #[tokio::test]
    async fn test_scope_limits_count() {
        let store = examples(10);
        let scope = Scope::default().filter(FilterCondition::lt("rank", 4));
        let (records, range) = Pager::unbounded()
            .page(&store, scope, None)
            .into_parts()
            .await
            .unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(range.to_string(), "0-3/4");
    }

    #[tokio::test]
    async fn test_invalid_ranges_are_range_errors() {
        let store = examples(10);
        for spec in ["3-2", "5-x"] {
            let mut page = Pager::unbounded().page(&store, Scope::default(), Some(spec));
            let err = page.records().await.unwrap_err();
            assert_eq!(err.key(), ErrorKey::RangeError);
        }

        let mut page = Pager::unbounded().page(&store, Scope::default(), Some("3-2"));
        assert!(matches!(
            page.bounds().await,
            Err(Failure::Range(RangeError::Inverted { from: 3, to: 2 }))
        ));
    }

    #[tokio::test]
    async fn test_values_are_memoized() {
        let store = examples(3);
        let mut page = Pager::unbounded().page(&store, Scope::default(), None);
        assert_eq!(page.records().await.unwrap().len(), 3);

        // Later writes do not change this page's snapshot
        store.seed([Example::default()]).unwrap();
        assert_eq!(page.count().await.unwrap(), 3);
        assert_eq!(page.records().await.unwrap().len(), 3);
        assert_eq!(page.content_range().await.unwrap().to_string(), "0-2/3");
    }
}
