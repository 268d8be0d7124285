//! Query shaping types passed to a [`Collection`](super::Collection)
//!
//! A [`Scope`] is built up step by step during a request: relations to
//! preload, filter conditions, and ordering terms. The store interprets it.
//!
//! # Example
//!
//! ```rust
//! use terrain::collection::{parse_order, FilterCondition, OrderDirection, OrderTerm, Scope};
//!
//! let scope = Scope::default()
//!     .filter(FilterCondition::eq("status", "active"))
//!     .order_by(parse_order(" -created_at, name "));
//!
//! assert_eq!(
//!     scope.order,
//!     vec![
//!         OrderTerm::new("created_at", OrderDirection::Descending),
//!         OrderTerm::new("name", OrderDirection::Ascending),
//!     ]
//! );
//! ```

use std::fmt;

use serde_json::Value;

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Sort in ascending order (A-Z, 0-9)
    #[default]
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    Descending,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// One `(field, direction)` ordering term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub field: String,
    pub direction: OrderDirection,
}

impl OrderTerm {
    pub fn new(field: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

impl fmt::Display for OrderTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction)
    }
}

/// Parse an `order` parameter such as `"-foo, bar"`
///
/// All whitespace is stripped before splitting on commas. A leading `-`
/// means descending. Empty terms are skipped. Terms keep their given order.
pub fn parse_order(order: &str) -> Vec<OrderTerm> {
    let compact: String = order.chars().filter(|c| !c.is_whitespace()).collect();

    compact
        .split(',')
        .filter_map(|term| {
            let (field, direction) = match term.strip_prefix('-') {
                Some(field) => (field, OrderDirection::Descending),
                None => (term, OrderDirection::Ascending),
            };
            (!field.is_empty()).then(|| OrderTerm::new(field, direction))
        })
        .collect()
}

/// Offset and limit applied when fetching a page of records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Number of results to skip
    pub offset: u64,
    /// Maximum number of results to return
    pub limit: u64,
}

impl Pagination {
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }
}

/// Comparison operators for filter conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    /// Value is one of an array
    In,
    IsNull,
    IsNotNull,
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::NotEqual => write!(f, "!="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterThanOrEqual => write!(f, ">="),
            Self::LessThan => write!(f, "<"),
            Self::LessThanOrEqual => write!(f, "<="),
            Self::In => write!(f, "IN"),
            Self::IsNull => write!(f, "IS NULL"),
            Self::IsNotNull => write!(f, "IS NOT NULL"),
        }
    }
}

/// A single `field <op> value` condition
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::Equal, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::NotEqual, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::GreaterThan, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::GreaterThanOrEqual, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::LessThan, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::LessThanOrEqual, value)
    }

    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, FilterOperator::In, Value::Array(values))
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNull, Value::Null)
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNotNull, Value::Null)
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            FilterOperator::IsNull | FilterOperator::IsNotNull => {
                write!(f, "{} {}", self.field, self.operator)
            }
            _ => write!(f, "{} {} {}", self.field, self.operator, self.value),
        }
    }
}

/// Accumulated query shape for one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    /// Relations to preload on returned records
    pub includes: Vec<String>,
    /// Conditions every record must satisfy
    pub filters: Vec<FilterCondition>,
    /// Ordering terms, most significant first
    pub order: Vec<OrderTerm>,
}

impl Scope {
    #[must_use]
    pub fn include(mut self, relation: impl Into<String>) -> Self {
        self.includes.push(relation.into());
        self
    }

    #[must_use]
    pub fn filter(mut self, condition: FilterCondition) -> Self {
        self.filters.push(condition);
        self
    }

    #[must_use]
    pub fn order_by(mut self, terms: impl IntoIterator<Item = OrderTerm>) -> Self {
        self.order.extend(terms);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_directions() {
        assert_eq!(
            parse_order("-foo, bar"),
            vec![
                OrderTerm::new("foo", OrderDirection::Descending),
                OrderTerm::new("bar", OrderDirection::Ascending),
            ]
        );
    }

    #[test]
    fn test_parse_order_strips_internal_whitespace() {
        assert_eq!(
            parse_order(" - foo ,\tba r"),
            vec![
                OrderTerm::new("foo", OrderDirection::Descending),
                OrderTerm::new("bar", OrderDirection::Ascending),
            ]
        );
    }

    #[test]
    fn test_parse_order_skips_empty_terms() {
        assert_eq!(
            parse_order(",foo,,-,"),
            vec![OrderTerm::new("foo", OrderDirection::Ascending)]
        );
        assert!(parse_order("").is_empty());
        assert!(parse_order("   ").is_empty());
    }

    #[test]
    fn test_parse_order_keeps_given_order() {
        let fields: Vec<String> = parse_order("c,a,-b").into_iter().map(|t| t.field).collect();
        assert_eq!(fields, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(FilterCondition::eq("foo", "x").to_string(), "foo = \"x\"");
        assert_eq!(FilterCondition::gte("n", 3).to_string(), "n >= 3");
        assert_eq!(FilterCondition::is_null("bar").to_string(), "bar IS NULL");
    }

    #[test]
    fn test_scope_builder() {
        let scope = Scope::default()
            .include("widgets")
            .filter(FilterCondition::ne("foo", "y"))
            .order_by([OrderTerm::new("id", OrderDirection::Descending)]);
        assert_eq!(scope.includes, vec!["widgets"]);
        assert_eq!(scope.filters.len(), 1);
        assert_eq!(scope.order[0].to_string(), "id desc");
    }
}
