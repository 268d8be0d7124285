//! Inbound request parameters

use std::collections::HashMap;

/// Requested relations, from a comma-separated `include` parameter
///
/// ```rust
/// use terrain::resource::Includes;
///
/// let includes = Includes::parse(Some("widgets, owner,,"));
/// assert_eq!(includes.as_slice(), ["widgets", "owner"]);
/// assert!(Includes::parse(None).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Includes(Vec<String>);

impl Includes {
    /// Parse an include list; blank names are skipped, duplicates dropped
    pub fn parse(raw: Option<&str>) -> Self {
        let mut names: Vec<String> = Vec::new();
        for name in raw.unwrap_or_default().split(',').map(str::trim) {
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        Self(names)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parameters of a list request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Raw `Range` header value
    pub range: Option<String>,
    /// Raw `order` parameter
    pub order: Option<String>,
    /// Requested relations
    pub include: Includes,
    /// Remaining query parameters, for filter hooks
    pub query: HashMap<String, String>,
}

impl ListParams {
    /// Split a query string map into the known parameters and the rest
    pub fn from_query(mut query: HashMap<String, String>, range: Option<String>) -> Self {
        let order = query.remove("order");
        let include = Includes::parse(query.remove("include").as_deref());
        Self {
            range,
            order,
            include,
            query,
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    #[must_use]
    pub fn with_include(mut self, include: &str) -> Self {
        self.include = Includes::parse(Some(include));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_includes_parse() {
        assert_eq!(Includes::parse(Some("a,b,a")).as_slice(), ["a", "b"]);
        assert_eq!(Includes::parse(Some(" , ")), Includes::default());
        assert_eq!(Includes::parse(Some("")).iter().count(), 0);
    }

    #[test]
    fn test_list_params_from_query() {
        let query = HashMap::from([
            ("order".to_string(), "-foo".to_string()),
            ("include".to_string(), "widgets".to_string()),
            ("bar".to_string(), "bar-1".to_string()),
        ]);
        let params = ListParams::from_query(query, Some("0-4".to_string()));
        assert_eq!(params.range.as_deref(), Some("0-4"));
        assert_eq!(params.order.as_deref(), Some("-foo"));
        assert_eq!(params.include.as_slice(), ["widgets"]);
        assert_eq!(params.query.len(), 1);
        assert_eq!(params.query.get("bar").map(String::as_str), Some("bar-1"));
    }
}
