//! Localizable message catalog
//!
//! Error messages are never written inline by the mapper; it looks up
//! `terrain.errors.<key>` here. Templates may interpolate `%{method}` and
//! `%{path}` from the request.
//!
//! ```rust
//! use http::Method;
//! use terrain::context::RequestContext;
//! use terrain::errors::{MessageCatalog, StaticCatalog};
//!
//! let catalog = StaticCatalog::default()
//!     .with_message("terrain.errors.route_not_found", "Nothing at %{method} %{path}");
//! let ctx = RequestContext::new(Method::GET, "/nowhere");
//!
//! assert_eq!(
//!     catalog.translate("terrain.errors.route_not_found", &ctx).as_deref(),
//!     Some("Nothing at GET /nowhere")
//! );
//! ```

use std::collections::BTreeMap;

use crate::config::Config;
use crate::context::RequestContext;

/// Message lookup `(key, context) -> string`
pub trait MessageCatalog: Send + Sync {
    /// Resolve a message, or `None` when the key is unknown
    fn translate(&self, key: &str, ctx: &RequestContext) -> Option<String>;
}

/// Built-in templates, keyed by catalog key
const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    ("terrain.errors.unauthenticated", "Authentication is required to access this resource"),
    ("terrain.errors.unauthorized", "You are not authorized to perform this action"),
    ("terrain.errors.association_not_found", "One or more requested associations do not exist"),
    ("terrain.errors.record_not_found", "The requested record could not be found"),
    ("terrain.errors.route_not_found", "No route matches %{method} %{path}"),
    ("terrain.errors.range_error", "The requested range could not be satisfied"),
    ("terrain.errors.record_invalid", "The record could not be saved because it is invalid"),
    ("terrain.errors.server_error", "An internal error occurred"),
];

/// In-memory catalog seeded with the built-in templates
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    templates: BTreeMap<String, String>,
}

impl StaticCatalog {
    /// Catalog with no templates at all
    pub fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// Built-in templates overlaid with `config.messages`
    pub fn from_config(config: &Config) -> Self {
        config
            .messages
            .iter()
            .fold(Self::default(), |catalog, (key, template)| {
                catalog.with_message(key.clone(), template.clone())
            })
    }

    /// Add or replace one template
    #[must_use]
    pub fn with_message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(key.into(), template.into());
        self
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        DEFAULT_MESSAGES
            .iter()
            .fold(Self::empty(), |catalog, (key, template)| {
                catalog.with_message(*key, *template)
            })
    }
}

impl MessageCatalog for StaticCatalog {
    fn translate(&self, key: &str, ctx: &RequestContext) -> Option<String> {
        self.templates
            .get(key)
            .map(|template| interpolate(template, ctx))
    }
}

fn interpolate(template: &str, ctx: &RequestContext) -> String {
    template
        .replace("%{method}", ctx.method.as_str())
        .replace("%{path}", &ctx.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKey;
    use http::Method;

    #[test]
    fn test_default_catalog_covers_every_key() {
        let catalog = StaticCatalog::default();
        let ctx = RequestContext::default();
        for key in ErrorKey::ALL {
            let message = catalog.translate(&key.catalog_key(), &ctx);
            assert!(message.is_some_and(|m| !m.is_empty()), "missing {}", key);
        }
    }

    #[test]
    fn test_unknown_key() {
        let catalog = StaticCatalog::default();
        assert!(catalog
            .translate("terrain.errors.nope", &RequestContext::default())
            .is_none());
    }

    #[test]
    fn test_interpolates_request() {
        let catalog = StaticCatalog::default();
        let ctx = RequestContext::new(Method::DELETE, "/widgets/9/extra");
        assert_eq!(
            catalog
                .translate("terrain.errors.route_not_found", &ctx)
                .as_deref(),
            Some("No route matches DELETE /widgets/9/extra")
        );
    }

    #[test]
    fn test_config_overrides_defaults() {
        let mut config = Config::default();
        config.messages.insert(
            "terrain.errors.range_error".to_string(),
            "Bad range for %{path}".to_string(),
        );
        let catalog = StaticCatalog::from_config(&config);
        let ctx = RequestContext::new(Method::GET, "/examples");

        assert_eq!(
            catalog
                .translate("terrain.errors.range_error", &ctx)
                .as_deref(),
            Some("Bad range for /examples")
        );
        assert!(catalog
            .translate("terrain.errors.server_error", &ctx)
            .is_some());
    }
}
