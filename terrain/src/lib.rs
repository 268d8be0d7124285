//! # terrain
//!
//! Expose a backing collection as a uniform REST resource on axum.
//!
//! ## Features
//!
//! - **Range pagination**: `Range: 0-24` in, `Content-Range: 0-24/311` out, capped by a configurable page size
//! - **Resource pipeline**: list, create, show, update and destroy flows with overridable steps
//! - **Permitted writes**: only allow-listed fields are read from write payloads
//! - **Authorization**: optional per-resource policy, permissive when none is bound
//! - **Error taxonomy**: every failure maps to one status, key and catalog message
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use serde::{Deserialize, Serialize};
//! use terrain::prelude::*;
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! struct Note {
//!     #[serde(default)]
//!     id: Option<u64>,
//!     #[serde(default)]
//!     text: String,
//! }
//!
//! impl MemoryRecord for Note {
//!     fn id(&self) -> Option<u64> { self.id }
//!     fn set_id(&mut self, id: u64) { self.id = Some(id); }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let notes = Resource::new(
//!         ResourceConfig::new(MemoryCollection::<Note>::new("notes")).permit(["text"]),
//!     )
//!     .with_pager(Pager::from_config(&config.pagination))
//!     .with_catalog(StaticCatalog::from_config(&config));
//!
//!     let app = axum::Router::new().nest("/notes", routes(Arc::new(notes)));
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod authz;
pub mod collection;
pub mod config;
pub mod context;
pub mod error;
pub mod errors;
pub mod observability;
pub mod pager;
pub mod resource;
pub mod router;
pub mod serializer;

#[cfg(test)]
pub(crate) mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::authz::{Capability, Policy, Principal};
    pub use crate::collection::{
        Attributes, Collection, FilterCondition, MemoryCollection, MemoryRecord, OrderTerm,
        Pagination, Scope,
    };
    pub use crate::config::Config;
    pub use crate::context::RequestContext;
    pub use crate::error::{Error, Result};
    pub use crate::errors::{ErrorKey, ErrorMapper, Failure, FieldErrors, MessageCatalog, StaticCatalog};
    pub use crate::observability::init_tracing;
    pub use crate::pager::{ContentRange, Pager};
    pub use crate::resource::{
        DefaultHooks, Includes, ListParams, PermitList, Resource, ResourceConfig, ResourceHooks,
        ResourceResponse,
    };
    pub use crate::router::routes;
    pub use crate::serializer::{JsonSerializer, Serializer};

    pub use async_trait::async_trait;
}
