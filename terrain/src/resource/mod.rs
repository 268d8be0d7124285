//! Resource pipeline
//!
//! A [`Resource`] wires a [`ResourceConfig`] (collection, permit list,
//! optional policy, serializer) into the list, create, show, update and
//! destroy flows. Steps are [`ResourceHooks`] methods; override any one of
//! them without reimplementing the rest.
//!
//! ```rust,ignore
//! let config = ResourceConfig::new(MemoryCollection::<Article>::new("articles"))
//!     .permit(["title", "body"])
//!     .policy(|p: Option<&Principal>, _: &Article, cap: Capability| {
//!         cap == Capability::Read || p.is_some()
//!     });
//!
//! let articles = Resource::new(config).with_pager(Pager::with_max_records(100));
//! let app = Router::new().nest("/articles", terrain::router::routes(Arc::new(articles)));
//! ```

mod config;
mod hooks;
mod params;
mod pipeline;
mod response;

pub use config::{PermitList, ResourceConfig};
pub use hooks::{DefaultHooks, ResourceHooks};
pub use params::{Includes, ListParams};
pub use pipeline::Resource;
pub use response::ResourceResponse;
