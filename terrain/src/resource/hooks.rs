//! Overridable pipeline steps
//!
//! Each flow in [`Resource`](super::Resource) is a fixed sequence of calls
//! into a [`ResourceHooks`] implementation. Every step has a default, so an
//! implementation overrides only the steps it cares about:
//!
//! ```rust,ignore
//! struct OwnedOnly;
//!
//! #[async_trait]
//! impl ResourceHooks<MemoryCollection<Note>> for OwnedOnly {
//!     fn filter(
//!         &self,
//!         _config: &ResourceConfig<MemoryCollection<Note>>,
//!         scope: Scope,
//!         _params: &ListParams,
//!         ctx: &RequestContext,
//!     ) -> Result<Scope, Failure> {
//!         let owner = ctx.principal().ok_or(Failure::Unauthenticated)?;
//!         Ok(scope.filter(FilterCondition::eq("owner", owner.sub.clone())))
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::config::ResourceConfig;
use super::params::{Includes, ListParams};
use crate::authz::{self, Capability};
use crate::collection::{parse_order, Attributes, Collection, Scope};
use crate::context::RequestContext;
use crate::errors::Failure;

/// Extension points of the resource pipeline
#[async_trait]
pub trait ResourceHooks<C: Collection + 'static>: Send + Sync {
    /// Base query for every flow
    fn base_scope(&self, _config: &ResourceConfig<C>, _ctx: &RequestContext) -> Scope {
        Scope::default()
    }

    /// Request relation preloading
    ///
    /// A name the collection does not know is `association_not_found`.
    fn preload(
        &self,
        config: &ResourceConfig<C>,
        scope: Scope,
        includes: &Includes,
    ) -> Result<Scope, Failure> {
        let known = config.collection().relations();
        let mut scope = scope;
        for relation in includes.iter() {
            if !known.contains(&relation) {
                return Err(Failure::AssociationNotFound(relation.to_string()));
            }
            scope = scope.include(relation);
        }
        Ok(scope)
    }

    /// Narrow a list query; identity by default
    fn filter(
        &self,
        _config: &ResourceConfig<C>,
        scope: Scope,
        _params: &ListParams,
        _ctx: &RequestContext,
    ) -> Result<Scope, Failure> {
        Ok(scope)
    }

    /// Apply the `order` parameter
    fn order(
        &self,
        _config: &ResourceConfig<C>,
        scope: Scope,
        order: Option<&str>,
    ) -> Result<Scope, Failure> {
        Ok(match order {
            Some(order) => scope.order_by(parse_order(order)),
            None => scope,
        })
    }

    /// Load the record a show, update or destroy acts on
    async fn resolve_record(
        &self,
        config: &ResourceConfig<C>,
        scope: &Scope,
        id: &C::Id,
    ) -> Result<C::Record, Failure> {
        config
            .collection()
            .find(scope, id)
            .await?
            .ok_or_else(|| Failure::record_not_found(config.name(), id))
    }

    /// Check a capability against a record
    fn authorize(
        &self,
        config: &ResourceConfig<C>,
        ctx: &RequestContext,
        record: &C::Record,
        capability: Capability,
    ) -> Result<(), Failure> {
        authz::authorize(
            config.bound_policy(),
            config.name(),
            ctx.principal(),
            record,
            capability,
        )
    }

    /// Allow-listed attributes of a write payload
    fn permitted(&self, config: &ResourceConfig<C>, payload: &Map<String, Value>) -> Attributes {
        config.permit_list().filter(payload)
    }

    /// Build an unsaved record
    async fn build_record(
        &self,
        config: &ResourceConfig<C>,
        _ctx: &RequestContext,
        attributes: Attributes,
    ) -> Result<C::Record, Failure> {
        config.collection().build(attributes).await
    }

    async fn persist_create(
        &self,
        config: &ResourceConfig<C>,
        record: C::Record,
    ) -> Result<C::Record, Failure> {
        config.collection().insert(record).await
    }

    async fn persist_update(
        &self,
        config: &ResourceConfig<C>,
        record: C::Record,
        attributes: Attributes,
    ) -> Result<C::Record, Failure> {
        config.collection().update(record, attributes).await
    }

    async fn persist_destroy(
        &self,
        config: &ResourceConfig<C>,
        record: C::Record,
    ) -> Result<(), Failure> {
        config.collection().delete(record).await
    }

    fn serialize_one(
        &self,
        config: &ResourceConfig<C>,
        record: &C::Record,
        includes: &Includes,
    ) -> Result<Value, Failure> {
        config
            .record_serializer()
            .serialize(record, includes.as_slice())
    }

    fn serialize_many(
        &self,
        config: &ResourceConfig<C>,
        records: &[C::Record],
        includes: &Includes,
    ) -> Result<Value, Failure> {
        config
            .record_serializer()
            .serialize_many(records, includes.as_slice())
    }
}

/// All default steps
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl<C: Collection + 'static> ResourceHooks<C> for DefaultHooks {}
