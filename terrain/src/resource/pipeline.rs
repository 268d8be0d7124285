//! The five resource flows
//!
//! | Flow | Steps | Success |
//! |---|---|---|
//! | list | scope, preload, filter, order, page, serialize | 200 + `Content-Range` |
//! | create | permit, build, authorize `create`, persist | 201 |
//! | show | scope, preload, resolve, authorize `read` | 200 |
//! | update | scope, resolve, authorize `update`, permit, persist | 200 |
//! | destroy | scope, resolve, authorize `destroy`, delete | 204 |
//!
//! Any step failure ends the flow; authorization always runs before anything
//! is persisted.

use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};

use super::config::ResourceConfig;
use super::hooks::{DefaultHooks, ResourceHooks};
use super::params::{Includes, ListParams};
use super::response::ResourceResponse;
use crate::authz::Capability;
use crate::collection::Collection;
use crate::context::RequestContext;
use crate::errors::{ErrorMapper, Failure, MessageCatalog};
use crate::pager::Pager;

/// A collection exposed as a REST resource
pub struct Resource<C: Collection + 'static, H = DefaultHooks> {
    config: Arc<ResourceConfig<C>>,
    hooks: H,
    pager: Pager,
    mapper: ErrorMapper,
}

impl<C: Collection + 'static> Resource<C, DefaultHooks> {
    /// Resource with default hooks, an unbounded pager and the built-in
    /// message catalog
    pub fn new(config: ResourceConfig<C>) -> Self {
        Self {
            config: Arc::new(config),
            hooks: DefaultHooks,
            pager: Pager::unbounded(),
            mapper: ErrorMapper::default(),
        }
    }
}

impl<C, H> Resource<C, H>
where
    C: Collection + 'static,
    H: ResourceHooks<C>,
{
    /// Replace the pipeline hooks
    pub fn with_hooks<H2: ResourceHooks<C>>(self, hooks: H2) -> Resource<C, H2> {
        Resource {
            config: self.config,
            hooks,
            pager: self.pager,
            mapper: self.mapper,
        }
    }

    #[must_use]
    pub fn with_pager(mut self, pager: Pager) -> Self {
        self.pager = pager;
        self
    }

    /// Resolve error messages from `catalog`
    #[must_use]
    pub fn with_catalog(mut self, catalog: impl MessageCatalog + 'static) -> Self {
        self.mapper = ErrorMapper::new(Arc::new(catalog));
        self
    }

    #[must_use]
    pub fn with_mapper(mut self, mapper: ErrorMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn config(&self) -> &ResourceConfig<C> {
        &self.config
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn pager(&self) -> Pager {
        self.pager
    }

    pub fn mapper(&self) -> &ErrorMapper {
        &self.mapper
    }

    /// Parse a path id; an unparseable id names no record
    pub fn parse_id(&self, raw: &str) -> Result<C::Id, Failure> {
        raw.parse()
            .map_err(|_| Failure::record_not_found(self.name(), raw))
    }

    /// Turn a flow outcome into an HTTP response
    pub fn respond(
        &self,
        ctx: &RequestContext,
        outcome: Result<ResourceResponse, Failure>,
    ) -> Response {
        match outcome {
            Ok(response) => response.into_response(),
            Err(failure) => self.mapper.map(&failure, ctx).into_response(),
        }
    }

    fn authenticate(&self, ctx: &RequestContext) -> Result<(), Failure> {
        if self.config.requires_authentication() && ctx.principal().is_none() {
            return Err(Failure::Unauthenticated);
        }
        Ok(())
    }

    /// List a page of the scoped collection
    #[tracing::instrument(skip_all, fields(resource = %self.name(), range = ?params.range))]
    pub async fn list(
        &self,
        ctx: &RequestContext,
        params: ListParams,
    ) -> Result<ResourceResponse, Failure> {
        self.authenticate(ctx)?;
        let config = self.config.as_ref();

        let scope = self.hooks.base_scope(config, ctx);
        let scope = self.hooks.preload(config, scope, &params.include)?;
        let scope = self.hooks.filter(config, scope, &params, ctx)?;
        let scope = self.hooks.order(config, scope, params.order.as_deref())?;

        let page = self
            .pager
            .page(config.collection(), scope, params.range.as_deref());
        let (records, content_range) = page.into_parts().await?;
        tracing::debug!(returned = records.len(), %content_range, "page loaded");

        let body = self.hooks.serialize_many(config, &records, &params.include)?;
        Ok(ResourceResponse::ok(body).with_content_range(content_range))
    }

    /// Create a record from the permitted fields of `payload`
    #[tracing::instrument(skip_all, fields(resource = %self.name()))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        payload: Map<String, Value>,
    ) -> Result<ResourceResponse, Failure> {
        self.authenticate(ctx)?;
        let config = self.config.as_ref();

        let attributes = self.hooks.permitted(config, &payload);
        let record = self.hooks.build_record(config, ctx, attributes).await?;
        self.hooks
            .authorize(config, ctx, &record, Capability::Create)?;
        let record = self.hooks.persist_create(config, record).await?;
        tracing::debug!("record created");

        let body = self
            .hooks
            .serialize_one(config, &record, &Includes::default())?;
        Ok(ResourceResponse::created(body))
    }

    /// Show one record
    #[tracing::instrument(skip_all, fields(resource = %self.name(), id = %id))]
    pub async fn show(
        &self,
        ctx: &RequestContext,
        id: &C::Id,
        includes: Includes,
    ) -> Result<ResourceResponse, Failure> {
        self.authenticate(ctx)?;
        let config = self.config.as_ref();

        let scope = self.hooks.base_scope(config, ctx);
        let scope = self.hooks.preload(config, scope, &includes)?;
        let record = self.hooks.resolve_record(config, &scope, id).await?;
        self.hooks.authorize(config, ctx, &record, Capability::Read)?;

        let body = self.hooks.serialize_one(config, &record, &includes)?;
        Ok(ResourceResponse::ok(body))
    }

    /// Apply the permitted fields of `payload` to one record
    #[tracing::instrument(skip_all, fields(resource = %self.name(), id = %id))]
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &C::Id,
        payload: Map<String, Value>,
    ) -> Result<ResourceResponse, Failure> {
        self.authenticate(ctx)?;
        let config = self.config.as_ref();

        let scope = self.hooks.base_scope(config, ctx);
        let record = self.hooks.resolve_record(config, &scope, id).await?;
        self.hooks
            .authorize(config, ctx, &record, Capability::Update)?;

        let attributes = self.hooks.permitted(config, &payload);
        let record = self
            .hooks
            .persist_update(config, record, attributes)
            .await?;
        tracing::debug!("record updated");

        let body = self
            .hooks
            .serialize_one(config, &record, &Includes::default())?;
        Ok(ResourceResponse::ok(body))
    }

    /// Delete one record
    #[tracing::instrument(skip_all, fields(resource = %self.name(), id = %id))]
    pub async fn destroy(
        &self,
        ctx: &RequestContext,
        id: &C::Id,
    ) -> Result<ResourceResponse, Failure> {
        self.authenticate(ctx)?;
        let config = self.config.as_ref();

        let scope = self.hooks.base_scope(config, ctx);
        let record = self.hooks.resolve_record(config, &scope, id).await?;
        self.hooks
            .authorize(config, ctx, &record, Capability::Destroy)?;
        self.hooks.persist_destroy(config, record).await?;
        tracing::debug!("record destroyed");

        Ok(ResourceResponse::no_content())
    }
}

impl<C: Collection + 'static, H> std::fmt::Debug for Resource<C, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("config", &self.config)
            .field("pager", &self.pager)
            .finish_non_exhaustive()
    }
}
