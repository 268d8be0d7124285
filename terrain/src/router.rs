//! axum routes for a [`Resource`]
//!
//! | Method | Path | Flow |
//! |---|---|---|
//! | `GET` | `/` | list (`Range` header, `order`, `include`) |
//! | `POST` | `/` | create |
//! | `GET` | `/{id}` | show (`include`) |
//! | `PATCH`, `PUT` | `/{id}` | update |
//! | `DELETE` | `/{id}` | destroy |
//!
//! Anything else is `route_not_found`. Mount the router where the resource
//! lives:
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .nest("/examples", terrain::router::routes(Arc::new(examples)))
//!     .layer(TraceLayer::new_for_http());
//! ```

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, OriginalUri, Path, Query, State},
    http::{header, request::Parts, HeaderMap},
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};

use crate::authz::Principal;
use crate::collection::Collection;
use crate::context::RequestContext;
use crate::errors::Failure;
use crate::resource::{Includes, ListParams, Resource, ResourceHooks};

type Shared<C, H> = State<Arc<Resource<C, H>>>;
type QueryMap = Query<HashMap<String, String>>;

/// Build the router for one resource
pub fn routes<C, H>(resource: Arc<Resource<C, H>>) -> Router
where
    C: Collection + 'static,
    H: ResourceHooks<C> + 'static,
{
    Router::new()
        .route(
            "/",
            get(list::<C, H>)
                .post(create::<C, H>)
                .fallback(route_not_found::<C, H>),
        )
        .route(
            "/{id}",
            get(show::<C, H>)
                .patch(update::<C, H>)
                .put(update::<C, H>)
                .delete(destroy::<C, H>)
                .fallback(route_not_found::<C, H>),
        )
        .fallback(route_not_found::<C, H>)
        .with_state(resource)
}

/// Method, original path and upstream principal of the request
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.path().to_string(), |uri| uri.path().to_string());

        Ok(Self {
            method: parts.method.clone(),
            path,
            principal: parts.extensions.get::<Principal>().cloned(),
        })
    }
}

fn query_map(query: Result<QueryMap, impl std::fmt::Display>) -> HashMap<String, String> {
    match query {
        Ok(Query(map)) => map,
        Err(rejection) => {
            tracing::debug!(%rejection, "ignoring unparseable query string");
            HashMap::new()
        }
    }
}

// A missing or non-JSON body is an empty payload
fn payload(body: Result<Json<Map<String, Value>>, JsonRejection>) -> Map<String, Value> {
    match body {
        Ok(Json(map)) => map,
        Err(rejection) => {
            tracing::debug!(%rejection, "treating write body as empty");
            Map::new()
        }
    }
}

fn range_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::RANGE)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

async fn list<C, H>(
    State(resource): Shared<C, H>,
    ctx: RequestContext,
    headers: HeaderMap,
    query: Result<QueryMap, axum::extract::rejection::QueryRejection>,
) -> Response
where
    C: Collection + 'static,
    H: ResourceHooks<C> + 'static,
{
    let params = ListParams::from_query(query_map(query), range_header(&headers));
    let outcome = resource.list(&ctx, params).await;
    resource.respond(&ctx, outcome)
}

async fn create<C, H>(
    State(resource): Shared<C, H>,
    ctx: RequestContext,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response
where
    C: Collection + 'static,
    H: ResourceHooks<C> + 'static,
{
    let outcome = resource.create(&ctx, payload(body)).await;
    resource.respond(&ctx, outcome)
}

async fn show<C, H>(
    State(resource): Shared<C, H>,
    ctx: RequestContext,
    Path(id): Path<String>,
    query: Result<QueryMap, axum::extract::rejection::QueryRejection>,
) -> Response
where
    C: Collection + 'static,
    H: ResourceHooks<C> + 'static,
{
    let query = query_map(query);
    let includes = Includes::parse(query.get("include").map(String::as_str));
    let outcome = match resource.parse_id(&id) {
        Ok(id) => resource.show(&ctx, &id, includes).await,
        Err(failure) => Err(failure),
    };
    resource.respond(&ctx, outcome)
}

async fn update<C, H>(
    State(resource): Shared<C, H>,
    ctx: RequestContext,
    Path(id): Path<String>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response
where
    C: Collection + 'static,
    H: ResourceHooks<C> + 'static,
{
    let outcome = match resource.parse_id(&id) {
        Ok(id) => resource.update(&ctx, &id, payload(body)).await,
        Err(failure) => Err(failure),
    };
    resource.respond(&ctx, outcome)
}

async fn destroy<C, H>(
    State(resource): Shared<C, H>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Response
where
    C: Collection + 'static,
    H: ResourceHooks<C> + 'static,
{
    let outcome = match resource.parse_id(&id) {
        Ok(id) => resource.destroy(&ctx, &id).await,
        Err(failure) => Err(failure),
    };
    resource.respond(&ctx, outcome)
}

async fn route_not_found<C, H>(State(resource): Shared<C, H>, ctx: RequestContext) -> Response
where
    C: Collection + 'static,
    H: ResourceHooks<C> + 'static,
{
    let failure = Failure::RouteNotFound {
        method: ctx.method.to_string(),
        path: ctx.path.clone(),
    };
    resource.respond(&ctx, Err(failure))
}
