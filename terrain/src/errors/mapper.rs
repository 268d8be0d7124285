//! Failure to HTTP response mapping
//!
//! Every failure leaves the pipeline through [`ErrorMapper::map`], which is
//! the only place an outward error body is built.
//!
//! ```text
//! HTTP/1.1 422 Unprocessable Entity
//! { "error": { "key": "record_invalid", "message": "...", "details": { "foo": ["can't be blank"] } } }
//! ```

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::catalog::{MessageCatalog, StaticCatalog};
use super::failure::{Failure, FieldErrors};
use crate::context::RequestContext;

/// Inner error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Taxonomy key
    pub key: String,
    /// Catalog message
    pub message: String,
    /// Field errors, present only when non-empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

/// Error response body, `{ "error": { ... } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// A mapped failure: status plus body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Maps typed failures to `(status, key, message, details)`
#[derive(Clone)]
pub struct ErrorMapper {
    catalog: Arc<dyn MessageCatalog>,
}

impl ErrorMapper {
    pub fn new(catalog: Arc<dyn MessageCatalog>) -> Self {
        Self { catalog }
    }

    /// Map a failure to its response
    pub fn map(&self, failure: &Failure, ctx: &RequestContext) -> ErrorResponse {
        let key = failure.key();
        let status = key.status_code();

        if status.is_server_error() {
            tracing::error!(
                key = %key,
                status = status.as_u16(),
                method = %ctx.method,
                path = %ctx.path,
                error = ?failure,
                "request failed"
            );
        } else {
            tracing::warn!(
                key = %key,
                status = status.as_u16(),
                method = %ctx.method,
                path = %ctx.path,
                "request rejected: {}", failure
            );
        }

        let catalog_key = key.catalog_key();
        let message = self
            .catalog
            .translate(&catalog_key, ctx)
            .unwrap_or(catalog_key);

        ErrorResponse {
            status,
            body: ErrorBody {
                error: ErrorDetail {
                    key: key.as_str().to_string(),
                    message,
                    details: failure.details().cloned(),
                },
            },
        }
    }
}

impl Default for ErrorMapper {
    fn default() -> Self {
        Self::new(Arc::new(StaticCatalog::default()))
    }
}

impl std::fmt::Debug for ErrorMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorMapper").finish_non_exhaustive()
    }
}

/// Maps with the built-in catalog and a placeholder request
///
/// Prefer [`ErrorMapper::map`] where the request is known.
impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        ErrorMapper::default()
            .map(&self, &RequestContext::default())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::Capability;
    use crate::errors::ErrorKey;
    use crate::pager::RangeError;
    use http::Method;

    fn map(failure: Failure) -> ErrorResponse {
        ErrorMapper::default().map(&failure, &RequestContext::new(Method::GET, "/examples"))
    }

    #[test]
    fn test_taxonomy_round_trips() {
        let cases = vec![
            (Failure::Unauthenticated, 401, "unauthenticated"),
            (
                Failure::Unauthorized {
                    resource: "examples".into(),
                    capability: Capability::Read,
                },
                403,
                "unauthorized",
            ),
            (
                Failure::AssociationNotFound("bogus".into()),
                400,
                "association_not_found",
            ),
            (Failure::record_not_found("examples", 999), 404, "record_not_found"),
            (
                Failure::RouteNotFound {
                    method: "GET".into(),
                    path: "/x".into(),
                },
                404,
                "route_not_found",
            ),
            (
                Failure::Range(RangeError::Inverted { from: 3, to: 2 }),
                416,
                "range_error",
            ),
            (
                Failure::RecordInvalid(FieldErrors::new().with("foo", "can't be blank")),
                422,
                "record_invalid",
            ),
            (Failure::server("boom"), 500, "server_error"),
        ];

        for (failure, status, key) in cases {
            let response = map(failure);
            assert_eq!(response.status.as_u16(), status, "status for {}", key);
            assert_eq!(response.body.error.key, key);
            assert!(!response.body.error.message.is_empty());
        }
    }

    #[test]
    fn test_record_invalid_carries_details() {
        let response = map(Failure::RecordInvalid(
            FieldErrors::new().with("foo", "can't be blank"),
        ));
        let details = response.body.error.details.expect("details");
        assert_eq!(details.get("foo"), Some(&["can't be blank".to_string()][..]));
    }

    #[test]
    fn test_details_omitted_from_json_when_absent() {
        let response = map(Failure::record_not_found("examples", 1));
        let json = serde_json::to_value(&response.body).unwrap();
        assert_eq!(json["error"]["key"], "record_not_found");
        assert!(json["error"].get("details").is_none());
    }

    #[test]
    fn test_server_error_hides_internal_message() {
        let response = map(Failure::server("password=hunter2 leaked"));
        assert!(!response.body.error.message.contains("hunter2"));
    }

    #[test]
    fn test_message_comes_from_catalog() {
        let catalog = StaticCatalog::empty()
            .with_message(ErrorKey::RecordNotFound.catalog_key(), "gone from %{path}");
        let mapper = ErrorMapper::new(Arc::new(catalog));
        let response = mapper.map(
            &Failure::record_not_found("examples", 5),
            &RequestContext::new(Method::GET, "/examples/5"),
        );
        assert_eq!(response.body.error.message, "gone from /examples/5");
    }

    #[test]
    fn test_missing_catalog_entry_falls_back_to_key() {
        let mapper = ErrorMapper::new(Arc::new(StaticCatalog::empty()));
        let response = mapper.map(&Failure::Unauthenticated, &RequestContext::default());
        assert_eq!(response.body.error.message, "terrain.errors.unauthenticated");
    }
}
