//! Typed failures raised by the pipeline and its collaborators
//!
//! # Example
//!
//! ```rust
//! use terrain::errors::{ErrorKey, Failure, FieldErrors};
//!
//! let mut fields = FieldErrors::new();
//! fields.add("foo", "can't be blank");
//!
//! let failure = Failure::RecordInvalid(fields);
//! assert_eq!(failure.key(), ErrorKey::RecordInvalid);
//! assert_eq!(failure.key().status_code().as_u16(), 422);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::authz::Capability;
use crate::pager::RangeError;

/// Per-field validation messages, ordered by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Create an empty error map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Builder form of [`FieldErrors::add`]
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(field, message);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Messages recorded for one field
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{} {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Key of a taxonomy entry
///
/// The order of the variants is the order in which failures are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKey {
    /// No authenticated principal
    Unauthenticated,
    /// Policy denied the capability
    Unauthorized,
    /// Requested relation does not exist
    AssociationNotFound,
    /// No record with the requested id
    RecordNotFound,
    /// No route matches the request
    RouteNotFound,
    /// Range header could not be satisfied
    RangeError,
    /// Record failed validation on write
    RecordInvalid,
    /// Anything unclassified
    ServerError,
}

impl ErrorKey {
    /// Every key, in classification order
    pub const ALL: [ErrorKey; 8] = [
        ErrorKey::Unauthenticated,
        ErrorKey::Unauthorized,
        ErrorKey::AssociationNotFound,
        ErrorKey::RecordNotFound,
        ErrorKey::RouteNotFound,
        ErrorKey::RangeError,
        ErrorKey::RecordInvalid,
        ErrorKey::ServerError,
    ];

    /// Wire name of the key, as emitted in `error.key`
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Unauthorized => "unauthorized",
            Self::AssociationNotFound => "association_not_found",
            Self::RecordNotFound => "record_not_found",
            Self::RouteNotFound => "route_not_found",
            Self::RangeError => "range_error",
            Self::RecordInvalid => "record_invalid",
            Self::ServerError => "server_error",
        }
    }

    /// HTTP status code for this key
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::AssociationNotFound => StatusCode::BAD_REQUEST,
            Self::RecordNotFound | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::RangeError => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::RecordInvalid => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message catalog key, `terrain.errors.<key>`
    #[must_use]
    pub fn catalog_key(&self) -> String {
        format!("terrain.errors.{}", self.as_str())
    }
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed failure that ends the current request
///
/// Produced by collaborators or by the pipeline itself and consumed once by
/// the [`ErrorMapper`](super::ErrorMapper).
#[derive(Debug, Error)]
pub enum Failure {
    /// No authenticated principal where one is required
    #[error("authentication required")]
    Unauthenticated,

    /// Policy denied the capability
    #[error("{capability} on {resource} denied by policy")]
    Unauthorized {
        resource: String,
        capability: Capability,
    },

    /// Unknown relation in an include list
    #[error("association not found: {0}")]
    AssociationNotFound(String),

    /// No record with this id in the scoped collection
    #[error("{resource} not found [id: {id}]")]
    RecordNotFound { resource: String, id: String },

    /// Unroutable request
    #[error("no route for {method} {path}")]
    RouteNotFound { method: String, path: String },

    /// Invalid range specifier
    #[error(transparent)]
    Range(#[from] RangeError),

    /// Record failed validation
    #[error("record invalid: {0}")]
    RecordInvalid(FieldErrors),

    /// Anything unclassified. The source is logged, never emitted.
    #[error("server error: {0}")]
    Server(#[source] anyhow::Error),
}

impl Failure {
    /// Create a record not found failure
    pub fn record_not_found(resource: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::RecordNotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Create an unclassified failure from a message
    pub fn server(message: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Server(anyhow::Error::msg(message))
    }

    /// Taxonomy entry of this failure
    #[must_use]
    pub fn key(&self) -> ErrorKey {
        match self {
            Self::Unauthenticated => ErrorKey::Unauthenticated,
            Self::Unauthorized { .. } => ErrorKey::Unauthorized,
            Self::AssociationNotFound(_) => ErrorKey::AssociationNotFound,
            Self::RecordNotFound { .. } => ErrorKey::RecordNotFound,
            Self::RouteNotFound { .. } => ErrorKey::RouteNotFound,
            Self::Range(_) => ErrorKey::RangeError,
            Self::RecordInvalid(_) => ErrorKey::RecordInvalid,
            Self::Server(_) => ErrorKey::ServerError,
        }
    }

    /// Structured details; only validation failures carry any
    pub fn details(&self) -> Option<&FieldErrors> {
        match self {
            Self::RecordInvalid(fields) if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }
}

/// Classify an opaque collaborator error
///
/// The first typed failure found along the error chain wins; an error chain
/// with none is unclassified.
impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<Failure>() {
            Ok(failure) => return failure,
            Err(err) => err,
        };

        for cause in err.chain() {
            if let Some(failure) = cause.downcast_ref::<Failure>().and_then(Failure::classified) {
                return failure;
            }
            if let Some(range) = cause.downcast_ref::<RangeError>() {
                return Failure::Range(range.clone());
            }
        }
        Failure::Server(err)
    }
}

impl Failure {
    /// Copy of a borrowed failure that keeps its key; `None` for `Server`
    fn classified(&self) -> Option<Failure> {
        Some(match self {
            Self::Unauthenticated => Self::Unauthenticated,
            Self::Unauthorized {
                resource,
                capability,
            } => Self::Unauthorized {
                resource: resource.clone(),
                capability: *capability,
            },
            Self::AssociationNotFound(name) => Self::AssociationNotFound(name.clone()),
            Self::RecordNotFound { resource, id } => Self::RecordNotFound {
                resource: resource.clone(),
                id: id.clone(),
            },
            Self::RouteNotFound { method, path } => Self::RouteNotFound {
                method: method.clone(),
                path: path.clone(),
            },
            Self::Range(range) => Self::Range(range.clone()),
            Self::RecordInvalid(fields) => Self::RecordInvalid(fields.clone()),
            Self::Server(_) => return None,
        })
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Failure::Server(err.into())
    }
}
