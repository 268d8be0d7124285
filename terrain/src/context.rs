//! Per-request context shared by the pipeline and the error mapper

use http::Method;

use crate::authz::Principal;

/// What the pipeline knows about the inbound request
///
/// Used for authorization (the principal) and for message interpolation
/// (method and path). Request-local; never shared across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// HTTP method
    pub method: Method,
    /// Request path, without query string
    pub path: String,
    /// Authenticated caller, if upstream authentication found one
    pub principal: Option<Principal>,
}

impl RequestContext {
    /// Create a context without a principal
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            principal: None,
        }
    }

    /// Attach the acting principal
    #[must_use]
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// The acting principal, if any
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(Method::GET, "/")
    }
}
