//! Principals, capabilities and the authorization hook
//!
//! A resource may bind a [`Policy`]. When it does, every record-level flow asks
//! it whether the acting [`Principal`] holds the flow's [`Capability`] on the
//! record at hand. When it does not, authorization is skipped and the flow
//! proceeds: resources are permissive until a policy is attached.
//!
//! ```rust
//! use terrain::authz::{Capability, Policy, Principal};
//!
//! let owner_only = |principal: Option<&Principal>, owner: &String, _cap: Capability| {
//!     principal.is_some_and(|p| &p.sub == owner)
//! };
//!
//! let alice = Principal::new("alice");
//! assert!(owner_only.allows(Some(&alice), &"alice".to_string(), Capability::Update));
//! assert!(!owner_only.allows(None, &"alice".to_string(), Capability::Read));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::Failure;

/// The authenticated caller of a request
///
/// Upstream authentication middleware inserts one into the request
/// extensions; the router hands it to the pipeline untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Subject (user ID or client ID)
    pub sub: String,

    /// Roles
    #[serde(default)]
    pub roles: Vec<String>,

    /// Permissions
    #[serde(default)]
    pub perms: Vec<String>,
}

impl Principal {
    /// Create a principal with no roles or permissions
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            roles: Vec::new(),
            perms: Vec::new(),
        }
    }

    /// Add a role
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Add a permission
    #[must_use]
    pub fn with_permission(mut self, perm: impl Into<String>) -> Self {
        self.perms.push(perm.into());
        self
    }

    /// Check if the principal has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check if the principal has a specific permission
    pub fn has_permission(&self, perm: &str) -> bool {
        self.perms.iter().any(|p| p == perm)
    }
}

/// Named action checked against a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Creating a record (checked against the unsaved record)
    Create,
    /// Reading a single record
    Read,
    /// Updating a record
    Update,
    /// Deleting a record
    Destroy,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Read => write!(f, "read"),
            Self::Update => write!(f, "update"),
            Self::Destroy => write!(f, "destroy"),
        }
    }
}

/// Authorization decision for records of type `R`
pub trait Policy<R>: Send + Sync {
    /// Return `true` if `principal` may perform `capability` on `record`
    fn allows(&self, principal: Option<&Principal>, record: &R, capability: Capability) -> bool;
}

impl<R, F> Policy<R> for F
where
    F: Fn(Option<&Principal>, &R, Capability) -> bool + Send + Sync,
{
    fn allows(&self, principal: Option<&Principal>, record: &R, capability: Capability) -> bool {
        self(principal, record, capability)
    }
}

/// Run the authorization hook
///
/// No bound policy means allowed. A denial becomes [`Failure::Unauthorized`].
/// This never produces [`Failure::Unauthenticated`]; a missing principal is
/// simply passed to the policy as `None`.
pub fn authorize<R>(
    policy: Option<&dyn Policy<R>>,
    resource: &str,
    principal: Option<&Principal>,
    record: &R,
    capability: Capability,
) -> Result<(), Failure> {
    let Some(policy) = policy else {
        tracing::debug!(resource, %capability, "no policy bound, skipping authorization");
        return Ok(());
    };

    if policy.allows(principal, record, capability) {
        Ok(())
    } else {
        tracing::debug!(
            resource,
            %capability,
            principal = principal.map(|p| p.sub.as_str()),
            "policy denied"
        );
        Err(Failure::Unauthorized {
            resource: resource.to_string(),
            capability,
        })
    }
}
