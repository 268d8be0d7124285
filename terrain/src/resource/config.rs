//! Per-resource configuration

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::authz::Policy;
use crate::collection::{Attributes, Collection};
use crate::serializer::{JsonSerializer, Serializer};

/// Ordered allow-list of writable field names
///
/// Only listed fields are read from inbound write payloads; everything else
/// is dropped without error.
///
/// ```rust
/// use serde_json::json;
/// use terrain::resource::PermitList;
///
/// let permit = PermitList::new(["foo", "bar"]);
/// let payload = json!({ "foo": 1, "admin": true });
/// let attributes = permit.filter(payload.as_object().unwrap());
/// assert_eq!(attributes.len(), 1);
/// assert!(attributes.contains_key("foo"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermitList {
    fields: Vec<String>,
}

impl PermitList {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut permit = Self::default();
        for field in fields {
            let field = field.into();
            if !permit.is_permitted(&field) {
                permit.fields.push(field);
            }
        }
        permit
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_permitted(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Keep the permitted fields of a write payload
    pub fn filter(&self, payload: &Map<String, Value>) -> Attributes {
        let discarded: Vec<&str> = payload
            .keys()
            .filter(|key| !self.is_permitted(key))
            .map(String::as_str)
            .collect();
        if !discarded.is_empty() {
            tracing::debug!(?discarded, "discarding unpermitted fields");
        }

        self.fields
            .iter()
            .filter_map(|field| payload.get(field).map(|value| (field.clone(), value.clone())))
            .collect()
    }
}

/// Everything a resource is configured with, set once and shared read-only
pub struct ResourceConfig<C: Collection> {
    collection: Arc<C>,
    permit: PermitList,
    policy: Option<Arc<dyn Policy<C::Record>>>,
    serializer: Arc<dyn Serializer<C::Record>>,
    require_authentication: bool,
}

impl<C> ResourceConfig<C>
where
    C: Collection + 'static,
    C::Record: Serialize,
{
    /// Configure a resource over `collection`, with no permitted fields, no
    /// policy and the [`JsonSerializer`]
    pub fn new(collection: C) -> Self {
        Self::shared(Arc::new(collection))
    }

    /// Configure a resource over a collection the host also keeps a handle to
    pub fn shared(collection: Arc<C>) -> Self {
        Self {
            collection,
            permit: PermitList::default(),
            policy: None,
            serializer: Arc::new(JsonSerializer::new()),
            require_authentication: false,
        }
    }
}

impl<C: Collection + 'static> ResourceConfig<C> {
    /// Set the writable fields
    #[must_use]
    pub fn permit<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permit = PermitList::new(fields);
        self
    }

    /// Bind an authorization policy
    #[must_use]
    pub fn policy(mut self, policy: impl Policy<C::Record> + 'static) -> Self {
        self.policy = Some(Arc::new(policy));
        self
    }

    #[must_use]
    pub fn serializer(mut self, serializer: impl Serializer<C::Record> + 'static) -> Self {
        self.serializer = Arc::new(serializer);
        self
    }

    /// Reject requests without a principal before any step runs
    #[must_use]
    pub fn require_authentication(mut self, required: bool) -> Self {
        self.require_authentication = required;
        self
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    pub fn name(&self) -> &str {
        self.collection.name()
    }

    pub fn permit_list(&self) -> &PermitList {
        &self.permit
    }

    /// The bound policy, if any
    pub fn bound_policy(&self) -> Option<&dyn Policy<C::Record>> {
        self.policy.as_deref()
    }

    pub fn record_serializer(&self) -> &dyn Serializer<C::Record> {
        self.serializer.as_ref()
    }

    pub fn requires_authentication(&self) -> bool {
        self.require_authentication
    }
}

impl<C: Collection> std::fmt::Debug for ResourceConfig<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceConfig")
            .field("collection", &self.collection.name())
            .field("permit", &self.permit)
            .field("policy", &self.policy.is_some())
            .field("require_authentication", &self.require_authentication)
            .finish_non_exhaustive()
    }
}
