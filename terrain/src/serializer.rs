//! Record serialization
//!
//! The pipeline hands every outbound record to a [`Serializer`] together with
//! the relation names the caller asked for through `include`.
//! [`JsonSerializer`] covers any `serde::Serialize` record; relations the
//! collection preloaded are already part of the record, so it emits them as
//! ordinary fields.

use serde::Serialize;
use serde_json::Value;

use crate::errors::Failure;

/// Record to JSON conversion
pub trait Serializer<R>: Send + Sync {
    /// Serialize one record, honoring the requested relations
    fn serialize(&self, record: &R, includes: &[String]) -> Result<Value, Failure>;

    /// Serialize a list of records as a JSON array
    fn serialize_many(&self, records: &[R], includes: &[String]) -> Result<Value, Failure> {
        records
            .iter()
            .map(|record| self.serialize(record, includes))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

/// serde-based serializer
///
/// # Example
///
/// ```rust
/// use serde::Serialize;
/// use terrain::serializer::{JsonSerializer, Serializer};
///
/// #[derive(Serialize)]
/// struct Account { id: u64, email: String, password_hash: String }
///
/// let serializer = JsonSerializer::new().except("password_hash");
/// let account = Account { id: 1, email: "a@example.com".into(), password_hash: "x".into() };
/// let json = serializer.serialize(&account, &[]).unwrap();
/// assert_eq!(json, serde_json::json!({ "id": 1, "email": "a@example.com" }));
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    except: Vec<String>,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never emit `field`
    #[must_use]
    pub fn except(mut self, field: impl Into<String>) -> Self {
        self.except.push(field.into());
        self
    }
}

impl<R: Serialize + Send + Sync> Serializer<R> for JsonSerializer {
    fn serialize(&self, record: &R, _includes: &[String]) -> Result<Value, Failure> {
        let mut value = serde_json::to_value(record)?;
        if let Value::Object(fields) = &mut value {
            for field in &self.except {
                fields.remove(field);
            }
        }
        Ok(value)
    }
}
