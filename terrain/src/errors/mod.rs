//! Error taxonomy and dispatch
//!
//! Collaborators and pipeline steps raise a [`Failure`]. The
//! [`ErrorMapper`] turns it into an [`ErrorResponse`] with the status and key
//! of its taxonomy entry and a message from the [`MessageCatalog`]:
//!
//! | Failure | Status | Key |
//! |---|---|---|
//! | `Unauthenticated` | 401 | `unauthenticated` |
//! | `Unauthorized` | 403 | `unauthorized` |
//! | `AssociationNotFound` | 400 | `association_not_found` |
//! | `RecordNotFound` | 404 | `record_not_found` |
//! | `RouteNotFound` | 404 | `route_not_found` |
//! | `Range` | 416 | `range_error` |
//! | `RecordInvalid` | 422 | `record_invalid` (with `details`) |
//! | `Server` | 500 | `server_error` |

mod catalog;
mod failure;
mod mapper;

pub use catalog::{MessageCatalog, StaticCatalog};
pub use failure::{ErrorKey, Failure, FieldErrors};
pub use mapper::{ErrorBody, ErrorDetail, ErrorMapper, ErrorResponse};
