//! Collection contract and query shaping
//!
//! A [`Collection`] is the backing store behind a resource: it counts,
//! enumerates, slices, looks up, inserts, updates and deletes records of one
//! kind. The pipeline describes *what* it wants through a [`Scope`] and a
//! [`Pagination`] window; the collection decides *how*.
//!
//! [`MemoryCollection`] is a complete in-memory implementation, useful for
//! tests, prototypes and small fixed datasets.

mod memory;
mod query;
mod traits;

pub use memory::{MemoryCollection, MemoryRecord};
pub use query::{
    parse_order, FilterCondition, FilterOperator, OrderDirection, OrderTerm, Pagination, Scope,
};
pub use traits::{Attributes, Collection};
