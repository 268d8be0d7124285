//! Range-based pagination
//!
//! Inbound `Range: <from>-<to>` headers select an inclusive slice of a
//! collection; the outbound `Content-Range: <from>-<to>/<count>` header
//! describes what was returned (`*/0` for an empty collection).
//!
//! | Range | Records | Bounds | Content-Range |
//! |---|---|---|---|
//! | absent | 10 | `0-9` | `0-9/10` |
//! | `0-4` | 10 | `0-4` | `0-4/10` |
//! | `5-14` | 10 | `5-14` | `5-9/10` |
//! | `5-` | 10 | `5-9` | `5-9/10` |
//! | `-5` | 10 | `0-5` | `0-5/10` |
//! | `3-2` | any | error | 416 |
//! | absent | 0 | `0--1` | `*/0` |

mod page;
mod range;

pub use page::{ContentRange, Page, Pager};
pub use range::{resolve_bounds, Bounds, RangeError, RangeSpec};
