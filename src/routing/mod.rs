//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     Router / Group (prefix + inherited middleware)
//!     → pattern.rs (parse "/users/:id/*rest" into segments)
//!     → trie.rs (insert into the method's trie, reject duplicates/conflicts)
//!
//! Incoming Request (method, path, query, headers, body)
//!     → router.rs (pick the method's trie)
//!     → trie.rs (walk segments, capture params)
//!     → Return: matched Route + Params, or NotFound
//!     → Route chain runs against a fresh RequestContext
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable once the router is shared
//! - One trie per method; `any` fans out to all of them
//! - Literal beats capture beats wildcard at the same position
//! - Deterministic: same path always matches the same route

pub mod method;
pub mod pattern;
pub mod router;
pub mod trie;

use thiserror::Error;

pub use method::Method;
pub use pattern::{Params, Pattern, Segment};
pub use router::{Group, Route, Router};
pub use trie::RouteTrie;

/// Errors raised while registering routes.
///
/// All of these are startup-time programming errors; callers are expected
/// to abort rather than serve with a partial route table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("route {method} {pattern} is already registered")]
    Duplicate { method: Method, pattern: String },

    #[error("route {method} {pattern}: segment '{segment}' conflicts with existing '{existing}'")]
    Conflict {
        method: Method,
        pattern: String,
        segment: String,
        existing: String,
    },

    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
