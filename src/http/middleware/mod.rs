//! Middleware subsystem.
//!
//! # Data Flow
//! ```text
//! Router::dispatch
//!     → chain.rs (Next walks the route's handler list)
//!     → request_id.rs (x-request-id in, x-request-id out)
//!     → logger.rs (latency + status after the chain returns)
//!     → group middleware registered by the application
//!     → endpoint
//! ```

pub mod chain;
pub mod logger;
pub mod request_id;

pub use chain::{from_fn, Chain, FromFn, Middleware, Next};
pub use logger::Logger;
pub use request_id::RequestId;
