//! Sample route catalogue.
//!
//! # Responsibilities
//! - Exercise every routing feature through a real route table
//! - Keep each feature's routes in its own registration function
//!
//! # Routes
//! ```text
//! /router/method                         GET POST PUT PATCH DELETE HEAD OPTIONS
//! /router/any                            every method
//! /router/request/path/require/:requirePathParam
//! /router/request/path/remain/*remainPathParam
//! /router/request/query                  query, default, array, map
//! /router/request/bind                   header + query binding
//! /router/request/validate               declarative validation
//! /router/response/{json,yaml,xml}       one record, three encodings
//! /router/group/{v1,v2}/hello            prefix groups
//! /router/group/middleware/hello         group-local middleware + store
//! ```

pub mod groups;
pub mod methods;
pub mod params;
pub mod responses;

use crate::routing::{RouteError, Router};

/// Register the whole catalogue.
pub fn register_routes(router: &mut Router) -> Result<(), RouteError> {
    methods::register(router)?;
    params::register(router)?;
    responses::register(router)?;
    groups::register(router)?;
    groups::register_with_middleware(router)?;
    Ok(())
}
