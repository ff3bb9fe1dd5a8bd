//! Handler traits and the error type a chain can fail with.

use thiserror::Error;

use crate::binding::BindError;
use crate::http::context::RequestContext;
use crate::http::response::RenderError;
use crate::http::store::StoreError;

/// Failure raised by a handler in a route chain.
///
/// Every variant becomes a 500 as soon as it leaves the handler that raised
/// it, so outer middleware already sees the final status. Handlers that want
/// a different status write it themselves and return `Ok(())`.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("bind: {0}")]
    Bind(#[from] BindError),

    #[error("{0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("panic: {0}")]
    Panic(String),
}

impl HandlerError {
    pub fn internal(message: impl Into<String>) -> Self {
        let message: String = message.into();
        HandlerError::Internal(message.into())
    }

    /// Store misuse and panics are handler bugs rather than request problems.
    pub fn is_bug(&self) -> bool {
        matches!(self, HandlerError::Store(_) | HandlerError::Panic(_))
    }
}

pub type HandlerResult = Result<(), HandlerError>;

/// Terminal handler at the end of a route chain.
pub trait Endpoint: Send + Sync + 'static {
    fn call(&self, ctx: &mut RequestContext) -> HandlerResult;
}

impl<F> Endpoint for F
where
    F: Fn(&mut RequestContext) -> HandlerResult + Send + Sync + 'static,
{
    fn call(&self, ctx: &mut RequestContext) -> HandlerResult {
        self(ctx)
    }
}
