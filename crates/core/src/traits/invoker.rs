//! Protocol client interface.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Envelope, InvokePayload};

/// A protocol-specific client that performs the actual remote call for one
/// resource class.
///
/// The wire format is the implementation's concern; the dispatcher only
/// requires that responses normalize into an [`Envelope`].
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Short protocol label, for logging (e.g. `a2a`, `mcp`, `loopback`).
    fn protocol(&self) -> &str;

    /// Establish the underlying connection.
    ///
    /// Must be idempotent: the dispatcher calls this lazily on first use and
    /// reuses the established connection afterwards.
    async fn connect(&self) -> Result<()>;

    /// Invoke the resource at `endpoint` with a class-shaped payload.
    async fn invoke(&self, endpoint: &str, payload: InvokePayload) -> Result<Envelope>;
}
