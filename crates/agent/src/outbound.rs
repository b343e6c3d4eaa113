//! Delivery-side abstraction.
//!
//! The orchestrator never talks to a socket or a bot API directly; it
//! hands envelopes to an [`Outbound`] sink. The WebSocket and Telegram
//! transports each implement this trait.

use async_trait::async_trait;
use niyati_core::{Envelope, Result};

/// Where a session's envelopes go.
#[async_trait]
pub trait Outbound: Send + Sync + 'static {
    /// Deliver one envelope. Implementations return
    /// [`niyati_core::Error::TransportClosed`] once the client is gone.
    async fn send(&self, envelope: &Envelope) -> Result<()>;

    /// Whether the client is still reachable. The orchestrator polls
    /// this between pipeline steps to cancel work for dead clients.
    fn is_connected(&self) -> bool {
        true
    }
}
