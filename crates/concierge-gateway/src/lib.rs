//! HTTP gateway to the remote support backend.
//!
//! A single-purpose client: post a user question to `/query`, post a ticket
//! to `/create-ticket`, and translate every failure into a typed
//! [`GatewayError`] the surface controllers can render. The [`SupportGateway`]
//! trait is the seam controllers are generic over, so tests substitute a
//! scripted gateway instead of a live server.

pub mod client;
pub mod error;

pub use client::GatewayClient;
pub use error::GatewayError;

use async_trait::async_trait;

/// Client-side contract of the support backend.
#[async_trait]
pub trait SupportGateway: Send + Sync {
    /// Ask the support assistant a question and return its answer text.
    async fn ask(&self, question: &str) -> Result<String, GatewayError>;

    /// File a support ticket and return the backend's confirmation message.
    async fn submit_ticket(&self, email: &str, description: &str)
        -> Result<String, GatewayError>;
}

// One client can back several surfaces at once.
#[async_trait]
impl<G: SupportGateway + ?Sized> SupportGateway for std::sync::Arc<G> {
    async fn ask(&self, question: &str) -> Result<String, GatewayError> {
        (**self).ask(question).await
    }

    async fn submit_ticket(
        &self,
        email: &str,
        description: &str,
    ) -> Result<String, GatewayError> {
        (**self).submit_ticket(email, description).await
    }
}
