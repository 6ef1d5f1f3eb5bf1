//! Composed API handle.
//!
//! [`Controller`] wraps the XML-RPC client and an optional OneFlow client.
//! Resource code receives the controller instead of deciding which backend
//! to talk to.

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::OneClient;
use crate::error::{ClientError, ClientResult};
use crate::flow::FlowClient;

/// Source of the OpenNebula release string.
///
/// Version negotiation only needs this one call, so it depends on the trait
/// rather than a concrete client.
#[async_trait]
pub trait SystemApi: Send + Sync {
    /// Raw release string as reported by the server.
    async fn system_version(&self) -> ClientResult<String>;
}

#[async_trait]
impl SystemApi for OneClient {
    async fn system_version(&self) -> ClientResult<String> {
        OneClient::system_version(self).await
    }
}

/// API handle shared by every resource operation.
///
/// Cloning is cheap; both clients sit behind `Arc`.
#[derive(Clone)]
pub struct Controller {
    client: Arc<OneClient>,
    flow: Option<Arc<FlowClient>>,
}

impl Controller {
    /// Create a controller backed by the XML-RPC client only.
    #[must_use]
    pub fn new(client: OneClient) -> Self {
        Self {
            client: Arc::new(client),
            flow: None,
        }
    }

    /// Add the OneFlow client.
    #[must_use]
    pub fn with_flow(mut self, flow: FlowClient) -> Self {
        self.flow = Some(Arc::new(flow));
        self
    }

    /// XML-RPC client.
    #[must_use]
    pub fn client(&self) -> &OneClient {
        &self.client
    }

    /// OneFlow client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::FlowNotConfigured`] when no flow endpoint was set.
    pub fn flow(&self) -> ClientResult<&FlowClient> {
        self.flow.as_deref().ok_or(ClientError::FlowNotConfigured)
    }

    /// Whether a OneFlow client is present.
    #[must_use]
    pub fn has_flow(&self) -> bool {
        self.flow.is_some()
    }
}

#[async_trait]
impl SystemApi for Controller {
    async fn system_version(&self) -> ClientResult<String> {
        self.client.system_version().await
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("endpoint", &self.client.endpoint().as_str())
            .field("has_flow", &self.flow.is_some())
            .finish_non_exhaustive()
    }
}
