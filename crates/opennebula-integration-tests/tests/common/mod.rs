//! Shared harness for integration tests.

use std::collections::HashMap;

use opennebula_config::DeclaredConfig;
use opennebula_provider::{BootstrapOutcome, OpenNebulaProvider};
use opennebula_test::{MockOpenNebula, init_test_logging};

/// A provider wired to a mock OpenNebula server.
#[allow(dead_code)]
pub struct ProviderHarness {
    /// The provider under test.
    pub provider: OpenNebulaProvider,
    /// The mock server.
    pub one: MockOpenNebula,
}

#[allow(dead_code)]
impl ProviderHarness {
    /// Start a mock server and a fresh provider.
    pub async fn start() -> Self {
        init_test_logging();
        Self {
            provider: OpenNebulaProvider::new(),
            one: MockOpenNebula::start().await,
        }
    }

    /// Run one configure cycle with an explicit environment.
    pub async fn configure(
        &self,
        declared: &DeclaredConfig,
        env: &HashMap<String, String>,
    ) -> BootstrapOutcome {
        self.provider.configure_with_env(declared, env).await
    }
}
