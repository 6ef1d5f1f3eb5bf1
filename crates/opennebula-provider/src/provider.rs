//! Provider entry point.

use std::collections::HashMap;
use std::sync::Arc;

use opennebula_config::DeclaredConfig;
use opennebula_config::env::collect_env_vars;
use opennebula_core::KeyedMutex;

use crate::bootstrap::{self, BootstrapOutcome};
use crate::schema::ProviderSchema;

/// The `opennebula` provider.
///
/// Owns the keyed lock registry for the life of the plugin process; every
/// session configured through it shares that registry.
#[derive(Debug, Default)]
pub struct OpenNebulaProvider {
    mutex: Arc<KeyedMutex>,
}

impl OpenNebulaProvider {
    /// Provider with a fresh lock registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that shares an existing lock registry.
    #[must_use]
    pub fn with_mutex(mutex: Arc<KeyedMutex>) -> Self {
        Self { mutex }
    }

    /// Schema of the provider block.
    #[must_use]
    pub fn schema(&self) -> ProviderSchema {
        ProviderSchema::opennebula()
    }

    /// The keyed lock registry.
    #[must_use]
    pub fn mutex(&self) -> &Arc<KeyedMutex> {
        &self.mutex
    }

    /// Configure against an explicit environment snapshot.
    pub async fn configure_with_env(
        &self,
        declared: &DeclaredConfig,
        env: &HashMap<String, String>,
    ) -> BootstrapOutcome {
        bootstrap::configure(declared, env, Arc::clone(&self.mutex)).await
    }

    /// Configure against the current process environment.
    pub async fn configure(&self, declared: &DeclaredConfig) -> BootstrapOutcome {
        let env = collect_env_vars();
        self.configure_with_env(declared, &env).await
    }
}

#[cfg(test)]
mod tests {
    use opennebula_test::{MockOpenNebula, test_declared_config, test_env};

    use super::*;

    #[tokio::test]
    async fn test_sessions_share_the_provider_registry() {
        let mut one = MockOpenNebula::start().await;
        let _mock = one.expect_version("6.8.0").await;
        let provider = OpenNebulaProvider::new();
        let declared = test_declared_config(&one.endpoint());

        let first = provider.configure_with_env(&declared, &test_env()).await.session.unwrap();
        let second = provider.configure_with_env(&declared, &test_env()).await.session.unwrap();

        let _guard = first.lock("image-7").await;
        assert!(second.mutex().try_acquire("image-7").is_none());
        assert!(Arc::ptr_eq(first.mutex(), provider.mutex()));
    }

    #[test]
    fn test_schema_type_name() {
        assert_eq!(OpenNebulaProvider::new().schema().type_name, "opennebula");
    }
}
