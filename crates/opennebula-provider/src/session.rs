//! The configured provider session.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use opennebula_client::Controller;
use opennebula_config::ResolvedConfig;
use opennebula_core::{KeyedGuard, KeyedMutex, VersionInfo};

/// Read-only context handed to every resource operation after configuration.
///
/// The session owns the API handles and the negotiated version. The keyed
/// lock registry is shared with the provider that created it and outlives
/// any single session.
pub struct ProviderSession {
    config: ResolvedConfig,
    controller: Controller,
    version: VersionInfo,
    mutex: Arc<KeyedMutex>,
}

impl ProviderSession {
    pub(crate) fn new(
        config: ResolvedConfig,
        controller: Controller,
        version: VersionInfo,
        mutex: Arc<KeyedMutex>,
    ) -> Self {
        Self {
            config,
            controller,
            version,
            mutex,
        }
    }

    /// The resolved configuration, including where each value came from.
    #[must_use]
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// API handles.
    #[must_use]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Release of the remote OpenNebula system.
    #[must_use]
    pub fn version(&self) -> &VersionInfo {
        &self.version
    }

    /// Tags applied to every managed object unless overridden.
    #[must_use]
    pub fn default_tags(&self) -> &BTreeMap<String, String> {
        &self.config.default_tags
    }

    /// Shared keyed lock registry.
    #[must_use]
    pub fn mutex(&self) -> &Arc<KeyedMutex> {
        &self.mutex
    }

    /// Hold the lock for `key` around a remote mutation.
    pub async fn lock(&self, key: &str) -> KeyedGuard {
        self.mutex.acquire(key).await
    }

    /// Whether the remote release is at least `min`.
    #[must_use]
    pub fn supports(&self, min: &VersionInfo) -> bool {
        self.version >= *min
    }
}

impl fmt::Debug for ProviderSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSession")
            .field("version", &self.version.to_string())
            .field("controller", &self.controller)
            .field("default_tags", &self.config.default_tags)
            .finish_non_exhaustive()
    }
}
