//! The configure pipeline.
//!
//! Steps run strictly in order and stop at the first stage that leaves an
//! error diagnostic behind:
//!
//! 1. reject unknown credentials
//! 2. merge declared values with the environment, then validate
//! 3. build the XML-RPC client and negotiate the remote version
//! 4. add the OneFlow client, fold `default_tags`, assemble the session
//!
//! No request is sent unless steps 1 and 2 are clean.

use std::collections::HashMap;
use std::sync::Arc;

use opennebula_config::{DeclaredConfig, aggregate_default_tags, resolve, validate};
use opennebula_core::{Diagnostics, KeyedMutex};
use tracing::{debug, info};

use crate::session::ProviderSession;
use crate::{factory, negotiate};

/// Result of one configure cycle.
///
/// `session` is `Some` only when `diagnostics` holds no error. Warnings may
/// accompany a session.
#[derive(Debug)]
pub struct BootstrapOutcome {
    /// The configured session.
    pub session: Option<ProviderSession>,
    /// Every problem found, in the order found.
    pub diagnostics: Diagnostics,
}

impl BootstrapOutcome {
    fn failed(diagnostics: Diagnostics) -> Self {
        debug!(count = diagnostics.len(), "provider configuration failed");
        Self {
            session: None,
            diagnostics,
        }
    }

    /// Whether configuration produced a session.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.session.is_some()
    }
}

/// Run the configure pipeline.
///
/// `env` is a snapshot of the `OPENNEBULA_*` variables (see
/// [`opennebula_config::env::collect_env_vars`]).
pub async fn configure(
    declared: &DeclaredConfig,
    env: &HashMap<String, String>,
    mutex: Arc<KeyedMutex>,
) -> BootstrapOutcome {
    let mut diags = Diagnostics::new();

    resolve::check_unknowns(declared, &mut diags);
    if diags.has_error() {
        return BootstrapOutcome::failed(diags);
    }

    let mut config = resolve::resolve(declared, env, &mut diags);
    validate::validate(&config, &mut diags);
    if diags.has_error() {
        return BootstrapOutcome::failed(diags);
    }

    let client = match factory::build_client(&config) {
        Ok(client) => client,
        Err(e) => {
            diags.add_attribute_error(
                "endpoint",
                "Failed to create the OpenNebula client",
                e.to_string(),
            );
            return BootstrapOutcome::failed(diags);
        },
    };

    let Some(version) = negotiate::negotiate_version(&client, &mut diags).await else {
        return BootstrapOutcome::failed(diags);
    };

    let controller = match factory::compose_controller(client, &config) {
        Ok(controller) => controller,
        Err(e) => {
            diags.add_attribute_error(
                "flow_endpoint",
                "Failed to create the OneFlow client",
                e.to_string(),
            );
            return BootstrapOutcome::failed(diags);
        },
    };

    config.default_tags = aggregate_default_tags(&declared.default_tags);

    info!(
        endpoint = %config.endpoint,
        version = %version,
        flow = controller.has_flow(),
        default_tags = config.default_tags.len(),
        "provider configured"
    );
    BootstrapOutcome {
        session: Some(ProviderSession::new(config, controller, version, mutex)),
        diagnostics: diags,
    }
}
