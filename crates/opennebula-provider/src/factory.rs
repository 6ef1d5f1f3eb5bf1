//! Client construction from a resolved configuration.

use opennebula_client::{ClientConfig, ClientResult, Controller, FlowClient, OneClient};
use opennebula_config::ResolvedConfig;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// Connection settings for `endpoint` using the resolved credentials.
fn client_config(resolved: &ResolvedConfig, endpoint: &str) -> ClientConfig {
    ClientConfig::new(
        endpoint,
        resolved.username.clone(),
        SecretString::from(resolved.password.expose_secret().to_owned()),
    )
    .with_insecure(resolved.insecure)
}

/// Build the XML-RPC client for the primary endpoint.
///
/// # Errors
///
/// Fails if the endpoint is not a usable URL or the HTTP stack cannot be
/// initialised.
pub fn build_client(resolved: &ResolvedConfig) -> ClientResult<OneClient> {
    OneClient::new(&client_config(resolved, &resolved.endpoint))
}

/// Wrap `client` in a [`Controller`], adding a OneFlow client when a flow
/// endpoint was resolved.
///
/// # Errors
///
/// Fails if the flow endpoint is not a usable URL.
pub fn compose_controller(client: OneClient, resolved: &ResolvedConfig) -> ClientResult<Controller> {
    let controller = Controller::new(client);
    let Some(flow_endpoint) = resolved.flow_endpoint.as_deref() else {
        debug!("no OneFlow endpoint configured");
        return Ok(controller);
    };

    let flow = FlowClient::new(&client_config(resolved, flow_endpoint))?;
    debug!(endpoint = %flow.endpoint(), "OneFlow client configured");
    Ok(controller.with_flow(flow))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use opennebula_config::FieldSources;

    use super::*;

    fn resolved(endpoint: &str, flow: Option<&str>) -> ResolvedConfig {
        ResolvedConfig {
            endpoint: endpoint.to_owned(),
            flow_endpoint: flow.map(str::to_owned),
            username: "u".to_owned(),
            password: SecretString::from("p".to_owned()),
            insecure: true,
            default_tags: BTreeMap::new(),
            sources: FieldSources::new(),
        }
    }

    #[test]
    fn test_primary_only() {
        let config = resolved("https://a", None);
        let client = build_client(&config).unwrap();
        assert_eq!(client.endpoint().as_str(), "https://a/");
        assert_eq!(client.username(), "u");
        assert!(client.is_insecure());

        let controller = compose_controller(client, &config).unwrap();
        assert!(!controller.has_flow());
    }

    #[test]
    fn test_flow_endpoint_adds_flow_client() {
        let config = resolved("https://a/RPC2", Some("https://a:2474"));
        let controller = compose_controller(build_client(&config).unwrap(), &config).unwrap();
        assert!(controller.has_flow());
        assert_eq!(controller.flow().unwrap().endpoint().as_str(), "https://a:2474/");
    }

    #[test]
    fn test_bad_flow_endpoint_fails() {
        let config = resolved("https://a/RPC2", Some("a:b:c"));
        assert!(compose_controller(build_client(&config).unwrap(), &config).is_err());
    }
}
