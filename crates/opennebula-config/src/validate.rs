//! Post-resolution configuration validation.
//!
//! Every check runs; problems are appended to the diagnostics list instead of
//! returning at the first failure, so a user missing both the endpoint and
//! the password sees both errors in one run.

use opennebula_core::Diagnostics;
use secrecy::ExposeSecret;
use url::Url;

use crate::env::{self, EnvBinding};
use crate::types::ResolvedConfig;

/// Validate a resolved configuration, appending one diagnostic per problem.
pub fn validate(config: &ResolvedConfig, diags: &mut Diagnostics) {
    require_non_empty(&config.endpoint, &env::ENDPOINT, diags);
    require_non_empty(&config.username, &env::USERNAME, diags);
    require_non_empty(config.password.expose_secret(), &env::PASSWORD, diags);

    if !config.endpoint.is_empty() {
        require_http_url(&config.endpoint, &env::ENDPOINT, diags);
    }
    if let Some(flow) = &config.flow_endpoint {
        require_http_url(flow, &env::FLOW_ENDPOINT, diags);
    }
}

fn require_non_empty(value: &str, binding: &EnvBinding, diags: &mut Diagnostics) {
    if !value.is_empty() {
        return;
    }
    diags.add_attribute_error(
        binding.attribute,
        format!("Missing {}", binding.label),
        format!(
            "The provider cannot create the OpenNebula client because the {} is missing or empty. \
             Set the {} attribute in the provider configuration or use the {} environment variable. \
             If either is already set, ensure the value is not empty.",
            binding.label, binding.attribute, binding.variable
        ),
    );
}

fn require_http_url(value: &str, binding: &EnvBinding, diags: &mut Diagnostics) {
    let problem = match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => return,
        Ok(url) => format!("unsupported scheme '{}'", url.scheme()),
        Err(e) => e.to_string(),
    };
    diags.add_attribute_error(
        binding.attribute,
        format!("Invalid {}", binding.label),
        format!(
            "'{value}' is not an absolute http or https URL ({problem}). \
             Check the {} attribute or the {} environment variable.",
            binding.attribute, binding.variable
        ),
    );
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use secrecy::SecretString;

    use super::*;
    use crate::types::FieldSources;

    fn config(endpoint: &str, username: &str, password: &str) -> ResolvedConfig {
        ResolvedConfig {
            endpoint: endpoint.to_owned(),
            flow_endpoint: None,
            username: username.to_owned(),
            password: SecretString::from(password.to_owned()),
            insecure: false,
            default_tags: BTreeMap::new(),
            sources: FieldSources::new(),
        }
    }

    #[test]
    fn test_complete_config_is_valid() {
        let mut diags = Diagnostics::new();
        validate(&config("https://one.example.com:2633/RPC2", "oneadmin", "pw"), &mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_reports_every_missing_field_at_once() {
        let mut diags = Diagnostics::new();
        validate(&config("", "u", ""), &mut diags);

        assert_eq!(diags.errors().count(), 2);
        assert_eq!(diags.for_attribute("endpoint").count(), 1);
        assert_eq!(diags.for_attribute("password").count(), 1);
    }

    #[test]
    fn test_missing_diagnostic_names_attribute_and_variable() {
        let mut diags = Diagnostics::new();
        validate(&config("https://a", "", "p"), &mut diags);

        let diag = diags.for_attribute("username").next().unwrap();
        assert_eq!(diag.summary, "Missing OpenNebula account username");
        assert!(diag.detail.contains("username attribute"));
        assert!(diag.detail.contains("OPENNEBULA_USERNAME"));
    }

    #[test]
    fn test_all_three_missing() {
        let mut diags = Diagnostics::new();
        validate(&config("", "", ""), &mut diags);
        assert_eq!(diags.len(), 3);
    }

    #[test]
    fn test_endpoint_must_be_http_url() {
        let mut diags = Diagnostics::new();
        validate(&config("one.example.com/RPC2", "u", "p"), &mut diags);
        assert_eq!(diags.for_attribute("endpoint").count(), 1);

        let mut diags = Diagnostics::new();
        validate(&config("ftp://one.example.com", "u", "p"), &mut diags);
        let diag = diags.for_attribute("endpoint").next().unwrap();
        assert!(diag.detail.contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn test_flow_endpoint_checked_when_present() {
        let mut cfg = config("https://a", "u", "p");
        cfg.flow_endpoint = Some("not a url".to_owned());
        let mut diags = Diagnostics::new();
        validate(&cfg, &mut diags);

        assert_eq!(diags.for_attribute("flow_endpoint").count(), 1);
        assert_eq!(diags.len(), 1);
    }
}
