//! Environment variable fallbacks.
//!
//! The process environment is read exactly once, by [`collect_env_vars`],
//! and the resulting map is passed explicitly to the resolver. Tests build
//! their own maps instead of mutating the real environment.

use std::collections::HashMap;

/// Prefix shared by every recognised variable.
pub const ENV_PREFIX: &str = "OPENNEBULA_";

/// Links a provider attribute to its environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvBinding {
    /// Attribute name in the provider block.
    pub attribute: &'static str,
    /// Environment variable consulted when the attribute is absent.
    pub variable: &'static str,
    /// Human-readable noun used in diagnostics.
    pub label: &'static str,
}

/// `endpoint` / `OPENNEBULA_ENDPOINT`.
pub const ENDPOINT: EnvBinding = EnvBinding {
    attribute: "endpoint",
    variable: "OPENNEBULA_ENDPOINT",
    label: "OpenNebula XML-RPC API endpoint",
};

/// `flow_endpoint` / `OPENNEBULA_FLOW_ENDPOINT`.
pub const FLOW_ENDPOINT: EnvBinding = EnvBinding {
    attribute: "flow_endpoint",
    variable: "OPENNEBULA_FLOW_ENDPOINT",
    label: "OneFlow API endpoint",
};

/// `username` / `OPENNEBULA_USERNAME`.
pub const USERNAME: EnvBinding = EnvBinding {
    attribute: "username",
    variable: "OPENNEBULA_USERNAME",
    label: "OpenNebula account username",
};

/// `password` / `OPENNEBULA_PASSWORD`.
pub const PASSWORD: EnvBinding = EnvBinding {
    attribute: "password",
    variable: "OPENNEBULA_PASSWORD",
    label: "OpenNebula account password",
};

/// `insecure` / `OPENNEBULA_INSECURE`.
pub const INSECURE: EnvBinding = EnvBinding {
    attribute: "insecure",
    variable: "OPENNEBULA_INSECURE",
    label: "TLS validation switch",
};

/// Every attribute that has an environment fallback.
pub const BINDINGS: [EnvBinding; 5] = [ENDPOINT, FLOW_ENDPOINT, USERNAME, PASSWORD, INSECURE];

/// Snapshot the `OPENNEBULA_*` variables of the current process.
///
/// Variables whose name or value is not valid UTF-8 are skipped.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect()
}

/// Look up a binding's variable, treating an empty value as unset.
#[must_use]
pub fn lookup<'a>(env: &'a HashMap<String, String>, binding: &EnvBinding) -> Option<&'a str> {
    env.get(binding.variable)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Parse a canonical boolean literal.
///
/// Accepts `1`, `t`, `T`, `true`, `TRUE`, `True` and their false
/// counterparts `0`, `f`, `F`, `false`, `FALSE`, `False`. Anything else,
/// including surrounding whitespace, is rejected.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_canonical_literals() {
        for raw in ["1", "t", "T", "true", "TRUE", "True"] {
            assert_eq!(parse_bool(raw), Some(true), "{raw}");
        }
        for raw in ["0", "f", "F", "false", "FALSE", "False"] {
            assert_eq!(parse_bool(raw), Some(false), "{raw}");
        }
    }

    #[test]
    fn test_parse_bool_rejects_everything_else() {
        for raw in ["yes", "no", "on", "off", "tRUE", " true", "2", ""] {
            assert_eq!(parse_bool(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn test_lookup_treats_empty_as_unset() {
        let mut env = HashMap::new();
        env.insert("OPENNEBULA_ENDPOINT".to_owned(), String::new());
        env.insert("OPENNEBULA_USERNAME".to_owned(), "oneadmin".to_owned());

        assert_eq!(lookup(&env, &ENDPOINT), None);
        assert_eq!(lookup(&env, &USERNAME), Some("oneadmin"));
        assert_eq!(lookup(&env, &PASSWORD), None);
    }

    #[test]
    fn test_bindings_share_prefix() {
        assert!(BINDINGS.iter().all(|b| b.variable.starts_with(ENV_PREFIX)));
    }

    #[test]
    fn test_collect_env_vars_only_keeps_prefix() {
        let vars = collect_env_vars();
        assert!(vars.keys().all(|k| k.starts_with(ENV_PREFIX)));
    }
}
