//! Declared and resolved provider configuration.
//!
//! [`DeclaredConfig`] is what the host hands over: every field is
//! three-valued because a declarative plan may reference values that are not
//! known until an earlier apply finishes. [`ResolvedConfig`] is the result of
//! merging the declared values with the environment.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Declared<T>
// ---------------------------------------------------------------------------

/// A declared configuration value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Declared<T> {
    /// The value depends on something not yet applied.
    Unknown,
    /// The attribute was omitted or set to null.
    #[default]
    Absent,
    /// A concrete value.
    Present(T),
}

impl<T> Declared<T> {
    /// Whether the value is not yet known.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The concrete value, if any.
    #[must_use]
    pub fn as_present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Unknown | Self::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for Declared<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Declared<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

// ---------------------------------------------------------------------------
// DeclaredConfig
// ---------------------------------------------------------------------------

/// The provider block as declared by the user.
///
/// Missing keys and explicit nulls both deserialize to [`Declared::Absent`].
#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeclaredConfig {
    /// XML-RPC API endpoint.
    pub endpoint: Declared<String>,
    /// OneFlow endpoint.
    pub flow_endpoint: Declared<String>,
    /// Account name.
    pub username: Declared<String>,
    /// Account password or token.
    pub password: Declared<String>,
    /// Skip TLS certificate validation.
    pub insecure: Declared<bool>,
    /// Repeated `default_tags` blocks, undecoded.
    pub default_tags: Vec<serde_json::Value>,
}

impl DeclaredConfig {
    /// Declared configuration with every attribute absent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Declared::Present(endpoint.into());
        self
    }

    /// Set the flow endpoint.
    #[must_use]
    pub fn with_flow_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.flow_endpoint = Declared::Present(endpoint.into());
        self
    }

    /// Set the username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Declared::Present(username.into());
        self
    }

    /// Set the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Declared::Present(password.into());
        self
    }

    /// Set the insecure flag.
    #[must_use]
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = Declared::Present(insecure);
        self
    }

    /// Append a raw `default_tags` block.
    #[must_use]
    pub fn with_tag_block(mut self, block: serde_json::Value) -> Self {
        self.default_tags.push(block);
        self
    }
}

impl fmt::Debug for DeclaredConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = match &self.password {
            Declared::Unknown => "Unknown",
            Declared::Absent => "Absent",
            Declared::Present(_) => "Present(***)",
        };
        f.debug_struct("DeclaredConfig")
            .field("endpoint", &self.endpoint)
            .field("flow_endpoint", &self.flow_endpoint)
            .field("username", &self.username)
            .field("password", &password)
            .field("insecure", &self.insecure)
            .field("default_tags", &self.default_tags.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Value sources
// ---------------------------------------------------------------------------

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    /// The provider block.
    Declared,
    /// An `OPENNEBULA_*` environment variable.
    Environment,
    /// Built-in default (empty string or `false`).
    Default,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declared => write!(f, "provider configuration"),
            Self::Environment => write!(f, "environment variable"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Tracks which source set each attribute.
pub type FieldSources = HashMap<String, ValueSource>;

// ---------------------------------------------------------------------------
// ResolvedConfig
// ---------------------------------------------------------------------------

/// Provider configuration after merging declared values with the environment.
pub struct ResolvedConfig {
    /// XML-RPC API endpoint.
    pub endpoint: String,
    /// OneFlow endpoint, `None` when not configured anywhere.
    pub flow_endpoint: Option<String>,
    /// Account name.
    pub username: String,
    /// Account password or token.
    pub password: SecretString,
    /// Skip TLS certificate validation.
    pub insecure: bool,
    /// Tags applied to every managed object.
    pub default_tags: BTreeMap<String, String>,
    /// Where each attribute came from.
    pub sources: FieldSources,
}

impl ResolvedConfig {
    /// The source of an attribute, if it was resolved.
    #[must_use]
    pub fn source_of(&self, attribute: &str) -> Option<ValueSource> {
        self.sources.get(attribute).copied()
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("endpoint", &self.endpoint)
            .field("flow_endpoint", &self.flow_endpoint)
            .field("username", &self.username)
            .field("password", &"***")
            .field("insecure", &self.insecure)
            .field("default_tags", &self.default_tags)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_from_option() {
        assert_eq!(Declared::from(Some(3)), Declared::Present(3));
        assert_eq!(Declared::<u8>::from(None), Declared::Absent);
    }

    #[test]
    fn test_declared_config_deserialize_missing_and_null() {
        let json = serde_json::json!({
            "endpoint": "https://one.example.com/RPC2",
            "username": null,
            "insecure": true,
        });
        let declared: DeclaredConfig = serde_json::from_value(json).unwrap();
        assert_eq!(
            declared.endpoint,
            Declared::Present("https://one.example.com/RPC2".to_owned())
        );
        assert_eq!(declared.username, Declared::Absent);
        assert_eq!(declared.password, Declared::Absent);
        assert_eq!(declared.insecure, Declared::Present(true));
        assert!(declared.default_tags.is_empty());
    }

    #[test]
    fn test_declared_config_rejects_unknown_attribute() {
        let json = serde_json::json!({ "endpont": "typo" });
        assert!(serde_json::from_value::<DeclaredConfig>(json).is_err());
    }

    #[test]
    fn test_declared_config_debug_redacts_password() {
        let declared = DeclaredConfig::new().with_password("s3cr3t-value");
        let rendered = format!("{declared:?}");
        assert!(!rendered.contains("s3cr3t-value"));
        assert!(rendered.contains("Present(***)"));
    }

    #[test]
    fn test_resolved_config_debug_redacts_password() {
        let resolved = ResolvedConfig {
            endpoint: "https://a".to_owned(),
            flow_endpoint: None,
            username: "u".to_owned(),
            password: SecretString::from("hunter2".to_owned()),
            insecure: false,
            default_tags: BTreeMap::new(),
            sources: FieldSources::new(),
        };
        let rendered = format!("{resolved:?}");
        assert!(!rendered.contains("hunter2"));
    }
}
