//! Provider block schema.
//!
//! Describes the attributes a host may set in the `provider "opennebula"`
//! block. Attribute names and environment variables come from
//! [`opennebula_config::env`], so the schema cannot drift from what the
//! resolver reads.

use opennebula_config::env::{self, EnvBinding};
use serde::Serialize;

/// Type name of the provider.
pub const PROVIDER_TYPE_NAME: &str = "opennebula";

/// Value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// UTF-8 string.
    String,
    /// Boolean.
    Bool,
    /// Map of string to string.
    StringMap,
}

/// One attribute of the provider block or a nested block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSchema {
    /// Attribute name.
    pub name: &'static str,
    /// Value type.
    #[serde(rename = "type")]
    pub kind: AttributeType,
    /// Help text.
    pub description: String,
    /// Whether the attribute may be omitted.
    pub optional: bool,
    /// Whether the value must be hidden from plans and logs.
    pub sensitive: bool,
}

impl AttributeSchema {
    fn new(name: &'static str, kind: AttributeType, description: impl Into<String>) -> Self {
        Self {
            name,
            kind,
            description: description.into(),
            optional: true,
            sensitive: false,
        }
    }

    fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// How a nested block may repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NestingMode {
    /// Unordered, repeatable.
    Set,
}

/// A nested block inside the provider block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSchema {
    /// Block type name.
    pub name: &'static str,
    /// Repetition rule.
    pub nesting: NestingMode,
    /// Help text.
    pub description: String,
    /// Attributes inside the block.
    pub attributes: Vec<AttributeSchema>,
}

/// Schema of the provider block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderSchema {
    /// Provider type name.
    pub type_name: &'static str,
    /// Top-level attributes.
    pub attributes: Vec<AttributeSchema>,
    /// Nested blocks.
    pub blocks: Vec<BlockSchema>,
}

fn described(binding: &EnvBinding, what: &str) -> String {
    format!("{what} May also be set with the {} environment variable.", binding.variable)
}

impl ProviderSchema {
    /// The `opennebula` provider block.
    #[must_use]
    pub fn opennebula() -> Self {
        let attributes = vec![
            AttributeSchema::new(
                env::ENDPOINT.attribute,
                AttributeType::String,
                described(&env::ENDPOINT, "The URL of the OpenNebula XML-RPC API."),
            ),
            AttributeSchema::new(
                env::FLOW_ENDPOINT.attribute,
                AttributeType::String,
                described(&env::FLOW_ENDPOINT, "The URL of the OneFlow API."),
            ),
            AttributeSchema::new(
                env::USERNAME.attribute,
                AttributeType::String,
                described(&env::USERNAME, "The OpenNebula account name."),
            ),
            AttributeSchema::new(
                env::PASSWORD.attribute,
                AttributeType::String,
                described(&env::PASSWORD, "The OpenNebula account password or token."),
            )
            .sensitive(),
            AttributeSchema::new(
                env::INSECURE.attribute,
                AttributeType::Bool,
                described(&env::INSECURE, "Skip TLS certificate validation. Defaults to false."),
            ),
        ];

        let default_tags = BlockSchema {
            name: "default_tags",
            nesting: NestingMode::Set,
            description: "Tags applied to every managed object that supports tags. \
                          Later blocks override earlier ones on duplicate names."
                .to_owned(),
            attributes: vec![AttributeSchema::new(
                "tags",
                AttributeType::StringMap,
                "Tag names and values.",
            )],
        };

        Self {
            type_name: PROVIDER_TYPE_NAME,
            attributes,
            blocks: vec![default_tags],
        }
    }

    /// Look up a top-level attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_env_binding_has_an_attribute() {
        let schema = ProviderSchema::opennebula();
        for binding in env::BINDINGS {
            let attr = schema.attribute(binding.attribute).unwrap();
            assert!(attr.optional);
            assert!(attr.description.contains(binding.variable));
        }
        assert_eq!(schema.attributes.len(), env::BINDINGS.len());
    }

    #[test]
    fn test_only_password_is_sensitive() {
        let schema = ProviderSchema::opennebula();
        let sensitive: Vec<_> = schema
            .attributes
            .iter()
            .filter(|a| a.sensitive)
            .map(|a| a.name)
            .collect();
        assert_eq!(sensitive, vec!["password"]);
        assert_eq!(schema.attribute("insecure").unwrap().kind, AttributeType::Bool);
    }

    #[test]
    fn test_serializes_to_json() {
        let json = serde_json::to_value(ProviderSchema::opennebula()).unwrap();
        assert_eq!(json["type_name"], "opennebula");
        assert_eq!(json["blocks"][0]["name"], "default_tags");
        assert_eq!(json["blocks"][0]["nesting"], "set");
        assert_eq!(json["blocks"][0]["attributes"][0]["type"], "string_map");
    }
}
