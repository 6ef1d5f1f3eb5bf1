//! Merge declared values with environment fallbacks.
//!
//! Precedence, highest first:
//! 1. a concrete declared value (even an empty string)
//! 2. the attribute's `OPENNEBULA_*` variable, when set and non-empty
//! 3. the built-in default: empty string, or `false` for `insecure`

use std::collections::{BTreeMap, HashMap};

use opennebula_core::Diagnostics;
use secrecy::SecretString;
use tracing::debug;

use crate::env::{self, EnvBinding};
use crate::types::{Declared, DeclaredConfig, FieldSources, ResolvedConfig, ValueSource};

/// Report declared values that are not known yet.
///
/// Unknown credentials or endpoint are errors: the client cannot be built
/// until an earlier apply settles them. Unknown optional attributes only warn
/// and fall back to the environment during [`resolve`].
pub fn check_unknowns(declared: &DeclaredConfig, diags: &mut Diagnostics) {
    for (value, binding) in [
        (&declared.endpoint, env::ENDPOINT),
        (&declared.username, env::USERNAME),
        (&declared.password, env::PASSWORD),
    ] {
        if value.is_unknown() {
            diags.add_attribute_error(
                binding.attribute,
                format!("Unknown {}", binding.label),
                format!(
                    "The provider cannot create the OpenNebula client because the {} is not known yet. \
                     Apply the resource it depends on first, set the value statically in the \
                     configuration, or use the {} environment variable.",
                    binding.label, binding.variable
                ),
            );
        }
    }

    let optional_unknown = [
        (declared.flow_endpoint.is_unknown(), env::FLOW_ENDPOINT),
        (declared.insecure.is_unknown(), env::INSECURE),
    ];
    for (unknown, binding) in optional_unknown {
        if unknown {
            diags.add_attribute_warning(
                binding.attribute,
                format!("Unknown {}", binding.label),
                format!(
                    "The {} is not known yet; the {} environment variable or the default is used instead.",
                    binding.label, binding.variable
                ),
            );
        }
    }
}

/// Resolve every attribute against the environment snapshot.
///
/// An unparsable `OPENNEBULA_INSECURE` value adds an error diagnostic and
/// resolves to `false`; resolution itself always completes. Default tags are
/// left empty for the tag aggregation step.
#[must_use]
pub fn resolve(
    declared: &DeclaredConfig,
    env: &HashMap<String, String>,
    diags: &mut Diagnostics,
) -> ResolvedConfig {
    let mut sources = FieldSources::new();

    let endpoint = resolve_string(&declared.endpoint, env, &env::ENDPOINT, &mut sources);
    let flow_endpoint = resolve_string(&declared.flow_endpoint, env, &env::FLOW_ENDPOINT, &mut sources);
    let username = resolve_string(&declared.username, env, &env::USERNAME, &mut sources);
    let password = resolve_string(&declared.password, env, &env::PASSWORD, &mut sources);
    let insecure = resolve_insecure(&declared.insecure, env, &mut sources, diags);

    for (attribute, source) in &sources {
        debug!(attribute = %attribute, source = %source, "resolved provider attribute");
    }

    ResolvedConfig {
        endpoint,
        flow_endpoint: Some(flow_endpoint).filter(|value| !value.is_empty()),
        username,
        password: SecretString::from(password),
        insecure,
        default_tags: BTreeMap::new(),
        sources,
    }
}

fn resolve_string(
    declared: &Declared<String>,
    env: &HashMap<String, String>,
    binding: &EnvBinding,
    sources: &mut FieldSources,
) -> String {
    let (value, source) = if let Declared::Present(value) = declared {
        (value.clone(), ValueSource::Declared)
    } else if let Some(value) = env::lookup(env, binding) {
        (value.to_owned(), ValueSource::Environment)
    } else {
        (String::new(), ValueSource::Default)
    };
    sources.insert(binding.attribute.to_owned(), source);
    value
}

fn resolve_insecure(
    declared: &Declared<bool>,
    env: &HashMap<String, String>,
    sources: &mut FieldSources,
    diags: &mut Diagnostics,
) -> bool {
    let binding = env::INSECURE;
    let (value, source) = if let Declared::Present(value) = declared {
        (*value, ValueSource::Declared)
    } else if let Some(raw) = env::lookup(env, &binding) {
        if let Some(value) = env::parse_bool(raw) {
            (value, ValueSource::Environment)
        } else {
            diags.add_attribute_error(
                binding.attribute,
                format!(
                    "Failed to parse boolean value from the {} environment variable",
                    binding.variable
                ),
                format!(
                    "The provider cannot create the OpenNebula client because {} holds '{raw}', \
                     which is not a boolean. Use one of 1, t, T, true, TRUE, True, 0, f, F, \
                     false, FALSE or False.",
                    binding.variable
                ),
            );
            (false, ValueSource::Default)
        }
    } else {
        (false, ValueSource::Default)
    };
    sources.insert(binding.attribute.to_owned(), source);
    value
}
