//! Test fixtures for common types.

use std::collections::HashMap;

use opennebula_config::DeclaredConfig;
use serde_json::{Value, json};

/// Account name used by fixtures.
pub const TEST_USERNAME: &str = "oneadmin";

/// Account password used by fixtures.
pub const TEST_PASSWORD: &str = "opennebula";

/// A complete declared configuration pointing at `endpoint`.
#[must_use]
pub fn test_declared_config(endpoint: &str) -> DeclaredConfig {
    DeclaredConfig::new()
        .with_endpoint(endpoint)
        .with_username(TEST_USERNAME)
        .with_password(TEST_PASSWORD)
}

/// An empty environment snapshot.
#[must_use]
pub fn test_env() -> HashMap<String, String> {
    HashMap::new()
}

/// An environment snapshot holding the given variables.
#[must_use]
pub fn test_env_with(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

/// A raw `default_tags` block holding `pairs`.
#[must_use]
pub fn test_tag_block(pairs: &[(&str, &str)]) -> Value {
    let tags: serde_json::Map<String, Value> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), Value::String((*v).to_owned())))
        .collect();
    json!({ "tags": tags })
}

/// Successful OpenNebula response carrying a string payload.
#[must_use]
pub fn xmlrpc_success(payload: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n<methodResponse><params><param><value><array><data>\
         <value><boolean>1</boolean></value>\
         <value><string>{payload}</string></value>\
         <value><i4>0</i4></value>\
         </data></array></value></param></params></methodResponse>"
    )
}

/// Failed OpenNebula response, e.g. code `256` for an authentication failure.
#[must_use]
pub fn xmlrpc_failure(message: &str, code: i64) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n<methodResponse><params><param><value><array><data>\
         <value><boolean>0</boolean></value>\
         <value><string>{message}</string></value>\
         <value><i4>{code}</i4></value>\
         </data></array></value></param></params></methodResponse>"
    )
}

/// XML-RPC `<fault>` response.
#[must_use]
pub fn xmlrpc_fault(code: i64, message: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n<methodResponse><fault><value><struct>\
         <member><name>faultCode</name><value><int>{code}</int></value></member>\
         <member><name>faultString</name><value><string>{message}</string></value></member>\
         </struct></value></fault></methodResponse>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_block_shape() {
        let block = test_tag_block(&[("team", "platform")]);
        assert_eq!(block["tags"]["team"], "platform");
    }

    #[test]
    fn test_env_with_pairs() {
        let env = test_env_with(&[("OPENNEBULA_USERNAME", "u")]);
        assert_eq!(env.get("OPENNEBULA_USERNAME").map(String::as_str), Some("u"));
        assert!(test_env().is_empty());
    }

    #[test]
    fn test_canned_bodies_decode() {
        use opennebula_client::xmlrpc::{Value as RpcValue, decode_response};

        let ok = decode_response(&xmlrpc_success("6.8.0")).unwrap();
        assert_eq!(ok.as_array().unwrap()[1], RpcValue::String("6.8.0".to_owned()));
        assert!(decode_response(&xmlrpc_fault(1, "boom")).is_err());
        let failed = decode_response(&xmlrpc_failure("denied", 256)).unwrap();
        assert_eq!(failed.as_array().unwrap()[0], RpcValue::Boolean(false));
    }
}
