//! `default_tags` aggregation.
//!
//! The provider block may repeat `default_tags { tags = { ... } }`. All
//! blocks fold into one map, later blocks winning on duplicate names. Tags
//! are enrichment only: a block that does not decode is logged and skipped,
//! never reported as a diagnostic.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// One decoded `default_tags` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagSet {
    /// Tag name to tag value.
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
}

/// Fold raw `default_tags` blocks into a single tag map.
///
/// Blocks are visited in declared order. An empty result means no default
/// tags and is not an error.
#[must_use]
pub fn aggregate_default_tags(blocks: &[Value]) -> BTreeMap<String, String> {
    let mut merged = BTreeMap::new();
    for (index, block) in blocks.iter().enumerate() {
        match TagSet::deserialize(block) {
            Ok(set) => merged.extend(set.tags.unwrap_or_default()),
            Err(e) => {
                debug!(index, error = %e, "skipping malformed default_tags block");
            },
        }
    }
    debug!(default_tags = ?merged, "aggregated default_tags");
    merged
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_later_blocks_win() {
        let blocks = [
            json!({ "tags": { "a": "1", "b": "2" } }),
            json!({ "tags": { "b": "3" } }),
        ];
        assert_eq!(aggregate_default_tags(&blocks), tags(&[("a", "1"), ("b", "3")]));
    }

    #[test]
    fn test_malformed_block_is_skipped() {
        let blocks = [
            json!({ "tags": { "broken": 42 } }),
            json!({ "tags": { "x": "9" } }),
        ];
        assert_eq!(aggregate_default_tags(&blocks), tags(&[("x", "9")]));
    }

    #[test]
    fn test_non_object_and_unknown_keys_are_skipped() {
        let blocks = [
            json!("not a block"),
            json!({ "labels": { "a": "1" } }),
            json!({ "tags": { "env": "prod" } }),
        ];
        assert_eq!(aggregate_default_tags(&blocks), tags(&[("env", "prod")]));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(aggregate_default_tags(&[]).is_empty());
        assert!(aggregate_default_tags(&[json!({})]).is_empty());
        assert!(aggregate_default_tags(&[json!({ "tags": null })]).is_empty());
    }
}
