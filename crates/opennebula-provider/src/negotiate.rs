//! Remote version negotiation.

use opennebula_client::SystemApi;
use opennebula_core::{Diagnostics, VersionInfo};
use tracing::info;

/// Query and parse the remote release.
///
/// On failure exactly one error diagnostic is appended and `None` is
/// returned; the caller must not build a session.
pub async fn negotiate_version(api: &dyn SystemApi, diags: &mut Diagnostics) -> Option<VersionInfo> {
    let raw = match api.system_version().await {
        Ok(raw) => raw,
        Err(e) => {
            diags.add_error("Failed to get OpenNebula release number", e.detail());
            return None;
        },
    };

    match VersionInfo::parse(raw.trim()) {
        Ok(version) => {
            info!(version = %version, "OpenNebula version");
            Some(version)
        },
        Err(e) => {
            diags.add_error(
                "Failed to parse OpenNebula version",
                format!("The server reported release '{raw}': {e}"),
            );
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use opennebula_test::MockSystemApi;

    use super::*;

    #[tokio::test]
    async fn test_parses_reported_release() {
        let mut diags = Diagnostics::new();
        let version = negotiate_version(&MockSystemApi::version("6.8.0"), &mut diags).await;
        assert_eq!(version, Some(VersionInfo::new(6, 8, 0)));
        assert!(diags.is_empty());
    }

    #[tokio::test]
    async fn test_query_failure_is_one_error() {
        let mut diags = Diagnostics::new();
        let version = negotiate_version(&MockSystemApi::failing(0x0100), &mut diags).await;

        assert!(version.is_none());
        assert_eq!(diags.len(), 1);
        let diag = diags.iter().next().unwrap();
        assert!(diag.is_error());
        assert!(diag.path.is_none());
        assert_eq!(diag.summary, "Failed to get OpenNebula release number");
        assert!(diag.detail.contains("mock failure"));
    }

    #[tokio::test]
    async fn test_parse_failure_is_one_error() {
        let mut diags = Diagnostics::new();
        let version = negotiate_version(&MockSystemApi::version("six.eight"), &mut diags).await;

        assert!(version.is_none());
        assert_eq!(diags.len(), 1);
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.summary, "Failed to parse OpenNebula version");
        assert!(diag.detail.contains("six.eight"));
    }

    #[tokio::test]
    async fn test_prerelease_is_accepted() {
        let mut diags = Diagnostics::new();
        let version = negotiate_version(&MockSystemApi::version("6.99.80-beta1\n"), &mut diags)
            .await
            .unwrap();
        assert!(version.is_prerelease());
        assert!(version.is_at_least(6, 99, 0));
    }
}
