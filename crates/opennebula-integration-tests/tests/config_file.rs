//! Declared configuration loaded from TOML files.

mod common;

use common::ProviderHarness;
use opennebula_config::loader;
use opennebula_test::test_env_with;

#[tokio::test]
async fn test_toml_file_with_environment_credentials() {
    let mut h = ProviderHarness::start().await;
    let _version = h.one.expect_version("6.8.3").await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("provider.toml");
    std::fs::write(
        &path,
        format!(
            r#"
            endpoint = "{}"

            [[default_tags]]
            tags = {{ team = "platform" }}
            "#,
            h.one.endpoint()
        ),
    )
    .unwrap();

    let declared = loader::load_file(&path).unwrap();
    let env = test_env_with(&[
        ("OPENNEBULA_USERNAME", "oneadmin"),
        ("OPENNEBULA_PASSWORD", "opennebula"),
    ]);
    let outcome = h.configure(&declared, &env).await;

    let session = outcome.session.unwrap();
    assert_eq!(session.version().to_string(), "6.8.3");
    assert_eq!(session.default_tags()["team"], "platform");
}

#[test]
fn test_unknown_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("provider.toml");
    std::fs::write(&path, "endpoint = \"https://a\"\nregion = \"eu\"\n").unwrap();

    let err = loader::load_file(&path).unwrap_err();
    assert!(err.to_string().contains("provider.toml"));
}
