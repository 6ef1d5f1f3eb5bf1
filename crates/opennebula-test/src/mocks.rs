//! Mock OpenNebula endpoints.

use async_trait::async_trait;
use mockito::{Matcher, Mock, Server, ServerGuard};
use opennebula_client::{ApiErrorKind, ClientError, ClientResult, SystemApi};

use crate::fixtures::{xmlrpc_failure, xmlrpc_fault, xmlrpc_success};

/// A mock HTTP server that speaks just enough OpenNebula for bootstrap.
///
/// Each `expect_*` method registers a mock and returns it; keep the returned
/// [`Mock`] alive for the duration of the test and call `assert_async` on it
/// to check the hit count.
pub struct MockOpenNebula {
    server: ServerGuard,
}

impl MockOpenNebula {
    /// Start a new server.
    pub async fn start() -> Self {
        Self {
            server: Server::new_async().await,
        }
    }

    /// Base URL, e.g. `http://127.0.0.1:40123`.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    /// XML-RPC endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/RPC2", self.server.url())
    }

    fn version_call(&mut self) -> Mock {
        self.server
            .mock("POST", "/RPC2")
            .match_body(Matcher::Regex("one.system.version".to_owned()))
    }

    /// Answer `one.system.version` with `version`.
    pub async fn expect_version(&mut self, version: &str) -> Mock {
        self.version_call()
            .with_status(200)
            .with_header("content-type", "text/xml")
            .with_body(xmlrpc_success(version))
            .create_async()
            .await
    }

    /// Reject `one.system.version` as OpenNebula does for bad credentials.
    pub async fn expect_auth_failure(&mut self) -> Mock {
        self.version_call()
            .with_status(200)
            .with_body(xmlrpc_failure(
                "[one.system.version] User couldn't be authenticated, aborting call.",
                0x0100,
            ))
            .create_async()
            .await
    }

    /// Answer `one.system.version` with an XML-RPC fault.
    pub async fn expect_fault(&mut self, code: i64, message: &str) -> Mock {
        self.version_call()
            .with_status(200)
            .with_body(xmlrpc_fault(code, message))
            .create_async()
            .await
    }

    /// Answer `one.system.version` with an HTTP error status.
    pub async fn expect_http_status(&mut self, status: usize) -> Mock {
        self.version_call()
            .with_status(status)
            .with_body("unavailable")
            .create_async()
            .await
    }

    /// Assert that no XML-RPC request is ever made.
    pub async fn expect_no_calls(&mut self) -> Mock {
        self.server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await
    }

    /// Serve a OneFlow JSON document at `path`.
    pub async fn expect_flow_get(&mut self, path: &str, body: &serde_json::Value) -> Mock {
        self.server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }
}

/// A [`SystemApi`] that returns a canned release string or failure.
#[derive(Debug, Clone)]
pub struct MockSystemApi {
    reply: Result<String, i64>,
}

impl MockSystemApi {
    /// Always answer with `version`.
    #[must_use]
    pub fn version(version: impl Into<String>) -> Self {
        Self {
            reply: Ok(version.into()),
        }
    }

    /// Always fail with an OpenNebula API error carrying `code`.
    #[must_use]
    pub fn failing(code: i64) -> Self {
        Self { reply: Err(code) }
    }
}

#[async_trait]
impl SystemApi for MockSystemApi {
    async fn system_version(&self) -> ClientResult<String> {
        match &self.reply {
            Ok(version) => Ok(version.clone()),
            Err(code) => Err(ClientError::Api {
                method: "one.system.version".to_owned(),
                kind: ApiErrorKind::from_code(*code),
                code: *code,
                message: "mock failure".to_owned(),
            }),
        }
    }
}
