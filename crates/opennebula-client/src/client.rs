//! OpenNebula XML-RPC client.

use std::fmt;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiErrorKind, ClientError, ClientResult};
use crate::xmlrpc::{self, Value};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest slice of an error body kept in [`ClientError::HttpStatus`].
pub(crate) const MAX_ERROR_BODY: usize = 512;

/// Connection settings shared by the XML-RPC and OneFlow clients.
pub struct ClientConfig {
    /// Endpoint URL.
    pub endpoint: String,
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: SecretString,
    /// Skip TLS certificate validation.
    pub insecure: bool,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Settings with TLS validation on and the default timeout.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password,
            insecure: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Toggle TLS certificate validation.
    #[must_use]
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn parse_endpoint(&self) -> ClientResult<Url> {
        let url = Url::parse(&self.endpoint).map_err(|e| ClientError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        Ok(url)
    }

    pub(crate) fn build_http(&self) -> ClientResult<reqwest::Client> {
        reqwest::Client::builder()
            .danger_accept_invalid_certs(self.insecure)
            .timeout(self.timeout)
            .user_agent(concat!("opennebula-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Build)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("insecure", &self.insecure)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Authenticated handle on the OpenNebula XML-RPC API.
///
/// Every call sends the `username:password` session string as its first
/// parameter. The handle is cheap to share behind an `Arc`.
pub struct OneClient {
    http: reqwest::Client,
    endpoint: Url,
    username: String,
    session: SecretString,
    insecure: bool,
}

impl OneClient {
    /// Build a client. No request is sent.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidEndpoint`] for an unusable URL and
    /// [`ClientError::Build`] if the HTTP stack cannot be initialised.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let endpoint = config.parse_endpoint()?;
        let http = config.build_http()?;
        if config.insecure {
            warn!(endpoint = %endpoint, "TLS certificate validation is disabled");
        }
        let session = format!("{}:{}", config.username, config.password.expose_secret());

        Ok(Self {
            http,
            endpoint,
            username: config.username.clone(),
            session: SecretString::from(session),
            insecure: config.insecure,
        })
    }

    /// Endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Account name used for the session.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether TLS certificate validation is disabled.
    #[must_use]
    pub fn is_insecure(&self) -> bool {
        self.insecure
    }

    /// Invoke an API method and return the payload of a successful call.
    ///
    /// OpenNebula answers every method with `[success, payload, error_code]`;
    /// a `false` success flag becomes [`ClientError::Api`].
    ///
    /// # Errors
    ///
    /// Transport, HTTP status, XML-RPC fault, API rejection, or a response
    /// not shaped as above.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> ClientResult<Value> {
        let mut full = Vec::with_capacity(params.len().saturating_add(1));
        full.push(Value::String(self.session.expose_secret().to_owned()));
        full.extend(params);

        let response = self.call_raw(method, &full).await?;
        unpack_response(method, response)
    }

    /// POST a method call and decode the raw return value.
    async fn call_raw(&self, method: &str, params: &[Value]) -> ClientResult<Value> {
        debug!(method, endpoint = %self.endpoint, "XML-RPC call");
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/xml")
            .body(xmlrpc::encode_call(method, params))
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                endpoint: self.endpoint.to_string(),
                source: e,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ClientError::Transport {
            endpoint: self.endpoint.to_string(),
            source: e,
        })?;

        if !status.is_success() {
            return Err(ClientError::HttpStatus {
                endpoint: self.endpoint.to_string(),
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }
        xmlrpc::decode_response(&body)
    }

    /// Query the OpenNebula release string, e.g. `"6.8.0"`.
    ///
    /// # Errors
    ///
    /// Any [`call`](Self::call) failure, or a non-string payload.
    pub async fn system_version(&self) -> ClientResult<String> {
        match self.call("one.system.version", Vec::new()).await? {
            Value::String(version) => Ok(version),
            other => Err(ClientError::MalformedResponse(format!(
                "one.system.version returned {other:?} instead of a string"
            ))),
        }
    }
}

impl fmt::Debug for OneClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("username", &self.username)
            .field("insecure", &self.insecure)
            .finish_non_exhaustive()
    }
}

fn unpack_response(method: &str, response: Value) -> ClientResult<Value> {
    let Value::Array(mut items) = response else {
        return Err(ClientError::MalformedResponse(format!(
            "{method} did not return an array"
        )));
    };
    if items.len() < 2 {
        return Err(ClientError::MalformedResponse(format!(
            "{method} returned {} elements, expected at least 2",
            items.len()
        )));
    }

    let success = items[0].as_bool().ok_or_else(|| {
        ClientError::MalformedResponse(format!("{method} success flag is not a boolean"))
    })?;
    let code = items.get(2).and_then(Value::as_i64).unwrap_or_default();
    let payload = items.swap_remove(1);

    if success {
        return Ok(payload);
    }
    Err(ClientError::Api {
        method: method.to_owned(),
        kind: ApiErrorKind::from_code(code),
        code,
        message: payload.as_str().unwrap_or_default().to_owned(),
    })
}
