//! Client error types.

use std::error::Error as _;
use std::fmt;

use thiserror::Error;

/// Errors raised while talking to OpenNebula or OneFlow.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint is not a usable URL.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// Endpoint as configured.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The request never produced a response (DNS, TCP, TLS, timeout).
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        /// Endpoint contacted.
        endpoint: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success HTTP status.
    #[error("{endpoint} answered HTTP {status}: {body}")]
    HttpStatus {
        /// Endpoint contacted.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// The server answered with an XML-RPC `<fault>`.
    #[error("XML-RPC fault {code}: {message}")]
    Fault {
        /// `faultCode`.
        code: i64,
        /// `faultString`.
        message: String,
    },

    /// OpenNebula rejected the call.
    #[error("{method} failed ({kind}, code {code}): {message}")]
    Api {
        /// XML-RPC method name.
        method: String,
        /// Classified error code.
        kind: ApiErrorKind,
        /// Raw OpenNebula error code.
        code: i64,
        /// Error message returned by OpenNebula.
        message: String,
    },

    /// The response body is not the expected XML-RPC or JSON shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A OneFlow operation was requested but no flow endpoint is configured.
    #[error("OneFlow endpoint is not configured")]
    FlowNotConfigured,
}

impl ClientError {
    /// Message followed by every distinct cause in the source chain.
    ///
    /// `reqwest` keeps the reason a request failed (refused connection, DNS,
    /// certificate) in nested sources that its `Display` leaves out.
    #[must_use]
    pub fn detail(&self) -> String {
        let mut detail = self.to_string();
        let mut cause = self.source();
        while let Some(err) = cause {
            let text = err.to_string();
            if !detail.contains(&text) {
                detail.push_str(": ");
                detail.push_str(&text);
            }
            cause = err.source();
        }
        detail
    }

    /// Whether OpenNebula rejected the credentials.
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::Api {
                kind: ApiErrorKind::Authentication,
                ..
            }
        ) || matches!(self, Self::HttpStatus { status: 401, .. })
    }
}

/// Error classes OpenNebula encodes in the third element of a failed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// `0x0100`: the session string was rejected.
    Authentication,
    /// `0x0200`: the user may not perform the call.
    Authorization,
    /// `0x0400`: the object does not exist.
    NoExists,
    /// `0x0800`: the action is not valid in the current state.
    Action,
    /// `0x1000`: bad call parameters.
    XmlRpcApi,
    /// `0x2000`: internal error.
    Internal,
    /// `0x4000`: allocation failed.
    Allocate,
    /// `0x8000`: the object is locked.
    Locked,
    /// Any other code.
    Other,
}

impl ApiErrorKind {
    /// Classify a raw OpenNebula error code.
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            0x0100 => Self::Authentication,
            0x0200 => Self::Authorization,
            0x0400 => Self::NoExists,
            0x0800 => Self::Action,
            0x1000 => Self::XmlRpcApi,
            0x2000 => Self::Internal,
            0x4000 => Self::Allocate,
            0x8000 => Self::Locked,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::NoExists => "no such object",
            Self::Action => "action",
            Self::XmlRpcApi => "api",
            Self::Internal => "internal",
            Self::Allocate => "allocate",
            Self::Locked => "locked",
            Self::Other => "unknown",
        };
        write!(f, "{name}")
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
