//! Everything that can go wrong between the client and the relay.
//!
//! One enum covers the whole failure surface, from HTTP statuses the relay
//! hands back to transport and parsing faults on this side of the wire.
//! Session code never lets these escape as panics; they fold into banner
//! text and error-flagged transcript messages.

use std::error;
use std::fmt;
use std::sync::Arc;

/// The one error type every fallible operation in this crate returns.
#[derive(Clone, Debug)]
pub enum Error {
    /// Catch-all for relay statuses without a dedicated variant.
    Api {
        /// Status the relay answered with.
        status_code: u16,
        message: String,
    },

    /// The relay refused the request as malformed (HTTP 400).
    BadRequest {
        message: String,
        /// Request field the relay objected to, when it named one.
        param: Option<String>,
    },

    /// The conversation or resource is gone (HTTP 404).
    NotFound { message: String },

    /// The request outlived its deadline (client clock or HTTP 408).
    Timeout {
        message: String,
        /// Deadline that expired, in seconds.
        duration: Option<f64>,
    },

    /// The user cut the request short.
    Abort { message: String },

    /// The relay never answered the connection attempt.
    Connection {
        message: String,
        /// Transport error underneath, when reqwest handed one over.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The relay itself faulted (HTTP 500).
    InternalServer { message: String },

    /// The hosted model behind the relay is out (HTTP 502 through 504).
    ServiceUnavailable { message: String },

    /// A body would not encode or decode as JSON.
    Serialization {
        message: String,
        /// The serde error underneath.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The HTTP stack failed below the status-code level.
    HttpClient {
        message: String,
        /// The reqwest error underneath.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A relay URL that would not parse.
    Url {
        message: String,
        /// The parse error underneath.
        source: Option<url::ParseError>,
    },

    /// Input rejected before any request left the client.
    Validation {
        message: String,
        /// Which input was rejected, when a single one is to blame.
        param: Option<String>,
    },
}

impl Error {
    /// A failure carrying the raw relay status.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Error::Api { status_code, message }
    }

    /// A request the relay refused as malformed.
    pub fn bad_request(message: impl Into<String>, param: Option<String>) -> Self {
        let message = message.into();
        Error::BadRequest { message, param }
    }

    /// A conversation or model the relay does not know.
    pub fn not_found(message: impl Into<String>) -> Self {
        let message = message.into();
        Error::NotFound { message }
    }

    /// A request that ran past its deadline.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        let message = message.into();
        Error::Timeout { message, duration }
    }

    /// A request the user cut short.
    pub fn abort(message: impl Into<String>) -> Self {
        let message = message.into();
        Error::Abort { message }
    }

    /// A relay that could not be reached at all.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        let message = message.into();
        let source = source.map(Arc::from);
        Error::Connection { message, source }
    }

    /// A fault inside the relay itself.
    pub fn internal_server(message: impl Into<String>) -> Self {
        let message = message.into();
        Error::InternalServer { message }
    }

    /// An upstream model outage behind the relay.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        let message = message.into();
        Error::ServiceUnavailable { message }
    }

    /// A body that would not round through serde.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        let message = message.into();
        let source = source.map(Arc::from);
        Error::Serialization { message, source }
    }

    /// A transport-level fault from the HTTP stack.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        let message = message.into();
        let source = source.map(Arc::from);
        Error::HttpClient { message, source }
    }

    /// A base URL that did not parse.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        let message = message.into();
        Error::Url { message, source }
    }

    /// Input rejected before any request went out.
    pub fn validation(message: impl Into<String>, param: Option<String>) -> Self {
        let message = message.into();
        Error::Validation { message, param }
    }

    /// True for a 404 from the relay.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// True for a 400 from the relay.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Error::BadRequest { .. })
    }

    /// True when a deadline expired, on either side of the wire.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// True when the user interrupted the request.
    pub fn is_abort(&self) -> bool {
        matches!(self, Error::Abort { .. })
    }

    /// True when the relay never answered.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// True for 500 and the 502 through 504 gateway family.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::InternalServer { .. } | Error::ServiceUnavailable { .. })
    }

    /// True for input rejected before leaving the client.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// True when the failure happened in transport rather than as an HTTP status.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Timeout { .. } | Error::Abort { .. } | Error::Connection { .. })
    }

    /// The HTTP status this error maps back to, when there is a single one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status_code, .. } => Some(*status_code),
            Error::BadRequest { .. } => Some(400),
            Error::NotFound { .. } => Some(404),
            Error::InternalServer { .. } => Some(500),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Api { status_code, message } => {
                write!(f, "relay returned status {status_code}: {message}")
            }
            Error::BadRequest { message, param: Some(param) } => {
                write!(f, "bad request ({param}): {message}")
            }
            Error::BadRequest { message, param: None } => write!(f, "bad request: {message}"),
            Error::NotFound { message } => write!(f, "not found: {message}"),
            Error::Timeout { message, duration: Some(seconds) } => {
                write!(f, "timed out after {seconds}s: {message}")
            }
            Error::Timeout { message, duration: None } => write!(f, "timed out: {message}"),
            Error::Abort { message } => write!(f, "cancelled: {message}"),
            Error::Connection { message, .. } => write!(f, "cannot reach relay: {message}"),
            Error::InternalServer { message } => write!(f, "relay fault: {message}"),
            Error::ServiceUnavailable { message } => {
                write!(f, "upstream unavailable: {message}")
            }
            Error::Serialization { message, .. } => write!(f, "payload error: {message}"),
            Error::HttpClient { message, .. } => write!(f, "http error: {message}"),
            Error::Url { message, .. } => write!(f, "bad relay url: {message}"),
            Error::Validation { message, param: Some(param) } => {
                write!(f, "invalid {param}: {message}")
            }
            Error::Validation { message, param: None } => write!(f, "invalid input: {message}"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Connection { source, .. }
            | Error::Serialization { source, .. }
            | Error::HttpClient { source, .. } => {
                source.as_deref().map(|e| e as &(dyn error::Error + 'static))
            }
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(err.to_string(), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(err.to_string(), Some(err))
    }
}

/// Shorthand for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
