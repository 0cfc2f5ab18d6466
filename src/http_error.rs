//! HTTP error classification.
//!
//! Errors coming out of an HTTP client have an unpredictable shape: some
//! carry a response with a status and a JSON body, some only a request
//! (the server never answered), some only a message. [`HttpErrorShape`]
//! models every optional piece and the functions here probe them in a fixed
//! order without ever failing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message used when nothing more specific can be extracted
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Error code that marks a request that never reached the server
pub const NETWORK_ERROR_CODE: &str = "ERR_NETWORK";

/// Body of an error response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
}

/// Response part of an HTTP error
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<u16>,
    /// Only an object body is kept; text and HTML bodies are dropped
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<ErrorBody>,
}

/// Duck-typed HTTP client error.
///
/// Deserializes from the JSON shape an HTTP client error serializes to;
/// unknown fields are ignored, every field is optional, and a field of the
/// wrong type is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpErrorShape {
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub code: Option<String>,
    /// Whether a request was sent
    #[serde(default, deserialize_with = "deserialize_presence")]
    pub request: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub response: Option<ErrorResponse>,
    /// Display text of the underlying native error, if any
    #[serde(default, deserialize_with = "lenient")]
    pub source_description: Option<String>,
}

/// Keep the field only when it has the expected type
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Any non-null value counts as "present"
fn deserialize_presence<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => false,
        Value::Bool(flag) => flag,
        _ => true,
    })
}

impl HttpErrorShape {
    /// Read an error from arbitrary JSON. Never fails: anything that is not
    /// an object yields the empty shape.
    pub fn from_json(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }

    /// Shape for a response that came back with a non-success status.
    ///
    /// The body is parsed leniently: a JSON `message` (or `error`) string
    /// becomes the response message, anything else is ignored.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body).ok().and_then(|json| {
            json.get("message")
                .or_else(|| json.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });

        Self {
            request: true,
            response: Some(ErrorResponse {
                status: Some(status),
                data: Some(ErrorBody { message }),
            }),
            ..Self::default()
        }
    }

    /// Shape for an error raised by `reqwest`
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        let mut shape = Self {
            request: true,
            source_description: Some(error.to_string()),
            ..Self::default()
        };

        if let Some(status) = error.status() {
            shape.response = Some(ErrorResponse {
                status: Some(status.as_u16()),
                data: None,
            });
        } else if error.is_connect() || error.is_timeout() {
            shape.code = Some(NETWORK_ERROR_CODE.to_string());
        }

        shape
    }

    fn status(&self) -> Option<u16> {
        self.response.as_ref().and_then(|r| r.status)
    }
}

/// Broad category of an HTTP error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Client,
    Server,
    Unknown,
}

/// Classification of a caught error, built on demand
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// Extract a human-readable message.
///
/// Precedence: direct message, then `response.data.message`, then a
/// status-only message, then the native error description, then
/// [`UNKNOWN_ERROR_MESSAGE`].
pub fn extract_error_message(error: &HttpErrorShape) -> String {
    if let Some(message) = &error.message {
        return message.clone();
    }

    let response_message = error
        .response
        .as_ref()
        .and_then(|r| r.data.as_ref())
        .and_then(|d| d.message.as_ref());
    if let Some(message) = response_message {
        return message.clone();
    }

    if let Some(status) = error.status() {
        return format!("Request failed with status {}", status);
    }

    if let Some(description) = &error.source_description {
        return description.clone();
    }

    UNKNOWN_ERROR_MESSAGE.to_string()
}

/// True when the request never got a response
pub fn is_network_error(error: &HttpErrorShape) -> bool {
    error.code.as_deref() == Some(NETWORK_ERROR_CODE)
        || (error.request && error.response.is_none())
}

/// True for 4xx responses
pub fn is_client_error(error: &HttpErrorShape) -> bool {
    matches!(error.status(), Some(status) if (400..500).contains(&status))
}

/// True for 5xx (and above) responses
pub fn is_server_error(error: &HttpErrorShape) -> bool {
    matches!(error.status(), Some(status) if status >= 500)
}

/// Classify an error that may be absent altogether
pub fn classify_opt(error: Option<&HttpErrorShape>) -> ClassifiedError {
    match error {
        Some(error) => classify(error),
        None => ClassifiedError {
            kind: ErrorKind::Unknown,
            message: UNKNOWN_ERROR_MESSAGE.to_string(),
            status_code: None,
        },
    }
}

/// Classify an error. Network errors are checked first.
pub fn classify(error: &HttpErrorShape) -> ClassifiedError {
    let kind = if is_network_error(error) {
        ErrorKind::Network
    } else if is_client_error(error) {
        ErrorKind::Client
    } else if is_server_error(error) {
        ErrorKind::Server
    } else {
        ErrorKind::Unknown
    };

    ClassifiedError {
        kind,
        message: extract_error_message(error),
        status_code: error.status(),
    }
}
