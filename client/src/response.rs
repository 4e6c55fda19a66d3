use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Error;

/// Decoded response body. JSON when the payload parses as JSON, otherwise the
/// raw text (the service answers some failures with an HTML page).
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Body::Json(value),
            Err(parse_err) => {
                tracing::trace! {
                    "response body is not JSON: {}",
                    parse_err,
                }
                Body::Text(String::from_utf8_lossy(bytes).into_owned())
            },
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Json(_) => None,
            Body::Text(text) => Some(text),
        }
    }

    /// Field of a JSON object body.
    pub fn get(
        &self,
        field: &str,
    ) -> Option<&Value> {
        self.as_json()?.get(field)
    }

    pub fn contains_key(
        &self,
        field: &str,
    ) -> bool {
        self.get(field).is_some()
    }
}

impl std::fmt::Display for Body {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Body::Json(value) => {
                match serde_json::to_string_pretty(value) {
                    Ok(pretty) => write!(f, "{pretty}"),
                    Err(_) => write!(f, "{value}"),
                }
            },
            Body::Text(text) => write!(f, "{text}"),
        }
    }
}

/// The `(status, body)` pair every client operation returns. Non-success
/// statuses are not errors; callers inspect them.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    status: StatusCode,
    body: Body,
}

impl ApiResponse {
    pub fn new(
        status: StatusCode,
        body: Body,
    ) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn into_parts(self) -> (StatusCode, Body) {
        (self.status, self.body)
    }

    /// Deserialize a JSON body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let Body::Json(value) = &self.body else {
            return Err(self.unexpected());
        };

        serde_json::from_value(value.clone()).map_err(|err| {
            tracing::trace!("response body does not match the expected shape: {}", err);
            self.unexpected()
        })
    }

    pub(crate) fn unexpected(&self) -> Error {
        Error::UnexpectedBody {
            status: self.status,
            body: self.body.clone(),
        }
    }
}
