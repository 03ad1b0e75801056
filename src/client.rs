//! Signed create-post request and response interpretation
//!
//! The network hop sits behind [`Transport`] so the outcome handling can be
//! exercised without a server.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::oauth::Signer;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Status line and body as received, before interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Sends one JSON POST. Connection, timeout and body-read failures are
/// reported as `Error::Transport`.
pub trait Transport {
    fn post_json(&self, url: &str, authorization: &str, body: &Value) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post_json(&self, url: &str, authorization: &str, body: &Value) -> Result<HttpResponse> {
        (**self).post_json(url, authorization, body)
    }
}

/// Blocking reqwest transport with a fixed request timeout
pub struct HttpTransport {
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn client(&self) -> Result<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("daily-poster/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))
    }

    fn describe(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("request timed out after {}s ({})", self.timeout.as_secs(), err)
        } else if err.is_connect() {
            format!("connection failed ({})", err)
        } else {
            err.to_string()
        }
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, authorization: &str, body: &Value) -> Result<HttpResponse> {
        let response = self
            .client()?
            .post(url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(body)
            .send()
            .map_err(|e| Error::Transport(self.describe(&e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| Error::Transport(self.describe(&e)))?;

        Ok(HttpResponse { status, body })
    }
}

/// Response payload: structured when it parses as JSON, raw text otherwise
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn parse(raw: String) -> Self {
        match serde_json::from_str(&raw) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(raw),
        }
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Json(value) => write!(f, "{}", value),
            ResponseBody::Text(text) => f.write_str(text),
        }
    }
}

/// Outcome of the create-post call
#[derive(Debug, Clone, PartialEq)]
pub enum PostResult {
    Success(ResponseBody),
    /// `status` is `None` when no response was received
    Failure {
        status: Option<u16>,
        body: ResponseBody,
    },
}

impl PostResult {
    /// Classify a received response. Statuses >= 400 and statuses outside
    /// the valid HTTP range are failures.
    pub fn from_response(response: HttpResponse) -> Self {
        let body = ResponseBody::parse(response.body);
        let readable = (100..=599).contains(&response.status);

        if readable && response.status < 400 {
            PostResult::Success(body)
        } else {
            PostResult::Failure {
                status: Some(response.status),
                body,
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PostResult::Success(_))
    }

    /// Convert into the run's error taxonomy
    pub fn into_result(self) -> Result<ResponseBody> {
        match self {
            PostResult::Success(body) => Ok(body),
            PostResult::Failure { status: None, body } => Err(Error::Transport(body.to_string())),
            PostResult::Failure {
                status: Some(status),
                body,
            } => Err(Error::RemoteRejection {
                status,
                body: body.to_string(),
            }),
        }
    }
}

#[derive(Serialize)]
struct CreatePostRequest<'a> {
    text: &'a str,
}

/// Sign and send `text` to the configured endpoint
///
/// Only a malformed endpoint URL is returned as `Err`; everything the
/// transport or the server reports comes back as a `PostResult`.
pub fn post<T: Transport + ?Sized>(
    transport: &T,
    config: &Config,
    text: &str,
) -> Result<PostResult> {
    let authorization =
        Signer::new(&config.credentials).authorization_header("POST", &config.endpoint, &[])?;
    let payload = serde_json::to_value(CreatePostRequest { text })?;

    debug!("POST {} ({} chars)", config.endpoint, text.chars().count());

    let result = match transport.post_json(&config.endpoint, &authorization, &payload) {
        Ok(response) => PostResult::from_response(response),
        Err(Error::Transport(detail)) => PostResult::Failure {
            status: None,
            body: ResponseBody::Text(detail),
        },
        Err(e) => return Err(e),
    };

    match &result {
        PostResult::Success(_) => info!("Post accepted by {}", config.endpoint),
        PostResult::Failure { status, .. } => info!("Post failed with status {:?}", status),
    }

    Ok(result)
}
