//! Configuration sourced from the environment

use crate::error::{Error, Result};
use std::env;
use std::fmt;
use std::time::Duration;

/// Create-post endpoint of the X v2 API
pub const DEFAULT_ENDPOINT: &str = "https://api.twitter.com/2/tweets";

/// Template used when `DAILY_MESSAGE_TEMPLATE` is unset
pub const DEFAULT_TEMPLATE: &str = "特定の文章 {date}";

/// Bound on the single outbound request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_API_KEY: &str = "X_API_KEY";
pub const ENV_API_KEY_SECRET: &str = "X_API_KEY_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "X_ACCESS_TOKEN";
pub const ENV_ACCESS_TOKEN_SECRET: &str = "X_ACCESS_TOKEN_SECRET";
pub const ENV_TEMPLATE: &str = "DAILY_MESSAGE_TEMPLATE";
pub const ENV_TIMEZONE: &str = "DAILY_MESSAGE_TZ";
pub const ENV_DRY_RUN: &str = "DRY_RUN";
pub const ENV_ENDPOINT: &str = "X_API_ENDPOINT";

/// Credential variables in the order they are reported
pub const REQUIRED_CREDENTIAL_VARS: &[&str] = &[
    ENV_API_KEY,
    ENV_API_KEY_SECRET,
    ENV_ACCESS_TOKEN,
    ENV_ACCESS_TOKEN_SECRET,
];

/// OAuth1 consumer and token pairs. Unset values are empty strings.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_key_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl Credentials {
    /// Names of the variables whose values are empty
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (ENV_API_KEY, &self.api_key),
            (ENV_API_KEY_SECRET, &self.api_key_secret),
            (ENV_ACCESS_TOKEN, &self.access_token),
            (ENV_ACCESS_TOKEN_SECRET, &self.access_token_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &str| if v.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("Credentials")
            .field("api_key", &redact(&self.api_key))
            .field("api_key_secret", &redact(&self.api_key_secret))
            .field("access_token", &redact(&self.access_token))
            .field("access_token_secret", &redact(&self.access_token_secret))
            .finish()
    }
}

/// Everything one run needs, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub template: String,
    /// Raw IANA name; resolution and fallback happen in `date`
    pub timezone: Option<String>,
    pub dry_run: bool,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            template: DEFAULT_TEMPLATE.to_string(),
            timezone: None,
            dry_run: false,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials {
            api_key: lookup(ENV_API_KEY).unwrap_or_default(),
            api_key_secret: lookup(ENV_API_KEY_SECRET).unwrap_or_default(),
            access_token: lookup(ENV_ACCESS_TOKEN).unwrap_or_default(),
            access_token_secret: lookup(ENV_ACCESS_TOKEN_SECRET).unwrap_or_default(),
        };

        Self {
            credentials,
            template: lookup(ENV_TEMPLATE).unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
            timezone: lookup(ENV_TIMEZONE)
                .map(|tz| tz.trim().to_string())
                .filter(|tz| !tz.is_empty()),
            dry_run: lookup(ENV_DRY_RUN).as_deref().map(parse_bool).unwrap_or(false),
            endpoint: lookup(ENV_ENDPOINT)
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Config for tests: dummy credentials, fixed template, UTC
    pub fn for_test() -> Self {
        Self {
            credentials: Credentials {
                api_key: "test-key".to_string(),
                api_key_secret: "test-key-secret".to_string(),
                access_token: "test-token".to_string(),
                access_token_secret: "test-token-secret".to_string(),
            },
            template: "Report {date}".to_string(),
            timezone: Some("UTC".to_string()),
            ..Self::default()
        }
    }

    /// Fail unless all four credentials are set. Always passes in dry-run mode.
    pub fn require_credentials(&self) -> Result<&Credentials> {
        if self.dry_run {
            return Ok(&self.credentials);
        }

        let missing = self.credentials.missing();
        if missing.is_empty() {
            Ok(&self.credentials)
        } else {
            Err(Error::MissingCredentials { missing })
        }
    }
}

/// Parse a boolean-like flag: `1`, `true`, `yes`, `on` (any case) are true
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
