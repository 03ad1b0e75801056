//! The daily post procedure
//!
//! Runs the checks in a fixed order: template, length, dry-run, credentials,
//! then the network call. Nothing is sent unless every earlier step passed.

use crate::client::{self, ResponseBody, Transport};
use crate::config::Config;
use crate::date::resolve_date_at;
use crate::error::Result;
use crate::message::{build_message, validate_length};
use chrono::{DateTime, Utc};
use std::io::Write;
use tracing::{debug, info};

/// What a successful run did
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    DryRun { message: String },
    Posted { message: String, response: ResponseBody },
}

/// One configured posting run
pub struct DailyPoster<T: Transport> {
    config: Config,
    transport: T,
}

impl<T: Transport> DailyPoster<T> {
    pub fn new(config: Config, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build today's message without sending anything
    pub fn compose(&self, now: DateTime<Utc>) -> Result<String> {
        let date = resolve_date_at(self.config.timezone.as_deref(), now);
        debug!("Resolved date {} for timezone {:?}", date, self.config.timezone);

        let text = build_message(&self.config.template, &date)?;
        validate_length(&text)?;
        Ok(text)
    }

    /// Run against the current clock
    pub fn run(&self, out: &mut dyn Write) -> Result<RunOutcome> {
        self.run_at(Utc::now(), out)
    }

    /// Run as if the current instant were `now`. Progress lines go to `out`;
    /// failures are returned for the caller to report.
    pub fn run_at(&self, now: DateTime<Utc>, out: &mut dyn Write) -> Result<RunOutcome> {
        let dry_run = self.config.dry_run;
        let message = self.compose(now)?;

        writeln!(out, "Posting: {}", message)?;

        if dry_run {
            info!("Dry run, skipping network call");
            writeln!(out, "DRY_RUN enabled; not posting.")?;
            return Ok(RunOutcome::DryRun { message });
        }

        self.config.require_credentials()?;

        let response = client::post(&self.transport, &self.config, &message)?.into_result()?;
        writeln!(out, "Posted successfully: {}", response)?;

        Ok(RunOutcome::Posted { message, response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HttpResponse;
    use crate::error::Error;
    use chrono::TimeZone;
    use serde_json::Value;
    use std::cell::Cell;

    /// Counts calls and answers with a fixed status/body
    struct CountingTransport {
        calls: Cell<usize>,
        status: u16,
        body: &'static str,
    }

    impl CountingTransport {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                calls: Cell::new(0),
                status,
                body,
            }
        }
    }

    impl Transport for CountingTransport {
        fn post_json(&self, _url: &str, _auth: &str, _body: &Value) -> Result<HttpResponse> {
            self.calls.set(self.calls.get() + 1);
            Ok(HttpResponse {
                status: self.status,
                body: self.body.to_string(),
            })
        }
    }

    fn march_5() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap()
    }

    fn run(poster: &DailyPoster<CountingTransport>) -> (Result<RunOutcome>, String) {
        let mut out = Vec::new();
        let result = poster.run_at(march_5(), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_dry_run_needs_no_credentials() {
        let config = Config {
            dry_run: true,
            template: "Report {date}".to_string(),
            ..Config::default()
        };
        let poster = DailyPoster::new(config, CountingTransport::new(201, "{}"));

        let (result, out) = run(&poster);
        assert_eq!(
            result.unwrap(),
            RunOutcome::DryRun {
                message: "Report 2024-03-05".to_string()
            }
        );
        assert_eq!(out, "Posting: Report 2024-03-05\nDRY_RUN enabled; not posting.\n");
        assert_eq!(poster.transport.calls.get(), 0);
    }

    #[test]
    fn test_successful_post() {
        let poster = DailyPoster::new(
            Config::for_test(),
            CountingTransport::new(201, r#"{"data": {"id": "123"}}"#),
        );

        let (result, out) = run(&poster);
        assert!(matches!(result.unwrap(), RunOutcome::Posted { .. }));
        assert_eq!(
            out,
            "Posting: Report 2024-03-05\nPosted successfully: {\"data\":{\"id\":\"123\"}}\n"
        );
        assert_eq!(poster.transport.calls.get(), 1);
    }

    #[test]
    fn test_rejected_post() {
        let poster = DailyPoster::new(
            Config::for_test(),
            CountingTransport::new(403, r#"{"error": "forbidden"}"#),
        );

        let (result, out) = run(&poster);
        let err = result.unwrap_err();
        assert!(matches!(err, Error::RemoteRejection { status: 403, .. }));
        assert_ne!(err.exit_code(), 0);
        assert!(!out.contains("Posted successfully"));
    }

    #[test]
    fn test_missing_credential_stops_before_network() {
        let mut config = Config::for_test();
        config.credentials.access_token.clear();
        let poster = DailyPoster::new(config, CountingTransport::new(201, "{}"));

        let (result, out) = run(&poster);
        match result {
            Err(Error::MissingCredentials { missing }) => assert_eq!(missing, vec!["X_ACCESS_TOKEN"]),
            other => panic!("Expected MissingCredentials, got {:?}", other),
        }
        // The message is still shown before the credential check
        assert_eq!(out, "Posting: Report 2024-03-05\n");
        assert_eq!(poster.transport.calls.get(), 0);
    }

    #[test]
    fn test_template_error_stops_before_output() {
        let config = Config {
            template: "Report {day}".to_string(),
            ..Config::for_test()
        };
        let poster = DailyPoster::new(config, CountingTransport::new(201, "{}"));

        let (result, out) = run(&poster);
        assert!(matches!(result, Err(Error::TemplateFormat(_))));
        assert!(out.is_empty());
        assert_eq!(poster.transport.calls.get(), 0);
    }

    #[test]
    fn test_too_long_fails_even_in_dry_run() {
        let config = Config {
            template: format!("{} {{date}}", "x".repeat(300)),
            dry_run: true,
            ..Config::default()
        };
        let poster = DailyPoster::new(config, CountingTransport::new(201, "{}"));

        let (result, out) = run(&poster);
        match result {
            Err(Error::MessageTooLong { count, .. }) => assert_eq!(count, 311),
            other => panic!("Expected MessageTooLong, got {:?}", other),
        }
        assert!(out.is_empty());
        assert_eq!(poster.transport.calls.get(), 0);
    }

    #[test]
    fn test_invalid_timezone_falls_back() {
        let config = Config {
            timezone: Some("Not/AZone".to_string()),
            ..Config::for_test()
        };
        let poster = DailyPoster::new(config, CountingTransport::new(201, "{}"));
        assert_eq!(poster.compose(march_5()).unwrap(), "Report 2024-03-05");
    }

    #[test]
    fn test_compose_uses_configured_timezone() {
        let config = Config {
            timezone: Some("Pacific/Kiritimati".to_string()),
            ..Config::for_test()
        };
        let poster = DailyPoster::new(config, CountingTransport::new(201, "{}"));
        // +14:00: 12:00 UTC on the 5th is already the 6th
        let noon = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        assert_eq!(poster.compose(noon).unwrap(), "Report 2024-03-06");
    }
}
