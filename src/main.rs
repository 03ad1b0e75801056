//! Daily Poster - CLI entry point
//!
//! Intended to be invoked once a day by an external scheduler.

use clap::Parser;
use daily_poster::client::HttpTransport;
use daily_poster::config::Config;
use daily_poster::poster::DailyPoster;
use std::io;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Post today's message to X
#[derive(Parser)]
#[command(name = "daily-poster")]
#[command(version)]
#[command(about = "Post a date-stamped daily message to X (config via environment)")]
struct Cli {
    /// Build and print the message without posting (same as DRY_RUN=1)
    #[arg(long)]
    dry_run: bool,

    /// Message template; overrides DAILY_MESSAGE_TEMPLATE
    #[arg(long)]
    template: Option<String>,

    /// IANA timezone for the date; overrides DAILY_MESSAGE_TZ
    #[arg(long)]
    tz: Option<String>,

    /// Create-post URL; overrides X_API_ENDPOINT
    #[arg(long, hide = true)]
    endpoint: Option<String>,
}

impl Cli {
    fn apply(self, mut config: Config) -> Config {
        if self.dry_run {
            config.dry_run = true;
        }
        if let Some(template) = self.template {
            config.template = template;
        }
        if let Some(tz) = self.tz {
            config.timezone = Some(tz);
        }
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        config
    }
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the run's output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = cli.apply(Config::from_env());
    let transport = HttpTransport::new(config.timeout);
    let poster = DailyPoster::new(config, transport);

    let stdout = io::stdout();
    if let Err(e) = poster.run(&mut stdout.lock()) {
        debug!("Run failed: {:?}", e);
        eprintln!("ERROR: {}", e);
        std::process::exit(e.exit_code());
    }
}
