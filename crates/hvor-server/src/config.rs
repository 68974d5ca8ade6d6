//! Command line and environment configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::Level;

use hvor_core::{TracingConfig, TracingOutputFormat};
use hvor_feed::{FeedSource, FileFeed, HttpFeed};

use crate::error::{ServerError, ServerResult};
use crate::tokens::AccessTokens;

/// hvor - where in the world am I
#[derive(Debug, Parser)]
#[command(name = "hvor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared calendar (ICS) URL to read location history from
    #[arg(long, env = "HVOR_CALENDAR_URL")]
    pub calendar_url: Option<String>,

    /// Address to serve HTTP on
    #[arg(long, env = "HVOR_LISTEN_ADDR", default_value = "localhost:56663")]
    pub listen_addr: String,

    /// Comma separated tokens accepted in `?from=` on the landing page
    #[arg(long, env = "HVOR_FROM_TOKENS", default_value = "")]
    pub from_tokens: String,

    /// Seconds between calendar refreshes
    #[arg(long, env = "HVOR_REFRESH_PERIOD", default_value_t = 1800)]
    pub refresh_period: u64,

    /// Seconds allowed for a single calendar download
    #[arg(long, env = "HVOR_FETCH_TIMEOUT", default_value_t = 30)]
    pub fetch_timeout: u64,

    /// Read the calendar from a local dump instead of the URL
    #[arg(long, env = "HVOR_DEV")]
    pub dev: bool,

    /// Calendar dump used in dev mode
    #[arg(long, env = "HVOR_DEV_FILE", default_value = "cal.dump")]
    pub dev_file: PathBuf,

    /// Enable debug output
    #[arg(long, short = 'v', env = "HVOR_VERBOSE")]
    pub verbose: bool,

    /// Log format: pretty, compact or json
    #[arg(long, env = "HVOR_LOG_FORMAT", default_value = "pretty")]
    pub log_format: TracingOutputFormat,

    /// Filter directive (e.g. `hvor_server=trace`), overrides RUST_LOG
    #[arg(long, env = "HVOR_LOG_FILTER")]
    pub log_filter: Option<String>,
}

/// Where the calendar is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedConfig {
    Http { url: String, timeout: Duration },
    File { path: PathBuf },
}

impl FeedConfig {
    /// Builds the feed source.
    pub fn build_source(&self) -> ServerResult<Arc<dyn FeedSource>> {
        let source: Arc<dyn FeedSource> = match self {
            Self::Http { url, timeout } => Arc::new(HttpFeed::new(url, *timeout)?),
            Self::File { path } => Arc::new(FileFeed::new(path)),
        };
        Ok(source)
    }
}

/// Validated server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub feed: FeedConfig,
    pub listen_addr: String,
    pub tokens: AccessTokens,
    pub refresh_period: Duration,
    pub verbose: bool,
    pub log_format: TracingOutputFormat,
    pub log_filter: Option<String>,
}

impl ServerConfig {
    /// Builds and validates the configuration from parsed arguments.
    pub fn from_cli(cli: Cli) -> ServerResult<Self> {
        let feed = if cli.dev {
            FeedConfig::File { path: cli.dev_file }
        } else {
            let url = cli
                .calendar_url
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| {
                    ServerError::config("a calendar URL is required (--calendar-url or HVOR_CALENDAR_URL)")
                })?;
            FeedConfig::Http {
                url,
                timeout: Duration::from_secs(cli.fetch_timeout),
            }
        };

        let config = Self {
            feed,
            listen_addr: cli.listen_addr,
            tokens: AccessTokens::parse(&cli.from_tokens),
            refresh_period: Duration::from_secs(cli.refresh_period),
            verbose: cli.verbose,
            log_format: cli.log_format,
            log_filter: cli.log_filter.filter(|f| !f.trim().is_empty()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values the server cannot run with.
    pub fn validate(&self) -> ServerResult<()> {
        if self.refresh_period.is_zero() {
            return Err(ServerError::config("refresh period must be greater than zero"));
        }
        if let FeedConfig::Http { url, timeout } = &self.feed {
            if url.trim().is_empty() {
                return Err(ServerError::config("calendar URL must not be empty"));
            }
            if timeout.is_zero() {
                return Err(ServerError::config("fetch timeout must be greater than zero"));
            }
        }
        if self.listen_addr.trim().is_empty() {
            return Err(ServerError::config("listen address must not be empty"));
        }
        Ok(())
    }

    /// Logging setup for this configuration.
    ///
    /// JSON output gets the daemon preset, `--verbose` raises the level to
    /// debug whatever the format.
    pub fn tracing_config(&self) -> TracingConfig {
        let mut tracing = match (self.log_format, self.verbose) {
            (TracingOutputFormat::Json, _) => TracingConfig::daemon(),
            (_, true) => TracingConfig::verbose(),
            (_, false) => TracingConfig::default(),
        }
        .with_format(self.log_format);

        if self.verbose {
            tracing = tracing.with_level(Level::DEBUG);
        }
        if let Some(filter) = &self.log_filter {
            tracing = tracing.with_filter(filter.clone());
        }
        tracing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hvor").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let cli = parse(&["--calendar-url", "https://example.com/cal.ics"]);
        assert_eq!(cli.listen_addr, "localhost:56663");
        assert_eq!(cli.refresh_period, 1800);
        assert_eq!(cli.fetch_timeout, 30);
        assert_eq!(cli.dev_file, PathBuf::from("cal.dump"));
        assert_eq!(cli.log_format, TracingOutputFormat::Pretty);
        assert!(!cli.dev);

        let config = ServerConfig::from_cli(cli).unwrap();
        assert_eq!(
            config.feed,
            FeedConfig::Http {
                url: "https://example.com/cal.ics".into(),
                timeout: Duration::from_secs(30),
            }
        );
        assert_eq!(config.refresh_period, Duration::from_secs(30 * 60));
        assert!(config.tokens.is_empty());
    }

    #[test]
    fn url_required_outside_dev() {
        let err = ServerConfig::from_cli(parse(&[])).unwrap_err();
        assert!(matches!(err, ServerError::Config { .. }));

        let err = ServerConfig::from_cli(parse(&["--calendar-url", "  "])).unwrap_err();
        assert!(matches!(err, ServerError::Config { .. }));
    }

    #[test]
    fn dev_reads_dump() {
        let config = ServerConfig::from_cli(parse(&["--dev", "--dev-file", "/tmp/x.ics"])).unwrap();
        assert_eq!(
            config.feed,
            FeedConfig::File {
                path: PathBuf::from("/tmp/x.ics")
            }
        );
    }

    #[test]
    fn zero_period_rejected() {
        let err = ServerConfig::from_cli(parse(&["--dev", "--refresh-period", "0"])).unwrap_err();
        assert!(err.to_string().contains("refresh period"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = ServerConfig::from_cli(parse(&[
            "--calendar-url",
            "https://example.com/cal.ics",
            "--fetch-timeout",
            "0",
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("fetch timeout"));
    }

    #[test]
    fn tokens_and_format() {
        let config = ServerConfig::from_cli(parse(&[
            "--dev",
            "--from-tokens",
            "mum, dad",
            "--log-format",
            "json",
            "-v",
        ]))
        .unwrap();

        assert!(config.tokens.is_valid("mum"));
        assert!(config.tokens.is_valid("dad"));
        assert_eq!(config.log_format, TracingOutputFormat::Json);

        let tracing = config.tracing_config();
        assert_eq!(tracing.format, TracingOutputFormat::Json);
        assert_eq!(tracing.level, Level::DEBUG);
        assert!(tracing.span_events);
        assert!(tracing.filter.is_none());
    }

    #[test]
    fn log_filter_overrides_level() {
        let config =
            ServerConfig::from_cli(parse(&["--dev", "--log-filter", "hvor_server=trace"])).unwrap();
        let tracing = config.tracing_config();
        assert_eq!(tracing.filter.as_deref(), Some("hvor_server=trace"));
        assert_eq!(tracing.format, TracingOutputFormat::Pretty);
        assert_eq!(tracing.level, Level::INFO);

        let config = ServerConfig::from_cli(parse(&["--dev", "--log-filter", " "])).unwrap();
        assert!(config.tracing_config().filter.is_none());
    }

    #[test]
    fn unknown_log_format_rejected() {
        let result = Cli::try_parse_from(["hvor", "--dev", "--log-format", "xml"]);
        assert!(result.is_err());
    }

    #[test]
    fn builds_sources() {
        let file = FeedConfig::File {
            path: PathBuf::from("cal.dump"),
        };
        assert_eq!(file.build_source().unwrap().name(), "file");

        let http = FeedConfig::Http {
            url: "https://example.com/cal.ics".into(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(http.build_source().unwrap().name(), "http");

        let bad = FeedConfig::Http {
            url: "not a url".into(),
            timeout: Duration::from_secs(5),
        };
        assert!(matches!(bad.build_source(), Err(ServerError::Feed(_))));
    }
}
