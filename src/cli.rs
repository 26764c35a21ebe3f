//! Command-line interface definitions for News Analyzer.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Global options configure the API client; the subcommand picks what to run.

use crate::config::{ConfigError, Settings};
use crate::models::{FetchRequest, SearchSection, TopStoriesSection};
use crate::web::DEFAULT_LOOKBACK_DAYS;
use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the News Analyzer application.
///
/// # Examples
///
/// ```sh
/// # Last week of Technology articles, filtered to headlines mentioning "AI"
/// news_analyzer search --section technology --keyword ai
///
/// # Current top stories in science, as JSON
/// news_analyzer top-stories --section science --json
///
/// # Interactive dashboard on http://127.0.0.1:8501
/// news_analyzer serve
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// New York Times API key
    #[arg(long, global = true, env = "NYT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// JSON file holding {"NYT_API_KEY": "..."}, read when no key is given
    #[arg(long, global = true)]
    pub api_key_file: Option<PathBuf>,

    /// Optional path to a YAML settings file
    #[arg(short, long, global = true, env = "NEWS_ANALYZER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Day requests in flight at once for `search`
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search one section day by day over a date range
    Search {
        #[arg(short, long, value_enum)]
        section: SearchSection,

        /// First day, YYYY-MM-DD (default: a week ago)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day, YYYY-MM-DD (default: today)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Only chart articles whose headline contains this text
        #[arg(short, long)]
        keyword: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch the current top stories for a section
    TopStories {
        #[arg(short, long, value_enum)]
        section: TopStoriesSection,

        /// Only chart articles whose headline contains this text
        #[arg(short, long)]
        keyword: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the interactive dashboard
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:8501")]
        bind: String,
    },
}

impl Cli {
    /// Settings from the config file (if any) with CLI overrides applied.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };
        if let Some(file) = &self.api_key_file {
            settings.api_key_file = file.clone();
        }
        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            settings.request_timeout_secs = secs;
        }
        if let Some(n) = self.concurrency {
            settings.concurrency = n;
        }
        settings.validate()?;
        Ok(settings)
    }
}

impl Command {
    /// The one-shot fetch this subcommand asks for; `None` for `serve`.
    pub fn fetch_request(&self, today: NaiveDate) -> Option<FetchRequest> {
        match self {
            Command::Search {
                section,
                start,
                end,
                keyword,
                ..
            } => Some(FetchRequest::Search {
                section: *section,
                start: start.unwrap_or(today - Duration::days(DEFAULT_LOOKBACK_DAYS)),
                end: end.unwrap_or(today),
                keyword: keyword.clone(),
            }),
            Command::TopStories {
                section, keyword, ..
            } => Some(FetchRequest::TopStories {
                section: *section,
                keyword: keyword.clone(),
            }),
            Command::Serve { .. } => None,
        }
    }

    pub fn wants_json(&self) -> bool {
        match self {
            Command::Search { json, .. } | Command::TopStories { json, .. } => *json,
            Command::Serve { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    #[test]
    fn test_search_parsing() {
        let cli = Cli::parse_from([
            "news_analyzer",
            "search",
            "--section",
            "politics",
            "--start",
            "2024-05-01",
            "--end",
            "2024-05-03",
            "-k",
            "vote",
        ]);
        assert_eq!(
            cli.command.fetch_request(today()),
            Some(FetchRequest::Search {
                section: SearchSection::Politics,
                start: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
                keyword: Some("vote".into()),
            })
        );
        assert!(!cli.command.wants_json());
    }

    #[test]
    fn test_search_default_dates() {
        let cli = Cli::parse_from(["news_analyzer", "search", "-s", "health"]);
        match cli.command.fetch_request(today()) {
            Some(FetchRequest::Search { start, end, .. }) => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2024, 5, 13).unwrap());
                assert_eq!(end, today());
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_top_stories_with_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "news_analyzer",
            "top-stories",
            "--section",
            "sports",
            "--json",
            "--api-key",
            "abc",
            "--concurrency",
            "2",
        ]);
        assert_eq!(cli.api_key.as_deref(), Some("abc"));
        assert!(cli.command.wants_json());
        let settings = cli.settings().unwrap();
        assert_eq!(settings.concurrency, 2);
    }

    #[test]
    fn test_serve_default_bind() {
        let cli = Cli::parse_from(["news_analyzer", "serve"]);
        match &cli.command {
            Command::Serve { bind } => assert_eq!(bind, "127.0.0.1:8501"),
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.command.fetch_request(today()), None);
    }

    #[test]
    fn test_rejects_unknown_section() {
        assert!(Cli::try_parse_from(["news_analyzer", "search", "-s", "sports"]).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let cli = Cli::parse_from(["news_analyzer", "serve", "--timeout-secs", "0"]);
        assert!(matches!(cli.settings(), Err(ConfigError::Invalid(_))));
    }
}
