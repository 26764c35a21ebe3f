//! Data models for fetched articles and the reports built from them.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: One extracted row from the New York Times API
//! - [`SearchSection`] / [`TopStoriesSection`]: The fixed section choices per endpoint
//! - [`FetchRequest`]: A single user-triggered fetch
//! - [`Report`]: Everything a presenter needs to render one pipeline run
//! - [`DashboardState`]: The two observable states of the dashboard

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single article extracted from an API record.
///
/// Articles are built fresh for every fetch and dropped when the report
/// has been rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// `headline.main` for search docs, `title` for top stories.
    pub headline: String,
    /// Publication date truncated to the day.
    pub published: NaiveDate,
    /// Keyword tags in provider order. May be empty.
    pub keywords: Vec<String>,
    /// The article abstract, when the provider sent one.
    pub summary: Option<String>,
    /// Link to the article on the provider's site.
    pub url: Option<String>,
}

impl Article {
    /// Keywords joined for display, e.g. `"AI, Chips"`.
    pub fn keywords_display(&self) -> String {
        self.keywords.join(", ")
    }
}

/// Sections offered by the article search endpoint.
///
/// The display name is sent verbatim inside the `fq` filter query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchSection {
    Technology,
    Politics,
    Science,
    Health,
    Business,
}

impl SearchSection {
    pub const ALL: [SearchSection; 5] = [
        SearchSection::Technology,
        SearchSection::Politics,
        SearchSection::Science,
        SearchSection::Health,
        SearchSection::Business,
    ];

    /// Name as the search API expects it in `section_name:("...")`.
    pub fn display_name(&self) -> &'static str {
        match self {
            SearchSection::Technology => "Technology",
            SearchSection::Politics => "Politics",
            SearchSection::Science => "Science",
            SearchSection::Health => "Health",
            SearchSection::Business => "Business",
        }
    }

    /// Lowercase form used in CLI arguments and form values.
    pub fn slug(&self) -> &'static str {
        match self {
            SearchSection::Technology => "technology",
            SearchSection::Politics => "politics",
            SearchSection::Science => "science",
            SearchSection::Health => "health",
            SearchSection::Business => "business",
        }
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.slug() == s)
    }
}

impl fmt::Display for SearchSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Sections offered by the top stories endpoint.
///
/// The lowercase name is the path segment: `/svc/topstories/v2/{name}.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TopStoriesSection {
    Technology,
    Politics,
    Business,
    Health,
    Science,
    Sports,
}

impl TopStoriesSection {
    pub const ALL: [TopStoriesSection; 6] = [
        TopStoriesSection::Technology,
        TopStoriesSection::Politics,
        TopStoriesSection::Business,
        TopStoriesSection::Health,
        TopStoriesSection::Science,
        TopStoriesSection::Sports,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            TopStoriesSection::Technology => "technology",
            TopStoriesSection::Politics => "politics",
            TopStoriesSection::Business => "business",
            TopStoriesSection::Health => "health",
            TopStoriesSection::Science => "science",
            TopStoriesSection::Sports => "sports",
        }
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.slug() == s)
    }
}

impl fmt::Display for TopStoriesSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// One "fetch" action from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    /// Article search, one API call per day in `start..=end`.
    Search {
        section: SearchSection,
        start: NaiveDate,
        end: NaiveDate,
        keyword: Option<String>,
    },
    /// Top stories for a whole section, one API call.
    TopStories {
        section: TopStoriesSection,
        keyword: Option<String>,
    },
}

impl FetchRequest {
    /// The headline filter, if the user typed anything besides whitespace.
    pub fn keyword(&self) -> Option<&str> {
        let keyword = match self {
            FetchRequest::Search { keyword, .. } => keyword,
            FetchRequest::TopStories { keyword, .. } => keyword,
        };
        keyword.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Section name as shown to the user.
    pub fn section_label(&self) -> String {
        match self {
            FetchRequest::Search { section, .. } => section.display_name().to_string(),
            FetchRequest::TopStories { section, .. } => section.slug().to_string(),
        }
    }
}

/// Severity of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A leveled message shown above the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub level: BannerLevel,
    pub message: String,
}

impl Banner {
    pub fn new(level: BannerLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Outcome of the headline filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSummary {
    pub term: String,
    pub matched: usize,
}

/// The result of one pipeline run, ready to be rendered.
///
/// `articles` is always the full fetched collection. The two chart series
/// are computed from the filtered collection when a filter is active, and
/// are empty when there is nothing to chart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    /// Heading such as `Technology, 2024-01-01 to 2024-01-07`.
    pub title: String,
    pub articles: Vec<Article>,
    pub filter: Option<FilterSummary>,
    /// Top keywords, descending by count.
    pub keyword_chart: Vec<(String, usize)>,
    /// Articles per day, ascending by date.
    pub daily_chart: Vec<(NaiveDate, usize)>,
    pub banners: Vec<Banner>,
    /// Records dropped by the extractor.
    pub skipped_records: usize,
}

impl Report {
    pub fn has_charts(&self) -> bool {
        !self.keyword_chart.is_empty() || !self.daily_chart.is_empty()
    }
}

/// What the dashboard is currently showing.
#[derive(Debug, Clone)]
pub enum DashboardState {
    /// No fetch issued yet.
    Idle,
    /// A fetch completed, with or without results.
    Displaying(Report),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_slugs_round_trip() {
        for section in SearchSection::ALL {
            assert_eq!(SearchSection::from_slug(section.slug()), Some(section));
        }
        for section in TopStoriesSection::ALL {
            assert_eq!(TopStoriesSection::from_slug(section.slug()), Some(section));
        }
        assert_eq!(SearchSection::from_slug("sports"), None);
    }

    #[test]
    fn test_search_section_display_name() {
        assert_eq!(SearchSection::Technology.to_string(), "Technology");
        assert_eq!(TopStoriesSection::Sports.to_string(), "sports");
    }

    #[test]
    fn test_blank_keyword_is_no_filter() {
        let request = FetchRequest::TopStories {
            section: TopStoriesSection::Science,
            keyword: Some("   ".to_string()),
        };
        assert_eq!(request.keyword(), None);

        let request = FetchRequest::TopStories {
            section: TopStoriesSection::Science,
            keyword: Some(" mars ".to_string()),
        };
        assert_eq!(request.keyword(), Some("mars"));
    }

    #[test]
    fn test_keywords_display() {
        let article = Article {
            headline: "Chips".to_string(),
            published: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            keywords: vec!["AI".to_string(), "Semiconductors".to_string()],
            summary: None,
            url: None,
        };
        assert_eq!(article.keywords_display(), "AI, Semiconductors");
    }

    #[test]
    fn test_report_serialization() {
        let report = Report {
            title: "Technology".to_string(),
            banners: vec![Banner::new(BannerLevel::Warning, "nothing")],
            ..Report::default()
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"warning\""));
        assert!(!report.has_charts());
    }
}
