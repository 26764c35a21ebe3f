//! The fetch → extract → aggregate pipeline behind every "fetch" action.
//!
//! [`run`] is stateless: each call starts from nothing, talks to the
//! [`ArticleSource`] and returns a [`Report`] for a presenter to render.

use crate::analysis::{count_by_day, count_keywords, filter_by_headline};
use crate::api::ArticleSource;
use crate::config::Settings;
use crate::extract::Extracted;
use crate::models::{Banner, BannerLevel, FetchRequest, FilterSummary, Report};
use crate::utils::days_inclusive;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

pub const NO_RESULTS: &str = "No articles found for the selected criteria.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("date range covers {days} days; the limit is {max}")]
    RangeTooLong { days: i64, max: i64 },
}

/// Days to query for `start..=end`, or why the range is refused.
pub fn plan_days(
    start: NaiveDate,
    end: NaiveDate,
    max_days: i64,
) -> Result<Vec<NaiveDate>, RequestError> {
    if start > end {
        return Err(RequestError::InvertedRange { start, end });
    }
    let days = (end - start).num_days() + 1;
    if days > max_days {
        return Err(RequestError::RangeTooLong {
            days,
            max: max_days,
        });
    }
    Ok(days_inclusive(start, end))
}

fn title_for(request: &FetchRequest) -> String {
    match request {
        FetchRequest::Search {
            section,
            start,
            end,
            ..
        } => format!("{section}, {start} to {end}"),
        FetchRequest::TopStories { section, .. } => format!("Top stories: {section}"),
    }
}

/// Run one fetch end to end.
#[instrument(level = "info", skip_all, fields(section = %request.section_label()))]
pub async fn run<S: ArticleSource>(source: &S, request: &FetchRequest, settings: &Settings) -> Report {
    let title = title_for(request);

    let extracted = match request {
        FetchRequest::Search {
            section, start, end, ..
        } => match plan_days(*start, *end, settings.max_days) {
            Ok(days) => source.search(*section, days).await,
            Err(e) => {
                warn!(error = %e, "Refusing search request");
                return error_report(title, e.to_string());
            }
        },
        FetchRequest::TopStories { section, .. } => match source.top_stories(*section).await {
            Ok(extracted) => extracted,
            Err(e) => {
                warn!(error = %e, "Top stories fetch failed");
                return error_report(
                    title,
                    format!(
                        "Failed to fetch articles ({e}). Check your API key and internet connection."
                    ),
                );
            }
        },
    };

    let report = build_report(
        title,
        extracted,
        request.keyword(),
        &request.section_label(),
        settings.top_n,
    );
    info!(
        articles = report.articles.len(),
        skipped_records = report.skipped_records,
        "Pipeline run complete"
    );
    report
}

fn error_report(title: String, message: String) -> Report {
    Report {
        title,
        banners: vec![Banner::new(BannerLevel::Error, message)],
        ..Report::default()
    }
}

/// Turn extracted articles into a [`Report`]. Pure.
pub fn build_report(
    title: String,
    extracted: Extracted,
    keyword: Option<&str>,
    section_label: &str,
    top_n: usize,
) -> Report {
    let mut report = Report {
        title,
        skipped_records: extracted.skipped,
        ..Report::default()
    };

    if extracted.skipped > 0 {
        report.banners.push(Banner::new(
            BannerLevel::Warning,
            format!(
                "Skipped {} malformed record(s) from the API response.",
                extracted.skipped
            ),
        ));
    }

    if extracted.articles.is_empty() {
        report
            .banners
            .push(Banner::new(BannerLevel::Warning, NO_RESULTS));
        return report;
    }

    report.banners.push(Banner::new(
        BannerLevel::Success,
        format!(
            "Retrieved {} articles from {section_label}.",
            extracted.articles.len()
        ),
    ));

    let filtered = keyword.map(|term| {
        let matched = filter_by_headline(&extracted.articles, term);
        report.banners.push(Banner::new(
            BannerLevel::Info,
            format!("Found {} articles containing '{term}'.", matched.len()),
        ));
        report.filter = Some(FilterSummary {
            term: term.to_string(),
            matched: matched.len(),
        });
        matched
    });

    let charted = filtered.as_deref().unwrap_or(&extracted.articles);
    if !charted.is_empty() {
        let counts = count_keywords(charted);
        debug!(
            distinct = counts.len(),
            total = counts.total(),
            "Counted keywords"
        );
        if !counts.is_empty() {
            report.keyword_chart = counts.top(top_n);
        }
        report.daily_chart = count_by_day(charted).into_iter().collect();
    }

    report.articles = extracted.articles;
    report
}
