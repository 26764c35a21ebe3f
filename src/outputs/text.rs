//! Terminal rendering of a [`Report`].
//!
//! Layout, top to bottom: banners, the numbered article list, the filter
//! summary, a horizontal bar chart of the top keywords and a per-day series.

use crate::models::{BannerLevel, Report};
use crate::utils::scaled;
use std::fmt;

const BAR_WIDTH: usize = 40;
const LABEL_WIDTH: usize = 28;

/// `Display` adapter; `TextReport(&report).to_string()` gives the full output.
pub struct TextReport<'a>(pub &'a Report);

fn tag(level: BannerLevel) -> &'static str {
    match level {
        BannerLevel::Success => "[ok]",
        BannerLevel::Info => "[info]",
        BannerLevel::Warning => "[warn]",
        BannerLevel::Error => "[error]",
    }
}

fn fit_label(label: &str) -> String {
    if label.chars().count() <= LABEL_WIDTH {
        return label.to_string();
    }
    let mut cut: String = label.chars().take(LABEL_WIDTH - 1).collect();
    cut.push('…');
    cut
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(f, "== {} ==", report.title)?;
        writeln!(f)?;

        for banner in &report.banners {
            writeln!(f, "{} {}", tag(banner.level), banner.message)?;
        }

        if !report.articles.is_empty() {
            writeln!(f)?;
            writeln!(f, "Articles ({})", report.articles.len())?;
            for (i, article) in report.articles.iter().enumerate() {
                writeln!(f, "{:>4}. {} ({})", i + 1, article.headline, article.published)?;
                if let Some(url) = &article.url {
                    writeln!(f, "      {url}")?;
                }
                if let Some(summary) = &article.summary {
                    writeln!(f, "      {summary}")?;
                }
                if !article.keywords.is_empty() {
                    writeln!(f, "      keywords: {}", article.keywords_display())?;
                }
            }
        }

        if let Some(filter) = &report.filter {
            writeln!(f)?;
            writeln!(
                f,
                "Filter '{}': {} matching articles",
                filter.term, filter.matched
            )?;
        }

        if !report.keyword_chart.is_empty() {
            writeln!(f)?;
            writeln!(f, "Top {} Most Frequent Keywords", report.keyword_chart.len())?;
            let max = report.keyword_chart.iter().map(|(_, c)| *c).max().unwrap_or(0);
            for (keyword, count) in &report.keyword_chart {
                writeln!(
                    f,
                    "  {:<width$} {} {}",
                    fit_label(keyword),
                    "█".repeat(scaled(*count, max, BAR_WIDTH)),
                    count,
                    width = LABEL_WIDTH
                )?;
            }
        }

        if !report.daily_chart.is_empty() {
            writeln!(f)?;
            writeln!(f, "Articles Published Over Time")?;
            let max = report.daily_chart.iter().map(|(_, c)| *c).max().unwrap_or(0);
            for (day, count) in &report.daily_chart {
                writeln!(
                    f,
                    "  {day}  {} {}",
                    "█".repeat(scaled(*count, max, BAR_WIDTH)),
                    count
                )?;
            }
        }

        Ok(())
    }
}

pub fn render(report: &Report) -> String {
    TextReport(report).to_string()
}
