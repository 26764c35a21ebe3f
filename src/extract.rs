//! Typed extraction of API records into [`Article`] rows.
//!
//! Every record goes through an explicit serde parse. A record that lacks a
//! required field, or whose date cannot be read, fails with an
//! [`ExtractError`]; [`extract_all`] logs it, counts it and moves on.

use crate::models::Article;
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid publication date {0:?}")]
    InvalidDate(String),
}

/// Body of `/svc/search/v2/articlesearch.json`.
#[derive(Debug, Deserialize)]
pub struct SearchEnvelope {
    pub response: SearchBody,
}

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub docs: Vec<Value>,
}

/// Body of `/svc/topstories/v2/{section}.json`.
#[derive(Debug, Deserialize)]
pub struct TopStoriesEnvelope {
    pub results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Headline {
    main: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Facet {
    Tagged { value: String },
    Plain(String),
}

impl Facet {
    fn into_value(self) -> String {
        match self {
            Facet::Tagged { value } => value,
            Facet::Plain(value) => value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    headline: Headline,
    pub_date: String,
    keywords: Vec<Facet>,
    #[serde(rename = "abstract")]
    summary: Option<String>,
    web_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TopStory {
    title: String,
    published_date: String,
    #[serde(default)]
    des_facet: Vec<Facet>,
    #[serde(rename = "abstract")]
    summary: Option<String>,
    url: Option<String>,
}

/// Articles that parsed, plus how many records did not.
#[derive(Debug, Default)]
pub struct Extracted {
    pub articles: Vec<Article>,
    pub skipped: usize,
}

impl Extracted {
    pub fn append(&mut self, other: Extracted) {
        self.articles.extend(other.articles);
        self.skipped += other.skipped;
    }
}

/// Parse the day out of an ISO 8601 timestamp such as `2024-01-05T09:30:00+0000`.
pub fn parse_day(raw: &str) -> Result<NaiveDate, ExtractError> {
    let day = raw
        .get(..10)
        .ok_or_else(|| ExtractError::InvalidDate(raw.to_string()))?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| ExtractError::InvalidDate(raw.to_string()))
}

fn keywords(facets: Vec<Facet>) -> Vec<String> {
    facets
        .into_iter()
        .map(Facet::into_value)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

/// Map one article search doc to an [`Article`].
pub fn search_doc(raw: &Value) -> Result<Article, ExtractError> {
    let doc = SearchDoc::deserialize(raw)?;
    Ok(Article {
        published: parse_day(&doc.pub_date)?,
        headline: doc.headline.main,
        keywords: keywords(doc.keywords),
        summary: non_empty(doc.summary),
        url: non_empty(doc.web_url),
    })
}

/// Map one top stories result to an [`Article`].
pub fn top_story(raw: &Value) -> Result<Article, ExtractError> {
    let story = TopStory::deserialize(raw)?;
    Ok(Article {
        published: parse_day(&story.published_date)?,
        headline: story.title,
        keywords: keywords(story.des_facet),
        summary: non_empty(story.summary),
        url: non_empty(story.url),
    })
}

/// Run `parse` over every record, skipping the ones that fail.
pub fn extract_all<F>(records: &[Value], parse: F) -> Extracted
where
    F: Fn(&Value) -> Result<Article, ExtractError>,
{
    let mut out = Extracted::default();
    for (index, record) in records.iter().enumerate() {
        match parse(record) {
            Ok(article) => out.articles.push(article),
            Err(e) => {
                warn!(
                    index,
                    error = %e,
                    record = %truncate_for_log(&record.to_string(), 200),
                    "Skipping malformed record"
                );
                out.skipped += 1;
            }
        }
    }
    debug!(
        parsed = out.articles.len(),
        skipped = out.skipped,
        "Extracted records"
    );
    out
}
