//! New York Times API client.
//!
//! This module issues the HTTP requests behind both pipeline variants:
//! - **Article search**: one GET per calendar day, filtered to a section.
//!   A day that fails (bad status, transport error, unreadable body) is
//!   logged and skipped; the other days still count.
//! - **Top stories**: one GET for a whole section. Failure is returned to
//!   the caller, which shows it to the user.
//!
//! There is no retry or backoff. Every request carries the configured timeout.
//!
//! # Architecture
//!
//! - [`ArticleSource`]: the seam the pipeline fetches through
//! - [`NytClient`]: the real implementation over `reqwest`

use crate::config::{ApiKey, Settings};
use crate::extract::{self, Extracted, SearchEnvelope, TopStoriesEnvelope};
use crate::models::{SearchSection, TopStoriesSection};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: StatusCode },

    #[error("unexpected response body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the request URL, which includes the api-key.
        FetchError::Http(e.without_url())
    }
}

/// Where the pipeline gets its articles from.
pub trait ArticleSource {
    /// Search `section` once per day in `days`, concatenating results in day
    /// order. Days that fail contribute nothing.
    fn search(
        &self,
        section: SearchSection,
        days: Vec<NaiveDate>,
    ) -> impl Future<Output = Extracted> + Send;

    /// Fetch the current top stories for `section`.
    fn top_stories(
        &self,
        section: TopStoriesSection,
    ) -> impl Future<Output = Result<Extracted, FetchError>> + Send;
}

/// HTTP client for the NYT developer API.
///
/// Holds the credential for its whole lifetime; build one at startup and
/// share it.
#[derive(Debug, Clone)]
pub struct NytClient {
    client: Client,
    base_url: String,
    api_key: ApiKey,
    concurrency: usize,
}

impl NytClient {
    pub fn new(settings: &Settings, api_key: ApiKey) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(concat!("news_analyzer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Url::parse(&settings.base_url)?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            concurrency: settings.concurrency.max(1),
        })
    }

    fn search_url(&self) -> Result<Url, FetchError> {
        Ok(Url::parse(&format!(
            "{}/svc/search/v2/articlesearch.json",
            self.base_url
        ))?)
    }

    fn top_stories_url(&self, section: TopStoriesSection) -> Result<Url, FetchError> {
        Ok(Url::parse(&format!(
            "{}/svc/topstories/v2/{}.json",
            self.base_url,
            urlencoding::encode(section.slug())
        ))?)
    }

    /// GET `url` with `params` and the api-key; return the body of a 200 response.
    async fn get(&self, url: Url, params: &[(&str, String)]) -> Result<Vec<u8>, FetchError> {
        let endpoint = url.path().to_string();
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("api-key", self.api_key.expose())])
            .send()
            .await?;

        let status = response.status();
        debug!(%endpoint, %status, elapsed_ms = t0.elapsed().as_millis() as u64, "API response");
        if status != StatusCode::OK {
            return Err(FetchError::Status { endpoint, status });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Fetch and extract one day of search results.
    #[instrument(level = "info", skip_all, fields(%section, %day))]
    pub async fn search_day(
        &self,
        section: SearchSection,
        day: NaiveDate,
    ) -> Result<Extracted, FetchError> {
        let stamp = day.format("%Y%m%d").to_string();
        let params = [
            ("fq", format!("section_name:(\"{}\")", section.display_name())),
            ("begin_date", stamp.clone()),
            ("end_date", stamp),
        ];
        let body = self.get(self.search_url()?, &params).await?;
        let envelope: SearchEnvelope = serde_json::from_slice(&body)?;
        let extracted = extract::extract_all(&envelope.response.docs, extract::search_doc);
        info!(
            docs = envelope.response.docs.len(),
            articles = extracted.articles.len(),
            "Fetched search day"
        );
        Ok(extracted)
    }
}

impl ArticleSource for NytClient {
    #[instrument(level = "info", skip_all, fields(%section, days = days.len()))]
    async fn search(&self, section: SearchSection, days: Vec<NaiveDate>) -> Extracted {
        let results: Vec<(NaiveDate, Result<Extracted, FetchError>)> = stream::iter(days)
            .map(|day| async move { (day, self.search_day(section, day).await) })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut merged = Extracted::default();
        let mut failed_days = 0usize;
        for (day, result) in results {
            match result {
                Ok(extracted) => merged.append(extracted),
                Err(e) => {
                    failed_days += 1;
                    warn!(%day, error = %e, "Search day failed; skipping its results");
                }
            }
        }
        info!(
            articles = merged.articles.len(),
            skipped_records = merged.skipped,
            failed_days,
            "Search complete"
        );
        merged
    }

    #[instrument(level = "info", skip_all, fields(%section))]
    async fn top_stories(&self, section: TopStoriesSection) -> Result<Extracted, FetchError> {
        let body = self.get(self.top_stories_url(section)?, &[]).await?;
        let envelope: TopStoriesEnvelope = serde_json::from_slice(&body)?;
        let extracted = extract::extract_all(&envelope.results, extract::top_story);
        info!(
            results = envelope.results.len(),
            articles = extracted.articles.len(),
            "Fetched top stories"
        );
        Ok(extracted)
    }
}
