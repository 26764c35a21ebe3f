//! HTTP dashboard.
//!
//! A single form page: pick the endpoint, a section, an optional date range
//! and an optional headline filter, then press "Fetch Articles". Every press
//! is a plain `GET /?...` that runs the whole pipeline again; the server keeps
//! nothing between requests besides the shared client and settings.
//!
//! # Routes
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /` | Dashboard page (idle without `section`, results with it) |
//! | `GET /api/report` | Same query, report as JSON |
//! | `GET /health` | Liveness check |

use crate::api::NytClient;
use crate::config::Settings;
use crate::models::{
    Banner, BannerLevel, DashboardState, FetchRequest, Report, SearchSection, TopStoriesSection,
};
use crate::outputs::html;
use crate::pipeline;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
};
use chrono::{Duration, Local, NaiveDate};
use serde::Deserialize;
use serde_json::{Value, json};
use std::error::Error;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

/// Days before today used as the default start date.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Shared, read-only server state.
#[derive(Debug)]
pub struct AppState {
    pub client: NytClient,
    pub settings: Settings,
}

/// Raw form values. Everything is optional so a half-filled form still
/// renders with a useful message instead of a 400.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    /// `search` (default) or `top-stories`.
    pub mode: Option<String>,
    pub section: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub keyword: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(value: &Option<String>, default: NaiveDate, name: &str) -> Result<NaiveDate, String> {
    match present(value) {
        None => Ok(default),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| format!("Invalid {name} date '{raw}'; expected YYYY-MM-DD.")),
    }
}

impl DashboardQuery {
    /// The fetch button was pressed (a section was submitted).
    pub fn is_fetch(&self) -> bool {
        present(&self.section).is_some()
    }

    pub fn is_top_stories(&self) -> bool {
        present(&self.mode) == Some("top-stories")
    }

    pub fn start_or_default(&self, today: NaiveDate) -> Result<NaiveDate, String> {
        parse_date(&self.start, today - Duration::days(DEFAULT_LOOKBACK_DAYS), "start")
    }

    pub fn end_or_default(&self, today: NaiveDate) -> Result<NaiveDate, String> {
        parse_date(&self.end, today, "end")
    }

    /// Turn the form into a [`FetchRequest`], or a message for the user.
    pub fn to_request(&self, today: NaiveDate) -> Result<FetchRequest, String> {
        let section = present(&self.section).ok_or("Choose a section.")?;
        let keyword = present(&self.keyword).map(str::to_string);

        if self.is_top_stories() {
            let section = TopStoriesSection::from_slug(section)
                .ok_or_else(|| format!("Unknown top stories section '{section}'."))?;
            return Ok(FetchRequest::TopStories { section, keyword });
        }

        match present(&self.mode) {
            None | Some("search") => {}
            Some(other) => return Err(format!("Unknown mode '{other}'.")),
        }
        let section = SearchSection::from_slug(section)
            .ok_or_else(|| format!("Unknown search section '{section}'."))?;
        Ok(FetchRequest::Search {
            section,
            start: self.start_or_default(today)?,
            end: self.end_or_default(today)?,
            keyword,
        })
    }
}

fn rejected(message: String) -> Report {
    Report {
        title: "Invalid request".to_string(),
        banners: vec![Banner::new(BannerLevel::Error, message)],
        ..Report::default()
    }
}

async fn state_for(state: &AppState, query: &DashboardQuery, today: NaiveDate) -> DashboardState {
    if !query.is_fetch() {
        return DashboardState::Idle;
    }
    let report = match query.to_request(today) {
        Ok(request) => pipeline::run(&state.client, &request, &state.settings).await,
        Err(message) => rejected(message),
    };
    DashboardState::Displaying(report)
}

#[instrument(level = "info", skip_all)]
async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let today = Local::now().date_naive();
    let view = state_for(&state, &query, today).await;
    Html(html::render_page(&view, &query, today))
}

#[instrument(level = "info", skip_all)]
async fn api_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> (StatusCode, Json<Report>) {
    let today = Local::now().date_naive();
    match query.to_request(today) {
        Ok(request) => (
            StatusCode::OK,
            Json(pipeline::run(&state.client, &request, &state.settings).await),
        ),
        Err(message) => (StatusCode::BAD_REQUEST, Json(rejected(message))),
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/report", get(api_report))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve the dashboard until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Dashboard listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKey;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn query(pairs: &[(&str, &str)]) -> DashboardQuery {
        let mut q = DashboardQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "mode" => q.mode = v,
                "section" => q.section = v,
                "start" => q.start = v,
                "end" => q.end = v,
                "keyword" => q.keyword = v,
                _ => unreachable!(),
            }
        }
        q
    }

    async fn app(server: &MockServer) -> Router {
        let settings = Settings {
            base_url: server.uri(),
            ..Settings::default()
        };
        let client = NytClient::new(&settings, ApiKey::new("k").unwrap()).unwrap();
        router(AppState { client, settings })
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_search_request_defaults_dates() {
        let request = query(&[("section", "politics")]).to_request(today()).unwrap();
        assert_eq!(
            request,
            FetchRequest::Search {
                section: SearchSection::Politics,
                start: NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
                end: today(),
                keyword: None,
            }
        );
    }

    #[test]
    fn test_top_stories_request() {
        let request = query(&[("mode", "top-stories"), ("section", "sports"), ("keyword", " cup ")])
            .to_request(today())
            .unwrap();
        assert_eq!(
            request,
            FetchRequest::TopStories {
                section: TopStoriesSection::Sports,
                keyword: Some("cup".into()),
            }
        );
    }

    #[test]
    fn test_bad_form_values() {
        assert!(query(&[("section", "sports")]).to_request(today()).is_err());
        assert!(query(&[("section", "health"), ("start", "03/01/2024")]).to_request(today()).is_err());
        assert!(query(&[("mode", "archive"), ("section", "health")]).to_request(today()).is_err());
        assert!(!query(&[("keyword", "x")]).is_fetch());
    }

    #[tokio::test]
    async fn test_idle_dashboard() {
        let server = MockServer::start().await;
        let (status, body) = get_body(app(&server).await, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Fetch Articles"));
        assert!(!body.contains("<svg"));
    }

    #[tokio::test]
    async fn test_dashboard_with_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/svc/topstories/v2/science.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"title": "Comet <Returns>", "published_date": "2024-03-09T08:00:00-05:00", "des_facet": ["Space"]},
                    {"title": "Moon Dust", "published_date": "2024-03-10T08:00:00-05:00", "des_facet": ["Space", "Moon"]}
                ]
            })))
            .mount(&server)
            .await;

        let (status, body) = get_body(
            app(&server).await,
            "/?mode=top-stories&section=science&keyword=",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Comet &lt;Returns&gt;"));
        assert!(body.contains("Retrieved 2 articles"));
        assert_eq!(body.matches("<svg").count(), 2);
    }

    #[tokio::test]
    async fn test_api_report_rejects_bad_section() {
        let server = MockServer::start().await;
        let (status, body) = get_body(
            app(&server).await,
            "/api/report?mode=top-stories&section=nope",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let report: Report = serde_json::from_str(&body).unwrap();
        assert_eq!(report.banners[0].level, BannerLevel::Error);
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        let (status, body) = get_body(app(&server).await, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"ok\""));
    }
}
