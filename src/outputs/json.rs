//! JSON output of a [`Report`].
//!
//! Used by `--json` on the one-shot subcommands. The dashboard's
//! `/api/report` route serializes the same structure through axum.

use crate::models::Report;

/// Serialize `report` as pretty-printed JSON.
pub fn to_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Banner, BannerLevel};
    use chrono::NaiveDate;

    #[test]
    fn test_report_json_shape() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let report = Report {
            title: "Technology, 2024-01-01 to 2024-01-02".to_string(),
            keyword_chart: vec![("AI".to_string(), 3)],
            daily_chart: vec![(day, 3)],
            banners: vec![Banner::new(BannerLevel::Success, "Retrieved 3 articles from Technology.")],
            ..Report::default()
        };

        let json = to_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["keyword_chart"][0][0], "AI");
        assert_eq!(value["daily_chart"][0][0], "2024-01-02");
        assert_eq!(value["banners"][0]["level"], "success");
        assert_eq!(value["skipped_records"], 0);
    }
}
