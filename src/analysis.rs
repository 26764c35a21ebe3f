//! Keyword and publication-day aggregation over an article collection.
//!
//! Both tables are recomputed from scratch for every collection handed in;
//! nothing here keeps state between runs.

use crate::models::Article;
use chrono::NaiveDate;
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};

/// Number of keywords shown in the bar chart.
pub const TOP_N: usize = 10;

/// Keyword occurrence counts in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordFrequency {
    entries: Vec<(String, usize)>,
}

impl KeywordFrequency {
    #[cfg(test)]
    pub fn get(&self, keyword: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, count)| *count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// At most `n` entries, highest count first. Equal counts keep the order
    /// in which the keywords were first seen.
    pub fn top(&self, n: usize) -> Vec<(String, usize)> {
        self.entries
            .iter()
            .sorted_by(|a, b| b.1.cmp(&a.1))
            .take(n)
            .cloned()
            .collect()
    }
}

/// Count every keyword across the collection.
pub fn count_keywords(articles: &[Article]) -> KeywordFrequency {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<(String, usize)> = Vec::new();

    for keyword in articles.iter().flat_map(|a| a.keywords.iter()) {
        match positions.get(keyword.as_str()) {
            Some(&i) => entries[i].1 += 1,
            None => {
                positions.insert(keyword.as_str(), entries.len());
                entries.push((keyword.clone(), 1));
            }
        }
    }

    KeywordFrequency { entries }
}

/// Number of articles per publication day, ascending by date.
pub fn count_by_day(articles: &[Article]) -> BTreeMap<NaiveDate, usize> {
    let mut days = BTreeMap::new();
    for article in articles {
        *days.entry(article.published).or_insert(0) += 1;
    }
    days
}

/// Articles whose headline contains `term`, ignoring case.
pub fn filter_by_headline(articles: &[Article], term: &str) -> Vec<Article> {
    let needle = term.to_lowercase();
    articles
        .iter()
        .filter(|a| a.headline.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(headline: &str, date: &str, keywords: &[&str]) -> Article {
        Article {
            headline: headline.to_string(),
            published: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            summary: None,
            url: None,
        }
    }

    #[test]
    fn test_count_keywords_scenario() {
        let articles = vec![
            article("A", "2024-01-01", &["x", "y"]),
            article("B", "2024-01-01", &["x"]),
        ];
        let counts = count_keywords(&articles);
        assert_eq!(counts.get("x"), Some(2));
        assert_eq!(counts.get("y"), Some(1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_count_keywords_total_matches_lengths() {
        let articles = vec![
            article("A", "2024-01-01", &["x", "y", "x"]),
            article("B", "2024-01-02", &[]),
            article("C", "2024-01-03", &["z"]),
        ];
        let expected: usize = articles.iter().map(|a| a.keywords.len()).sum();
        assert_eq!(count_keywords(&articles).total(), expected);
        assert!(count_keywords(&[]).is_empty());
    }

    #[test]
    fn test_count_by_day_scenario() {
        let articles = vec![
            article("A", "2024-01-01", &[]),
            article("B", "2024-01-01", &[]),
            article("C", "2024-01-02", &[]),
        ];
        let days = count_by_day(&articles);
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(days.get(&d1), Some(&2));
        assert_eq!(days.get(&d2), Some(&1));
        assert_eq!(days.values().sum::<usize>(), articles.len());
    }

    #[test]
    fn test_count_by_day_is_ascending() {
        let articles = vec![
            article("late", "2024-03-09", &[]),
            article("early", "2024-03-01", &[]),
            article("mid", "2024-03-05", &[]),
        ];
        let days: Vec<NaiveDate> = count_by_day(&articles).into_keys().collect();
        let mut sorted = days.clone();
        sorted.sort();
        assert_eq!(days, sorted);
    }

    #[test]
    fn test_top_caps_sorts_and_keeps_first_seen_ties() {
        let keywords: Vec<String> = (0..15).map(|i| format!("k{i}")).collect();
        let refs: Vec<&str> = keywords.iter().map(String::as_str).collect();
        let mut articles = vec![article("all", "2024-01-01", &refs)];
        articles.push(article("again", "2024-01-01", &["k7", "k3"]));

        let top = count_keywords(&articles).top(TOP_N);
        assert_eq!(top.len(), TOP_N);
        assert_eq!(top[0], ("k3".to_string(), 2));
        assert_eq!(top[1], ("k7".to_string(), 2));
        assert_eq!(top[2], ("k0".to_string(), 1));
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_top_with_fewer_entries() {
        let articles = vec![article("A", "2024-01-01", &["x"])];
        assert_eq!(count_keywords(&articles).top(TOP_N).len(), 1);
    }

    #[test]
    fn test_filter_case_insensitive_and_idempotent() {
        let articles = vec![
            article("Apple Unveils Headset", "2024-01-01", &[]),
            article("APPLE earnings", "2024-01-02", &[]),
            article("Banana prices", "2024-01-02", &[]),
        ];
        let once = filter_by_headline(&articles, "apple");
        assert_eq!(once.len(), 2);
        let twice = filter_by_headline(&once, "apple");
        assert_eq!(once, twice);
        assert!(filter_by_headline(&articles, "cherry").is_empty());
    }
}
