use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::Article;

/// Channel-level metadata for the generated feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedInfo {
    pub title: String,
    pub link: String,
    pub description: String,
    pub language: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Feed {
    pub info: FeedInfo,
    pub items: Vec<Article>,
    pub generated_at: DateTime<Utc>,
}

impl Feed {
    /// Builds a feed with items ordered by `published_at` descending, ties
    /// broken by `source_url`. Later duplicates of a source URL or canonical
    /// link are dropped.
    pub fn new(
        info: FeedInfo,
        mut items: Vec<Article>,
        generated_at: DateTime<Utc>,
        max_items: Option<usize>,
    ) -> Self {
        items.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| a.source_url.cmp(&b.source_url))
        });

        let mut seen_sources = HashSet::new();
        let mut seen_links = HashSet::new();
        items.retain(|article| {
            let fresh_source = seen_sources.insert(article.source_url.clone());
            let fresh_link = seen_links.insert(article.link.clone());
            fresh_source && fresh_link
        });

        if let Some(max) = max_items {
            items.truncate(max);
        }

        Self {
            info,
            items,
            generated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    fn info() -> FeedInfo {
        FeedInfo {
            title: "Things To Do".to_string(),
            link: "https://example.com/".to_string(),
            description: "Curated".to_string(),
            language: None,
        }
    }

    fn at(ts: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc)
    }

    fn article(url: &str, ts: &str) -> Article {
        Article::new(url.to_string(), url.to_string(), Category::Tourism, at(ts))
    }

    #[test]
    fn test_items_sorted_newest_first() {
        let feed = Feed::new(
            info(),
            vec![
                article("https://example.com/old", "2024-01-01T00:00:00Z"),
                article("https://example.com/new", "2024-03-01T00:00:00Z"),
                article("https://example.com/mid", "2024-02-01T00:00:00Z"),
            ],
            at("2024-04-01T00:00:00Z"),
            None,
        );

        let urls: Vec<&str> = feed.items.iter().map(|a| a.source_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/new",
                "https://example.com/mid",
                "https://example.com/old"
            ]
        );
    }

    #[test]
    fn test_ties_broken_by_source_url() {
        let ts = "2024-01-01T00:00:00Z";
        let forward = Feed::new(
            info(),
            vec![
                article("https://example.com/c", ts),
                article("https://example.com/a", ts),
                article("https://example.com/b", ts),
            ],
            at(ts),
            None,
        );
        let reversed = Feed::new(
            info(),
            vec![
                article("https://example.com/b", ts),
                article("https://example.com/a", ts),
                article("https://example.com/c", ts),
            ],
            at(ts),
            None,
        );

        let order = |feed: &Feed| -> Vec<String> {
            feed.items.iter().map(|a| a.source_url.clone()).collect()
        };
        assert_eq!(
            order(&forward),
            vec![
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/c"
            ]
        );
        assert_eq!(order(&forward), order(&reversed));
    }

    #[test]
    fn test_duplicate_canonical_links_collapse() {
        let ts = "2024-01-01T00:00:00Z";
        let first = article("https://example.com/a?ref=1", ts)
            .with_link(Some("https://example.com/a".to_string()));
        let second = article("https://example.com/a?ref=2", ts)
            .with_link(Some("https://example.com/a".to_string()));

        let feed = Feed::new(info(), vec![second, first], at(ts), None);

        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].source_url, "https://example.com/a?ref=1");
    }

    #[test]
    fn test_max_items_truncates_after_sorting() {
        let feed = Feed::new(
            info(),
            vec![
                article("https://example.com/old", "2024-01-01T00:00:00Z"),
                article("https://example.com/new", "2024-03-01T00:00:00Z"),
            ],
            at("2024-04-01T00:00:00Z"),
            Some(1),
        );

        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].source_url, "https://example.com/new");
    }
}
