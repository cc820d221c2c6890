use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

use crate::errors::{TourfeedError, TourfeedResult};

/// Meta keys tried in order for the publish timestamp
const PUBLISHED_KEYS: &[&str] = &[
    "article:published_time",
    "og:published_time",
    "og:updated_time",
    "article:modified_time",
];

const IMAGE_KEYS: &[&str] = &["og:image", "og:image:secure_url", "og:image:url"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub canonical_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub og_type: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OpenGraphExtractor;

impl OpenGraphExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, html: &str, page_url: &str) -> TourfeedResult<PageMetadata> {
        let base = Url::parse(page_url)
            .map_err(|e| TourfeedError::InvalidUrl(format!("{}: {}", page_url, e)))?;
        let tags = Self::meta_tags(html)?;

        if !tags.keys().any(|k| k.starts_with("og:")) {
            return Err(TourfeedError::Extraction("no OpenGraph tags".to_string()));
        }

        let title = tags
            .get("og:title")
            .map(|t| collapse_whitespace(t))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| TourfeedError::Extraction("missing og:title".to_string()))?;

        let description = tags
            .get("og:description")
            .map(|d| collapse_whitespace(d))
            .filter(|d| !d.is_empty());

        let image_url = IMAGE_KEYS
            .iter()
            .filter_map(|key| tags.get(*key))
            .find_map(|raw| resolve_http_url(&base, raw));

        let canonical_url = tags.get("og:url").and_then(|raw| resolve_http_url(&base, raw));

        let published_at = PUBLISHED_KEYS
            .iter()
            .filter_map(|key| tags.get(*key))
            .find_map(|raw| parse_timestamp(raw));

        Ok(PageMetadata {
            title,
            description,
            image_url,
            canonical_url,
            published_at,
            og_type: tags.get("og:type").cloned(),
        })
    }

    /// First non-empty `content` per lowercased `property`/`name` key
    fn meta_tags(html: &str) -> TourfeedResult<HashMap<String, String>> {
        let document = Html::parse_document(html);
        let selector = Selector::parse("meta[content]")
            .map_err(|e| TourfeedError::Extraction(e.to_string()))?;

        let mut tags = HashMap::new();
        for element in document.select(&selector) {
            let value = element.value();
            let Some(key) = value.attr("property").or_else(|| value.attr("name")) else {
                continue;
            };
            let content = value.attr("content").unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }
            tags.entry(key.trim().to_lowercase())
                .or_insert_with(|| content.to_string());
        }

        Ok(tags)
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn resolve_http_url(base: &Url, raw: &str) -> Option<String> {
    let url = base.join(raw.trim()).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.to_string()),
        _ => None,
    }
}

/// RFC 3339, offset without colon, or a bare date (midnight UTC)
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
    {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}
