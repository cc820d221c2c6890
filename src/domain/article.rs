use chrono::{DateTime, Utc};

use super::Category;

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    /// Configured page URL; unique within one run.
    pub source_url: String,
    /// Canonical URL from `og:url`, or the source URL when absent.
    pub link: String,
    pub title: String,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub category: Category,
    pub published_at: DateTime<Utc>,
}

impl Article {
    pub fn new(
        source_url: String,
        title: String,
        category: Category,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            link: source_url.clone(),
            source_url,
            title,
            image_url: None,
            description: None,
            category,
            published_at,
        }
    }

    pub fn with_link(mut self, link: Option<String>) -> Self {
        if let Some(link) = link {
            self.link = link;
        }
        self
    }

    pub fn with_image(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Lowercased "{title} {description}" used for keyword matching.
    pub fn text_blob(&self) -> String {
        format!(
            "{} {}",
            self.title,
            self.description.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }
}
