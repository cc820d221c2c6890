use serde::Deserialize;

use super::Category;

/// A page to curate, optionally pinned to a category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Source {
    pub url: String,
    #[serde(default)]
    pub category: Option<Category>,
}

impl Source {
    pub fn new(url: impl Into<String>, category: Option<Category>) -> Self {
        Self {
            url: url.into(),
            category,
        }
    }
}
