use crate::config::FilterConfig;
use crate::domain::{Article, Category};

/// Why an article was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    CategoryNotAllowed(Category),
    BlockedKeyword(String),
    NoKeywordMatch,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::CategoryNotAllowed(c) => write!(f, "category {} not allowed", c),
            Rejection::BlockedKeyword(k) => write!(f, "blocked keyword {:?}", k),
            Rejection::NoKeywordMatch => write!(f, "no required keyword matched"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TopicFilter {
    allowed: Vec<Category>,
    blocked_keywords: Vec<String>,
    keywords: Vec<String>,
}

impl TopicFilter {
    pub fn new(allowed: Vec<Category>, blocked_keywords: Vec<String>, keywords: Vec<String>) -> Self {
        let normalize = |words: Vec<String>| -> Vec<String> {
            words
                .into_iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        };

        Self {
            allowed,
            blocked_keywords: normalize(blocked_keywords),
            keywords: normalize(keywords),
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(
            config.categories.clone(),
            config.blocked_keywords.clone(),
            config.keywords.clone(),
        )
    }

    pub fn matches(&self, article: &Article) -> bool {
        self.check(article).is_ok()
    }

    /// Substring match against "{title} {description}", case-insensitive
    pub fn check(&self, article: &Article) -> Result<(), Rejection> {
        if !self.allowed.contains(&article.category) {
            return Err(Rejection::CategoryNotAllowed(article.category));
        }

        let blob = article.text_blob();

        if let Some(bad) = self.blocked_keywords.iter().find(|bad| blob.contains(bad.as_str())) {
            return Err(Rejection::BlockedKeyword(bad.clone()));
        }

        if self.keywords.is_empty() || self.keywords.iter().any(|k| blob.contains(k.as_str())) {
            Ok(())
        } else {
            Err(Rejection::NoKeywordMatch)
        }
    }
}

impl Default for TopicFilter {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}
