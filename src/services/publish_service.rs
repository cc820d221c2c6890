use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::Feed;
use crate::errors::TourfeedResult;
use crate::render::FeedRenderer;

pub struct PublishService {
    renderer: FeedRenderer,
}

impl PublishService {
    pub fn new(renderer: FeedRenderer) -> Self {
        Self { renderer }
    }

    /// Render the feed and check that it parses back with every item
    pub fn render_checked(&self, feed: &Feed) -> TourfeedResult<String> {
        let xml = self.renderer.render(feed)?;
        self.renderer.verify(&xml, feed.items.len())?;
        Ok(xml)
    }

    /// Render, verify and atomically replace the file at `path`.
    /// On any error the previous file is left in place.
    pub fn publish(&self, feed: &Feed, path: &Path) -> TourfeedResult<()> {
        let xml = self.render_checked(feed)?;
        write_atomic(path, &xml)?;

        info!(path = %path.display(), items = feed.items.len(), "feed written");
        Ok(())
    }
}

impl Default for PublishService {
    fn default() -> Self {
        Self::new(FeedRenderer::new())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "feed.xml".into());
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_atomic(path: &Path, contents: &str) -> TourfeedResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, contents)?;

    if let Err(e) = fs::rename(&tmp, path) {
        fs::remove_file(&tmp).ok();
        return Err(e.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;
    use crate::domain::{Article, Category, FeedInfo, Source};
    use crate::errors::TourfeedError;
    use crate::filter::TopicFilter;
    use crate::services::CurationService;
    use crate::sources::{MockPageFetcher, SourceList};
    use chrono::{DateTime, Utc};
    use tempfile::TempDir;

    fn info() -> FeedInfo {
        FeedInfo {
            title: "Guide".to_string(),
            link: "https://example.com/".to_string(),
            description: "Curated".to_string(),
            language: None,
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-07-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn feed() -> Feed {
        let article = Article::new(
            "https://example.com/beach".to_string(),
            "Beach day".to_string(),
            Category::Beaches,
            now(),
        );
        Feed::new(info(), vec![article], now(), None)
    }

    #[test]
    fn test_publish_creates_parent_dirs_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("public").join("feed.xml");

        PublishService::default().publish(&feed(), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("Beach day"));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_publish_overwrites_previous_feed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feed.xml");
        fs::write(&path, "old").unwrap();

        PublishService::default().publish(&feed(), &path).unwrap();

        assert_ne!(fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn test_failed_run_keeps_existing_feed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feed.xml");
        fs::write(&path, "previous feed").unwrap();

        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().returning(|url| {
            Err(TourfeedError::HttpStatus {
                url: url.to_string(),
                status: 502,
            })
        });
        let curation =
            CurationService::new(fetcher, Classifier::new().unwrap(), TopicFilter::default(), 2);

        let mut sources = SourceList::new();
        sources.push(Source::new("https://example.com/a", Some(Category::Tourism)));

        let publisher = PublishService::default();
        let result = curation
            .build_feed(info(), &sources, now(), None)
            .and_then(|(feed, _)| publisher.publish(&feed, &path));

        assert!(matches!(result, Err(TourfeedError::NoSourcesSucceeded(1))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous feed");
    }

    #[test]
    fn test_temp_path_sits_next_to_target() {
        assert_eq!(
            temp_path(Path::new("/srv/www/feed.xml")),
            PathBuf::from("/srv/www/feed.xml.tmp")
        );
    }
}
