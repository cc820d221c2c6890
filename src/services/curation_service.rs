use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classify::Classifier;
use crate::domain::{Article, Category, Feed, FeedInfo, Source};
use crate::errors::{TourfeedError, TourfeedResult};
use crate::extract::{OpenGraphExtractor, PageMetadata};
use crate::filter::TopicFilter;
use crate::sources::{PageFetcher, SourceList};

pub struct CurationReport {
    pub articles: Vec<Article>,
    /// Sources fetched and extracted successfully
    pub succeeded: usize,
    pub failures: Vec<(String, String)>, // (url, error_message)
    pub rejected: Vec<(String, String)>, // (url, reason)
}

/// Result of running a single page through the pipeline without publishing
#[derive(Debug, Serialize)]
pub struct Inspection {
    pub url: String,
    pub metadata: PageMetadata,
    pub category: Option<Category>,
    pub rejected: Option<String>,
}

pub struct CurationService<F: PageFetcher> {
    fetcher: F,
    extractor: OpenGraphExtractor,
    classifier: Classifier,
    filter: TopicFilter,
    concurrency: usize,
}

impl<F: PageFetcher> CurationService<F> {
    pub fn new(
        fetcher: F,
        classifier: Classifier,
        filter: TopicFilter,
        concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor: OpenGraphExtractor::new(),
            classifier,
            filter,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch, extract, classify and filter every source. Per-source failures
    /// are logged and collected; only a run where nothing succeeded is an error.
    pub fn curate(
        &self,
        sources: &SourceList,
        started_at: DateTime<Utc>,
    ) -> TourfeedResult<CurationReport> {
        let mut report = CurationReport {
            articles: Vec::new(),
            succeeded: 0,
            failures: Vec::new(),
            rejected: Vec::new(),
        };

        let pages = self.fetch_all(sources.as_slice());

        for (source, page) in sources.iter().zip(pages) {
            let metadata = match page.and_then(|html| self.extractor.extract(&html, &source.url)) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(url = %source.url, error = %e, "skipping source");
                    report.failures.push((source.url.clone(), e.to_string()));
                    continue;
                }
            };
            report.succeeded += 1;

            match self.to_article(source, metadata, started_at) {
                Some(article) => match self.filter.check(&article) {
                    Ok(()) => {
                        debug!(url = %source.url, category = %article.category, "accepted");
                        report.articles.push(article);
                    }
                    Err(reason) => {
                        info!(url = %source.url, %reason, "filtered out");
                        report.rejected.push((source.url.clone(), reason.to_string()));
                    }
                },
                None => {
                    info!(url = %source.url, "no category matched, dropping");
                    report
                        .rejected
                        .push((source.url.clone(), "unclassified".to_string()));
                }
            }
        }

        if report.succeeded == 0 {
            return Err(TourfeedError::NoSourcesSucceeded(sources.len()));
        }

        info!(
            sources = sources.len(),
            succeeded = report.succeeded,
            failed = report.failures.len(),
            rejected = report.rejected.len(),
            accepted = report.articles.len(),
            "curation finished"
        );

        Ok(report)
    }

    /// Curate and assemble the ordered feed
    pub fn build_feed(
        &self,
        info: FeedInfo,
        sources: &SourceList,
        started_at: DateTime<Utc>,
        max_items: Option<usize>,
    ) -> TourfeedResult<(Feed, CurationReport)> {
        let mut report = self.curate(sources, started_at)?;
        let articles = std::mem::take(&mut report.articles);
        let feed = Feed::new(info, articles, started_at, max_items);
        Ok((feed, report))
    }

    /// Run one URL through fetch, extraction, classification and the filter
    pub fn inspect(&self, url: &str) -> TourfeedResult<Inspection> {
        let html = self.fetcher.fetch(url)?;
        let metadata = self.extractor.extract(&html, url)?;
        let source = Source::new(url, None);

        let article = self.to_article(&source, metadata.clone(), Utc::now());
        let category = article.as_ref().map(|a| a.category);
        let rejected = match &article {
            Some(article) => self.filter.check(article).err().map(|r| r.to_string()),
            None => Some("unclassified".to_string()),
        };

        Ok(Inspection {
            url: url.to_string(),
            metadata,
            category,
            rejected,
        })
    }

    fn to_article(
        &self,
        source: &Source,
        metadata: PageMetadata,
        fallback_time: DateTime<Utc>,
    ) -> Option<Article> {
        let category = self.classifier.classify(
            source.category,
            &source.url,
            &metadata.title,
            metadata.description.as_deref(),
        )?;

        Some(
            Article::new(
                source.url.clone(),
                metadata.title,
                category,
                metadata.published_at.unwrap_or(fallback_time),
            )
            .with_link(metadata.canonical_url)
            .with_image(metadata.image_url)
            .with_description(metadata.description),
        )
    }

    /// Fetch pages on up to `concurrency` scoped threads; results come back
    /// in source order.
    fn fetch_all(&self, sources: &[Source]) -> Vec<TourfeedResult<String>> {
        if sources.is_empty() {
            return Vec::new();
        }

        let workers = self.concurrency.min(sources.len());
        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel();

        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let next = &next;
                scope.spawn(move || loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(source) = sources.get(index) else {
                        break;
                    };
                    let result = self.fetcher.fetch(&source.url);
                    if tx.send((index, result)).is_err() {
                        break;
                    }
                });
            }
        });
        drop(tx);

        let mut results: Vec<(usize, TourfeedResult<String>)> = rx.into_iter().collect();
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MockPageFetcher;

    fn og_page(title: &str, description: &str, image: Option<&str>, published: Option<&str>) -> String {
        let mut head = format!(
            r#"<meta property="og:title" content="{}"><meta property="og:description" content="{}">"#,
            title, description
        );
        if let Some(image) = image {
            head.push_str(&format!(r#"<meta property="og:image" content="{}">"#, image));
        }
        if let Some(published) = published {
            head.push_str(&format!(
                r#"<meta property="article:published_time" content="{}">"#,
                published
            ));
        }
        format!("<html><head>{}</head><body></body></html>", head)
    }

    fn started_at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-07-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn service(fetcher: MockPageFetcher, concurrency: usize) -> CurationService<MockPageFetcher> {
        CurationService::new(
            fetcher,
            Classifier::new().unwrap(),
            TopicFilter::default(),
            concurrency,
        )
    }

    fn source_list(sources: &[(&str, Option<Category>)]) -> SourceList {
        let mut list = SourceList::new();
        for (url, category) in sources {
            list.push(Source::new(*url, *category));
        }
        list
    }

    fn unreachable(url: &str) -> TourfeedError {
        TourfeedError::HttpStatus {
            url: url.to_string(),
            status: 503,
        }
    }

    #[test]
    fn test_failed_and_tagless_sources_are_skipped() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().times(3).returning(|url| match url {
            "https://example.com/beaches/north" => Ok(og_page(
                "North Shore",
                "Sand and surf",
                Some("https://cdn.example.com/n.jpg"),
                None,
            )),
            "https://example.com/plain" => {
                Ok("<html><head><title>No tags</title></head></html>".to_string())
            }
            other => Err(unreachable(other)),
        });

        let sources = source_list(&[
            ("https://example.com/beaches/north", None),
            ("https://example.com/plain", Some(Category::Tourism)),
            ("https://example.com/down", Some(Category::Tourism)),
        ]);

        let report = service(fetcher, 2).curate(&sources, started_at()).unwrap();

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.articles.len(), 1);

        let article = &report.articles[0];
        assert_eq!(article.category, Category::Beaches);
        assert_eq!(article.image_url.as_deref(), Some("https://cdn.example.com/n.jpg"));
        // No publish meta: falls back to the run start
        assert_eq!(article.published_at, started_at());
    }

    #[test]
    fn test_zero_successful_sources_is_error() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .times(2)
            .returning(|url| Err(unreachable(url)));

        let sources = source_list(&[
            ("https://example.com/a", Some(Category::Tourism)),
            ("https://example.com/b", Some(Category::Tourism)),
        ]);

        let result = service(fetcher, 4).curate(&sources, started_at());
        assert!(matches!(result, Err(TourfeedError::NoSourcesSucceeded(2))));
    }

    #[test]
    fn test_empty_source_list_is_error() {
        let fetcher = MockPageFetcher::new();
        let result = service(fetcher, 4).curate(&SourceList::new(), started_at());
        assert!(matches!(result, Err(TourfeedError::NoSourcesSucceeded(0))));
    }

    #[test]
    fn test_blocked_topics_never_reach_feed() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().times(3).returning(|url| {
            Ok(match url {
                "https://example.com/a" => og_page("Crime on the promenade", "Police report", None, None),
                "https://example.com/b" => og_page("Council politics", "Budget vote", None, None),
                _ => og_page("Sunset cruise", "Evening on the bay", None, None),
            })
        });

        let sources = source_list(&[
            ("https://example.com/a", Some(Category::Tourism)),
            ("https://example.com/b", Some(Category::Culture)),
            ("https://example.com/c", Some(Category::ThingsToDo)),
        ]);

        let report = service(fetcher, 3).curate(&sources, started_at()).unwrap();

        assert_eq!(report.succeeded, 3);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.articles.len(), 1);
        assert_eq!(report.articles[0].title, "Sunset cruise");
        for article in &report.articles {
            let blob = article.text_blob();
            assert!(!blob.contains("crime") && !blob.contains("politics") && !blob.contains("news"));
        }
    }

    #[test]
    fn test_unclassified_page_is_dropped_not_defaulted() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(og_page("Quarterly report", "Figures", None, None)));

        let sources = source_list(&[("https://example.com/p/1", None)]);
        let report = service(fetcher, 1).curate(&sources, started_at()).unwrap();

        assert_eq!(report.succeeded, 1);
        assert!(report.articles.is_empty());
        assert_eq!(report.rejected[0].1, "unclassified");
    }

    #[test]
    fn test_build_feed_orders_deterministically_regardless_of_concurrency() {
        let pages = |url: &str| -> TourfeedResult<String> {
            Ok(match url {
                "https://example.com/museums/a" => {
                    og_page("Museum A", "Gallery", None, Some("2024-03-01T00:00:00Z"))
                }
                "https://example.com/museums/b" => og_page("Museum B", "Gallery", None, None),
                _ => og_page("Museum C", "Gallery", None, None),
            })
        };
        let sources = source_list(&[
            ("https://example.com/museums/c", None),
            ("https://example.com/museums/a", None),
            ("https://example.com/museums/b", None),
        ]);
        let info = FeedInfo {
            title: "Guide".to_string(),
            link: "https://example.com/".to_string(),
            description: "Museums".to_string(),
            language: None,
        };

        let mut orders = Vec::new();
        for concurrency in [1, 3] {
            let mut fetcher = MockPageFetcher::new();
            fetcher.expect_fetch().times(3).returning(move |url| pages(url));

            let (feed, _) = service(fetcher, concurrency)
                .build_feed(info.clone(), &sources, started_at(), None)
                .unwrap();
            orders.push(
                feed.items
                    .iter()
                    .map(|a| a.source_url.clone())
                    .collect::<Vec<_>>(),
            );
        }

        // b and c share the run start time, which is newer than a
        assert_eq!(
            orders[0],
            vec![
                "https://example.com/museums/b",
                "https://example.com/museums/c",
                "https://example.com/museums/a"
            ]
        );
        assert_eq!(orders[0], orders[1]);
    }

    #[test]
    fn test_inspect_reports_category_and_verdict() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(og_page("Night market news", "Street food stalls", None, None)));

        let inspection = service(fetcher, 1)
            .inspect("https://example.com/shopping/night-market")
            .unwrap();

        assert_eq!(inspection.category, Some(Category::Shopping));
        assert_eq!(inspection.metadata.title, "Night market news");
        assert!(inspection.rejected.unwrap().contains("news"));
    }
}
