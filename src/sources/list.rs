use std::collections::HashSet;
use std::fs;

use opml::{Outline, OPML};
use tracing::{debug, warn};

use crate::config::{validate_source_url, Config};
use crate::domain::{Category, Source};
use crate::errors::{TourfeedError, TourfeedResult};

/// Ordered, de-duplicated set of pages to curate.
#[derive(Debug, Clone, Default)]
pub struct SourceList {
    sources: Vec<Source>,
    seen: HashSet<String>,
}

impl SourceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inline `[[sources]]` first, then the OPML file if configured
    pub fn from_config(config: &Config) -> TourfeedResult<Self> {
        let mut list = Self::new();

        for source in &config.sources {
            list.push(source.clone());
        }

        if let Some(path) = config.opml_path() {
            let content = fs::read_to_string(&path).map_err(|e| {
                TourfeedError::Config(format!("cannot read {}: {}", path.display(), e))
            })?;
            let imported = Self::parse_opml(&content)?;
            debug!(path = %path.display(), count = imported.len(), "loaded OPML sources");
            for source in imported {
                list.push(source);
            }
        }

        Ok(list)
    }

    /// Returns false when the URL was already present.
    pub fn push(&mut self, source: Source) -> bool {
        if !self.seen.insert(source.url.clone()) {
            warn!(url = %source.url, "duplicate source ignored");
            return false;
        }
        self.sources.push(source);
        true
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    pub fn as_slice(&self) -> &[Source] {
        &self.sources
    }

    /// Parse sources from OPML. A page URL comes from `htmlUrl`, `url` or
    /// `xmlUrl`; the category from the outline's `category` attribute or an
    /// enclosing outline whose text names a category.
    pub fn parse_opml(content: &str) -> TourfeedResult<Vec<Source>> {
        let opml = OPML::from_str(content).map_err(|e| TourfeedError::OpmlParse(e.to_string()))?;

        let mut sources = Vec::new();
        Self::collect_outlines(&opml.body.outlines, None, &mut sources)?;
        Ok(sources)
    }

    fn collect_outlines(
        outlines: &[Outline],
        inherited: Option<Category>,
        sources: &mut Vec<Source>,
    ) -> TourfeedResult<()> {
        for outline in outlines {
            let own = match outline.category.as_deref() {
                Some(raw) if !raw.trim().is_empty() => Some(
                    raw.parse::<Category>()
                        .map_err(TourfeedError::OpmlParse)?,
                ),
                _ => None,
            };
            let category = own.or(inherited);

            let url = [&outline.html_url, &outline.url, &outline.xml_url]
                .into_iter()
                .flatten()
                .find(|u| !u.trim().is_empty());

            if let Some(url) = url {
                validate_source_url(url)?;
                sources.push(Source::new(url.trim(), category));
            }

            // Group outlines like <outline text="Beaches"> pass their category down
            let group = outline.text.parse::<Category>().ok().or(category);
            Self::collect_outlines(&outline.outlines, group, sources)?;
        }

        Ok(())
    }

    /// Export the list as OPML, grouped by category.
    pub fn to_opml(&self, title: &str) -> TourfeedResult<String> {
        let mut opml = OPML::default();
        opml.head = Some(opml::Head {
            title: Some(title.to_string()),
            ..Default::default()
        });

        let page = |source: &Source| Outline {
            text: source.url.clone(),
            r#type: Some("link".to_string()),
            html_url: Some(source.url.clone()),
            category: source.category.map(|c| c.to_string()),
            ..Default::default()
        };

        for category in Category::ALL {
            let children: Vec<Outline> = self
                .sources
                .iter()
                .filter(|s| s.category == Some(category))
                .map(page)
                .collect();

            if !children.is_empty() {
                opml.body.outlines.push(Outline {
                    text: category.to_string(),
                    outlines: children,
                    ..Default::default()
                });
            }
        }

        opml.body.outlines.extend(
            self.sources
                .iter()
                .filter(|s| s.category.is_none())
                .map(page),
        );

        opml.to_string()
            .map_err(|e| TourfeedError::OpmlParse(e.to_string()))
    }
}
