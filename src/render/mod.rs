use std::collections::BTreeMap;

use rss::extension::{Extension, ExtensionMap};
use rss::{Category as RssCategory, Channel, Enclosure, Guid, Item};

use crate::domain::{Article, Feed};
use crate::errors::{TourfeedError, TourfeedResult};

pub const MEDIA_NAMESPACE: &str = "http://search.yahoo.com/mrss/";

const GENERATOR: &str = concat!("tourfeed ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Default, Clone, Copy)]
pub struct FeedRenderer;

impl FeedRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize a feed as an RSS 2.0 document
    pub fn render(&self, feed: &Feed) -> TourfeedResult<String> {
        let mut channel = Channel::default();
        channel.set_title(xml_text(&feed.info.title));
        channel.set_link(feed.info.link.clone());
        channel.set_description(xml_text(&feed.info.description));
        channel.set_language(feed.info.language.clone());
        channel.set_generator(GENERATOR.to_string());
        channel.set_last_build_date(feed.generated_at.to_rfc2822());

        let mut namespaces = BTreeMap::new();
        namespaces.insert("media".to_string(), MEDIA_NAMESPACE.to_string());
        channel.set_namespaces(namespaces);

        channel.set_items(feed.items.iter().map(Self::item).collect::<Vec<_>>());

        let bytes = channel
            .write_to(Vec::new())
            .map_err(|e| TourfeedError::Render(e.to_string()))?;

        String::from_utf8(bytes).map_err(|e| TourfeedError::Render(e.to_string()))
    }

    fn item(article: &Article) -> Item {
        let mut item = Item::default();
        item.set_title(xml_text(&article.title));
        item.set_link(article.link.clone());
        item.set_description(article.description.as_deref().map(xml_text));
        item.set_pub_date(article.published_at.to_rfc2822());

        let mut guid = Guid::default();
        guid.set_value(article.link.clone());
        guid.set_permalink(true);
        item.set_guid(guid);

        let mut category = RssCategory::default();
        category.set_name(article.category.to_string());
        item.set_categories(vec![category]);

        if let Some(image_url) = &article.image_url {
            let mut enclosure = Enclosure::default();
            enclosure.set_url(image_url.clone());
            enclosure.set_length("0".to_string());
            enclosure.set_mime_type(image_mime_type(image_url).to_string());
            item.set_enclosure(enclosure);

            item.set_extensions(media_content(image_url));
        }

        item
    }

    /// Re-parse rendered output and check the item count survived.
    pub fn verify(&self, xml: &str, expected_items: usize) -> TourfeedResult<()> {
        if let Some(bad) = xml.chars().find(|c| !is_xml_char(*c)) {
            return Err(TourfeedError::FeedParse(format!(
                "character U+{:04X} is not allowed in XML",
                bad as u32
            )));
        }

        let parsed = feed_rs::parser::parse(xml.as_bytes())
            .map_err(|e| TourfeedError::FeedParse(e.to_string()))?;

        if parsed.entries.len() != expected_items {
            return Err(TourfeedError::FeedParse(format!(
                "expected {} items, parsed {}",
                expected_items,
                parsed.entries.len()
            )));
        }

        Ok(())
    }
}

/// XML 1.0 `Char` production
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Drop characters an XML document cannot carry, even escaped
fn xml_text(s: &str) -> String {
    s.chars().filter(|c| is_xml_char(*c)).collect()
}

/// `<media:content url="..." medium="image"/>`
fn media_content(image_url: &str) -> ExtensionMap {
    let mut attrs = BTreeMap::new();
    attrs.insert("url".to_string(), image_url.to_string());
    attrs.insert("medium".to_string(), "image".to_string());

    let mut extension = Extension::default();
    extension.set_name("media:content".to_string());
    extension.attrs = attrs;

    let mut media = BTreeMap::new();
    media.insert("content".to_string(), vec![extension]);

    let mut map = ExtensionMap::new();
    map.insert("media".to_string(), media);
    map
}

fn image_mime_type(image_url: &str) -> &'static str {
    let path = url::Url::parse(image_url)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_else(|_| image_url.to_lowercase());

    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("svg") => "image/svg+xml",
        _ => "image/jpeg",
    }
}
