use regex::Regex;
use url::Url;

use crate::domain::Category;
use crate::errors::{TourfeedError, TourfeedResult};

/// Words that vote for each category. Matched on word boundaries.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Tourism,
        &["tourism", "tourist", "tourists", "travel", "visit", "visitors", "sightseeing", "tour", "tours", "guide"],
    ),
    (
        Category::Beaches,
        &["beach", "beaches", "coast", "coastline", "shore", "surf", "seaside", "bay", "lagoon", "snorkel", "snorkeling"],
    ),
    (
        Category::Restaurants,
        &["restaurant", "restaurants", "dining", "dine", "food", "eat", "eats", "cafe", "cafes", "brunch", "dinner", "cuisine", "bistro", "tapas"],
    ),
    (
        Category::Shopping,
        &["shopping", "shop", "shops", "market", "markets", "boutique", "boutiques", "mall", "souvenir", "souvenirs", "store", "stores"],
    ),
    (
        Category::Museums,
        &["museum", "museums", "gallery", "galleries", "exhibit", "exhibition", "exhibitions", "collection"],
    ),
    (
        Category::Culture,
        &["culture", "cultural", "festival", "festivals", "music", "theatre", "theater", "art", "arts", "tradition", "traditions", "dance"],
    ),
    (
        Category::History,
        &["history", "historic", "historical", "heritage", "castle", "castles", "ruins", "monument", "monuments", "cathedral", "century", "ancient"],
    ),
    (
        Category::ThingsToDo,
        &["things-to-do", "things to do", "activities", "activity", "attractions", "attraction", "hike", "hiking", "excursion", "excursions", "itinerary", "weekend"],
    ),
];

/// Assigns a category to a page. A category pinned on the source always wins;
/// otherwise the category whose keywords match most often in the URL path,
/// title and description is chosen, ties going to declaration order.
pub struct Classifier {
    patterns: Vec<(Category, Regex)>,
}

impl Classifier {
    pub fn new() -> TourfeedResult<Self> {
        let patterns = CATEGORY_KEYWORDS
            .iter()
            .map(|(category, words)| {
                let alternation = words
                    .iter()
                    .map(|w| regex::escape(w))
                    .collect::<Vec<_>>()
                    .join("|");
                Regex::new(&format!(r"\b(?:{})\b", alternation))
                    .map(|re| (*category, re))
                    .map_err(|e| TourfeedError::Config(e.to_string()))
            })
            .collect::<TourfeedResult<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    pub fn classify(
        &self,
        pinned: Option<Category>,
        page_url: &str,
        title: &str,
        description: Option<&str>,
    ) -> Option<Category> {
        if pinned.is_some() {
            return pinned;
        }

        let haystack = format!(
            "{} {} {}",
            url_words(page_url),
            title,
            description.unwrap_or_default()
        )
        .to_lowercase();

        let mut best: Option<(Category, usize)> = None;
        for (category, re) in &self.patterns {
            let score = re.find_iter(&haystack).count();
            if score == 0 {
                continue;
            }
            match best {
                Some((_, top)) if top >= score => {}
                _ => best = Some((*category, score)),
            }
        }

        best.map(|(category, _)| category)
    }
}

/// Path segments of a URL as space-separated words ("things-to-do" kept intact
/// alongside its parts).
fn url_words(page_url: &str) -> String {
    let Ok(url) = Url::parse(page_url) else {
        return String::new();
    };

    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(|s| format!("{} {}", s, s.replace(['-', '_'], " ")))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}
