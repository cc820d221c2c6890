use crate::errors::TourfeedResult;

#[cfg_attr(test, mockall::automock)]
pub trait PageFetcher: Send + Sync {
    /// Fetch the raw HTML of a page
    fn fetch(&self, url: &str) -> TourfeedResult<String>;
}
