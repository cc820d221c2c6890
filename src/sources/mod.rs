pub mod http;
pub mod list;
pub mod traits;

pub use http::HttpFetcher;
pub use list::SourceList;
pub use traits::PageFetcher;

#[cfg(test)]
pub use traits::MockPageFetcher;
