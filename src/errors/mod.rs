use thiserror::Error;

#[derive(Error, Debug)]
pub enum TourfeedError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    // Parsing errors
    #[error("Metadata extraction failed: {0}")]
    Extraction(String),

    #[error("Feed parsing failed: {0}")]
    FeedParse(String),

    #[error("OPML parsing failed: {0}")]
    OpmlParse(String),

    // Output errors
    #[error("Feed rendering failed: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Run-level errors
    #[error("No sources succeeded ({0} attempted)")]
    NoSourcesSucceeded(usize),
}

pub type TourfeedResult<T> = Result<T, TourfeedError>;
