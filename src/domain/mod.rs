pub mod article;
pub mod category;
pub mod feed;
pub mod source;

pub use article::Article;
pub use category::Category;
pub use feed::{Feed, FeedInfo};
pub use source::Source;
