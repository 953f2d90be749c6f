//! Client operations over the WordPress REST API.

pub mod client;
pub mod crawl;
pub mod error;
pub mod query;

pub use client::{ClientConfig, PostPage, WordPressClient};
pub use error::{ApiError, ErrorKind};
pub use query::{Order, OrderBy, PostQuery, RequestOptions};
