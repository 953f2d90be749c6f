//! View models handed to callers after normalization.
//!
//! Every field is always populated; fallbacks are applied in
//! [`crate::domain::transform`] so consumers never re-check for gaps.

use serde::Serialize;

/// Placeholder image used when a post carries no usable featured media.
pub const PLACEHOLDER_IMAGE: &str =
    "https://images.unsplash.com/photo-1595872018818-97555653a011?w=800&h=600&fit=crop";
pub const DEFAULT_AUTHOR: &str = "DataEngineer Hub";
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<TagRef>,
    pub read_time: String,
    pub date: String,
    pub modified: String,
    pub image: String,
    pub featured: bool,
    pub trending: bool,
    pub author: String,
}

/// Lightweight tag reference attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRef {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub count: u64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub count: u64,
    pub description: String,
}

/// Minimal post listing produced by a full-site crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub id: u64,
    pub slug: String,
    pub date: String,
    pub modified: String,
}
