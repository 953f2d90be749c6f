//! Query builders for WordPress list endpoints.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use url::form_urlencoded;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

impl Order {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderBy {
    #[default]
    Date,
    Modified,
    Title,
    Slug,
    Id,
    Relevance,
}

impl OrderBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Modified => "modified",
            Self::Title => "title",
            Self::Slug => "slug",
            Self::Id => "id",
            Self::Relevance => "relevance",
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for `GET /posts`.
///
/// Out-of-range paging is clamped when the endpoint is built, never rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub page: u32,
    pub per_page: u32,
    pub category_id: Option<u64>,
    pub tag_id: Option<u64>,
    pub search: Option<String>,
    pub featured: bool,
    pub trending: bool,
    pub orderby: OrderBy,
    pub order: Order,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            category_id: None,
            tag_id: None,
            search: None,
            featured: false,
            trending: false,
            orderby: OrderBy::default(),
            order: Order::default(),
        }
    }
}

impl PostQuery {
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Path and query string relative to the API base, e.g.
    /// `/posts?page=1&per_page=10&_embed=true&status=publish&orderby=date&order=desc`.
    pub fn endpoint(&self) -> String {
        let mut params = form_urlencoded::Serializer::new(String::new());
        params
            .append_pair("page", &self.page().to_string())
            .append_pair("per_page", &self.per_page().to_string())
            .append_pair("_embed", "true")
            .append_pair("status", "publish")
            .append_pair("orderby", self.orderby.as_str())
            .append_pair("order", self.order.as_str());

        if let Some(category) = self.category_id {
            params.append_pair("categories", &category.to_string());
        }
        if let Some(tag) = self.tag_id {
            params.append_pair("tags", &tag.to_string());
        }
        if let Some(term) = self.search_term() {
            params.append_pair("search", term);
        }
        if self.featured {
            params
                .append_pair("meta_key", "featured")
                .append_pair("meta_value", "1");
        }
        if self.trending {
            params
                .append_pair("meta_key", "trending")
                .append_pair("meta_value", "1");
        }

        format!("/posts?{}", params.finish())
    }
}

/// Build `path?k=v&...` with each value form-encoded.
pub fn endpoint(path: &str, pairs: &[(&str, &str)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{path}?{query}")
}

/// Per-request options that take part in the cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestOptions {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl RequestOptions {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}
