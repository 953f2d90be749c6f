//! Raw WordPress REST v2 shapes.
//!
//! Deserialization is deliberately lenient: every field is optional, rendered
//! fields accept either `{"rendered": ...}` or a bare string, and fields the
//! REST API is known to emit with mixed types (`false` for a missing image
//! URL, `[]` for empty meta) are read as loose JSON.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WpPost {
    pub id: Option<u64>,
    pub slug: Option<String>,
    pub title: Option<Rendered>,
    pub excerpt: Option<Rendered>,
    pub content: Option<Rendered>,
    #[serde(deserialize_with = "loose_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub date_gmt: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub modified: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub featured_image_url: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub jetpack_featured_media_url: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub featured_media_src_url: Option<String>,
    pub featured: Option<Value>,
    pub trending: Option<Value>,
    pub meta: Option<Value>,
    pub post_tags: Option<Vec<WpTerm>>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<WpEmbedded>,
}

/// A `{"rendered": "..."}` wrapper or a plain string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Rendered {
    Object { rendered: Option<String> },
    Plain(String),
}

impl Rendered {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Object { rendered } => rendered.as_deref(),
            Self::Plain(value) => Some(value.as_str()),
        }
    }
}

/// A taxonomy term, either embedded in a post or from `/categories`/`/tags`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WpTerm {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub taxonomy: Option<String>,
    pub count: Option<u64>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WpEmbedded {
    #[serde(rename = "wp:featuredmedia")]
    pub featured_media: Vec<WpMedia>,
    #[serde(rename = "wp:term")]
    pub terms: Vec<Vec<WpTerm>>,
    pub author: Vec<WpAuthor>,
}

impl WpEmbedded {
    /// Find the embedded term group for `taxonomy`, falling back to the
    /// positional slot WordPress uses (`0` categories, `1` tags).
    pub fn term_group(&self, taxonomy: &str, position: usize) -> Option<&[WpTerm]> {
        self.terms
            .iter()
            .find(|group| {
                group
                    .first()
                    .and_then(|term| term.taxonomy.as_deref())
                    .is_some_and(|value| value == taxonomy)
            })
            .or_else(|| {
                self.terms.get(position).filter(|group| {
                    group
                        .first()
                        .is_none_or(|term| term.taxonomy.as_deref().is_none_or(|v| v == taxonomy))
                })
            })
            .map(Vec::as_slice)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WpMedia {
    #[serde(deserialize_with = "loose_string")]
    pub source_url: Option<String>,
    pub media_details: Option<Value>,
}

impl WpMedia {
    const PREFERRED_SIZES: [&'static str; 2] = ["large", "medium_large"];

    pub fn sized_url(&self) -> Option<&str> {
        let details = self.media_details.as_ref()?;
        Self::PREFERRED_SIZES.iter().find_map(|size| {
            details
                .pointer(&format!("/sizes/{size}/source_url"))
                .and_then(Value::as_str)
                .filter(|url| !url.is_empty())
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WpAuthor {
    pub name: Option<String>,
}

fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        _ => None,
    })
}

/// WordPress flags arrive as `true`, `1` or `"1"`.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_i64() == Some(1),
        Value::String(text) => text == "1",
        _ => false,
    }
}
