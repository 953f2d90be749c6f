//! Boundary between raw WordPress JSON and the view models.
//!
//! [`parse_post`] is the strict step: it either yields a fully populated
//! [`Post`] or a [`TransformError`]. [`transform_post`] is what list renders
//! use; it never fails and turns a rejected item into a degraded placeholder
//! so one malformed post cannot break a whole page.

use serde::Deserialize;
use serde_json::Value;
use time::{
    OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
    macros::format_description,
};
use tracing::warn;

use super::entities::{
    Category, DEFAULT_AUTHOR, PLACEHOLDER_IMAGE, Post, PostSummary, Tag, TagRef, UNCATEGORIZED,
};
use super::error::TransformError;
use super::text;
use super::wp::{Rendered, WpPost, WpTerm, is_truthy};

const UNTITLED: &str = "Untitled";
const EMPTY_CONTENT: &str = "<p>No content available</p>";
const ERROR_TITLE: &str = "Error Loading Post";
const ERROR_EXCERPT: &str = "There was an error loading this post content.";
const ERROR_CONTENT: &str =
    "<p>There was an error loading this post content. Please try refreshing the page.</p>";
const UNNAMED_CATEGORY: &str = "Unnamed Category";
const UNNAMED_TAG: &str = "Unnamed Tag";

/// Parse one raw post.
pub fn parse_post(value: &Value) -> Result<Post, TransformError> {
    let raw = parse_raw(value)?;
    Ok(build_post(raw))
}

/// Parse one raw post, degrading to an error placeholder instead of failing.
pub fn transform_post(value: &Value) -> Post {
    match parse_post(value) {
        Ok(post) => post,
        Err(error) => {
            warn!(
                target = "presswire::transform",
                error = %error,
                "Degrading malformed post"
            );
            degraded_post(value)
        }
    }
}

pub fn transform_posts(values: &[Value]) -> Vec<Post> {
    values.iter().map(transform_post).collect()
}

pub fn normalize_category(value: &Value) -> Category {
    let term = parse_term(value, "category");
    Category {
        id: term.id.unwrap_or(0),
        name: non_empty(term.name.as_deref())
            .unwrap_or(UNNAMED_CATEGORY)
            .to_string(),
        slug: term.slug.unwrap_or_default(),
        count: term.count.unwrap_or(0),
        description: term.description.unwrap_or_default(),
    }
}

pub fn normalize_tag(value: &Value) -> Tag {
    let term = parse_term(value, "tag");
    Tag {
        id: term.id.unwrap_or(0),
        name: non_empty(term.name.as_deref())
            .unwrap_or(UNNAMED_TAG)
            .to_string(),
        slug: term.slug.unwrap_or_default(),
        count: term.count.unwrap_or(0),
        description: term.description.unwrap_or_default(),
    }
}

/// Reduce a `_fields`-filtered post to its crawl summary.
pub fn parse_summary(value: &Value) -> Result<PostSummary, TransformError> {
    let raw = parse_raw(value)?;
    let date = first_valid_date([raw.date.as_deref(), raw.date_gmt.as_deref()])
        .map(str::to_string)
        .unwrap_or_default();
    let modified = first_valid_date([raw.modified.as_deref()])
        .map(str::to_string)
        .unwrap_or_else(|| date.clone());
    Ok(PostSummary {
        id: raw.id.unwrap_or(0),
        slug: raw.slug.unwrap_or_default(),
        date,
        modified,
    })
}

fn parse_raw(value: &Value) -> Result<WpPost, TransformError> {
    if !value.is_object() {
        return Err(TransformError::not_an_object("post", value));
    }
    WpPost::deserialize(value).map_err(|err| TransformError::shape("post", err.to_string()))
}

fn parse_term(value: &Value, entity: &'static str) -> WpTerm {
    match WpTerm::deserialize(value) {
        Ok(term) if value.is_object() => term,
        Ok(_) | Err(_) => {
            warn!(
                target = "presswire::transform",
                entity,
                "Normalizing malformed term with fallbacks"
            );
            WpTerm::default()
        }
    }
}

fn build_post(raw: WpPost) -> Post {
    let excerpt = raw
        .excerpt
        .as_ref()
        .and_then(Rendered::text)
        .map(text::clean_excerpt)
        .unwrap_or_default();
    let content = resolve_content(&raw);
    let read_time = text::read_time(&content);
    let content = if content.is_empty() {
        EMPTY_CONTENT.to_string()
    } else {
        content
    };

    let date = first_valid_date([
        raw.date.as_deref(),
        raw.date_gmt.as_deref(),
        raw.modified.as_deref(),
    ])
    .map_or_else(now_timestamp, str::to_string);
    let modified = first_valid_date([raw.modified.as_deref()])
        .map_or_else(|| date.clone(), str::to_string);

    Post {
        id: raw.id.unwrap_or(0),
        slug: raw.slug.clone().unwrap_or_default(),
        title: raw
            .title
            .as_ref()
            .and_then(Rendered::text)
            .and_then(|title| non_empty(Some(title)))
            .unwrap_or(UNTITLED)
            .to_string(),
        excerpt,
        content,
        category: resolve_category(&raw),
        tags: resolve_tags(&raw),
        read_time,
        date,
        modified,
        image: resolve_image(&raw),
        featured: resolve_flag(&raw, raw.featured.as_ref(), "featured"),
        trending: resolve_flag(&raw, raw.trending.as_ref(), "trending"),
        author: raw
            .embedded
            .as_ref()
            .and_then(|embedded| embedded.author.first())
            .and_then(|author| non_empty(author.name.as_deref()))
            .unwrap_or(DEFAULT_AUTHOR)
            .to_string(),
    }
}

fn resolve_content(raw: &WpPost) -> String {
    let source = match raw.content.as_ref() {
        Some(content) => content.text(),
        None => raw.excerpt.as_ref().and_then(Rendered::text),
    };
    let content = source.unwrap_or_default().trim();
    if content.is_empty() {
        return String::new();
    }
    if content.contains("<p>") || content.contains("<table>") {
        content.to_string()
    } else {
        format!("<p>{content}</p>")
    }
}

fn resolve_image(raw: &WpPost) -> String {
    let media = raw
        .embedded
        .as_ref()
        .and_then(|embedded| embedded.featured_media.first());

    non_empty(raw.featured_image_url.as_deref())
        .or_else(|| media.and_then(|media| media.sized_url()))
        .or_else(|| media.and_then(|media| non_empty(media.source_url.as_deref())))
        .or_else(|| non_empty(raw.jetpack_featured_media_url.as_deref()))
        .or_else(|| non_empty(raw.featured_media_src_url.as_deref()))
        .unwrap_or(PLACEHOLDER_IMAGE)
        .to_string()
}

fn resolve_category(raw: &WpPost) -> String {
    let Some(terms) = raw
        .embedded
        .as_ref()
        .and_then(|embedded| embedded.term_group("category", 0))
    else {
        return UNCATEGORIZED.to_string();
    };

    let mut names = terms.iter().filter_map(|term| non_empty(term.name.as_deref()));
    let first = names.clone().next();
    names
        .find(|name| *name != UNCATEGORIZED)
        .or(first)
        .unwrap_or(UNCATEGORIZED)
        .to_string()
}

fn resolve_tags(raw: &WpPost) -> Vec<TagRef> {
    let flat = raw.post_tags.as_deref().filter(|tags| !tags.is_empty());
    let terms = flat.or_else(|| {
        raw.embedded
            .as_ref()
            .and_then(|embedded| embedded.term_group("post_tag", 1))
    });

    terms
        .unwrap_or_default()
        .iter()
        .filter(|term| term.name.is_some() || term.slug.is_some())
        .map(|term| TagRef {
            id: term.id.unwrap_or(0),
            name: term
                .name
                .clone()
                .or_else(|| term.slug.clone())
                .unwrap_or_default(),
            slug: term.slug.clone().unwrap_or_default(),
        })
        .collect()
}

fn resolve_flag(raw: &WpPost, top_level: Option<&Value>, key: &str) -> bool {
    let from_field = top_level.is_some_and(is_truthy);
    let from_meta = raw
        .meta
        .as_ref()
        .and_then(|meta| meta.get(key))
        .is_some_and(is_truthy);
    from_field || from_meta
}

fn degraded_post(value: &Value) -> Post {
    let title = value
        .get("title")
        .and_then(|title| title.get("rendered").or(Some(title)))
        .and_then(Value::as_str)
        .and_then(|title| non_empty(Some(title)))
        .unwrap_or(ERROR_TITLE);
    let now = now_timestamp();

    Post {
        id: value.get("id").and_then(Value::as_u64).unwrap_or(0),
        slug: value
            .get("slug")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        title: title.to_string(),
        excerpt: ERROR_EXCERPT.to_string(),
        content: ERROR_CONTENT.to_string(),
        category: UNCATEGORIZED.to_string(),
        tags: Vec::new(),
        read_time: text::format_read_time(1),
        date: now.clone(),
        modified: now,
        image: PLACEHOLDER_IMAGE.to_string(),
        featured: false,
        trending: false,
        author: DEFAULT_AUTHOR.to_string(),
    }
}

fn first_valid_date<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| is_valid_date(candidate))
}

/// Accepts WordPress's offset-less `2024-01-31T08:00:00` and RFC 3339.
fn is_valid_date(candidate: &str) -> bool {
    let local = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(candidate, local).is_ok()
        || OffsetDateTime::parse(candidate, &Rfc3339).is_ok()
}

fn now_timestamp() -> String {
    OffsetDateTime::now_utc()
        .replace_nanosecond(0)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn assert_fully_populated(post: &Post) {
        assert!(!post.title.is_empty());
        assert!(!post.content.is_empty());
        assert!(!post.category.is_empty());
        assert!(!post.read_time.is_empty());
        assert!(!post.date.is_empty());
        assert!(!post.modified.is_empty());
        assert!(!post.image.is_empty());
        assert!(!post.author.is_empty());
    }

    #[test]
    fn empty_object_gets_every_fallback() {
        let post = parse_post(&json!({})).expect("empty object parses");
        assert_fully_populated(&post);
        assert_eq!(post.id, 0);
        assert_eq!(post.slug, "");
        assert_eq!(post.title, "Untitled");
        assert_eq!(post.excerpt, "");
        assert_eq!(post.content, "<p>No content available</p>");
        assert_eq!(post.category, "Uncategorized");
        assert!(post.tags.is_empty());
        assert_eq!(post.read_time, "1 min read");
        assert_eq!(post.image, PLACEHOLDER_IMAGE);
        assert_eq!(post.author, "DataEngineer Hub");
        assert!(!post.featured && !post.trending);
        assert!(is_valid_date(&post.date));
    }

    #[test]
    fn non_objects_degrade_instead_of_failing() {
        for value in [json!(null), json!(42), json!("post"), json!([1, 2])] {
            assert!(matches!(
                parse_post(&value),
                Err(TransformError::NotAnObject { .. })
            ));
            let post = transform_post(&value);
            assert_fully_populated(&post);
            assert_eq!(post.title, ERROR_TITLE);
        }
    }

    #[test]
    fn wrong_field_types_degrade_but_keep_identity() {
        let value = json!({"id": 12, "slug": "broken", "title": 99});
        assert!(matches!(parse_post(&value), Err(TransformError::Shape { .. })));

        let post = transform_post(&value);
        assert_eq!(post.id, 12);
        assert_eq!(post.slug, "broken");
        assert_eq!(post.title, ERROR_TITLE);
        assert_eq!(post.excerpt, ERROR_EXCERPT);
        assert_fully_populated(&post);
    }

    #[test]
    fn explicit_image_field_wins_over_embedded_media() {
        let post = transform_post(&json!({
            "featured_image_url": "https://cdn/explicit.png",
            "_embedded": {"wp:featuredmedia": [{
                "source_url": "https://cdn/source.png",
                "media_details": {"sizes": {"large": {"source_url": "https://cdn/large.png"}}}
            }]}
        }));
        assert_eq!(post.image, "https://cdn/explicit.png");
    }

    #[test]
    fn embedded_sizes_win_over_source_url() {
        let post = transform_post(&json!({
            "featured_image_url": null,
            "_embedded": {"wp:featuredmedia": [{
                "source_url": "https://cdn/source.png",
                "media_details": {"sizes": {"medium_large": {"source_url": "https://cdn/ml.png"}}}
            }]}
        }));
        assert_eq!(post.image, "https://cdn/ml.png");

        let post = transform_post(&json!({
            "_embedded": {"wp:featuredmedia": [{"source_url": "https://cdn/source.png", "media_details": []}]}
        }));
        assert_eq!(post.image, "https://cdn/source.png");
    }

    #[test]
    fn category_skips_uncategorized_when_possible() {
        let post = transform_post(&json!({
            "_embedded": {"wp:term": [[
                {"name": "Uncategorized", "taxonomy": "category"},
                {"name": "Snowflake", "taxonomy": "category"}
            ]]}
        }));
        assert_eq!(post.category, "Snowflake");

        let post = transform_post(&json!({
            "_embedded": {"wp:term": [[{"name": "Uncategorized", "taxonomy": "category"}]]}
        }));
        assert_eq!(post.category, "Uncategorized");
    }

    #[test]
    fn flat_tags_take_precedence_over_embedded_terms() {
        let post = transform_post(&json!({
            "post_tags": [{"id": 3, "name": "dbt", "slug": "dbt"}],
            "_embedded": {"wp:term": [[], [{"id": 9, "name": "airflow", "slug": "airflow", "taxonomy": "post_tag"}]]}
        }));
        assert_eq!(post.tags, vec![TagRef { id: 3, name: "dbt".into(), slug: "dbt".into() }]);

        let post = transform_post(&json!({
            "post_tags": [],
            "_embedded": {"wp:term": [[], [{"id": 9, "name": "airflow", "slug": "airflow", "taxonomy": "post_tag"}]]}
        }));
        assert_eq!(post.tags[0].slug, "airflow");
    }

    #[test]
    fn missing_content_falls_back_to_excerpt() {
        let post = transform_post(&json!({"excerpt": {"rendered": "<p>Short intro</p>"}}));
        assert_eq!(post.content, "<p>Short intro</p>");
        assert_eq!(post.excerpt, "Short intro");

        let post = transform_post(&json!({"content": "bare text"}));
        assert_eq!(post.content, "<p>bare text</p>");
    }

    #[test]
    fn flags_read_from_fields_or_meta() {
        let post = transform_post(&json!({"featured": true, "meta": {"trending": "1"}}));
        assert!(post.featured);
        assert!(post.trending);

        let post = transform_post(&json!({"featured": false, "meta": []}));
        assert!(!post.featured);
    }

    #[test]
    fn dates_skip_zero_values() {
        let post = transform_post(&json!({
            "date": "0000-00-00 00:00:00",
            "date_gmt": "2024-03-01T09:30:00",
        }));
        assert_eq!(post.date, "2024-03-01T09:30:00");
        assert_eq!(post.modified, "2024-03-01T09:30:00");
    }

    #[test]
    fn read_time_counts_content_words() {
        let body = format!("<p>{}</p>", "data ".repeat(450));
        let post = transform_post(&json!({"content": {"rendered": body}}));
        assert_eq!(post.read_time, "3 min read");
    }

    #[test]
    fn terms_normalize_with_fallbacks() {
        let category = normalize_category(&json!({"id": 4}));
        assert_eq!(category.name, "Unnamed Category");
        assert_eq!(category.count, 0);

        let tag = normalize_tag(&json!("oops"));
        assert_eq!(tag.id, 0);
        assert_eq!(tag.name, "Unnamed Tag");
    }

    #[test]
    fn summary_keeps_raw_dates() {
        let summary = parse_summary(&json!({
            "id": 5, "slug": "s", "date": "2024-01-02T03:04:05", "modified": "2024-02-02T03:04:05"
        }))
        .expect("summary");
        assert_eq!(summary.modified, "2024-02-02T03:04:05");
        assert_eq!(summary.date, "2024-01-02T03:04:05");
    }
}
