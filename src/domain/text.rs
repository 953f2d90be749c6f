//! Plain-text helpers over rendered WordPress HTML.
//!
//! Tag and entity stripping use the lenient `<[^>]*>` / `&[^;]+;` rules:
//! an unterminated `<` or `&` is kept as literal text.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

const WORDS_PER_MINUTE: usize = 200;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern compiles"));
static ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[^;]+;").expect("entity pattern compiles"));

/// Replace every `<...>` tag with `with`.
pub fn replace_tags(input: &str, with: &str) -> String {
    TAG_PATTERN.replace_all(input, NoExpand(with)).into_owned()
}

/// Replace every `&name;` entity with `with`.
pub fn replace_entities(input: &str, with: &str) -> String {
    ENTITY_PATTERN.replace_all(input, NoExpand(with)).into_owned()
}

/// Turn a rendered excerpt into display text.
pub fn clean_excerpt(html: &str) -> String {
    let without_tags = replace_tags(html, "");
    let with_ellipsis = without_tags.replace("[&hellip;]", "...");
    replace_entities(&with_ellipsis, "").trim().to_string()
}

pub fn word_count(html: &str) -> usize {
    let text = replace_entities(&replace_tags(html, " "), " ");
    text.split_whitespace().count()
}

/// Estimated reading time in whole minutes, never below one.
pub fn read_time_minutes(html: &str) -> u32 {
    let words = word_count(html);
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

pub fn format_read_time(minutes: u32) -> String {
    format!("{minutes} min read")
}

pub fn read_time(html: &str) -> String {
    format_read_time(read_time_minutes(html))
}
