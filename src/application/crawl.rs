//! Full listing of published posts for sitemap generation.

use tracing::{info, warn};

use crate::domain::{entities::PostSummary, transform::parse_summary};

use super::{
    client::WordPressClient,
    error::{ApiError, ErrorKind},
    query::{MAX_PER_PAGE, RequestOptions, endpoint},
};

const SUMMARY_FIELDS: &str = "id,slug,date,modified";

impl WordPressClient {
    /// Walk every page of `/posts` with a reduced field set.
    ///
    /// Stops at the last page WordPress reports, at an empty page, or at the
    /// HTTP 400 WordPress returns for a page number past the end.
    pub async fn crawl_posts(&self) -> Result<Vec<PostSummary>, ApiError> {
        let per_page = MAX_PER_PAGE.to_string();
        let mut summaries = Vec::new();
        let mut page: u32 = 1;

        loop {
            let page_param = page.to_string();
            let endpoint = endpoint(
                "/posts",
                &[
                    ("per_page", per_page.as_str()),
                    ("page", page_param.as_str()),
                    ("_fields", SUMMARY_FIELDS),
                    ("status", "publish"),
                ],
            );

            let response = match self.fetch(&endpoint, &RequestOptions::default()).await {
                Ok(response) => response,
                Err(error) if page > 1 && error.kind() == ErrorKind::Status(400) => {
                    info!(page, "Reached end of post listing");
                    break;
                }
                Err(error) => return Err(error),
            };

            let Some(items) = response.data.as_array() else {
                warn!(
                    target = "presswire::crawl",
                    page,
                    "Post listing page was not a list"
                );
                break;
            };
            if items.is_empty() {
                break;
            }

            for item in items {
                match parse_summary(item) {
                    Ok(summary) => summaries.push(summary),
                    Err(error) => warn!(
                        target = "presswire::crawl",
                        page,
                        error = %error,
                        "Skipping unreadable post summary"
                    ),
                }
            }
            info!(
                page,
                total_pages = response.total_pages,
                collected = summaries.len(),
                "Crawled post listing page"
            );

            // A missing X-WP-TotalPages reads as 1, so a full page keeps going.
            let last_reported = u64::from(page) >= response.total_pages;
            let short_page = items.len() < MAX_PER_PAGE as usize;
            if last_reported && (short_page || response.total_pages > 1) {
                break;
            }
            page += 1;
        }

        Ok(summaries)
    }
}
