//! Command handlers for the presswire binary.

use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::info;

use presswire::{
    application::{ApiError, PostQuery, WordPressClient},
    config::{Command, LoadError, PostsArgs},
    infra::error::InfraError,
};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("WordPress API at {0} is unreachable")]
    Unhealthy(String),
}

pub async fn handle(client: &WordPressClient, command: Command) -> Result<(), CliError> {
    match command {
        Command::Posts(args) => list_posts(client, args).await,
        Command::Post(args) => print_json(&client.get_post_by_slug(&args.slug).await?),
        Command::Categories => print_json(&client.get_categories().await?),
        Command::Tags => print_json(&client.get_tags().await?),
        Command::Related(args) => print_json(&client.get_related_posts(args.post_id).await),
        Command::Health => health(client).await,
        Command::Crawl => {
            let summaries = client.crawl_posts().await?;
            info!(posts = summaries.len(), "Crawl finished");
            print_json(&summaries)
        }
    }
}

async fn list_posts(client: &WordPressClient, args: PostsArgs) -> Result<(), CliError> {
    let mut query = PostQuery {
        page: args.page,
        per_page: args.per_page,
        search: args.search,
        featured: args.featured,
        trending: args.trending,
        orderby: args.orderby.into(),
        order: args.order.into(),
        ..Default::default()
    };
    if let Some(tag) = args.tag.as_deref() {
        query.tag_id = Some(client.get_tag_id_by_slug(tag).await?);
    }

    let page = match args.category.as_deref() {
        Some(category) => client.get_posts_by_category_slug(category, &query).await?,
        None => client.get_posts(&query).await?,
    };
    print_json(&page)
}

async fn health(client: &WordPressClient) -> Result<(), CliError> {
    let healthy = client.health_check().await;
    print_json(&json!({ "healthy": healthy, "baseUrl": client.base_url() }))?;
    if healthy {
        Ok(())
    } else {
        Err(CliError::Unhealthy(client.base_url().to_string()))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}
