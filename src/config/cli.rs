use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};

use crate::application::query::{Order, OrderBy};

/// Command-line arguments for the presswire binary.
#[derive(Debug, Parser)]
#[command(name = "presswire", version, about = "Read-only WordPress REST client")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "PRESSWIRE_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the WordPress REST API root (e.g. https://example.com/wp-json/wp/v2).
    #[arg(long = "base-url", value_name = "URL", value_hint = ValueHint::Url)]
    pub base_url: Option<String>,

    /// Override the per-request timeout in milliseconds.
    #[arg(long = "timeout-ms", value_name = "MILLIS")]
    pub timeout_ms: Option<u64>,

    /// Override how long responses are cached, in seconds.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List posts.
    Posts(PostsArgs),
    /// Show a single post by slug.
    Post(PostArgs),
    /// List all categories.
    Categories,
    /// List all tags.
    Tags,
    /// List posts related to a post id.
    Related(RelatedArgs),
    /// Check that the API answers.
    Health,
    /// List id, slug and dates of every published post.
    Crawl,
}

#[derive(Debug, Args, Clone)]
pub struct PostsArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long = "per-page", default_value_t = 10)]
    pub per_page: u32,
    /// Category slug or name.
    #[arg(long)]
    pub category: Option<String>,
    /// Tag slug or name.
    #[arg(long)]
    pub tag: Option<String>,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub featured: bool,
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub trending: bool,
    #[arg(long, value_enum, default_value_t = OrderByArg::Date)]
    pub orderby: OrderByArg,
    #[arg(long, value_enum, default_value_t = OrderArg::Desc)]
    pub order: OrderArg,
}

#[derive(Debug, Args, Clone)]
pub struct PostArgs {
    pub slug: String,
}

#[derive(Debug, Args, Clone)]
pub struct RelatedArgs {
    #[arg(value_name = "POST_ID")]
    pub post_id: u64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OrderByArg {
    Date,
    Modified,
    Title,
    Slug,
    Id,
    Relevance,
}

impl From<OrderByArg> for OrderBy {
    fn from(value: OrderByArg) -> Self {
        match value {
            OrderByArg::Date => OrderBy::Date,
            OrderByArg::Modified => OrderBy::Modified,
            OrderByArg::Title => OrderBy::Title,
            OrderByArg::Slug => OrderBy::Slug,
            OrderByArg::Id => OrderBy::Id,
            OrderByArg::Relevance => OrderBy::Relevance,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for Order {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Asc => Order::Asc,
            OrderArg::Desc => Order::Desc,
        }
    }
}
