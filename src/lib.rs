//! Cached, read-only client for the WordPress REST API.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
