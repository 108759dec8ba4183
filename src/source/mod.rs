//! Content source adapters
//!
//! This module defines the narrow contract the crawler consumes from the
//! encyclopedic content source: given a term or title in one language
//! edition, return the page's summary, canonical URL, outbound link titles,
//! category titles, and cross-language link table, or report that the page
//! does not exist.
//!
//! The production adapter (`MediaWikiSource`) talks to the MediaWiki Action
//! API; tests substitute scripted sources through the same traits.

mod mediawiki;

pub use mediawiki::{MediaWikiFactory, MediaWikiSource};

use crate::config::SourceConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the content source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response from {lang} edition: {message}")]
    UnexpectedResponse { lang: String, message: String },
}

/// A page fetched from one language edition of the content source
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Canonical page title after redirect resolution
    pub title: String,

    /// Plain-text introductory summary
    pub summary: String,

    /// Canonical page URL
    pub url: String,

    /// Cross-language link table: language code -> page title in that edition
    pub langlinks: HashMap<String, String>,

    /// Outbound link titles, in page order
    pub links: Vec<String>,

    /// Category titles, including their namespace prefix
    pub categories: Vec<String>,
}

/// Per-language-edition content source client
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetches a page by term or title
    ///
    /// # Returns
    ///
    /// * `Ok(Some(PageContent))` - The page exists
    /// * `Ok(None)` - The page does not exist in this edition
    /// * `Err(SourceError)` - The source could not be reached or answered
    ///   with something unusable
    async fn fetch_page(&self, title: &str) -> Result<Option<PageContent>, SourceError>;
}

/// Factory handing out one memoized content source per language edition
pub trait SourceFactory: Send + Sync {
    fn for_language(&self, lang: &str) -> Arc<dyn ContentSource>;
}

/// Builds the shared HTTP client with proper identification
///
/// The user agent is formatted per the content source's bot policy:
/// `CrawlerName/Version (+ContactURL; ContactEmail)`.
///
/// # Arguments
///
/// * `config` - The content source configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &SourceConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}
