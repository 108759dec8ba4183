//! MediaWiki Action API adapter
//!
//! Fetches a page's introductory extract, canonical URL, outbound links,
//! categories, and cross-language link table in a single `action=query`
//! request against one language edition.

use crate::source::{ContentSource, PageContent, SourceError, SourceFactory};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One language edition of a MediaWiki-backed content source
pub struct MediaWikiSource {
    client: Client,
    lang: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    query: Option<ApiQuery>,
}

#[derive(Debug, Deserialize)]
struct ApiQuery {
    #[serde(default)]
    pages: Vec<ApiPage>,
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    title: String,
    #[serde(default)]
    missing: bool,
    extract: Option<String>,
    fullurl: Option<String>,
    #[serde(default)]
    links: Vec<ApiTitle>,
    #[serde(default)]
    categories: Vec<ApiTitle>,
    #[serde(default)]
    langlinks: Vec<ApiLangLink>,
}

#[derive(Debug, Deserialize)]
struct ApiTitle {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiLangLink {
    lang: String,
    title: String,
}

impl MediaWikiSource {
    /// Creates a client for one language edition
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client (see `build_http_client`)
    /// * `lang` - Language code of the edition
    /// * `endpoint` - Fully resolved API endpoint for this edition
    pub fn new(client: Client, lang: &str, endpoint: &str) -> Self {
        Self {
            client,
            lang: lang.to_string(),
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl ContentSource for MediaWikiSource {
    async fn fetch_page(&self, title: &str) -> Result<Option<PageContent>, SourceError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("redirects", "1"),
                ("titles", title),
                ("prop", "extracts|info|links|categories|langlinks"),
                ("explaintext", "1"),
                ("exintro", "1"),
                ("inprop", "url"),
                ("pllimit", "max"),
                ("cllimit", "max"),
                ("lllimit", "max"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: ApiResponse = response.json().await?;

        let page = body
            .query
            .and_then(|q| q.pages.into_iter().next())
            .ok_or_else(|| SourceError::UnexpectedResponse {
                lang: self.lang.clone(),
                message: format!("no page entry in query response for '{}'", title),
            })?;

        if page.missing {
            tracing::debug!("Page '{}' missing in {} edition", title, self.lang);
            return Ok(None);
        }

        Ok(Some(PageContent {
            title: page.title,
            summary: page.extract.unwrap_or_default(),
            url: page.fullurl.unwrap_or_default(),
            langlinks: page
                .langlinks
                .into_iter()
                .map(|l| (l.lang, l.title))
                .collect(),
            links: page.links.into_iter().map(|l| l.title).collect(),
            categories: page.categories.into_iter().map(|c| c.title).collect(),
        }))
    }
}

/// Factory for per-language MediaWiki clients
///
/// Clients are memoized by language code so repeated requests for the same
/// edition share one instance, and all editions share one HTTP client.
pub struct MediaWikiFactory {
    client: Client,
    endpoint_template: String,
    instances: Mutex<HashMap<String, Arc<MediaWikiSource>>>,
}

impl MediaWikiFactory {
    /// Creates a factory from a shared HTTP client and an endpoint template
    /// containing a `{lang}` placeholder
    pub fn new(client: Client, endpoint_template: &str) -> Self {
        Self {
            client,
            endpoint_template: endpoint_template.to_string(),
            instances: Mutex::new(HashMap::new()),
        }
    }
}

impl SourceFactory for MediaWikiFactory {
    fn for_language(&self, lang: &str) -> Arc<dyn ContentSource> {
        let mut instances = self.instances.lock().unwrap();
        let source = instances.entry(lang.to_string()).or_insert_with(|| {
            let endpoint = self.endpoint_template.replace("{lang}", lang);
            tracing::debug!("Creating content source for '{}' at {}", lang, endpoint);
            Arc::new(MediaWikiSource::new(self.client.clone(), lang, &endpoint))
        });
        source.clone()
    }
}
