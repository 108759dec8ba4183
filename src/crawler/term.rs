//! Per-term crawl with language fan-out
//!
//! Crawling one term always starts from the base-language page: if that
//! page does not exist the whole term fails, and no other language is
//! fetched. Secondary languages resolve through the base page's
//! cross-language link table; a missing link or missing page there is not
//! an error, it degrades to a sentinel result. Associations are extracted
//! from the base-language page only.

use crate::lang;
use crate::lang::VariantNormalizer;
use crate::source::{PageContent, SourceError, SourceFactory};
use crate::storage::{
    AssociationKind, AssociationSeed, LangResult, SqliteStore, StorageError, TaskStore, TermRecord,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Maximum summary length in characters before truncation
const SUMMARY_MAX_CHARS: usize = 1000;

/// Marker appended to truncated summaries
const TRUNCATION_MARKER: &str = "...";

/// Cap on link associations extracted per page
const MAX_LINK_ASSOCIATIONS: usize = 20;

/// Sentinel summary recorded when a language has no usable translation
pub const TRANSLATION_NOT_FOUND: &str = "Translation not found.";

/// Administrative/meta category prefixes that never become associations
const CATEGORY_DENYLIST: &[&str] = &[
    "Category:All articles",
    "Category:Articles",
    "Category:Webarchive",
    "Category:CS1",
];

const CATEGORY_PREFIX: &str = "Category:";

/// Errors that fail a whole term
#[derive(Debug, Error)]
pub enum TermCrawlError {
    #[error("Term '{0}' not found in the base-language edition")]
    BaseNotFound(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The in-memory result of one successful term crawl
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Language code -> persisted result
    pub results: BTreeMap<String, LangResult>,

    /// Associations extracted from the base-language page
    pub associations: Vec<AssociationSeed>,
}

/// Crawls single terms across the task's target languages
pub struct TermCrawler {
    store: Arc<Mutex<SqliteStore>>,
    sources: Arc<dyn SourceFactory>,
    normalizer: Arc<dyn VariantNormalizer>,
    base_language: String,
}

impl TermCrawler {
    pub fn new(
        store: Arc<Mutex<SqliteStore>>,
        sources: Arc<dyn SourceFactory>,
        normalizer: Arc<dyn VariantNormalizer>,
        base_language: &str,
    ) -> Self {
        Self {
            store,
            sources,
            normalizer,
            base_language: base_language.to_string(),
        }
    }

    /// Crawls one term and persists the outcome
    ///
    /// On success the per-language results, the associations, and the
    /// `completed` status are written. On failure the term is marked
    /// `failed` with the error message and nothing else is saved; the error
    /// is returned for the scheduler to log.
    pub async fn crawl(
        &self,
        term: &TermRecord,
        target_languages: &[String],
    ) -> Result<CrawlOutcome, TermCrawlError> {
        {
            let mut store = self.store.lock().unwrap();
            store.mark_term_crawling(term.id)?;
        }

        match self.fetch_term(&term.term, target_languages).await {
            Ok(outcome) => {
                let mut store = self.store.lock().unwrap();
                if !outcome.associations.is_empty() {
                    store.save_associations(term.id, &outcome.associations)?;
                }
                store.complete_term(term.id, &outcome.results)?;
                Ok(outcome)
            }
            Err(e) => {
                let mut store = self.store.lock().unwrap();
                if let Err(persist_err) = store.fail_term(term.id, &e.to_string()) {
                    tracing::error!(
                        "Could not record failure for term {}: {}",
                        term.id,
                        persist_err
                    );
                }
                Err(e)
            }
        }
    }

    /// Fetches the term's content across all target languages
    async fn fetch_term(
        &self,
        term: &str,
        target_languages: &[String],
    ) -> Result<CrawlOutcome, TermCrawlError> {
        let base_source = self.sources.for_language(&self.base_language);
        let base_page = base_source
            .fetch_page(term)
            .await?
            .ok_or_else(|| TermCrawlError::BaseNotFound(term.to_string()))?;

        let base_result = LangResult {
            summary: truncate_summary(&base_page.summary),
            url: base_page.url.clone(),
        };

        let mut results = BTreeMap::new();
        // Script variants share one canonical edition; fetch it once per term
        let mut canonical_cache: HashMap<String, Option<LangResult>> = HashMap::new();

        for code in target_languages {
            if code == &self.base_language {
                results.insert(code.clone(), base_result.clone());
                continue;
            }

            let canonical = lang::canonical_code(code);
            let fetched = match canonical_cache.get(canonical) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.fetch_translation(&base_page, canonical).await?;
                    canonical_cache.insert(canonical.to_string(), fetched.clone());
                    fetched
                }
            };

            let result = match fetched {
                Some(translation) => self.localize(translation, code),
                None => LangResult {
                    summary: TRANSLATION_NOT_FOUND.to_string(),
                    url: String::new(),
                },
            };
            results.insert(code.clone(), result);
        }

        Ok(CrawlOutcome {
            results,
            associations: extract_associations(&base_page),
        })
    }

    /// Resolves and fetches a term's page in another canonical edition
    ///
    /// Returns None when the base page has no cross-language link for the
    /// edition, or the linked page does not exist there.
    async fn fetch_translation(
        &self,
        base_page: &PageContent,
        canonical: &str,
    ) -> Result<Option<LangResult>, TermCrawlError> {
        let title = match base_page.langlinks.get(canonical) {
            Some(title) => title,
            None => return Ok(None),
        };

        let source = self.sources.for_language(canonical);
        let page = match source.fetch_page(title).await? {
            Some(page) => page,
            None => return Ok(None),
        };

        Ok(Some(LangResult {
            summary: truncate_summary(&page.summary),
            url: page.url,
        }))
    }

    /// Converts a fetched translation into the requested script variant
    ///
    /// Normalization failure degrades to the unconverted text rather than
    /// failing the term.
    fn localize(&self, translation: LangResult, code: &str) -> LangResult {
        let variant = match lang::script_variant(code) {
            Some(variant) => variant,
            None => return translation,
        };

        match self.normalizer.normalize(&translation.summary, variant) {
            Ok(summary) => LangResult {
                summary,
                url: translation.url,
            },
            Err(e) => {
                tracing::warn!("Script normalization for '{}' failed: {}", code, e);
                translation
            }
        }
    }
}

/// Truncates a summary to the storage bound, appending a marker when
/// content was dropped
fn truncate_summary(text: &str) -> String {
    if text.chars().count() > SUMMARY_MAX_CHARS {
        let mut truncated: String = text.chars().take(SUMMARY_MAX_CHARS).collect();
        truncated.push_str(TRUNCATION_MARKER);
        truncated
    } else {
        text.to_string()
    }
}

/// Extracts associations from a base-language page
///
/// Categories outside the administrative denylist are kept with their
/// namespace prefix stripped; non-namespaced outbound links are kept up to
/// a fixed cap.
fn extract_associations(page: &PageContent) -> Vec<AssociationSeed> {
    let mut associations = Vec::new();

    for cat_title in &page.categories {
        if CATEGORY_DENYLIST
            .iter()
            .any(|prefix| cat_title.starts_with(prefix))
        {
            continue;
        }
        let clean = cat_title.strip_prefix(CATEGORY_PREFIX).unwrap_or(cat_title);
        associations.push(AssociationSeed {
            target_term: clean.to_string(),
            kind: AssociationKind::Category,
        });
    }

    let mut link_count = 0;
    for title in &page.links {
        if link_count >= MAX_LINK_ASSOCIATIONS {
            break;
        }
        // Skip namespaced titles
        if !title.contains(':') {
            associations.push(AssociationSeed {
                target_term: title.clone(),
                kind: AssociationKind::Link,
            });
            link_count += 1;
        }
    }

    associations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::TableNormalizer;
    use crate::source::ContentSource;
    use crate::state::TermStatus;
    use async_trait::async_trait;

    /// Scripted content source serving pages from a fixed map
    struct StaticSource {
        pages: HashMap<String, PageContent>,
    }

    #[async_trait]
    impl ContentSource for StaticSource {
        async fn fetch_page(&self, title: &str) -> Result<Option<PageContent>, SourceError> {
            Ok(self.pages.get(title).cloned())
        }
    }

    /// Factory serving a scripted source per language
    struct StaticFactory {
        editions: HashMap<String, Arc<StaticSource>>,
    }

    impl StaticFactory {
        fn new() -> Self {
            Self {
                editions: HashMap::new(),
            }
        }

        fn with_page(mut self, lang: &str, title: &str, page: PageContent) -> Self {
            let edition = self
                .editions
                .entry(lang.to_string())
                .or_insert_with(|| {
                    Arc::new(StaticSource {
                        pages: HashMap::new(),
                    })
                });
            Arc::get_mut(edition).unwrap().pages.insert(title.to_string(), page);
            self
        }
    }

    impl SourceFactory for StaticFactory {
        fn for_language(&self, lang: &str) -> Arc<dyn ContentSource> {
            match self.editions.get(lang) {
                Some(edition) => edition.clone(),
                None => Arc::new(StaticSource {
                    pages: HashMap::new(),
                }),
            }
        }
    }

    fn dog_page() -> PageContent {
        PageContent {
            title: "Dog".to_string(),
            summary: "The dog is a domesticated descendant of the wolf.".to_string(),
            url: "https://en.wikipedia.org/wiki/Dog".to_string(),
            langlinks: HashMap::from([("zh".to_string(), "犬".to_string())]),
            links: vec!["Wolf".to_string(), "Canidae".to_string()],
            categories: vec![
                "Category:Dogs".to_string(),
                "Category:All articles with short description".to_string(),
            ],
        }
    }

    fn setup(
        factory: StaticFactory,
        seed: &str,
    ) -> (Arc<Mutex<SqliteStore>>, TermCrawler, TermRecord) {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let task_id = store
            .create_task(
                &[seed.to_string()],
                0,
                1,
                10,
                &["en".to_string(), "zh".to_string()],
            )
            .unwrap();
        let term = store.pending_terms(task_id).unwrap().remove(0);

        let store = Arc::new(Mutex::new(store));
        let crawler = TermCrawler::new(
            store.clone(),
            Arc::new(factory),
            Arc::new(TableNormalizer::new()),
            "en",
        );
        (store, crawler, term)
    }

    #[test]
    fn test_truncate_summary_short() {
        assert_eq!(truncate_summary("short"), "short");
    }

    #[test]
    fn test_truncate_summary_exact_boundary() {
        let text = "a".repeat(1000);
        assert_eq!(truncate_summary(&text), text);
    }

    #[test]
    fn test_truncate_summary_over_boundary() {
        let text = "a".repeat(1001);
        let truncated = truncate_summary(&text);
        assert_eq!(truncated.chars().count(), 1003);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_truncate_summary_counts_chars_not_bytes() {
        let text = "犬".repeat(1000);
        assert_eq!(truncate_summary(&text), text);
    }

    #[test]
    fn test_extract_associations_filters_denylist() {
        let page = PageContent {
            categories: vec![
                "Category:Dogs".to_string(),
                "Category:All articles with short description".to_string(),
                "Category:Articles with hCards".to_string(),
                "Category:Webarchive template wayback links".to_string(),
                "Category:CS1 maint: archived copy".to_string(),
            ],
            ..Default::default()
        };

        let associations = extract_associations(&page);
        assert_eq!(associations.len(), 1);
        assert_eq!(associations[0].target_term, "Dogs");
        assert_eq!(associations[0].kind, AssociationKind::Category);
    }

    #[test]
    fn test_extract_associations_caps_links_and_skips_namespaces() {
        let mut links: Vec<String> = (0..30).map(|i| format!("Link {}", i)).collect();
        links.insert(0, "Template:Infobox".to_string());
        links.insert(5, "Help:Contents".to_string());

        let page = PageContent {
            links,
            ..Default::default()
        };

        let associations = extract_associations(&page);
        let link_targets: Vec<&str> = associations
            .iter()
            .filter(|a| a.kind == AssociationKind::Link)
            .map(|a| a.target_term.as_str())
            .collect();

        assert_eq!(link_targets.len(), 20);
        assert!(!link_targets.iter().any(|t| t.contains(':')));
        assert_eq!(link_targets[0], "Link 0");
    }

    #[tokio::test]
    async fn test_crawl_success_with_translation() {
        let factory = StaticFactory::new()
            .with_page("en", "Dog", dog_page())
            .with_page(
                "zh",
                "犬",
                PageContent {
                    title: "犬".to_string(),
                    summary: "犬是狼的驯化后代。".to_string(),
                    url: "https://zh.wikipedia.org/wiki/犬".to_string(),
                    ..Default::default()
                },
            );
        let (store, crawler, term) = setup(factory, "Dog");

        let outcome = crawler
            .crawl(&term, &["en".to_string(), "zh".to_string()])
            .await
            .unwrap();

        assert_eq!(
            outcome.results.get("en").unwrap().url,
            "https://en.wikipedia.org/wiki/Dog"
        );
        assert!(outcome.results.get("zh").unwrap().summary.contains('犬'));

        let stored = store.lock().unwrap().get_term(term.id).unwrap();
        assert_eq!(stored.status, TermStatus::Completed);
        assert_eq!(stored.results.len(), 2);

        let associations = store.lock().unwrap().associations_for_term(term.id).unwrap();
        assert!(!associations.is_empty());
    }

    #[tokio::test]
    async fn test_crawl_missing_langlink_records_sentinel() {
        let mut page = dog_page();
        page.langlinks.clear();
        let factory = StaticFactory::new().with_page("en", "Dog", page);
        let (store, crawler, term) = setup(factory, "Dog");

        let outcome = crawler
            .crawl(&term, &["en".to_string(), "zh".to_string()])
            .await
            .unwrap();

        let zh = outcome.results.get("zh").unwrap();
        assert_eq!(zh.summary, TRANSLATION_NOT_FOUND);
        assert_eq!(zh.url, "");

        // The term still completes
        let stored = store.lock().unwrap().get_term(term.id).unwrap();
        assert_eq!(stored.status, TermStatus::Completed);
    }

    #[tokio::test]
    async fn test_crawl_missing_linked_page_records_sentinel() {
        // Langlink exists but the zh edition has no such page
        let factory = StaticFactory::new().with_page("en", "Dog", dog_page());
        let (_store, crawler, term) = setup(factory, "Dog");

        let outcome = crawler
            .crawl(&term, &["en".to_string(), "zh".to_string()])
            .await
            .unwrap();

        assert_eq!(
            outcome.results.get("zh").unwrap().summary,
            TRANSLATION_NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_crawl_variants_share_one_fetch_and_differ_by_script() {
        let factory = StaticFactory::new()
            .with_page("en", "Dog", dog_page())
            .with_page(
                "zh",
                "犬",
                PageContent {
                    title: "犬".to_string(),
                    summary: "简体说明".to_string(),
                    url: "https://zh.wikipedia.org/wiki/犬".to_string(),
                    ..Default::default()
                },
            );
        let (_store, crawler, term) = setup(factory, "Dog");

        let outcome = crawler
            .crawl(
                &term,
                &["en".to_string(), "zh".to_string(), "zh-tw".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(outcome.results.get("zh").unwrap().summary, "简体说明");
        assert_eq!(outcome.results.get("zh-tw").unwrap().summary, "簡體說明");
        assert_eq!(
            outcome.results.get("zh").unwrap().url,
            outcome.results.get("zh-tw").unwrap().url
        );
    }

    #[tokio::test]
    async fn test_crawl_missing_base_page_fails_term() {
        let factory = StaticFactory::new();
        let (store, crawler, term) = setup(factory, "Nonexistent");

        let result = crawler.crawl(&term, &["en".to_string()]).await;
        assert!(matches!(result, Err(TermCrawlError::BaseNotFound(_))));

        let stored = store.lock().unwrap().get_term(term.id).unwrap();
        assert_eq!(stored.status, TermStatus::Failed);
        assert!(stored
            .error_message
            .as_deref()
            .unwrap()
            .contains("not found"));

        // No associations persisted for failed terms
        let associations = store.lock().unwrap().associations_for_term(term.id).unwrap();
        assert!(associations.is_empty());
    }

    #[tokio::test]
    async fn test_crawl_failure_is_idempotent() {
        let factory = StaticFactory::new();
        let (store, crawler, term) = setup(factory, "Nonexistent");

        let first = crawler.crawl(&term, &["en".to_string()]).await;
        let first_message = first.unwrap_err().to_string();

        store.lock().unwrap().reset_failed_terms(term.task_id).unwrap();
        let second = crawler.crawl(&term, &["en".to_string()]).await;
        assert_eq!(second.unwrap_err().to_string(), first_message);
    }

    #[tokio::test]
    async fn test_crawl_truncates_long_summaries() {
        let mut page = dog_page();
        page.summary = "x".repeat(1500);
        page.langlinks.clear();
        let factory = StaticFactory::new().with_page("en", "Dog", page);
        let (_store, crawler, term) = setup(factory, "Dog");

        let outcome = crawler.crawl(&term, &["en".to_string()]).await.unwrap();
        let summary = &outcome.results.get("en").unwrap().summary;
        assert_eq!(summary.chars().count(), 1003);
        assert!(summary.ends_with("..."));
    }
}
