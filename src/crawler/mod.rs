//! Batch crawler module
//!
//! This module contains the core batch crawl machinery, including:
//! - The per-task scheduling loop with cooperative cancellation
//! - Per-term crawling with language fan-out
//! - The depth expansion policy
//! - The process-wide registry of in-flight task runs
//! - Pacing between consecutive fetches

mod expansion;
mod pacing;
mod registry;
mod scheduler;
mod service;
mod term;

pub use expansion::select_expansion_terms;
pub use pacing::{FixedDelay, NoDelay, Pacer};
pub use registry::TaskRegistry;
pub use scheduler::BatchCrawler;
pub use service::{CrawlService, TaskOptions};
pub use term::{CrawlOutcome, TermCrawlError, TermCrawler, TRANSLATION_NOT_FOUND};
