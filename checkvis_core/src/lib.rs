#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod router;

pub use router::{
    CommandRouter, DefineError, Reply, ReplyFormat, Request, WELCOME_TEXT, escape_markdown,
    is_case_number, is_word,
};

/// A user-chosen word bound to a case number, scoped to one messaging account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub user_id: i64,
    pub word: String,
    pub case_number: String,
}

/// Outcome of one status-page lookup.
///
/// Failures are carried as a single-line `short_summary` with an empty
/// `detailed_summary`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// Status line plus update-date line, with inline emphasis markers.
    pub short_summary: String,
    /// Every (label, value) row of the status table.
    pub detailed_summary: String,
}

impl ScrapeResult {
    pub fn new(short_summary: impl Into<String>, detailed_summary: impl Into<String>) -> Self {
        Self {
            short_summary: short_summary.into(),
            detailed_summary: detailed_summary.into(),
        }
    }

    /// A one-line result with no detail, used for every failure path.
    pub fn message(text: impl Into<String>) -> Self {
        Self::new(text, String::new())
    }
}

/// Resolves a case number to its current status. Never fails.
#[async_trait]
pub trait CaseLookup: Send + Sync {
    async fn lookup(&self, case_number: &str) -> ScrapeResult;
}

/// Persistence of (user, word) -> case number associations.
///
/// Both operations swallow storage errors: `put` reports them as `false`,
/// `get` as not found.
#[async_trait]
pub trait AssociationRepo: Send + Sync {
    async fn put(&self, user_id: i64, word: &str, case_number: &str) -> bool;
    async fn get(&self, user_id: i64, word: &str) -> Option<String>;
}

#[async_trait]
impl<T: CaseLookup + ?Sized> CaseLookup for Arc<T> {
    async fn lookup(&self, case_number: &str) -> ScrapeResult {
        (**self).lookup(case_number).await
    }
}

#[async_trait]
impl<T: AssociationRepo + ?Sized> AssociationRepo for Arc<T> {
    async fn put(&self, user_id: i64, word: &str, case_number: &str) -> bool {
        (**self).put(user_id, word, case_number).await
    }

    async fn get(&self, user_id: i64, word: &str) -> Option<String> {
        (**self).get(user_id, word).await
    }
}
