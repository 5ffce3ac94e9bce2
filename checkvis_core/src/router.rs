//! Per-message dispatch over the three bot handlers.
//!
//! The router is stateless between messages: every request is validated,
//! routed to storage and/or the status lookup, and turned into at most one
//! reply.

use crate::{Association, AssociationRepo, CaseLookup};
use thiserror::Error;
use tracing::{info, warn};

pub const WELCOME_TEXT: &str = "Welcome to the Case Analysis Bot! Please send me a case number.";

/// An inbound message, already classified by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `/start`
    Start,
    /// `/define` with its whitespace-separated arguments.
    Define { args: Vec<String> },
    /// Any non-command text.
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFormat {
    Plain,
    /// Lightweight markup: `*bold*` and `_italic_`.
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub format: ReplyFormat,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: ReplyFormat::Plain,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: ReplyFormat::Markdown,
        }
    }
}

/// Rejection reasons for `/define`, displayed verbatim to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DefineError {
    #[error("Usage: /define <word> <case_number>")]
    Usage,
    #[error("The word should start with an alphabetic character.")]
    InvalidWord,
    #[error("The case number should contain only digits.")]
    InvalidCaseNumber,
}

/// Non-empty and made of ASCII digits only.
#[must_use]
pub fn is_case_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Starts with an alphabetic character.
#[must_use]
pub fn is_word(s: &str) -> bool {
    s.chars().next().is_some_and(char::is_alphabetic)
}

/// Backslash-escape the characters that open a Markdown entity.
#[must_use]
pub fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl Association {
    /// Validate `/define` arguments in order: count, word, case number.
    pub fn from_define_args(user_id: i64, args: &[String]) -> Result<Self, DefineError> {
        let [word, case_number] = args else {
            return Err(DefineError::Usage);
        };
        if !is_word(word) {
            return Err(DefineError::InvalidWord);
        }
        if !is_case_number(case_number) {
            return Err(DefineError::InvalidCaseNumber);
        }
        Ok(Self {
            user_id,
            word: word.clone(),
            case_number: case_number.clone(),
        })
    }
}

pub struct CommandRouter<R, L> {
    repo: R,
    lookup: L,
}

impl<R: AssociationRepo, L: CaseLookup> CommandRouter<R, L> {
    pub const fn new(repo: R, lookup: L) -> Self {
        Self { repo, lookup }
    }

    /// Handle one request from `user_id`.
    ///
    /// Returns `None` only when a valid `/define` could not be stored.
    pub async fn route(&self, user_id: i64, request: Request) -> Option<Reply> {
        match request {
            Request::Start => {
                info!("[{user_id}] Command: /start");
                Some(Reply::plain(WELCOME_TEXT))
            }
            Request::Define { args } => {
                info!("[{user_id}] Command: /define {}", args.join(" "));
                self.define(user_id, &args).await
            }
            Request::Text(text) => {
                info!("[{user_id}] Message: {text}");
                Some(self.free_text(user_id, text.trim()).await)
            }
        }
    }

    async fn define(&self, user_id: i64, args: &[String]) -> Option<Reply> {
        let association = match Association::from_define_args(user_id, args) {
            Ok(a) => a,
            Err(e) => return Some(Reply::plain(e.to_string())),
        };

        if self
            .repo
            .put(user_id, &association.word, &association.case_number)
            .await
        {
            Some(Reply::plain(format!(
                "Learned: {} => {}",
                association.word, association.case_number
            )))
        } else {
            warn!("[{user_id}] Failed to store '{}'", association.word);
            None
        }
    }

    async fn free_text(&self, user_id: i64, text: &str) -> Reply {
        if is_case_number(text) {
            let result = self.lookup.lookup(text).await;
            return Reply::markdown(format!("{text}\n{}", result.short_summary));
        }

        let Some(case_number) = self.repo.get(user_id, text).await else {
            return Reply::plain(format!("No association found for '{text}'"));
        };

        let result = self.lookup.lookup(&case_number).await;
        Reply::markdown(format!(
            "{} ({case_number})\n{}",
            escape_markdown(text),
            result.short_summary
        ))
    }
}
