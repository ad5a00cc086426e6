//! Chat message rendering with entity extraction.
//!
//! ```
//! let result = chatmark::process_chat("ping @alice about #42");
//! assert_eq!(result.mentions[0].screen_name, "alice");
//! assert_eq!(result.issues[0].number, "42");
//! assert!(!result.html.contains("<p>"));
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;

pub use application::render::{
    ChatRenderer, ComrakChatRenderer, IssueRef, Mention, ProcessedChat, UrlRef, chat_renderer,
    process_chat,
};
pub use domain::links::{DETERRENT_URL, SanitizedHref, classify_href, sanitize_href};
pub use domain::references::{GithubUrlClassifier, Reference, ReferenceClassifier};
