//! Chat message rendering.
//!
//! The pipeline is pure: it accepts one message, produces deterministic HTML
//! plus the entities referenced in it, and never fails. Collaborators that hold
//! no per-message state (parser options, syntax definitions, the classifier) are
//! shared; everything collected while rendering lives in a per-call context.

mod service;
mod types;

pub use service::{ComrakChatRenderer, chat_renderer, process_chat};
pub use types::{ChatRenderer, IssueRef, Mention, ProcessedChat, RenderError, UrlRef};
