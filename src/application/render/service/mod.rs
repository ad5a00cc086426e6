mod config;
mod highlight;
mod markup;
mod math;
mod rewrite;

use std::sync::Arc;

use comrak::{Arena, format_html, nodes::AstNode, parse_document};
use once_cell::sync::Lazy;
use tracing::{trace, warn};

use crate::application::render::types::{ChatRenderer, ProcessedChat, RenderError};
use crate::domain::references::{GithubUrlClassifier, ReferenceClassifier};

use config::default_options;
use highlight::CodeHighlighter;
use rewrite::{ChatCallbacks, RenderContext, rewrite_ast};

/// Chat pipeline: comrak parsing, callback rewrite, syntect and KaTeX collaborators.
pub struct ComrakChatRenderer {
    options: comrak::Options<'static>,
    highlighter: CodeHighlighter,
    classifier: Box<dyn ReferenceClassifier>,
}

impl ComrakChatRenderer {
    /// Renderer that recognises `github.com` issue and commit links.
    pub fn new() -> Self {
        Self::with_classifier(GithubUrlClassifier::default())
    }

    pub fn with_classifier(classifier: impl ReferenceClassifier + 'static) -> Self {
        Self {
            options: default_options(),
            highlighter: CodeHighlighter::new(),
            classifier: Box::new(classifier),
        }
    }

    fn try_render(&self, text: &str) -> Result<ProcessedChat, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, text, &self.options);

        let mut context = RenderContext::default();
        rewrite_stage(
            root,
            &self.options,
            &mut context,
            self.classifier.as_ref(),
            &self.highlighter,
        )?;

        let rendered_html = render_html_stage(root, &self.options)?;
        let html = unwrap_stage(rendered_html, context.paragraph_count);

        trace!(
            target = "application::render::pipeline",
            paragraphs = context.paragraph_count,
            urls = context.urls.len(),
            mentions = context.mentions.len(),
            issues = context.issues.len(),
            "chat message rendered"
        );

        let RenderContext {
            urls,
            mentions,
            issues,
            ..
        } = context;

        Ok(ProcessedChat {
            text: text.to_string(),
            html,
            urls,
            mentions,
            issues,
        })
    }
}

impl Default for ComrakChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatRenderer for ComrakChatRenderer {
    fn render(&self, text: &str) -> ProcessedChat {
        self.try_render(text).unwrap_or_else(|err| {
            warn!(
                target = "application::render::pipeline",
                error = %err,
                "falling back to escaped text"
            );
            ProcessedChat {
                text: text.to_string(),
                html: markup::escape_text(text),
                urls: Vec::new(),
                mentions: Vec::new(),
                issues: Vec::new(),
            }
        })
    }
}

static CHAT_RENDERER: Lazy<Arc<ComrakChatRenderer>> =
    Lazy::new(|| Arc::new(ComrakChatRenderer::new()));

/// Access the shared renderer instance, initialised on first use.
pub fn chat_renderer() -> Arc<ComrakChatRenderer> {
    Arc::clone(&CHAT_RENDERER)
}

/// Render one chat message with the shared renderer.
pub fn process_chat(text: &str) -> ProcessedChat {
    CHAT_RENDERER.render(text)
}

fn rewrite_stage<'a>(
    root: &'a AstNode<'a>,
    options: &comrak::Options<'static>,
    context: &mut RenderContext,
    classifier: &dyn ReferenceClassifier,
    highlighter: &CodeHighlighter,
) -> Result<(), RenderError> {
    rewrite_ast(root, options, ChatCallbacks::new(context, classifier, highlighter))
}

fn render_html_stage<'a>(
    root: &'a AstNode<'a>,
    options: &comrak::Options<'static>,
) -> Result<String, RenderError> {
    let mut html = String::new();
    format_html(root, options, &mut html).map_err(|err| RenderError::Format {
        message: err.to_string(),
    })?;
    Ok(html)
}

/// A message that is a single paragraph renders inline.
fn unwrap_stage(html: String, paragraph_count: usize) -> String {
    if paragraph_count == 1 {
        html.replace("<p>", "").replace("</p>", "")
    } else {
        html
    }
}
