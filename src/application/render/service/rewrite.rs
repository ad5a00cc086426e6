use comrak::{
    format_html,
    nodes::{AstNode, NodeHtmlBlock, NodeValue},
    options::Options,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::{
    application::render::types::{IssueRef, Mention, RenderError, UrlRef},
    domain::{
        links::classify_href,
        references::{Reference, ReferenceClassifier},
        shorthand::{self, Segment, Shorthand},
    },
};

use super::{highlight::CodeHighlighter, markup, math};

static HTML_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--[\s\S]*?-->").expect("comment pattern must compile"));

const MAILTO_PREFIX: &str = "mailto:";

/// Entities collected while rendering one message. Built fresh per request.
#[derive(Debug, Default)]
pub(crate) struct RenderContext {
    pub(crate) urls: Vec<UrlRef>,
    pub(crate) mentions: Vec<Mention>,
    pub(crate) issues: Vec<IssueRef>,
    pub(crate) paragraph_count: usize,
}

/// What a link becomes once its target has been classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LinkMarkup {
    /// Issue or commit reference; the link text is replaced.
    Reference(String),
    /// Ordinary anchor to the sanitised href, wrapping the link text.
    Anchor(String),
}

/// One hook per syntax construct. Every hook is total and records what it
/// sees in the borrowed [`RenderContext`].
pub(crate) struct ChatCallbacks<'r> {
    context: &'r mut RenderContext,
    classifier: &'r dyn ReferenceClassifier,
    highlighter: &'r CodeHighlighter,
}

impl<'r> ChatCallbacks<'r> {
    pub(crate) fn new(
        context: &'r mut RenderContext,
        classifier: &'r dyn ReferenceClassifier,
        highlighter: &'r CodeHighlighter,
    ) -> Self {
        Self {
            context,
            classifier,
            highlighter,
        }
    }

    pub(crate) fn code(&self, code: &str, language: Option<&str>) -> String {
        self.highlighter.render_block(language, code)
    }

    pub(crate) fn math(&self, source: &str, display_mode: bool) -> String {
        match math::render_math_html(source, display_mode) {
            Ok(html) => html,
            Err(err) => {
                warn!(
                    target = "application::render::math",
                    display_mode, "KaTeX rendering failed: {err}"
                );
                markup::math_fallback(&err.to_string(), source)
            }
        }
    }

    /// The `<p>` wrapper itself is written by the formatter.
    pub(crate) fn paragraph(&mut self) {
        self.context.paragraph_count += 1;
    }

    pub(crate) fn issue(&mut self, number: &str, repo: Option<&str>, text: &str) -> String {
        self.context.issues.push(IssueRef {
            number: number.to_string(),
            repo: repo.map(str::to_string),
        });
        markup::issue_span(number, repo, text)
    }

    pub(crate) fn commit(&self, repo: &str, sha: &str) -> String {
        markup::commit_span(repo, sha)
    }

    pub(crate) fn link(&mut self, href: &str) -> LinkMarkup {
        let href = self.sanitize(href);
        match self.classifier.classify(&href) {
            Reference::Issue {
                repo,
                id,
                display_text,
            } => LinkMarkup::Reference(self.issue(&id, repo.as_deref(), &display_text)),
            Reference::Commit { repo, sha, .. } => LinkMarkup::Reference(self.commit(&repo, &sha)),
            Reference::None => {
                self.context.urls.push(UrlRef { url: href.clone() });
                LinkMarkup::Anchor(href)
            }
        }
    }

    pub(crate) fn image(&mut self, href: &str, alt: &str) -> String {
        let href = self.sanitize(href);
        let html = markup::image_tag(&href, alt);
        self.context.urls.push(UrlRef { url: href });
        html
    }

    pub(crate) fn mention(&mut self, text: &str) -> String {
        let screen_name = text.strip_prefix('@').unwrap_or(text);
        self.context.mentions.push(Mention::user(screen_name));
        markup::mention_span(screen_name, text)
    }

    pub(crate) fn group_mention(&mut self, name: &str, text: &str) -> String {
        self.context.mentions.push(Mention::group(name));
        markup::group_mention_span(name, text)
    }

    /// The href is kept as written; sanitisation only flags illegal schemes.
    pub(crate) fn email(&mut self, href: &str, inner_html: &str) -> String {
        if classify_href(href).is_defanged() {
            warn!(
                target = "application::render::links",
                href, "email link uses an illegal scheme"
            );
        }
        self.context.urls.push(UrlRef {
            url: href.to_string(),
        });
        markup::email_anchor(href, inner_html)
    }

    fn sanitize(&self, href: &str) -> String {
        let sanitized = classify_href(href);
        if sanitized.is_defanged() {
            debug!(
                target = "application::render::links",
                "replaced unsafe link target with deterrent URL"
            );
        }
        sanitized.into_string()
    }
}

/// Rewrite the parsed document in place so the formatter emits chat markup.
pub(crate) fn rewrite_ast<'a>(
    root: &'a AstNode<'a>,
    options: &Options<'static>,
    callbacks: ChatCallbacks<'_>,
) -> Result<(), RenderError> {
    let mut walker = RewriteWalker { options, callbacks };
    walker.visit_children(root, false)
}

struct RewriteWalker<'o, 'r> {
    options: &'o Options<'static>,
    callbacks: ChatCallbacks<'r>,
}

enum NodeAction {
    Paragraph { wrapped: bool },
    CodeBlock { info: String, literal: String },
    Math { literal: String, display_mode: bool },
    Link { url: String },
    Image { url: String },
    Text(String),
    RawInline(String),
    RawBlock(String),
    Descend,
}

impl RewriteWalker<'_, '_> {
    fn visit_children<'a>(
        &mut self,
        node: &'a AstNode<'a>,
        in_link: bool,
    ) -> Result<(), RenderError> {
        merge_adjacent_text(node);

        let children: Vec<&'a AstNode<'a>> = node.children().collect();
        for child in children {
            self.visit(child, in_link)?;
        }
        Ok(())
    }

    fn visit<'a>(&mut self, node: &'a AstNode<'a>, in_link: bool) -> Result<(), RenderError> {
        match node_action(node) {
            NodeAction::Paragraph { wrapped } => {
                if wrapped {
                    self.callbacks.paragraph();
                }
                self.visit_children(node, in_link)?;
            }
            NodeAction::CodeBlock { info, literal } => {
                let language = info.split_whitespace().next();
                let html = self.callbacks.code(&literal, language);
                replace_with_block(node, html);
            }
            NodeAction::Math {
                literal,
                display_mode,
            } => {
                let html = self.callbacks.math(&literal, display_mode);
                replace_with_inline(node, html);
            }
            NodeAction::Link { url } => self.rewrite_link(node, &url)?,
            NodeAction::Image { url } => {
                let alt = collect_inline_text(node);
                let html = self.callbacks.image(&url, &alt);
                replace_with_inline(node, html);
            }
            NodeAction::Text(text) if !in_link => self.rewrite_text(node, &text),
            NodeAction::Text(_) => {}
            NodeAction::RawInline(literal) => {
                replace_with_inline(node, escape_raw_html(&literal));
            }
            NodeAction::RawBlock(literal) => {
                replace_with_block(node, escape_raw_html(&literal));
            }
            NodeAction::Descend => self.visit_children(node, in_link)?,
        }
        Ok(())
    }

    fn rewrite_link<'a>(&mut self, node: &'a AstNode<'a>, url: &str) -> Result<(), RenderError> {
        if is_email(url) {
            self.visit_children(node, true)?;
            let inner = self.render_children(node)?;
            let html = self.callbacks.email(url, &inner);
            replace_with_inline(node, html);
            return Ok(());
        }

        match self.callbacks.link(url) {
            LinkMarkup::Reference(html) => replace_with_inline(node, html),
            LinkMarkup::Anchor(href) => {
                self.visit_children(node, true)?;
                let inner = self.render_children(node)?;
                replace_with_inline(node, markup::link_anchor(&href, &inner));
            }
        }
        Ok(())
    }

    fn rewrite_text<'a>(&mut self, node: &'a AstNode<'a>, text: &str) {
        let segments = shorthand::scan(text);
        if !segments
            .iter()
            .any(|segment| matches!(segment, Segment::Shorthand(_)))
        {
            return;
        }

        let mut html = String::with_capacity(text.len() * 2);
        for segment in segments {
            match segment {
                Segment::Text(plain) => html.push_str(&markup::escape_text(plain)),
                Segment::Shorthand(Shorthand::Mention { text, .. }) => {
                    html.push_str(&self.callbacks.mention(text));
                }
                Segment::Shorthand(Shorthand::GroupMention { name, text }) => {
                    html.push_str(&self.callbacks.group_mention(name, text));
                }
                Segment::Shorthand(Shorthand::Issue { repo, number, text }) => {
                    html.push_str(&self.callbacks.issue(number, repo, text));
                }
                Segment::Shorthand(Shorthand::Commit { repo, sha }) => {
                    html.push_str(&self.callbacks.commit(repo, sha));
                }
            }
        }

        replace_with_inline(node, html);
    }

    fn render_children<'a>(&self, node: &'a AstNode<'a>) -> Result<String, RenderError> {
        let mut html = String::new();
        for child in node.children() {
            format_html(child, self.options, &mut html).map_err(|err| RenderError::Format {
                message: err.to_string(),
            })?;
        }
        Ok(html)
    }
}

fn node_action(node: &AstNode<'_>) -> NodeAction {
    let data = node.data.borrow();
    match &data.value {
        NodeValue::Paragraph => NodeAction::Paragraph {
            wrapped: !in_tight_list(node),
        },
        NodeValue::CodeBlock(block) => NodeAction::CodeBlock {
            info: block.info.trim().to_string(),
            literal: block.literal.clone(),
        },
        NodeValue::Math(math) => NodeAction::Math {
            literal: math.literal.clone(),
            display_mode: math.display_math,
        },
        NodeValue::Link(link) => NodeAction::Link {
            url: link.url.clone(),
        },
        NodeValue::Image(link) => NodeAction::Image {
            url: link.url.clone(),
        },
        NodeValue::Text(text) => NodeAction::Text(text.to_string()),
        NodeValue::HtmlInline(literal) => NodeAction::RawInline(literal.clone()),
        NodeValue::HtmlBlock(block) => NodeAction::RawBlock(block.literal.clone()),
        _ => NodeAction::Descend,
    }
}

/// Paragraphs directly inside a tight list item render without `<p>`.
fn in_tight_list(paragraph: &AstNode<'_>) -> bool {
    let Some(list) = paragraph.parent().and_then(|item| item.parent()) else {
        return false;
    };
    let data = list.data.borrow();
    matches!(&data.value, NodeValue::List(list) if list.tight)
}

fn is_email(url: &str) -> bool {
    url.get(..MAILTO_PREFIX.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(MAILTO_PREFIX))
}

/// Raw HTML authored in a message is shown as text, minus comments.
fn escape_raw_html(literal: &str) -> String {
    markup::escape_text(&HTML_COMMENT.replace_all(literal, ""))
}

fn replace_with_inline(node: &AstNode<'_>, html: String) {
    node.data.borrow_mut().value = NodeValue::HtmlInline(html);
    detach_children(node);
}

fn replace_with_block(node: &AstNode<'_>, html: String) {
    node.data.borrow_mut().value = NodeValue::HtmlBlock(NodeHtmlBlock {
        block_type: 0,
        literal: html,
    });
    detach_children(node);
}

fn detach_children(node: &AstNode<'_>) {
    while let Some(child) = node.first_child() {
        child.detach();
    }
}

/// The parser may split one run of text into several nodes.
fn merge_adjacent_text(node: &AstNode<'_>) {
    let mut current = node.first_child();
    while let Some(this) = current {
        let Some(next) = this.next_sibling() else {
            break;
        };

        let appended = {
            let next_data = next.data.borrow();
            match &next_data.value {
                NodeValue::Text(tail) => Some(tail.to_string()),
                _ => None,
            }
        };

        let merged = match appended {
            Some(tail) => {
                let mut data = this.data.borrow_mut();
                let joined = match &data.value {
                    NodeValue::Text(head) => Some(format!("{head}{tail}")),
                    _ => None,
                };
                match joined {
                    Some(joined) => {
                        data.value = NodeValue::Text(joined.into());
                        true
                    }
                    None => false,
                }
            }
            None => false,
        };

        if merged {
            next.detach();
        } else {
            current = Some(next);
        }
    }
}

fn collect_inline_text(node: &AstNode<'_>) -> String {
    fn walk(node: &AstNode<'_>, buffer: &mut String) {
        {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Text(text) => buffer.push_str(text),
                NodeValue::Code(code) => buffer.push_str(&code.literal),
                NodeValue::LineBreak | NodeValue::SoftBreak => buffer.push(' '),
                _ => {}
            }
        }
        let mut child = node.first_child();
        while let Some(next) = child {
            walk(next, buffer);
            child = next.next_sibling();
        }
    }

    let mut buffer = String::new();
    walk(node, &mut buffer);
    buffer
}
