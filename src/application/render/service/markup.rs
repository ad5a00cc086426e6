//! HTML fragments consumed by the chat client. Attribute names, attribute order
//! and class names are fixed; client code selects on them.

use crate::domain::references::abbreviate_sha;

pub(crate) fn mention_span(screen_name: &str, text: &str) -> String {
    format!(
        "<span data-link-type=\"mention\" data-screen-name=\"{}\" class=\"mention\">{}</span>",
        escape_attribute(screen_name),
        escape_text(text)
    )
}

pub(crate) fn group_mention_span(name: &str, text: &str) -> String {
    format!(
        "<span data-link-type=\"groupmention\" data-group-name=\"{}\" class=\"groupmention\">{}</span>",
        escape_attribute(name),
        escape_text(text)
    )
}

pub(crate) fn issue_span(number: &str, repo: Option<&str>, text: &str) -> String {
    let mut html = String::with_capacity(96 + text.len());
    html.push_str("<span data-link-type=\"issue\" data-issue=\"");
    html.push_str(&escape_attribute(number));
    html.push('"');
    if let Some(repo) = repo {
        html.push_str(" data-issue-repo=\"");
        html.push_str(&escape_attribute(repo));
        html.push('"');
    }
    html.push_str(" class=\"issue\">");
    html.push_str(&escape_text(text));
    html.push_str("</span>");
    html
}

pub(crate) fn commit_span(repo: &str, sha: &str) -> String {
    let text = format!("{repo}@{}", abbreviate_sha(sha));
    format!(
        "<span data-link-type=\"commit\" data-commit-sha=\"{}\" data-commit-repo=\"{}\" class=\"commit\">{}</span>",
        escape_attribute(sha),
        escape_attribute(repo),
        escape_text(&text)
    )
}

pub(crate) fn link_anchor(href: &str, inner_html: &str) -> String {
    format!(
        "<a href=\"{}\" rel=\"nofollow\" target=\"_blank\" class=\"link\">{inner_html}</a>",
        escape_attribute(href)
    )
}

pub(crate) fn email_anchor(href: &str, inner_html: &str) -> String {
    format!(
        "<a href=\"{}\" rel=\"nofollow\">{inner_html}</a>",
        escape_attribute(href)
    )
}

pub(crate) fn image_tag(src: &str, alt: &str) -> String {
    format!(
        "<img src=\"{}\" alt=\"{}\" rel=\"nofollow\">",
        escape_attribute(src),
        escape_attribute(alt)
    )
}

/// `highlighted` is trusted markup from the highlighter.
pub(crate) fn code_block(language: Option<&str>, highlighted: &str) -> String {
    match language {
        Some(language) => format!(
            "<pre><code class=\"{}\">{highlighted}</code></pre>",
            escape_attribute(language)
        ),
        None => format!("<pre><code>{highlighted}</code></pre>"),
    }
}

pub(crate) fn math_fallback(message: &str, source: &str) -> String {
    format!(
        "<pre><code>{}: {}</code></pre>",
        escape_text(message),
        escape_text(source)
    )
}

/// Escape text content the same way the markdown formatter does.
pub(crate) fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub(crate) fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\n' | '\r' | '\t' => escaped.push(' '),
            _ => escaped.push(ch),
        }
    }
    escaped
}
