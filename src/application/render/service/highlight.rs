use once_cell::sync::Lazy;
use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};
use thiserror::Error;
use tracing::warn;

use super::markup;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

#[derive(Debug, Clone, Error)]
#[error("syntax highlighting failed: {language}: {message}")]
pub(crate) struct HighlightError {
    language: String,
    message: String,
}

/// Class-based syntax highlighting for fenced code blocks.
pub(crate) struct CodeHighlighter {
    syntax_set: &'static SyntaxSet,
    class_style: ClassStyle,
}

impl CodeHighlighter {
    pub(crate) fn new() -> Self {
        Self {
            syntax_set: &SYNTAX_SET,
            class_style: ClassStyle::Spaced,
        }
    }

    /// Render a complete `<pre><code>` block. A recognised hint becomes the
    /// code class; anything else falls back to first-line detection.
    pub(crate) fn render_block(&self, language_hint: Option<&str>, code: &str) -> String {
        let hint = language_hint
            .map(|hint| hint.trim().to_lowercase())
            .filter(|hint| !hint.is_empty());

        if let Some(language) = hint {
            if let Some(syntax) = self.find_syntax(&language) {
                let body = self.highlight_or_escape(syntax, &language, code);
                return markup::code_block(Some(&language), &body);
            }
        }

        markup::code_block(None, &self.highlight_auto(code))
    }

    fn highlight_auto(&self, code: &str) -> String {
        let first_line = code.lines().next().unwrap_or_default();
        match self.syntax_set.find_syntax_by_first_line(first_line) {
            Some(syntax) => self.highlight_or_escape(syntax, &syntax.name, code),
            None => markup::escape_text(code),
        }
    }

    fn highlight_or_escape(&self, syntax: &SyntaxReference, language: &str, code: &str) -> String {
        self.highlight(syntax, language, code).unwrap_or_else(|err| {
            warn!(target = "application::render::highlight", "{err}");
            markup::escape_text(code)
        })
    }

    fn highlight(
        &self,
        syntax: &SyntaxReference,
        language: &str,
        code: &str,
    ) -> Result<String, HighlightError> {
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, self.syntax_set, self.class_style);

        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|err| HighlightError {
                    language: language.to_string(),
                    message: err.to_string(),
                })?;
        }

        Ok(generator.finalize())
    }

    fn find_syntax(&self, token: &str) -> Option<&'static SyntaxReference> {
        self.syntax_set
            .find_syntax_by_token(token)
            .or_else(|| self.syntax_set.find_syntax_by_name(token))
            .or_else(|| self.syntax_set.find_syntax_by_extension(token))
    }
}

impl Default for CodeHighlighter {
    fn default() -> Self {
        Self::new()
    }
}
