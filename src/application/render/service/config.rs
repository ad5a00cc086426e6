use comrak::options::Options;

/// Markdown dialect accepted in chat messages.
pub(crate) fn default_options() -> Options<'static> {
    let mut options = Options::default();
    configure_extensions(&mut options);
    options
}

fn configure_extensions(options: &mut Options<'static>) {
    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.tagfilter = false;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.math_dollars = true;

    let render = &mut options.render;
    // Single newlines in chat are line breaks.
    render.hardbreaks = true;
    // Raw HTML nodes are rewritten to escaped text before formatting.
    render.r#unsafe = true;
    render.sourcepos = false;
}

#[cfg(test)]
mod tests {
    use super::default_options;

    fn render(markdown: &str) -> String {
        comrak::markdown_to_html(markdown, &default_options())
    }

    #[test]
    fn chat_dialect_extensions_are_enabled() {
        let options = default_options();
        assert!(options.extension.strikethrough);
        assert!(options.extension.table);
        assert!(options.extension.autolink);
        assert!(options.extension.math_dollars);
        assert!(options.render.hardbreaks);
    }

    #[test]
    fn soft_breaks_render_as_line_breaks() {
        assert_eq!(render("one\ntwo"), "<p>one<br />\ntwo</p>\n");
    }

    #[test]
    fn strikethrough_is_supported() {
        assert_eq!(render("~~gone~~"), "<p><del>gone</del></p>\n");
    }
}
