use katex::{OptsBuilder, OutputType};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub(crate) enum MathError {
    #[error("failed to build KaTeX options: {0}")]
    Options(String),
    #[error("{0}")]
    Render(String),
}

/// Render a TeX expression to HTML. Invalid input is an error, not inline red text.
pub(crate) fn render_math_html(literal: &str, display_mode: bool) -> Result<String, MathError> {
    let mut builder = OptsBuilder::default();
    builder.display_mode(display_mode);
    builder.output_type(OutputType::Html);

    let opts = builder
        .build()
        .map_err(|err| MathError::Options(err.to_string()))?;

    katex::render_with_opts(literal, opts).map_err(|err| MathError::Render(err.to_string()))
}
