use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the chatmark binary.
#[derive(Debug, Parser)]
#[command(
    name = "chatmark",
    version,
    about = "Render chat messages to HTML and extract mentions, issues and links",
    args_conflicts_with_subcommands = true
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "CHATMARK_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub render: RenderArgs,
}

impl CliArgs {
    /// Arguments of the effective command; `render` is the default.
    pub fn render_args(&self) -> &RenderArgs {
        match &self.command {
            Some(Command::Render(args)) => args,
            None => &self.render,
        }
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render one message and print the result as JSON.
    Render(RenderArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub overrides: RenderOverrides,

    /// Message file; standard input is read when omitted.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Host whose issue and commit URLs render as references.
    #[arg(long = "github-host", value_name = "HOST")]
    pub github_host: Option<String>,

    /// Pretty-print the JSON result.
    #[arg(
        long = "pretty",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub pretty: Option<bool>,
}
