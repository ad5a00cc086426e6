use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
    process,
};

use chatmark::{
    ChatRenderer, ComrakChatRenderer, GithubUrlClassifier, ProcessedChat,
    application::error::AppError,
    config,
    infra::{error::InfraError, telemetry},
};
use tracing::{Dispatch, Level, debug, dispatcher, error};
use tracing_subscriber::fmt as tracing_fmt;

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging)?;

    let args = cli_args.render_args();
    let message = read_message(args.file.as_deref())?;

    let classifier = GithubUrlClassifier::new(settings.render.github_host.as_str());
    let renderer = ComrakChatRenderer::with_classifier(classifier);
    let result = renderer.render(&message);

    debug!(
        target = "chatmark::cli",
        bytes = message.len(),
        github_host = %settings.render.github_host,
        "message rendered"
    );

    write_result(&result, settings.output.pretty)
}

fn read_message(path: Option<&Path>) -> Result<String, AppError> {
    match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|err| AppError::input(path.display().to_string(), err)),
        None => {
            let mut message = String::new();
            io::stdin()
                .read_to_string(&mut message)
                .map_err(|err| AppError::input("<stdin>", err))?;
            Ok(message)
        }
    }
}

fn write_result(result: &ProcessedChat, pretty: bool) -> Result<(), AppError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if pretty {
        serde_json::to_writer_pretty(&mut out, result).map_err(InfraError::from)?;
    } else {
        serde_json::to_writer(&mut out, result).map_err(InfraError::from)?;
    }
    writeln!(out).map_err(InfraError::from)?;
    out.flush().map_err(InfraError::from)?;
    Ok(())
}
