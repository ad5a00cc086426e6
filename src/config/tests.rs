use std::{fs, path::PathBuf};

use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("info".to_string());
    raw.render.github_host = Some("git.example.org".to_string());

    let overrides = RenderOverrides {
        log_level: Some("debug".to_string()),
        github_host: Some("GitHub.example.com".to_string()),
        ..Default::default()
    };

    raw.apply_render_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.render.github_host, "github.example.com");
}

#[test]
fn defaults_are_quiet_compact_and_github() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::WARN);
    assert_eq!(settings.logging.format, LogFormat::Compact);
    assert_eq!(settings.render.github_host, "github.com");
    assert!(!settings.output.pretty);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = RenderOverrides {
        log_json: Some(true),
        pretty: Some(true),
        ..Default::default()
    };

    raw.apply_render_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.logging.format, LogFormat::Json);
    assert!(settings.output.pretty);
}

#[test]
fn invalid_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    let err = Settings::from_raw(raw).expect_err("level must be rejected");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "logging.level",
            ..
        }
    ));
}

#[test]
fn github_host_must_be_a_bare_host() {
    for host in ["", "   ", "https://github.com", "github.com/org", "user@github.com"] {
        let mut raw = RawSettings::default();
        raw.render.github_host = Some(host.to_string());

        let err = Settings::from_raw(raw).expect_err("host must be rejected");
        assert!(
            matches!(
                err,
                LoadError::Invalid {
                    key: "render.github_host",
                    ..
                }
            ),
            "host: {host:?}"
        );
    }
}

#[test]
fn default_to_render_command() {
    let args = CliArgs::parse_from(["chatmark", "--pretty", "true", "message.md"]);

    assert!(args.command.is_none());
    let render = args.render_args();
    assert_eq!(render.file, Some(PathBuf::from("message.md")));
    assert_eq!(render.overrides.pretty, Some(true));
}

#[test]
fn parse_render_subcommand() {
    let args = CliArgs::parse_from([
        "chatmark",
        "render",
        "--github-host",
        "git.example.org",
        "--log-json",
        "yes",
    ]);

    match args.command.as_ref().expect("render command") {
        Command::Render(render) => {
            assert_eq!(
                render.overrides.github_host.as_deref(),
                Some("git.example.org")
            );
            assert_eq!(render.overrides.log_json, Some(true));
            assert!(render.file.is_none());
        }
    }
    assert_eq!(
        args.render_args().overrides.github_host.as_deref(),
        Some("git.example.org")
    );
}

#[test]
fn config_file_layer_is_applied() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.toml");
    fs::write(
        &path,
        "[logging]\nlevel = \"error\"\n\n[render]\ngithub_host = \"code.example.net\"\n",
    )
    .expect("write config");

    let args = CliArgs::parse_from([
        "chatmark",
        "--config-file",
        path.to_str().expect("utf-8 path"),
        "--log-level",
        "info",
    ]);
    let settings = load(&args).expect("settings load");

    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert_eq!(settings.render.github_host, "code.example.net");
}

#[test]
fn missing_config_file_is_an_error() {
    let args = CliArgs::parse_from(["chatmark", "--config-file", "/nonexistent/chatmark.toml"]);
    assert!(matches!(load(&args), Err(LoadError::Build(_))));
}
