use super::*;

#[test]
fn empty_object_yields_defaults() {
    let cfg: BotConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, BotConfig::default());
    assert_eq!(cfg.command, "!quote");
    assert!(matches!(cfg.output, OutputTarget::Unique { .. }));
    cfg.validate().unwrap();
}

#[test]
fn output_target_is_tagged() {
    let cfg: BotConfig =
        serde_json::from_str(r#"{"output":{"kind":"fixed","path":"/tmp/quote.webp"}}"#).unwrap();
    assert_eq!(
        cfg.output,
        OutputTarget::Fixed {
            path: PathBuf::from("/tmp/quote.webp")
        }
    );

    let cfg: BotConfig = serde_json::from_str(r#"{"output":{"kind":"memory"}}"#).unwrap();
    assert_eq!(cfg.output, OutputTarget::Memory);
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(serde_json::from_str::<BotConfig>(r#"{"comand":"!q"}"#).is_err());
}

#[test]
fn validate_rejects_degenerate_values() {
    let mut cfg = BotConfig {
        command: "  ".to_string(),
        ..BotConfig::default()
    };
    assert!(matches!(cfg.validate(), Err(QuoteError::Config(_))));

    cfg.command = "!q".to_string();
    cfg.avatar.timeout_ms = 0;
    assert!(cfg.validate().is_err());

    cfg.avatar.timeout_ms = 5;
    cfg.output = OutputTarget::Fixed {
        path: PathBuf::from("/"),
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn load_reports_missing_file_as_config_error() {
    let err = BotConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(err.to_string().contains("config error:"));
}

#[test]
fn transport_settings_round_trip_browser_path() {
    let cfg: BotConfig = serde_json::from_str(
        r#"{"transport":{"browser_executable":"/usr/bin/chromium","headless":false}}"#,
    )
    .unwrap();
    assert_eq!(
        cfg.transport.browser_executable.as_deref(),
        Some(Path::new("/usr/bin/chromium"))
    );
    assert!(!cfg.transport.headless);
    assert_eq!(cfg.transport.session_dir, PathBuf::from("./session_data"));
}
