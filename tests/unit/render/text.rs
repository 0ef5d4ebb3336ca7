use super::*;

#[test]
fn family_stack_puts_configured_family_first() {
    assert_eq!(family_stack(None, "Arial, sans-serif"), "Arial, sans-serif");
    assert_eq!(
        family_stack(Some("Inter"), "Arial, sans-serif"),
        "\"Inter\", Arial, sans-serif"
    );
    assert_eq!(family_stack(Some("Inter"), " "), "\"Inter\"");
}

#[test]
fn missing_font_file_is_a_config_error() {
    let cfg = FontConfig {
        regular: Some("/no/such/font.ttf".into()),
        ..FontConfig::default()
    };
    let err = TextEngine::new(&cfg).unwrap_err();
    assert!(matches!(err, QuoteError::Config(_)));
    assert!(err.to_string().contains("/no/such/font.ttf"));
}

#[test]
fn non_font_bytes_are_rejected() {
    let path = std::env::temp_dir().join(format!("quotestick_not_a_font_{}.ttf", std::process::id()));
    std::fs::write(&path, b"plain text, not a font").unwrap();
    let cfg = FontConfig {
        regular: Some(path.clone()),
        ..FontConfig::default()
    };
    assert!(TextEngine::new(&cfg).is_err());
    let _ = std::fs::remove_file(path);
}

#[test]
fn measurement_grows_with_text() {
    let mut engine = TextEngine::new(&FontConfig::default()).unwrap();
    let empty = engine.measure("", 35.0, TextWeight::Regular);
    let short = engine.measure("ab", 35.0, TextWeight::Regular);
    let long = engine.measure("abcdefgh", 35.0, TextWeight::Regular);
    assert_eq!(empty, 0.0);
    assert!(short <= long);
    assert!(long.is_finite());
}

#[test]
fn brush_converts_from_color() {
    let b = TextBrushRgba8::from(Rgba8::opaque(0, 0x7b, 0xff));
    assert_eq!((b.r, b.g, b.b, b.a), (0, 0x7b, 0xff, 255));
}
