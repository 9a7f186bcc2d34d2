use super::*;

// =============================================================================
// parse_port
// =============================================================================

#[test]
fn parse_port_defaults_when_unset() {
    assert_eq!(parse_port(None).unwrap(), DEFAULT_PORT);
}

#[test]
fn parse_port_defaults_when_blank() {
    assert_eq!(parse_port(Some("  ")).unwrap(), DEFAULT_PORT);
}

#[test]
fn parse_port_accepts_valid_port() {
    assert_eq!(parse_port(Some("8080")).unwrap(), 8080);
}

#[test]
fn parse_port_trims_whitespace() {
    assert_eq!(parse_port(Some(" 4000 ")).unwrap(), 4000);
}

#[test]
fn parse_port_rejects_garbage() {
    let err = parse_port(Some("http")).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
}

#[test]
fn parse_port_rejects_out_of_range() {
    assert!(parse_port(Some("70000")).is_err());
}

// =============================================================================
// env_parse: unique env var names avoid races with parallel tests.
// =============================================================================

#[test]
fn env_parse_reads_value() {
    let key = "__TEST_HUB_ENV_PARSE_OK_311__";
    unsafe { std::env::set_var(key, "42") };
    assert_eq!(env_parse::<u32>(key, 5), 42);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_falls_back_on_invalid() {
    let key = "__TEST_HUB_ENV_PARSE_BAD_312__";
    unsafe { std::env::set_var(key, "many") };
    assert_eq!(env_parse::<u32>(key, 5), 5);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_falls_back_when_unset() {
    assert_eq!(env_parse::<u64>("__TEST_HUB_ENV_PARSE_UNSET_313__", 10), 10);
}

// =============================================================================
// AuthConfig
// =============================================================================

#[test]
fn user_endpoint_appends_auth_path() {
    let config = AuthConfig {
        base_url: "https://auth.example.test".into(),
        api_key: "anon".into(),
        timeout: Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS),
    };
    assert_eq!(config.user_endpoint(), "https://auth.example.test/auth/v1/user");
}

#[test]
fn non_blank_filters_whitespace() {
    assert_eq!(non_blank(Some("   ".into())), None);
    assert_eq!(non_blank(None), None);
    assert_eq!(non_blank(Some("x".into())), Some("x".into()));
}
