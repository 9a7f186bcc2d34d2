use super::*;

#[tokio::test]
async fn test_state_has_no_auth_provider() {
    let state = test_helpers::test_app_state();
    assert!(state.auth.is_none());
    assert_eq!(state.assets_dir, PathBuf::from("./assets"));
}

#[tokio::test]
async fn state_clone_shares_config() {
    let state = test_helpers::test_app_state();
    let clone = state.clone();
    assert_eq!(clone.auth, state.auth);
    assert_eq!(clone.assets_dir, state.assets_dir);
}

#[test]
fn auth_http_client_builds_with_configured_timeout() {
    let client = auth_http_client(std::time::Duration::from_secs(3));
    assert!(client.get("http://localhost/").build().is_ok());
}
