//! Trello credential lookup order.
//!
//! Lives in its own test binary because it mutates process environment
//! variables; everything runs inside one test so nothing races on them.

use studyplan_core::TrelloCredentials;
use tempfile::TempDir;

#[test]
fn environment_wins_over_secrets_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("trello-secrets.json"),
        r#"{"apiKey": "file-key", "token": "file-token"}"#,
    )
    .unwrap();
    std::env::set_var("STUDYPLAN_CONFIG_DIR", dir.path());

    // Half a pair in the environment is ignored.
    std::env::set_var("TRELLO_API_KEY", "env-key");
    std::env::remove_var("TRELLO_TOKEN");
    assert_eq!(TrelloCredentials::from_env(), None);

    std::env::set_var("TRELLO_TOKEN", "env-token");
    assert_eq!(
        TrelloCredentials::load(),
        Some(TrelloCredentials::new("env-key", "env-token"))
    );

    // Empty values count as unset.
    std::env::set_var("TRELLO_TOKEN", "");
    assert_eq!(TrelloCredentials::from_env(), None);

    std::env::remove_var("TRELLO_API_KEY");
    std::env::remove_var("TRELLO_TOKEN");
    assert_eq!(
        TrelloCredentials::from_file(&dir.path().join("trello-secrets.json")).unwrap(),
        Some(TrelloCredentials::new("file-key", "file-token"))
    );
}
