use crate::config::Config;
use tempfile::tempdir;

#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert_eq!(config.dialogue_origin, "https://api.repl-ai.jp");
    assert_eq!(config.profile_origin, "https://randomuser.me");
    assert_eq!(config.bot_id, "sample");
    assert_eq!(config.init_utterance, "init");
    assert_eq!(config.init_topic_id, "aisatsu");
    assert!(config.api_key.is_empty());
    assert_eq!(config.connect_timeout_secs, 10);
    assert_eq!(config.request_timeout_secs, 20);
}

#[test]
fn test_connect_timeout_below_request_timeout() {
    let config = Config::default();

    assert!(config.connect_timeout() < config.request_timeout());
}

#[test]
fn test_load_missing_file_returns_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");

    let config = Config::load(dir.path().join("kaiwa.json")).expect("Failed to load");

    assert_eq!(config, Config::default());
}

#[test]
fn test_save_load_round_trip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("kaiwa.json");

    let mut config = Config::default();
    config.api_key = "my-key".to_string();
    config.bot_id = "other-bot".to_string();
    config.save(&path).expect("Failed to save");

    let loaded = Config::load(&path).expect("Failed to load");
    assert_eq!(loaded, config);
}

#[test]
fn test_load_empty_file_returns_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("kaiwa.json");
    std::fs::write(&path, "  \n").expect("Failed to write");

    let config = Config::load(&path).expect("Failed to load");
    assert_eq!(config, Config::default());
}
