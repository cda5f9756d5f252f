//! Config file loading tests.

use chatplay::{BotConfig, Credentials, Services};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
        initial_matches = 17

        [http]
        host = "0.0.0.0"
        port = 9000

        [services]
        translate_lang = "ru-en"
        timeout_secs = 3

        [messenger]
        webhook_url = "http://localhost:9999/replies"
        "#,
    );

    let config = BotConfig::from_file(file.path()).unwrap();
    assert_eq!(config.http().host(), "0.0.0.0");
    assert_eq!(*config.http().port(), 9000);
    assert_eq!(config.services().translate_lang(), "ru-en");
    assert_eq!(*config.services().timeout_secs(), 3);
    assert_eq!(
        config.messenger().webhook_url().as_deref(),
        Some("http://localhost:9999/replies")
    );
    assert_eq!(config.initial_matches(), 17);
}

#[test]
fn test_missing_file_and_bad_toml_fail() {
    let err = BotConfig::from_file("/nonexistent/chatplay.toml").unwrap_err();
    assert!(err.message.contains("Failed to read config file"));

    let file = write_config("[http]\nport = \"not a number\"");
    let err = BotConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));

    let file = write_config("initial_matches = 0");
    assert!(BotConfig::from_file(file.path()).is_err());
}

#[test]
fn test_no_config_path_uses_defaults() {
    let config = BotConfig::load(None).unwrap();
    assert_eq!(*config.http().port(), 3000);
    assert_eq!(config.initial_matches(), 21);
}

#[test]
fn test_credentials_enable_services() {
    let config = BotConfig::load(None).unwrap();
    let credentials = Credentials::new(Some("app".into()), None, Some("token".into()));
    let services = Services::from_config(config.services(), &credentials).unwrap();
    assert!(services.solver().is_some());
    assert!(services.translator().is_none());
    assert!(services.transcriber().is_some());
    assert!(services.jokes().is_some());
}
