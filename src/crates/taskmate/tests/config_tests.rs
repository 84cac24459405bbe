//! Config file discovery and layering.

use std::fs;
use std::path::Path;
use taskmate::config::{ConfigLoader, ConfigOverrides, Provider, StoreBackend};
use tempfile::TempDir;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[tokio::test]
async fn test_project_overrides_user_key_by_key() {
    let dir = TempDir::new().unwrap();
    let user = dir.path().join("home/.taskmate/taskmate.toml");
    let project = dir.path().join("project/.taskmate/taskmate.toml");

    write(
        &user,
        r#"
[llm]
provider = "openai"
model = "gpt-4o"
api_key = "sk-user"

[classifier]
max_attempts = 5
"#,
    );
    write(
        &project,
        r#"
[llm]
model = "gpt-4o-mini"

[store]
backend = "memory"
"#,
    );

    let config = ConfigLoader::with_paths(&user, &project).load().await.unwrap();

    assert_eq!(config.llm.provider().unwrap(), Provider::OpenAi);
    assert_eq!(config.llm.model_name(), "gpt-4o-mini");
    assert_eq!(config.llm.api_key.as_deref(), Some("sk-user"));
    assert_eq!(config.classifier.max_attempts, 5);
    assert_eq!(config.classifier.history_turns, 9);
    assert_eq!(config.store.backend().unwrap(), StoreBackend::Memory);
    config.validate().unwrap();
}

#[tokio::test]
async fn test_missing_files_give_defaults() {
    let dir = TempDir::new().unwrap();
    let config = ConfigLoader::with_paths(dir.path().join("a.toml"), dir.path().join("b.toml"))
        .load()
        .await
        .unwrap();

    assert_eq!(config.llm.provider().unwrap(), Provider::Gemini);
    assert_eq!(config.llm.model_name(), "gemini-1.5-flash");
    assert_eq!(config.store.backend().unwrap(), StoreBackend::Sqlite);
    assert_eq!(config.store.path, "taskmate.db");
}

#[tokio::test]
async fn test_explicit_path_and_cli_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    write(
        &path,
        r#"
[llm]
provider = "gemini"
api_key = "g-key"

[store]
path = "work.db"
"#,
    );

    let config = ConfigLoader::from_path(&path)
        .with_overrides(ConfigOverrides {
            model: Some("gemini-1.5-pro".into()),
            db_path: Some("other.db".into()),
            ..ConfigOverrides::default()
        })
        .load()
        .await
        .unwrap();

    assert_eq!(config.llm.model_name(), "gemini-1.5-pro");
    assert_eq!(config.store.path, "other.db");
    assert_eq!(config.llm.api_key.as_deref(), Some("g-key"));
}

#[tokio::test]
async fn test_invalid_toml_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    write(&path, "[llm\nprovider = ");

    let err = ConfigLoader::from_path(&path).load().await.unwrap_err();
    assert!(matches!(err, taskmate::TaskmateError::Config(_)));
}

#[tokio::test]
async fn test_redacted_config_hides_key() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    write(&path, "[llm]\napi_key = \"super-secret\"\n");

    let config = ConfigLoader::from_path(&path).load().await.unwrap();
    let rendered = toml::to_string_pretty(&config.redacted()).unwrap();

    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("***"));
}
