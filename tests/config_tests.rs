// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Nexus AI Contributors

use tempfile::TempDir;

use nexus::config::Settings;

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load_from(&dir.path().join("settings.toml")).unwrap();

    assert_eq!(settings.limits.max_input_tokens, 3000);
    assert_eq!(settings.server.bind, "127.0.0.1:8080");
    // Conventional env var names are filled in
    assert_eq!(settings.providers.anthropic.api_key_env, "ANTHROPIC_API_KEY");
    assert_eq!(settings.providers.groq.api_key_env, "GROQ_API_KEY");
}

#[test]
fn test_save_and_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("settings.toml");

    let mut settings = Settings::default();
    settings.server.bind = "0.0.0.0:9999".to_string();
    settings.limits.max_input_tokens = 4096;
    settings.providers.groq.model = "llama-3.1-8b-instant".to_string();
    settings.save_to(&path).unwrap();

    let loaded = Settings::load_from(&path).unwrap();
    assert_eq!(loaded.server.bind, "0.0.0.0:9999");
    assert_eq!(loaded.limits.max_input_tokens, 4096);
    assert_eq!(loaded.providers.groq.model, "llama-3.1-8b-instant");
}

#[test]
fn test_file_models_survive_env_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(
        &path,
        r#"
[providers.anthropic]
model = "claude-3-5-haiku-20241022"
"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.providers.anthropic.model, "claude-3-5-haiku-20241022");
    // Groq model still falls back to the default
    assert_eq!(settings.providers.groq.model, "llama-3.3-70b-versatile");
}

#[test]
fn test_invalid_toml_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "this is not toml [[[").unwrap();

    let err = Settings::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("TOML"));
}

#[test]
fn test_memory_endpoints_optional() {
    let settings = Settings::default();
    // Without env vars set, both stores resolve to unconfigured
    assert!(settings.memory.redis.url.is_none());
    assert!(settings.memory.vector.url.is_none());
}
