use ess_core::config::*;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = EssConfig::from_toml("").unwrap();

    // Generation defaults
    assert_eq!(config.generation.model, "llama-3.3-70b-versatile");
    assert!(config.generation.endpoint.starts_with("https://"));
    assert!(config.generation.api_key.is_none());
    assert_eq!(config.generation.max_retries, 2);
    assert_eq!(config.generation.temperature, 0.0);

    // Structured defaults
    assert_eq!(config.structured.max_rows, 50);
    assert_eq!(config.structured.employees_table, "employees");

    // Document defaults
    assert_eq!(config.documents.top_k, 5);
    assert_eq!(config.documents.chunk_size, 800);
    assert_eq!(config.documents.chunk_overlap, 100);

    // Access defaults
    assert!(config.access.basic_fields.contains(&"leave_type".to_string()));
    assert!(config.access.restricted_fields.contains(&"net_salary".to_string()));

    // Session defaults
    assert_eq!(config.session.history_window, 20);
    assert_eq!(config.session.request_timeout_secs, 120);

    // Observability defaults
    assert_eq!(config.observability.log_level, "info");
    assert!(!config.observability.json);
    assert_eq!(config.observability.request_log_capacity, 10_000);
    assert_eq!(config.observability.degradation_capacity, 256);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[generation]
model = "local-model"
max_retries = 0

[documents]
top_k = 3

[access]
basic_fields = ["employee_code", "department"]
"#;
    let config = EssConfig::from_toml(toml).unwrap();
    assert_eq!(config.generation.model, "local-model");
    assert_eq!(config.generation.max_retries, 0);
    // Non-overridden fields keep defaults
    assert_eq!(config.generation.timeout_secs, 30);
    assert_eq!(config.documents.top_k, 3);
    assert_eq!(config.documents.chunk_size, 800);
    assert_eq!(config.access.basic_fields.len(), 2);
    assert!(!config.access.restricted_fields.is_empty());
}

#[test]
fn config_rejects_malformed_toml() {
    let err = EssConfig::from_toml("[generation\nmodel = 1").unwrap_err();
    assert!(matches!(err, ess_core::EssError::Config { .. }));
}

#[test]
fn api_key_is_never_serialized() {
    let mut config = EssConfig::default();
    config.generation.api_key = Some("secret-key".into());
    let rendered = toml::to_string(&config).unwrap();
    assert!(!rendered.contains("secret-key"));
}

// ── Environment overrides ──

#[test]
fn env_fills_missing_api_key_in_precedence_order() {
    let mut config = EssConfig::default();
    config.apply_env_from(|key| match key {
        "ESS_API_KEY" => Some("  ".into()),
        "GROQ_API_KEY" => Some("groq-key".into()),
        _ => None,
    });
    assert_eq!(config.generation.api_key.as_deref(), Some("groq-key"));

    let mut config = EssConfig::default();
    config.apply_env_from(|key| Some(format!("{key}-value")));
    assert_eq!(config.generation.api_key.as_deref(), Some("ESS_API_KEY-value"));
}

#[test]
fn env_does_not_override_explicit_api_key() {
    let mut config = EssConfig::from_toml("[generation]\napi_key = \"from-file\"").unwrap();
    config.apply_env_from(|_| Some("from-env".into()));
    assert_eq!(config.generation.api_key.as_deref(), Some("from-file"));
}

#[test]
fn load_reads_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ess.toml");
    std::fs::write(&path, "[structured]\nmax_rows = 7\n").unwrap();
    let config = EssConfig::load(&path).unwrap();
    assert_eq!(config.structured.max_rows, 7);
}

#[test]
fn load_reports_missing_file_as_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EssConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
}
