//! Configuration loading against the shipped research.toml

use deep_research::llm::Provider;
use deep_research::utils::{ConfigError, ResearchConfig};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

fn shipped_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("research.toml")
}

#[cfg(feature = "ollama")]
#[test]
fn test_shipped_config_loads() {
    let config = ResearchConfig::load(shipped_config()).expect("research.toml should load");

    let settings = config.settings();
    assert_eq!(settings.max_searches, 5);
    assert_eq!(settings.search_timeout, Some(Duration::from_secs(120)));
    assert!(config.research.web_search);

    match config.to_provider().expect("provider") {
        Provider::Ollama {
            base_url,
            model,
            params,
        } => {
            assert_eq!(base_url, "http://localhost:11434");
            assert_eq!(model, "llama3.2:3b");
            assert_eq!(params.temperature, Some(0.7));
        }
        other => panic!("expected the ollama provider, got {:?}", other),
    }
    assert_eq!(config.transport().name(), "sendgrid");
}

#[cfg(feature = "openai")]
#[test]
fn test_openai_config_reports_missing_key_env() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[llm]
type = "openai"
api_key_env = "DEEP_RESEARCH_TEST_UNSET_KEY"
model = "gpt-4o-mini"
"#
    )
    .unwrap();

    let err = ResearchConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(ref name) if name == "DEEP_RESEARCH_TEST_UNSET_KEY"));
    assert!(err.to_string().contains("DEEP_RESEARCH_TEST_UNSET_KEY"));
}

#[test]
fn test_missing_llm_section_is_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[research]\nmax_searches = 2").unwrap();

    assert!(matches!(
        ResearchConfig::load(file.path()),
        Err(ConfigError::ParseError(_))
    ));
}
