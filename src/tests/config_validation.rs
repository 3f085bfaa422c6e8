#[cfg(test)]
mod test {

    use std::io::Write;

    use serial_test::serial;

    use crate::config::credentials::Credentials;
    use crate::config::proc_loader::{expand_env_vars, file_to_config, parse_config};
    use crate::config::settings::LogFormat;
    use crate::errors::ConfigError;
    use crate::resilience::retry::RetrySettings;
    use crate::sources::executor::chain::ChainOrchestrator;
    use crate::utils::constants::DEFAULT_SCOPE;
    use crate::utils::logging::{resolve_logging_config, LogLevel};

    const MINIMAL_YAML: &str = r#"
credentials:
  token_endpoint: https://login.microsoftonline.com/tenant/oauth2/v2.0/token
  blueprint_id: B1
  blueprint_secret: S1
  agent_id: A1
  agent_user: U1
"#;

    #[tokio::test]
    async fn minimal_config_gets_defaults() {
        let service_config = parse_config(MINIMAL_YAML.to_owned()).await.expect("valid config");

        let settings = &service_config.settings;
        assert_eq!(settings.cache.buffer_seconds, 180);
        assert_eq!(settings.cache.default_expires_in_seconds, 3600);
        assert_eq!(settings.http.timeout_ms, Some(10_000));
        assert!(settings.retry.is_none());
        let logging = settings.logging.as_ref().expect("logging default applied");
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, LogFormat::Compact);

        let credentials = service_config.credentials.validate().expect("complete credentials");
        assert_eq!(credentials.scope, DEFAULT_SCOPE);
    }

    #[tokio::test]
    async fn full_config_is_honoured() {
        let yaml = r#"
settings:
  cache:
    buffer_seconds: 60
    default_expires_in_seconds: 900
  http:
    timeout_ms: null
  retry:
    attempts: 5
    base_delay_ms: 100
    max_delay_ms: 800
  logging:
    level: debug
    format: json
credentials:
  token_endpoint: http://127.0.0.1:8080/token
  blueprint_id: B1
  blueprint_secret: S1
  agent_id: A1
  agent_user: U1
  scope: https://graph.microsoft.com/.default
"#;
        let service_config = parse_config(yaml.to_owned()).await.expect("valid config");

        assert_eq!(service_config.settings.cache.buffer_seconds, 60);
        assert_eq!(service_config.settings.http.timeout_ms, None);
        assert_eq!(
            RetrySettings::from(service_config.settings.retry.as_ref()),
            RetrySettings { attempts: 5, base_delay_ms: 100, max_delay_ms: 800 }
        );
        assert_eq!(service_config.credentials.scope.as_deref(), Some("https://graph.microsoft.com/.default"));

        let orchestrator = ChainOrchestrator::from_settings(&service_config.settings).expect("client");
        assert_eq!(orchestrator.cache().buffer_seconds(), 60);
        assert_eq!(orchestrator.policy().default_expires_in_seconds, 900);
    }

    #[tokio::test]
    async fn invalid_config_reports_all_errors() {
        let yaml = r#"
settings:
  cache:
    buffer_seconds: 3600
    default_expires_in_seconds: 3600
  retry:
    attempts: 0
    base_delay_ms: 500
    max_delay_ms: 100
  logging:
    level: verbose
    format: compact
credentials:
  token_endpoint: ftp://example.com/token
  blueprint_id: B1
  agent_id: ""
"#;
        let err = parse_config(yaml.to_owned()).await.unwrap_err();
        let config_error = err.downcast_ref::<ConfigError>().expect("aggregated config error");
        let messages = &config_error.0;

        let expect = |needle: &str| {
            assert!(
                messages.iter().any(|m| m.contains(needle)),
                "no error mentions '{}': {:?}",
                needle,
                messages
            )
        };
        expect("buffer_seconds");
        expect("attempts must be > 0");
        expect("max_delay_ms");
        expect("settings.logging.level");
        expect("http or https");
        expect("credentials.blueprint_secret is required");
        expect("credentials.agent_id is required");
        expect("credentials.agent_user is required");
        assert_eq!(messages.len(), 8);
    }

    #[tokio::test]
    async fn malformed_endpoint_is_rejected() {
        let yaml = MINIMAL_YAML.replace(
            "https://login.microsoftonline.com/tenant/oauth2/v2.0/token",
            "not a url",
        );
        let err = parse_config(yaml).await.unwrap_err();
        assert!(err.to_string().contains("not a valid URL"));
    }

    #[tokio::test]
    #[serial]
    async fn file_config_expands_environment() {
        std::env::set_var("FIC_TEST_SECRET", "from-env-secret");
        std::env::remove_var("FIC_TEST_UNSET");

        let yaml = r#"
credentials:
  token_endpoint: ${FIC_TEST_UNSET:http://localhost:9000/token}
  blueprint_id: B1
  blueprint_secret: ${FIC_TEST_SECRET}
  agent_id: A1
  agent_user: U1
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let service_config = file_to_config(file.path()).await.expect("valid config");
        let credentials = service_config.credentials;
        assert_eq!(credentials.blueprint_secret.as_deref(), Some("from-env-secret"));
        assert_eq!(credentials.token_endpoint.as_deref(), Some("http://localhost:9000/token"));

        std::env::remove_var("FIC_TEST_SECRET");
    }

    #[test]
    #[serial]
    fn unset_variable_without_default_expands_to_empty() {
        std::env::remove_var("FIC_TEST_NOTHING");
        assert_eq!(expand_env_vars("a: '${FIC_TEST_NOTHING}'").unwrap(), "a: ''");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let err = file_to_config(std::path::Path::new("does/not/exist.yaml")).await.unwrap_err();
        assert!(err.to_string().contains("cannot read config file"));
    }

    #[tokio::test]
    async fn cli_log_level_overrides_config() {
        let service_config = parse_config(MINIMAL_YAML.to_owned()).await.unwrap();
        assert_eq!(resolve_logging_config(&service_config, None).level, "info");
        assert_eq!(resolve_logging_config(&service_config, Some(LogLevel::TRACE)).level, "trace");
    }

    #[test]
    fn credentials_debug_hides_secret() {
        let credentials = Credentials::new("http://localhost/token", "B1", "top-secret", "A1", "U1");
        assert!(!format!("{:?}", credentials).contains("top-secret"));
        let validated = credentials.validate().unwrap();
        assert!(!format!("{:?}", validated).contains("top-secret"));
    }
}
