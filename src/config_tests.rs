//! Unit tests for configuration structures and parsing.

#[cfg(test)]
mod config_tests {
    use crate::config::*;
    use crate::error::ConfigError;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    // ============= Defaults Tests =============

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.broker.initial_cash, 100_000.0);
        assert_eq!(config.model.n_estimators, 100);
        assert_eq!(config.model.seed, 42);
        assert_eq!(config.model.max_depth, None);
        assert_eq!(config.model.min_samples_split, 2);
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bind_addr() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9000,
        };
        assert_eq!(server.bind_addr(), "127.0.0.1:9000");
    }

    // ============= YAML Tests =============

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 8080
broker:
  initial_cash: 50000.0
model:
  n_estimators: 25
  seed: 7
  max_depth: 6
  min_samples_split: 4
log_level: "debug"
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.broker.initial_cash, 50_000.0);
        assert_eq!(config.model.n_estimators, 25);
        assert_eq!(config.model.max_depth, Some(6));
        assert_eq!(config.log_level, "debug");

        let params = config.model.forest_params();
        assert_eq!(params.n_estimators, 25);
        assert_eq!(params.seed, 7);
        assert_eq!(params.max_depth, Some(6));
        assert_eq!(params.min_samples_split, 4);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
broker:
  initial_cash: 1000.0
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.broker.initial_cash, 1_000.0);
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.model, ModelConfig::default());
    }

    #[test]
    fn test_empty_yaml_and_bom() {
        assert_eq!(AppConfig::from_yaml("").unwrap(), AppConfig::default());

        let with_bom = "\u{feff}log_level: warn\n";
        assert_eq!(AppConfig::from_yaml(with_bom).unwrap().log_level, "warn");
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(AppConfig::from_yaml("server: [1, 2").is_err());
        assert!(AppConfig::from_yaml("server:\n  port: not-a-port\n").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    // ============= Env Override Tests =============

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[("HOST", "127.0.0.1"), ("PORT", "3000"), ("INITIAL_CASH", "250.5")]))
            .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.broker.initial_cash, 250.5);
    }

    #[test]
    fn test_env_invalid_port() {
        let mut config = AppConfig::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidEnv { ref key, .. } if key == "PORT"));
        assert_eq!(config.server.port, 8000);
    }

    // ============= Validation Tests =============

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.model.n_estimators = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.model.min_samples_split = 1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.broker.initial_cash = f64::NAN;
        assert!(config.validate().is_err());
    }
}
