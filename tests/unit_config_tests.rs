//! # Config Module Unit Tests / Config 模块单元测试
//!
//! This module contains unit tests for the `config.rs` module, covering
//! TOML loading, defaults, validation and derived values.
//!
//! 此模块包含 `config.rs` 模块的单元测试，
//! 覆盖 TOML 加载、默认值、验证以及派生值。

use matrix_stress::core::config::{DEFAULT_WORKER_FANOUT, StressConfig};
use matrix_stress::core::error::StressError;
use matrix_stress::core::models::ExecutionMode;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[cfg(test)]
mod defaults_tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StressConfig::default();
        assert_eq!(config.language, "en");
        assert_eq!(config.seed, 0);
        assert!(!config.redefine);
        assert_eq!(config.min_version, 49);
        assert!(!config.ignore_test_failures);
        assert_eq!(config.threads_factor, 1);
        assert_eq!(config.stress_time(), Duration::from_secs(60));
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert!(config.warmup);
        assert!(!config.keep_going);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_worker_count_fan_out() {
        let mut config = StressConfig::default();
        assert_eq!(config.worker_count(), DEFAULT_WORKER_FANOUT);
        assert_eq!(config.worker_count(), 5);

        config.threads_factor = 2;
        assert_eq!(config.worker_count(), 2);

        config.threads_factor = 12;
        assert_eq!(config.worker_count(), 12);
    }

    #[test]
    fn test_matrix_options_follow_config() {
        let config = StressConfig {
            min_version: 51,
            redefine: true,
            ..StressConfig::default()
        };
        let options = config.matrix_options();
        assert_eq!(options.min_version, 51);
        assert!(options.redefine);
        assert_eq!(options.modes, ExecutionMode::ALL.to_vec());
    }
}

#[cfg(test)]
mod loading_tests {
    use super::*;

    #[test]
    fn test_load_full_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stress.toml");
        fs::write(
            &path,
            r#"
language = "zh-CN"
seed = 1234
redefine = true
min_version = 50
ignore_test_failures = true
threads_factor = 3
stress_time_secs = 5
poll_interval_ms = 250
warmup = false
print_stack_trace = true
keep_going = true
"#,
        )
        .unwrap();

        let config = StressConfig::load(&path).unwrap();
        assert_eq!(config.language, "zh-CN");
        assert_eq!(config.seed, 1234);
        assert!(config.redefine);
        assert_eq!(config.min_version, 50);
        assert!(config.ignore_test_failures);
        assert_eq!(config.worker_count(), 3);
        assert_eq!(config.stress_time(), Duration::from_secs(5));
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert!(!config.warmup);
        assert!(config.print_stack_trace);
        assert!(config.keep_going);
    }

    #[test]
    fn test_load_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(&path, "seed = 9\n").unwrap();

        let config = StressConfig::load(&path).unwrap();
        assert_eq!(
            config,
            StressConfig {
                seed: 9,
                ..StressConfig::default()
            }
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        match StressConfig::load(&path) {
            Err(StressError::Config { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "seed = \"not a number\"\n[[unclosed\n").unwrap();
        assert!(matches!(
            StressConfig::load(&path),
            Err(StressError::Config { .. })
        ));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");
        fs::write(&path, "threads_factor = 0\n").unwrap();
        assert!(matches!(
            StressConfig::load(&path),
            Err(StressError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_serialization_round_trip_keeps_fields() {
        let config = StressConfig {
            seed: 5,
            keep_going: true,
            ..StressConfig::default()
        };
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("seed = 5"));
        assert!(toml_str.contains("keep_going = true"));
        let parsed: StressConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn test_zero_threads_factor_is_invalid() {
        let config = StressConfig {
            threads_factor: 0,
            ..StressConfig::default()
        };
        assert!(matches!(config.validate(), Err(StressError::InvalidConfig(_))));
    }

    #[test]
    fn test_min_version_bounds() {
        for (min_version, ok) in [(44, false), (45, true), (52, true), (53, false)] {
            let config = StressConfig {
                min_version,
                ..StressConfig::default()
            };
            assert_eq!(config.validate().is_ok(), ok, "min_version {min_version}");
        }
    }

    #[test]
    fn test_zero_poll_interval_is_invalid() {
        let config = StressConfig {
            poll_interval_ms: 0,
            ..StressConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
