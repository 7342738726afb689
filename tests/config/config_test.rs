//! Coverage for config parsing, env precedence and validation.

use std::fs;
use std::path::PathBuf;

use pulp_selinux::config::{config_dir, Config, ConfigError, CONFIG_PATH_ENV};
use pulp_selinux::policy::PolicyVariant;

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn config_dir_resolves() {
    let path = match config_dir() {
        Ok(path) => path,
        Err(err) => panic!("config dir should resolve: {err}"),
    };
    assert!(path.ends_with(".config/pulp-selinux"));
}

#[test]
fn missing_default_file_means_defaults() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let missing = tmp.path().join("absent.toml");
    let config = Config::load_with(None, |key| {
        (key == CONFIG_PATH_ENV).then(|| missing.display().to_string())
    })
    .expect("defaults should load");
    assert_eq!(config, Config::default());
}

#[test]
fn missing_explicit_file_is_an_error() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let missing = tmp.path().join("absent.toml");
    let result = Config::load_with(Some(&missing), no_env);
    assert!(matches!(result, Err(ConfigError::Read { .. })));
}

#[test]
fn parse_full_config() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("config.toml");
    fs::write(
        &path,
        r#"
module = "pulp-server"
variants = ["targeted", "mls"]
semodule = "/opt/bin/semodule"
policy_dir = "/opt/selinux"
timeout_secs = 30
log_dir = "/var/log/pulp-selinux"
"#,
    )
    .expect("should write config");

    let config = Config::load_with(Some(&path), no_env).expect("config should load");

    assert_eq!(config.module, "pulp-server");
    assert_eq!(config.variants, vec![PolicyVariant::Targeted, PolicyVariant::Mls]);
    assert_eq!(config.semodule, PathBuf::from("/opt/bin/semodule"));
    assert_eq!(config.policy_dir, PathBuf::from("/opt/selinux"));
    assert_eq!(config.timeout_secs, 30);
    assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/pulp-selinux")));
}

#[test]
fn env_overrides_file_values() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("config.toml");
    fs::write(&path, "module = \"from-file\"\ntimeout_secs = 30\n").expect("should write config");

    let config = Config::load_with(Some(&path), |key| match key {
        "PULP_SELINUX_MODULE" => Some("from-env".to_owned()),
        "PULP_SELINUX_SEMODULE" => Some("/tmp/semodule".to_owned()),
        _ => None,
    })
    .expect("config should load");

    assert_eq!(config.module, "from-env");
    assert_eq!(config.semodule, PathBuf::from("/tmp/semodule"));
    assert_eq!(config.timeout_secs, 30);
}

#[test]
fn unknown_variant_is_a_parse_error() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("config.toml");
    fs::write(&path, "variants = [\"minimum\"]\n").expect("should write config");

    let result = Config::load_with(Some(&path), no_env);
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn invalid_values_are_rejected() {
    for bad in [
        Config {
            module: String::new(),
            ..Config::default()
        },
        Config {
            module: "../pulp".to_owned(),
            ..Config::default()
        },
        Config {
            variants: Vec::new(),
            ..Config::default()
        },
        Config {
            timeout_secs: 0,
            ..Config::default()
        },
    ] {
        assert!(
            matches!(bad.validate(), Err(ConfigError::Invalid(_))),
            "should reject {bad:?}"
        );
    }
}
