use crate::tests::{EnvGuard, setup_config_dir, write_config};
use crate::{Config, ConfigError};

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, none, ok, some};
use log::LevelFilter;
use serial_test::serial;

#[test]
#[serial]
fn given_no_config_file_when_load_then_defaults_used() {
    // Given
    let (_temp, _dir) = setup_config_dir();
    let _port = EnvGuard::remove("PORT");
    let _port2 = EnvGuard::remove("PARLEY_SERVER_PORT");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.server.port, eq(3000));
    assert_that!(config.server.host.as_str(), eq("127.0.0.1"));
    assert_that!(config.auth.otp_ttl_secs, eq(600));
    assert_that!(config.auth.session_ttl_secs, eq(86_400));
    assert_that!(
        config.upstream.coding_model.as_str(),
        eq("anthropic/claude-3.5-sonnet")
    );
    assert_that!(config.validate(), ok(anything()));
}

#[test]
#[serial]
fn given_missing_config_dir_when_load_then_directory_created() {
    // Given
    let temp = tempfile::TempDir::new().unwrap();
    let nested = temp.path().join("nested").join("cfg");
    let _dir = EnvGuard::set("PARLEY_CONFIG_DIR", nested.to_str().unwrap());

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    assert!(nested.is_dir());
}

#[test]
#[serial]
fn given_partial_toml_when_load_then_missing_sections_defaulted() {
    // Given
    let (temp, _dir) = setup_config_dir();
    let _port = EnvGuard::remove("PORT");
    let _port2 = EnvGuard::remove("PARLEY_SERVER_PORT");
    write_config(
        &temp,
        r#"
[server]
port = 4100

[logging]
level = "debug"
"#,
    );

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.server.port, eq(4100));
    assert_that!(*config.logging.level, eq(LevelFilter::Debug));
    assert_that!(config.uploads.max_bytes, eq(10 * 1024 * 1024));
}

#[test]
#[serial]
fn given_malformed_toml_when_load_then_toml_error() {
    // Given
    let (temp, _dir) = setup_config_dir();
    write_config(&temp, "[server\nport = ");

    // When
    let result = Config::load();

    // Then
    assert!(matches!(result, Err(ConfigError::Toml { .. })));
}

#[test]
#[serial]
fn given_unknown_log_level_when_load_then_falls_back_to_info() {
    // Given
    let (temp, _dir) = setup_config_dir();
    write_config(&temp, "[logging]\nlevel = \"chatty\"\n");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(*config.logging.level, eq(LevelFilter::Info));
}

#[test]
#[serial]
fn given_openrouter_key_env_when_load_then_api_key_set() {
    // Given
    let (_temp, _dir) = setup_config_dir();
    let _key = EnvGuard::set("OPENROUTER_API_KEY", "sk-test");
    let _override = EnvGuard::remove("PARLEY_UPSTREAM_API_KEY");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.upstream.api_key.as_deref(), some(eq("sk-test")));
}

#[test]
#[serial]
fn given_empty_env_value_when_load_then_option_left_unset() {
    // Given
    let (_temp, _dir) = setup_config_dir();
    let _id = EnvGuard::set("GOOGLE_CLIENT_ID", "  ");
    let _secret = EnvGuard::remove("GOOGLE_CLIENT_SECRET");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.oauth.google_client_id, none());
    assert!(!config.oauth.is_enabled());
}

#[test]
#[serial]
fn given_port_env_when_load_then_overrides_toml() {
    // Given
    let (temp, _dir) = setup_config_dir();
    let _override = EnvGuard::remove("PARLEY_SERVER_PORT");
    write_config(&temp, "[server]\nport = 4100\n");
    let _port = EnvGuard::set("PORT", "5200");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.server.port, eq(5200));
    assert_that!(config.bind_addr().as_str(), eq("127.0.0.1:5200"));
}

#[test]
#[serial]
fn given_no_app_url_when_app_url_then_localhost_with_port() {
    // Given
    let mut config = Config::default();
    config.server.port = 4321;

    // When / Then
    assert_that!(config.app_url().as_str(), eq("http://localhost:4321"));

    config.oauth.app_url = Some("https://chat.example.com/".into());
    assert_that!(config.app_url().as_str(), eq("https://chat.example.com"));
}

#[test]
#[serial]
fn given_config_dir_env_when_uploads_path_then_joined_under_config_dir() {
    // Given
    let (temp, _dir) = setup_config_dir();
    let config = Config::default();

    // When
    let path = config.uploads_path().unwrap();

    // Then
    assert_that!(path, eq(&temp.path().join("uploads")));
}

#[test]
#[serial]
fn given_non_http_webhook_when_validate_then_error() {
    // Given
    let mut config = Config::default();
    config.notifier.webhook_url = Some("ftp://mail".into());

    // When / Then
    assert_that!(config.validate(), err(anything()));
}
