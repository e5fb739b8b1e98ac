//! Config environment variable tests
//!
//! These tests verify that Config::from_env() reads and applies
//! environment-variable overrides, including the sampling clamps.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use metabolens::config::{Config, LogFormat};
use serial_test::serial;
use std::env;

#[test]
#[serial]
fn config_loads_without_api_key() {
    env::remove_var("METABOLENS_API_KEY");
    let config = Config::from_env();
    // Missing credential is not a startup failure; it blocks workflows
    // at call time instead.
    assert!(config.llm.api_key.is_none());
    assert_eq!(config.llm.model, "gpt-4o-mini");
}

#[test]
#[serial]
fn custom_base_url_and_model() {
    env::set_var("METABOLENS_BASE_URL", "https://custom.api.com");
    env::set_var("METABOLENS_MODEL", "gpt-4.1");

    let config = Config::from_env();
    assert_eq!(config.llm.base_url, "https://custom.api.com");
    assert_eq!(config.llm.model, "gpt-4.1");

    env::remove_var("METABOLENS_BASE_URL");
    env::remove_var("METABOLENS_MODEL");
}

#[test]
#[serial]
fn empty_api_key_counts_as_absent() {
    env::set_var("METABOLENS_API_KEY", "");
    let config = Config::from_env();
    assert!(config.llm.api_key.is_none());
    env::remove_var("METABOLENS_API_KEY");
}

#[test]
#[serial]
fn max_tokens_is_clamped_to_range() {
    env::set_var("MAX_OUTPUT_TOKENS", "20000");
    assert_eq!(Config::from_env().sampling.max_tokens, 8000);

    env::set_var("MAX_OUTPUT_TOKENS", "10");
    assert_eq!(Config::from_env().sampling.max_tokens, 1000);

    env::set_var("MAX_OUTPUT_TOKENS", "3000");
    assert_eq!(Config::from_env().sampling.max_tokens, 3000);

    env::remove_var("MAX_OUTPUT_TOKENS");
}

#[test]
#[serial]
fn temperature_is_clamped_to_unit_interval() {
    env::set_var("TEMPERATURE", "3.5");
    assert_eq!(Config::from_env().sampling.temperature, 1.0);

    env::set_var("TEMPERATURE", "-1");
    assert_eq!(Config::from_env().sampling.temperature, 0.0);

    env::set_var("TEMPERATURE", "0.2");
    assert_eq!(Config::from_env().sampling.temperature, 0.2);

    env::remove_var("TEMPERATURE");
}

#[test]
#[serial]
fn unparseable_numeric_vars_fall_back_to_defaults() {
    env::set_var("MAX_OUTPUT_TOKENS", "lots");
    env::set_var("REQUEST_TIMEOUT_MS", "soon");

    let config = Config::from_env();
    assert_eq!(config.sampling.max_tokens, 4000);
    assert_eq!(config.request.timeout_ms, 120_000);

    env::remove_var("MAX_OUTPUT_TOKENS");
    env::remove_var("REQUEST_TIMEOUT_MS");
}

#[test]
#[serial]
fn json_log_format() {
    env::set_var("LOG_FORMAT", "json");
    assert_eq!(Config::from_env().logging.format, LogFormat::Json);

    env::set_var("LOG_FORMAT", "pretty");
    assert_eq!(Config::from_env().logging.format, LogFormat::Pretty);

    env::remove_var("LOG_FORMAT");
}
