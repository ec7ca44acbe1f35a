use crate::config::{BridgeConfig, PushMode};
use std::env;
use std::sync::Mutex;
use std::sync::OnceLock;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

const VARS: &[&str] = &[
    "PUSHGATEWAY_URL",
    "PUSHGATEWAY_JOB",
    "PUSHGATEWAY_TIMEOUT_SECS",
    "PUSH_MODE",
    "JAEGER_ENABLED",
    "JAEGER_AGENT_HOST",
    "JAEGER_AGENT_PORT",
];

fn clear_vars() {
    for var in VARS {
        // SAFETY: env mutation is serialized by ENV_LOCK
        unsafe { env::remove_var(var) };
    }
}

fn set_var(key: &str, value: &str) {
    // SAFETY: env mutation is serialized by ENV_LOCK
    unsafe { env::set_var(key, value) };
}

#[test]
fn test_config_defaults() {
    let _guard = get_env_lock().lock().unwrap();
    clear_vars();

    let config = BridgeConfig::from_env().unwrap();

    assert_eq!(config.gateway_url, "http://localhost:9091");
    assert_eq!(config.job, "job_collector");
    assert_eq!(config.push_timeout.as_secs(), 30);
    assert_eq!(config.push_mode, PushMode::Immediate);
    assert!(!config.tracing_enabled());
    assert_eq!(config.jaeger_agent_port, 6831);
}

#[test]
fn test_config_with_jaeger_enabled() {
    let _guard = get_env_lock().lock().unwrap();
    clear_vars();

    set_var("PUSHGATEWAY_URL", "pushgateway.monitoring:9091");
    set_var("PUSHGATEWAY_JOB", "lambda_logs");
    set_var("PUSH_MODE", "buffered");
    set_var("JAEGER_ENABLED", "true");
    set_var("JAEGER_AGENT_HOST", "jaeger.monitoring");
    set_var("JAEGER_AGENT_PORT", "6832");

    let config = BridgeConfig::from_env().unwrap();

    assert_eq!(config.gateway_url, "pushgateway.monitoring:9091");
    assert_eq!(config.job, "lambda_logs");
    assert_eq!(config.push_mode, PushMode::Buffered);
    assert_eq!(config.jaeger_agent_host.as_deref(), Some("jaeger.monitoring"));
    assert_eq!(config.jaeger_agent_port, 6832);

    clear_vars();
}

#[test]
fn test_config_rejects_bad_values() {
    let _guard = get_env_lock().lock().unwrap();
    clear_vars();

    set_var("JAEGER_AGENT_PORT", "not-a-port");
    assert!(BridgeConfig::from_env().is_err());
    clear_vars();

    set_var("PUSHGATEWAY_TIMEOUT_SECS", "-3");
    assert!(BridgeConfig::from_env().is_err());
    clear_vars();

    set_var("PUSH_MODE", "sometimes");
    assert!(BridgeConfig::from_env().is_err());
    clear_vars();

    for flag in ["yes", "1"] {
        set_var("JAEGER_ENABLED", flag);
        let error = BridgeConfig::from_env().unwrap_err();
        assert!(format!("{:#}", error).contains("JAEGER_ENABLED"));
        clear_vars();
    }
}

#[test]
fn test_builder_helpers() {
    let config = BridgeConfig::new("localhost:9091", "svc")
        .with_jaeger_agent("127.0.0.1", 6831)
        .with_grouping_key("instance", "worker-1")
        .with_push_mode(PushMode::Buffered);

    assert!(config.tracing_enabled());
    assert_eq!(
        config.grouping,
        vec![("instance".to_string(), "worker-1".to_string())]
    );
    assert_eq!(config.push_mode, PushMode::Buffered);
}
