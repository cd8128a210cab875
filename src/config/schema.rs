//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from the TOML file.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::pipeline::{LegacyOptions, LegacyVariant};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Inbound listener settings.
    pub listener: ListenerConfig,

    /// Upstream HTTP client settings.
    pub upstream: UpstreamConfig,

    /// Digipos credentials and command endpoints.
    pub digipos: DigiposConfig,

    /// Output shaping.
    pub response: ResponseConfig,

    /// Inbound timeouts.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Upstream client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Name used in logs.
    pub name: String,

    /// Base URL every endpoint is joined onto.
    pub base_url: String,

    /// Default headers sent with every request.
    pub headers: IndexMap<String, String>,

    /// Total request timeout in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Maximum idle pooled connections per host.
    pub pool_max_idle: usize,

    /// Idle pooled connection lifetime in seconds.
    pub pool_idle_timeout_secs: u64,

    /// Retry policy.
    pub retry: RetryConfig,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        let mut headers = IndexMap::new();
        headers.insert(
            "User-Agent".to_string(),
            concat!("digipos-gateway/", env!("CARGO_PKG_VERSION")).to_string(),
        );
        headers.insert("Accept".to_string(), "application/json".to_string());

        Self {
            name: "digipos".to_string(),
            base_url: "http://127.0.0.1:10003/".to_string(),
            headers,
            timeout_secs: 10,
            connect_timeout_secs: 5,
            pool_max_idle: 100,
            pool_idle_timeout_secs: 300,
            retry: RetryConfig::default(),
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, first one included.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Upstream statuses that trigger a retry.
    pub status_forcelist: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 5,
            base_delay_ms: 500,
            max_delay_ms: 8000,
            status_forcelist: vec![429, 500, 502, 503, 504],
        }
    }
}

/// Digipos account configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DigiposConfig {
    /// Account username every command must present.
    pub username: String,

    /// Account password required by `login`.
    pub password: String,

    /// Upstream endpoint per command.
    pub endpoints: DigiposEndpoints,
}

/// Upstream endpoint paths, relative to `upstream.base_url`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DigiposEndpoints {
    pub login: String,
    pub verify_otp: String,
    pub balance: String,
    pub profile: String,
    pub list_va: String,
    pub logout: String,
    pub reward: String,
    pub banner: String,
    pub sim_status: String,
}

impl Default for DigiposEndpoints {
    fn default() -> Self {
        Self {
            login: "add_account".to_string(),
            verify_otp: "add_account_otp".to_string(),
            balance: "balance".to_string(),
            profile: "profile".to_string(),
            list_va: "list_va".to_string(),
            logout: "logout".to_string(),
            reward: "reward_summary".to_string(),
            banner: "banner".to_string(),
            sim_status: "sim_status".to_string(),
        }
    }
}

impl DigiposEndpoints {
    /// All endpoints paired with their command names.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("login", self.login.as_str()),
            ("verify_otp", self.verify_otp.as_str()),
            ("balance", self.balance.as_str()),
            ("profile", self.profile.as_str()),
            ("list_va", self.list_va.as_str()),
            ("logout", self.logout.as_str()),
            ("reward", self.reward.as_str()),
            ("banner", self.banner.as_str()),
            ("sim_status", self.sim_status.as_str()),
        ]
        .into_iter()
    }
}

/// Output format returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Flattened `key=value&key=value` text.
    #[default]
    Legacy,
    /// JSON envelope.
    Structured,
}

/// Response shaping configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Populate envelope `meta` by default.
    pub debug: bool,

    /// Default output format.
    pub mode: ResponseMode,

    /// Legacy text options.
    pub legacy: LegacyConfig,
}

/// Legacy text configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LegacyConfig {
    /// Character stripping variant.
    pub variant: LegacyVariant,

    /// Prepend envelope fields before the payload.
    pub include_envelope: bool,
}

impl LegacyConfig {
    pub fn options(&self) -> LegacyOptions {
        LegacyOptions {
            variant: self.variant,
            include_envelope: self.include_envelope,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Inbound request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
