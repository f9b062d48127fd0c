//! Configuration schema definitions.
//!
//! This module defines the on-disk shape of a routing table and of the
//! binary's settings. All types derive Serde traits for deserialization from
//! config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::routing::params::ParamValue;
use crate::routing::pattern::{Capture, CaptureRule};
use crate::routing::router::RouterOptions;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SignpostConfig {
    /// Listener configuration for `signpost serve`.
    pub listener: ListenerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Options shared by every router in the tree.
    pub router: RouterOptions,

    /// Routes, in match order.
    pub routes: Vec<RouteConfig>,

    /// Redirects, tried after `routes`.
    pub redirects: Vec<RedirectConfig>,

    /// Nested routers, tried after `redirects`.
    pub mounts: Vec<MountConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// A route to an endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct RouteConfig {
    /// Single method (default `GET`); `ANY` for every method.
    pub method: Option<String>,

    /// Several methods; exclusive with `method`.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Path template.
    pub path: String,

    /// Endpoint spec (`users#show`); omitted means resolved per request.
    pub to: Option<String>,

    /// Route name for reverse routing.
    pub name: Option<String>,

    /// Default params.
    #[serde(default)]
    pub params: BTreeMap<String, ConfigValue>,

    /// Capture constraints.
    pub capture: Option<CaptureConfig>,

    /// Template of paths to reject.
    pub except: Option<String>,
}

/// A redirect route answering every method.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct RedirectConfig {
    /// Path template to match.
    pub path: String,

    /// Target template, expanded with the matched params.
    pub to: Option<String>,

    /// Target route name; exclusive with `to`.
    pub to_route: Option<String>,

    /// Redirect status (3xx); defaults to `router.default_redirect_status`.
    pub status: Option<u16>,

    /// Leftover params policy for `to`: `ignore` or `append`.
    pub additional: Option<String>,
}

/// A nested router. Paths inside it are relative to `path`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(default)]
pub struct MountConfig {
    /// Prefix the nested router is mounted under.
    pub path: String,

    pub routes: Vec<RouteConfig>,
    pub redirects: Vec<RedirectConfig>,
    pub mounts: Vec<MountConfig>,
}

/// A scalar param value as written in TOML.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl From<&ConfigValue> for ParamValue {
    fn from(value: &ConfigValue) -> Self {
        match value {
            ConfigValue::Bool(b) => ParamValue::Bool(*b),
            ConfigValue::Integer(i) => ParamValue::Integer(*i),
            ConfigValue::Text(s) => ParamValue::Text(s.clone()),
        }
    }
}

/// Capture constraints: one rule for all captures, or a table per name.
///
/// Rules are character classes (`digit`), alternatives (`json|html`) or
/// regular expressions.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum CaptureConfig {
    All(String),
    Named(BTreeMap<String, String>),
}

impl From<&CaptureConfig> for Capture {
    fn from(config: &CaptureConfig) -> Self {
        match config {
            CaptureConfig::All(rule) => Capture::All(CaptureRule::parse(rule)),
            CaptureConfig::Named(rules) => Capture::Named(
                rules
                    .iter()
                    .map(|(name, rule)| (name.clone(), CaptureRule::parse(rule)))
                    .collect(),
            ),
        }
    }
}
