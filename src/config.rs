//! Configuration management for the FOP Editor server and FOP sidecar

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::render::FopCommandConfig;

/// Default cap on request bodies (16 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Public API tier configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub renderer: RendererConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RendererConfig {
    /// FOP sidecar render URL; `None` selects the stub renderer
    pub fop_endpoint: Option<String>,
}

/// FOP sidecar configuration
#[derive(Debug, Clone)]
pub struct SidecarConfig {
    pub server: ServerConfig,
    pub fop: FopCommandConfig,
}

impl ServerConfig {
    fn with_port(port: u16) -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>, default_port: u16) -> Self {
        ServerConfig {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(lookup, "PORT", default_port),
            max_body_bytes: parse_or(lookup, "MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
        }
    }

    /// Socket address string to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::with_port(8080),
            renderer: RendererConfig::default(),
        }
    }
}

impl Default for SidecarConfig {
    fn default() -> Self {
        SidecarConfig {
            server: ServerConfig::with_port(8090),
            fop: FopCommandConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Config {
            server: ServerConfig::from_lookup(&lookup, 8080),
            renderer: RendererConfig {
                fop_endpoint: lookup("FOP_ENDPOINT"),
            },
        }
    }
}

impl SidecarConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = FopCommandConfig::default();
        SidecarConfig {
            server: ServerConfig::from_lookup(&lookup, 8090),
            fop: FopCommandConfig {
                fop_path: lookup("FOP_BIN").unwrap_or(defaults.fop_path),
                base_args: lookup("FOP_ARGS")
                    .map(|args| args.split_whitespace().map(str::to_string).collect())
                    .unwrap_or_default(),
                work_root: lookup("FOP_WORK_DIR").map(PathBuf::from),
                max_run_time: defaults.max_run_time,
            },
        }
    }
}

/// Read a variable, treating empty values as unset
fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        None => default,
    }
}
