//! Configuration loading from the build directory and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    /// An environment variable held a value that does not parse.
    Env {
        var: String,
        value: String,
    },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, value } => {
                write!(f, "Invalid value for {}: {:?}", var, value)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate the configuration for a build directory.
///
/// Order: defaults, then the optional `gateway.toml` the build phase baked
/// next to the assets, then the environment overlay. The environment always
/// wins so a deployment can be retargeted without touching the build.
pub fn load(build_dir: &Path) -> Result<GatewayConfig, ConfigError> {
    let baked = build_dir.join("gateway.toml");

    let mut config: GatewayConfig = if baked.is_file() {
        let content = fs::read_to_string(&baked).map_err(ConfigError::Io)?;
        toml::from_str(&content).map_err(ConfigError::Parse)?
    } else {
        GatewayConfig::default()
    };

    config.paths.build_dir = build_dir.to_path_buf();

    apply_env(&mut config)?;
    normalize(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`, honoring its prefix.
fn apply_env(config: &mut GatewayConfig) -> Result<(), ConfigError> {
    let prefix = config.env_prefix.clone();
    let var = move |name: &str| std::env::var(format!("{}{}", prefix, name)).ok();

    if let Some(origin) = var("ORIGIN") {
        config.forwarded.origin = Some(origin);
    }

    if let Some(depth) = var("XFF_DEPTH") {
        config.forwarded.xff_depth = depth.trim().parse().map_err(|_| ConfigError::Env {
            var: config.env_name("XFF_DEPTH"),
            value: depth.clone(),
        })?;
    }

    if let Some(header) = var("ADDRESS_HEADER") {
        config.forwarded.address_header = Some(header);
    }
    if let Some(header) = var("PROTOCOL_HEADER") {
        config.forwarded.protocol_header = Some(header);
    }
    if let Some(header) = var("HOST_HEADER") {
        config.forwarded.host_header = Some(header);
    }

    if let Some(logreq) = var("LOGREQ") {
        config.observability.log_requests = logreq.trim().eq_ignore_ascii_case("true");
    }

    let host = var("HOST");
    let port = var("PORT");
    if host.is_some() || port.is_some() {
        let (current_host, current_port) = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(h, p)| (h.to_string(), p.to_string()))
            .unwrap_or_else(|| (config.listener.bind_address.clone(), "3000".to_string()));

        let port = port.unwrap_or(current_port);
        let port: u16 = port.trim().parse().map_err(|_| ConfigError::Env {
            var: config.env_name("PORT"),
            value: port.clone(),
        })?;

        config.listener.bind_address = format!("{}:{}", host.unwrap_or(current_host), port);
    }

    Ok(())
}

/// Canonicalize values after the overlay.
///
/// Header names are lower-cased for case-insensitive lookup, and empty
/// strings (the environment's way of unsetting a baked value) become None.
fn normalize(config: &mut GatewayConfig) {
    for header in [
        &mut config.forwarded.address_header,
        &mut config.forwarded.protocol_header,
        &mut config.forwarded.host_header,
    ] {
        if let Some(name) = header.take() {
            let name = name.trim().to_lowercase();
            if !name.is_empty() {
                *header = Some(name);
            }
        }
    }

    if let Some(origin) = config.forwarded.origin.take() {
        let origin = origin.trim().to_string();
        if !origin.is_empty() {
            config.forwarded.origin = Some(origin);
        }
    }
}
