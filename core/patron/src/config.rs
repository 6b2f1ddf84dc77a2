// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0
//
// ConfigLoader reads the configuration file once and exposes cached
// accessors for each top-level section. A section is decoded and validated
// the first time it is requested.

use std::collections::HashSet;

use lazy_static::lazy_static;
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use thiserror::Error;
use tracing::debug;

use crate::runtime::RuntimeConfiguration;
use patron_config::component::configuration::Configuration;
use patron_gateway::config::GatewayConfig;
use patron_service::server::RpcConfiguration;
use patron_tracing::TracingConfiguration;

#[derive(Error, Debug)]
pub enum ConfigError {
    // File / I/O
    #[error("not found: {0}")]
    NotFound(String),

    // Parsing / structural validity
    #[error("invalid configuration - impossible to parse yaml")]
    InvalidYaml,
    #[error("invalid configuration - key {0} not valid")]
    InvalidKey(String),
    #[error("invalid configuration - missing {0} section")]
    MissingSection(&'static str),
    #[error("invalid {section} configuration: {reason}")]
    Invalid {
        section: &'static str,
        reason: String,
    },

    // YAML decoding
    #[error("yaml parse error in {section}: {source}")]
    YamlError {
        section: &'static str,
        source: serde_yaml::Error,
    },
}

const TRACING: &str = "tracing";
const RUNTIME: &str = "runtime";
const RPC: &str = "rpc";
const GATEWAY: &str = "gateway";

lazy_static! {
    static ref CONFIG_KEYS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert(TRACING);
        s.insert(RUNTIME);
        s.insert(RPC);
        s.insert(GATEWAY);
        s
    };
}

pub struct ConfigLoader {
    root: Value,
    tracing: Option<TracingConfiguration>,
    runtime: Option<RuntimeConfiguration>,
    rpc: Option<RpcConfiguration>,
    gateway: Option<Option<GatewayConfig>>,
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let root_keys = self
            .root
            .as_mapping()
            .map(|m| {
                m.keys()
                    .filter_map(|k| k.as_str())
                    .map(|s| s.to_string())
                    .collect::<Vec<String>>()
            })
            .unwrap_or_default();

        // sections are not printed: the rpc one holds the password
        f.debug_struct("ConfigLoader")
            .field("root_keys", &root_keys)
            .field("tracing_loaded", &self.tracing.is_some())
            .field("runtime_loaded", &self.runtime.is_some())
            .field("rpc_loaded", &self.rpc.is_some())
            .field("gateway_loaded", &self.gateway.is_some())
            .finish()
    }
}

impl ConfigLoader {
    pub fn new(file_path: &str) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(file_path)
            .map_err(|e| ConfigError::NotFound(format!("{}: {}", file_path, e)))?;

        Self::from_yaml(&config_str)
    }

    /// Build the loader from YAML text. Only the set of top-level keys is
    /// checked here. An empty document is an empty configuration.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_yaml::from_str(content).map_err(|_| ConfigError::InvalidYaml)?;

        match &root {
            Value::Null => {}
            Value::Mapping(mapping) => {
                for key in mapping.keys() {
                    let k = key.as_str().ok_or(ConfigError::InvalidYaml)?;
                    if !CONFIG_KEYS.contains(k) {
                        return Err(ConfigError::InvalidKey(k.to_string()));
                    }
                }
            }
            _ => return Err(ConfigError::InvalidYaml),
        }

        Ok(Self {
            root,
            tracing: None,
            runtime: None,
            rpc: None,
            gateway: None,
        })
    }

    /// Logging settings. Defaults apply when the section is absent.
    pub fn tracing(&mut self) -> Result<&TracingConfiguration, ConfigError> {
        let cfg = match self.tracing.take() {
            Some(cfg) => cfg,
            None => {
                let cfg = section(&self.root, TRACING)?.unwrap_or_default();
                debug!(?cfg, "tracing configuration loaded");
                cfg
            }
        };

        Ok(&*self.tracing.insert(cfg))
    }

    /// Runtime settings. Defaults apply when the section is absent.
    pub fn runtime(&mut self) -> Result<&RuntimeConfiguration, ConfigError> {
        let cfg = match self.runtime.take() {
            Some(cfg) => cfg,
            None => {
                let cfg = section(&self.root, RUNTIME)?.unwrap_or_default();
                debug!(?cfg, "runtime configuration loaded");
                cfg
            }
        };

        Ok(&*self.runtime.insert(cfg))
    }

    /// The customer service settings. This section is mandatory.
    pub fn rpc(&mut self) -> Result<&RpcConfiguration, ConfigError> {
        let cfg = match self.rpc.take() {
            Some(cfg) => cfg,
            None => {
                let cfg: RpcConfiguration =
                    section(&self.root, RPC)?.ok_or(ConfigError::MissingSection(RPC))?;
                validate(RPC, &cfg)?;
                debug!(endpoint = %cfg.server.endpoint, "rpc configuration loaded");
                cfg
            }
        };

        Ok(&*self.rpc.insert(cfg))
    }

    /// The HTTP gateway settings, if the gateway is enabled.
    pub fn gateway(&mut self) -> Result<Option<&GatewayConfig>, ConfigError> {
        let cfg = match self.gateway.take() {
            Some(cfg) => cfg,
            None => {
                let cfg: Option<GatewayConfig> = section(&self.root, GATEWAY)?;
                if let Some(cfg) = &cfg {
                    validate(GATEWAY, cfg)?;
                    debug!(endpoint = %cfg.endpoint, "gateway configuration loaded");
                }
                cfg
            }
        };

        Ok(self.gateway.insert(cfg).as_ref())
    }
}

fn section<T: DeserializeOwned>(root: &Value, key: &'static str) -> Result<Option<T>, ConfigError> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_yaml::from_value(value.clone())
            .map(Some)
            .map_err(|source| ConfigError::YamlError {
                section: key,
                source,
            }),
    }
}

fn validate<C: Configuration>(section: &'static str, config: &C) -> Result<(), ConfigError> {
    config.validate().map_err(|e| {
        debug!(error = %e, section, "configuration validation failed");
        ConfigError::Invalid {
            section,
            reason: e.to_string(),
        }
    })
}
