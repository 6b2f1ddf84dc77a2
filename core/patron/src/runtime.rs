// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use std::time;

use duration_str::deserialize_duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("failed to build runtime: {0}")]
    Build(#[from] std::io::Error),
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfiguration {
    /// Worker threads. 0 means one per available core.
    #[serde(default = "default_n_cores")]
    n_cores: usize,

    /// Name given to the runtime threads
    #[serde(default = "default_thread_name")]
    thread_name: String,

    /// Time allowed to the servers to stop once shutdown is requested
    #[serde(
        default = "default_drain_timeout",
        deserialize_with = "deserialize_duration"
    )]
    drain_timeout: time::Duration,
}

impl Default for RuntimeConfiguration {
    fn default() -> Self {
        RuntimeConfiguration {
            n_cores: default_n_cores(),
            thread_name: default_thread_name(),
            drain_timeout: default_drain_timeout(),
        }
    }
}

fn default_n_cores() -> usize {
    0
}

fn default_thread_name() -> String {
    "patron".to_string()
}

fn default_drain_timeout() -> time::Duration {
    time::Duration::from_secs(10)
}

impl RuntimeConfiguration {
    pub fn new() -> Self {
        RuntimeConfiguration::default()
    }

    pub fn with_cores(self, n_cores: usize) -> Self {
        RuntimeConfiguration { n_cores, ..self }
    }

    pub fn with_thread_name(self, thread_name: &str) -> Self {
        RuntimeConfiguration {
            thread_name: thread_name.to_string(),
            ..self
        }
    }

    pub fn with_drain_timeout(self, drain_timeout: time::Duration) -> Self {
        RuntimeConfiguration {
            drain_timeout,
            ..self
        }
    }

    pub fn n_cores(&self) -> usize {
        self.n_cores
    }

    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    pub fn drain_timeout(&self) -> time::Duration {
        self.drain_timeout
    }

    /// Worker threads actually used on this machine.
    pub fn effective_cores(&self) -> usize {
        let n_cpu = num_cpus::get().max(1);

        if self.n_cores > n_cpu {
            warn!(
                requested = self.n_cores,
                available = n_cpu,
                "requested more cores than available: using all available cores"
            );
            n_cpu
        } else if self.n_cores == 0 {
            n_cpu
        } else {
            self.n_cores
        }
    }
}

pub struct PatronRuntime {
    pub config: RuntimeConfiguration,
    pub runtime: Runtime,
}

pub fn build(config: &RuntimeConfiguration) -> Result<PatronRuntime, RuntimeError> {
    let cores = config.effective_cores();

    let runtime = match cores {
        1 => {
            info!("using single-threaded runtime");
            Builder::new_current_thread()
                .enable_all()
                .thread_name(config.thread_name.as_str())
                .build()?
        }
        _ => {
            info!(%cores, "using multi-threaded runtime");
            Builder::new_multi_thread()
                .enable_all()
                .thread_name(config.thread_name.as_str())
                .worker_threads(cores)
                .build()?
        }
    };

    Ok(PatronRuntime {
        config: config.clone(),
        runtime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_configuration() {
        let config = RuntimeConfiguration::default();
        assert_eq!(config.n_cores(), 0);
        assert_eq!(config.thread_name(), "patron");
        assert_eq!(config.drain_timeout(), time::Duration::from_secs(10));

        let config = RuntimeConfiguration::new()
            .with_cores(1)
            .with_thread_name("test")
            .with_drain_timeout(time::Duration::from_secs(5));
        assert_eq!(config.n_cores(), 1);
        assert_eq!(config.thread_name(), "test");
        assert_eq!(config.drain_timeout(), time::Duration::from_secs(5));
    }

    #[test]
    fn test_effective_cores() {
        let n_cpu = num_cpus::get();
        assert_eq!(RuntimeConfiguration::new().effective_cores(), n_cpu);
        assert_eq!(
            RuntimeConfiguration::new()
                .with_cores(n_cpu + 100)
                .effective_cores(),
            n_cpu
        );
        assert_eq!(
            RuntimeConfiguration::new().with_cores(1).effective_cores(),
            1
        );
    }

    #[test]
    fn test_runtime_builder() {
        let runtime = build(&RuntimeConfiguration::default()).unwrap();
        assert_eq!(runtime.config.n_cores(), 0);
        assert_eq!(runtime.runtime.block_on(async { 1 + 1 }), 2);

        let runtime = build(&RuntimeConfiguration::new().with_cores(1)).unwrap();
        assert_eq!(runtime.runtime.block_on(async { "single" }), "single");
    }

    #[test]
    fn test_deserialize() {
        let config: RuntimeConfiguration =
            serde_yaml::from_str("n_cores: 2\ndrain_timeout: 3s\n").unwrap();
        assert_eq!(config.n_cores(), 2);
        assert_eq!(config.thread_name(), "patron");
        assert_eq!(config.drain_timeout(), time::Duration::from_secs(3));

        assert!(serde_yaml::from_str::<RuntimeConfiguration>("cores: 2\n").is_err());
    }
}
