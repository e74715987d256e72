//! Daemon configuration, read from `WORKQ_*` environment variables

use std::time::Duration;
use workq_api_rpc::server::DEFAULT_RPC_PORT;
use workq_api_rpc::RpcServerConfig;
use workq_core::application::worker::constants::DEFAULT_REPORT_INTERVAL;
use workq_core::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub rpc: RpcServerConfig,
    /// `None` disables periodic queue reports
    pub report_interval: Option<Duration>,
    pub log_format: LogFormat,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            rpc: RpcServerConfig::default(),
            report_interval: Some(DEFAULT_REPORT_INTERVAL),
            log_format: LogFormat::Pretty,
        }
    }
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("WORKQ_RPC_HOST") {
            config.rpc.host = host;
        }

        config.rpc.port = parse_or(&lookup, "WORKQ_RPC_PORT", DEFAULT_RPC_PORT)?;

        let interval_secs = parse_or(
            &lookup,
            "WORKQ_REPORT_INTERVAL_SECS",
            DEFAULT_REPORT_INTERVAL.as_secs(),
        )?;
        config.report_interval = match interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        config.log_format = match lookup("WORKQ_LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "WORKQ_LOG_FORMAT must be 'pretty' or 'json', got '{}'",
                    other
                )))
            }
        };

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{} = '{}': {}", key, raw, e))),
    }
}
