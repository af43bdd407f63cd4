//! Environment-driven configuration.
//!
//! | Variable            | Default                 |
//! |---------------------|-------------------------|
//! | `ENGINE_HOST`       | `http://localhost:2375` |
//! | `LISTEN_ADDR`       | `0.0.0.0:3000`          |
//! | `LIGHT_LOG_TAIL`    | `5`                     |
//! | `FULL_LOG_TAIL`     | `50`                    |
//! | `SUMMARY_LOG_TAIL`  | `10`                    |
//! | `MAX_CONCURRENCY`   | `16`                    |
//! | `TASK_TIMEOUT_SECS` | `10` (`0` disables)     |
//! | `SILENT_LOG_POLICY` | `fail-closed`           |

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::engine::Endpoint;
use crate::health::SilentLogPolicy;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid value for `{key}`: `{value}`: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Knobs of the per-container fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationConfig {
    pub light_log_tail: usize,
    pub full_log_tail: usize,
    pub summary_log_tail: usize,
    /// Upper bound on containers processed at the same time. Always at least 1.
    pub max_concurrency: usize,
    /// Deadline for one container's processing; `None` waits forever.
    pub task_timeout: Option<Duration>,
    pub silent_log_policy: SilentLogPolicy,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            light_log_tail: 5,
            full_log_tail: 50,
            summary_log_tail: 10,
            max_concurrency: 16,
            task_timeout: Some(Duration::from_secs(10)),
            silent_log_policy: SilentLogPolicy::FailClosed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub engine: Endpoint,
    pub listen_addr: String,
    pub aggregation: AggregationConfig,
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(err) => Err(Error::InvalidValue {
                key,
                reason: err.to_string(),
                value,
            }),
        },
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns `None` for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = AggregationConfig::default();
        let engine = parse_var(
            &lookup,
            "ENGINE_HOST",
            Endpoint::Tcp("localhost:2375".to_owned()),
        )?;
        let listen_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_owned());

        let max_concurrency: usize =
            parse_var(&lookup, "MAX_CONCURRENCY", defaults.max_concurrency)?;
        if max_concurrency == 0 {
            return Err(Error::InvalidValue {
                key: "MAX_CONCURRENCY",
                value: "0".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        let timeout_secs: u64 = parse_var(&lookup, "TASK_TIMEOUT_SECS", 10)?;

        Ok(Self {
            engine,
            listen_addr,
            aggregation: AggregationConfig {
                light_log_tail: parse_var(&lookup, "LIGHT_LOG_TAIL", defaults.light_log_tail)?,
                full_log_tail: parse_var(&lookup, "FULL_LOG_TAIL", defaults.full_log_tail)?,
                summary_log_tail: parse_var(
                    &lookup,
                    "SUMMARY_LOG_TAIL",
                    defaults.summary_log_tail,
                )?,
                max_concurrency,
                task_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
                silent_log_policy: parse_var(
                    &lookup,
                    "SILENT_LOG_POLICY",
                    defaults.silent_log_policy,
                )?,
            },
        })
    }
}
