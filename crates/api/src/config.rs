//! Service configuration loaded from environment variables.
//!
//! Every variable has a default. A variable that is set but cannot be parsed
//! is an error rather than silently replaced by its default.

use std::str::FromStr;
use std::time::Duration;

use inventory::StockRecord;
use resilience::{BackoffConfig, CircuitBreakerConfig, ResilienceConfig, RetryConfig};
use thiserror::Error;

pub const DEFAULT_INVENTORY_PORT: u16 = 8082;
pub const DEFAULT_ORDER_PORT: u16 = 8081;
pub const DEFAULT_INVENTORY_URL: &str = "http://localhost:8082";
pub const DEFAULT_SEED: &str = "iphone_15=100,pixel_8=100,galaxy_24=100,oneplus_12=100";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Policy(#[from] resilience::ConfigError),
}

/// Settings shared by both services.
///
/// - `HOST` bind address (default `0.0.0.0`)
/// - `PORT` listen port (service specific default)
/// - `RUST_LOG` tracing filter directive (default `info`)
/// - `LOG_FORMAT` `text` or `json` (default `text`)
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_json: bool,
}

impl ServerConfig {
    fn with_port(port: u16) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port,
            log_level: "info".to_string(),
            log_json: false,
        }
    }

    fn from_lookup(env: &Env<'_>, default_port: u16) -> Result<Self, ConfigError> {
        let defaults = Self::with_port(default_port);
        let log_json = match env.get("LOG_FORMAT").as_deref() {
            None | Some("text") => false,
            Some("json") => true,
            Some(other) => {
                return Err(ConfigError::InvalidVar {
                    var: "LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected `text` or `json`".to_string(),
                });
            }
        };

        Ok(Self {
            host: env.get("HOST").unwrap_or(defaults.host),
            port: env.parse("PORT", defaults.port)?,
            log_level: env.get("RUST_LOG").unwrap_or(defaults.log_level),
            log_json,
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration of the `inventory-service` binary.
///
/// `INVENTORY_SEED` lists the initial stock as `sku=quantity` pairs separated
/// by commas. An empty value starts with no stock.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryServiceConfig {
    pub server: ServerConfig,
    pub seed: Vec<StockRecord>,
}

impl InventoryServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);
        let seed = match env.get("INVENTORY_SEED") {
            Some(raw) => parse_seed(&raw)?,
            None => parse_seed(DEFAULT_SEED)?,
        };
        Ok(Self {
            server: ServerConfig::from_lookup(&env, DEFAULT_INVENTORY_PORT)?,
            seed,
        })
    }
}

impl Default for InventoryServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::with_port(DEFAULT_INVENTORY_PORT),
            seed: parse_seed(DEFAULT_SEED).unwrap_or_default(),
        }
    }
}

/// Configuration of the `order-service` binary.
///
/// The `INVENTORY_*` variables tune the resilience policy around inventory
/// lookups. The resulting policy is validated before it is returned.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderServiceConfig {
    pub server: ServerConfig,
    pub inventory_url: String,
    pub resilience: ResilienceConfig,
    /// Answer used when inventory cannot be consulted.
    pub fallback: bool,
}

impl OrderServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);
        let defaults = ResilienceConfig::default();
        let cb = &defaults.circuit_breaker;

        let initial_interval = env.millis("INVENTORY_RETRY_WAIT_MS", defaults.retry.backoff.initial_interval)?;
        let multiplier = env.parse("INVENTORY_RETRY_MULTIPLIER", 1.0)?;
        let max_interval = env.millis("INVENTORY_RETRY_MAX_WAIT_MS", Duration::from_secs(10))?;

        let resilience = ResilienceConfig {
            retry: RetryConfig {
                max_attempts: env.parse("INVENTORY_RETRY_MAX_ATTEMPTS", defaults.retry.max_attempts)?,
                backoff: BackoffConfig::exponential(initial_interval, multiplier, max_interval),
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_rate_threshold: env.parse("INVENTORY_CB_FAILURE_RATE", cb.failure_rate_threshold)?,
                sliding_window_size: env.parse("INVENTORY_CB_WINDOW_SIZE", cb.sliding_window_size)?,
                minimum_number_of_calls: env.parse("INVENTORY_CB_MIN_CALLS", cb.minimum_number_of_calls)?,
                wait_duration_in_open_state: env
                    .millis("INVENTORY_CB_OPEN_WAIT_MS", cb.wait_duration_in_open_state)?,
                permitted_calls_in_half_open_state: env
                    .parse("INVENTORY_CB_HALF_OPEN_CALLS", cb.permitted_calls_in_half_open_state)?,
                half_open_success_threshold: env
                    .parse("INVENTORY_CB_HALF_OPEN_SUCCESSES", cb.half_open_success_threshold)?,
            },
            attempt_timeout: env.millis("INVENTORY_ATTEMPT_TIMEOUT_MS", defaults.attempt_timeout)?,
        };
        resilience.validate()?;

        Ok(Self {
            server: ServerConfig::from_lookup(&env, DEFAULT_ORDER_PORT)?,
            inventory_url: env
                .get("INVENTORY_URL")
                .unwrap_or_else(|| DEFAULT_INVENTORY_URL.to_string()),
            resilience,
            fallback: env.parse("INVENTORY_FALLBACK", false)?,
        })
    }
}

impl Default for OrderServiceConfig {
    fn default() -> Self {
        let mut resilience = ResilienceConfig::default();
        resilience.retry.backoff.max_interval = Duration::from_secs(10);
        Self {
            server: ServerConfig::with_port(DEFAULT_ORDER_PORT),
            inventory_url: DEFAULT_INVENTORY_URL.to_string(),
            resilience,
            fallback: false,
        }
    }
}

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    fn get(&self, var: &str) -> Option<String> {
        (self.0)(var)
    }

    fn parse<T>(&self, var: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(var) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidVar {
                var,
                value: raw.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn millis(&self, var: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
        self.parse(var, default_ms).map(Duration::from_millis)
    }
}

/// Parses `sku=quantity` pairs separated by commas.
pub fn parse_seed(raw: &str) -> Result<Vec<StockRecord>, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidVar {
        var: "INVENTORY_SEED",
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (sku, quantity) = entry
                .split_once('=')
                .ok_or_else(|| invalid(&format!("entry `{entry}` is not `sku=quantity`")))?;
            let sku = sku.trim();
            if sku.is_empty() {
                return Err(invalid(&format!("entry `{entry}` has an empty sku")));
            }
            let quantity = quantity
                .trim()
                .parse::<u32>()
                .map_err(|e| invalid(&format!("entry `{entry}`: {e}")))?;
            Ok(StockRecord::new(sku, quantity))
        })
        .collect()
}
