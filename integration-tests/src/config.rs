use std::collections::HashMap;
use std::path::Path;
use std::thread;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use error_stack::{bail, Report, Result, ResultExt};
use hyperlane_ton_api::{AmountEncoding, Domain, GasConfig, TokenStandard, MAILBOX_VERSION};
use serde::{Deserialize, Serialize};
use ton_utils::{B256, U256};
use tracing::debug;

use crate::contract::Error;

const ENV_PREFIX: &str = "HYPERLANE_TON";
const ENV_SEPARATOR: &str = "__";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MailboxConfig {
    pub version: u8,
    pub local_domain: Domain,
    pub initial_nonce: u32,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            version: MAILBOX_VERSION,
            local_domain: 1234,
            initial_nonce: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProtocolFeeConfig {
    pub protocol_fee: u64,
    pub max_protocol_fee: u64,
}

impl Default for ProtocolFeeConfig {
    fn default() -> Self {
        Self {
            protocol_fee: 1_000,
            max_protocol_fee: 1_000_000,
        }
    }
}

/// Gas pricing of one destination. `domain = 0` prices every destination without its own entry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DomainGasConfig {
    pub domain: Domain,
    #[serde(default)]
    pub gas_overhead: u64,
    pub gas_price: u64,
    pub exchange_rate: u64,
}

impl From<&DomainGasConfig> for GasConfig {
    fn from(config: &DomainGasConfig) -> Self {
        GasConfig {
            gas_oracle: B256::ZERO,
            gas_overhead: U256::from(config.gas_overhead),
            exchange_rate: u128::from(config.exchange_rate),
            gas_price: u128::from(config.gas_price),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DomainValidators {
    pub domain: Domain,
    pub threshold: u8,
    /// Ethereum addresses, right-aligned in 32-byte words.
    pub validators: Vec<B256>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WarpRouteConfig {
    pub standard: TokenStandard,
    pub amount_encoding: AmountEncoding,
}

impl Default for WarpRouteConfig {
    fn default() -> Self {
        Self {
            standard: TokenStandard::Synthetic,
            amount_encoding: AmountEncoding::Uint256,
        }
    }
}

/// How a deployment script waits for state to become visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(2),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeploymentConfig {
    pub mailbox: MailboxConfig,
    pub protocol_fee: ProtocolFeeConfig,
    pub gas_configs: Vec<DomainGasConfig>,
    pub validator_sets: Vec<DomainValidators>,
    pub warp_route: WarpRouteConfig,
    pub retry: RetryPolicy,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            mailbox: MailboxConfig::default(),
            protocol_fee: ProtocolFeeConfig::default(),
            gas_configs: vec![DomainGasConfig {
                domain: 0,
                gas_overhead: 0,
                gas_price: 1,
                exchange_rate: 10_000_000_000,
            }],
            validator_sets: vec![],
            warp_route: WarpRouteConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl DeploymentConfig {
    /// Reads the optional TOML file at `path`, then applies `HYPERLANE_TON__*` overrides such as
    /// `HYPERLANE_TON__MAILBOX__LOCAL_DOMAIN=5678`.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let files = path.map(|path| File::from(path).format(FileFormat::Toml));

        Self::build(Config::builder().add_source(files.into_iter().collect::<Vec<_>>()))
    }

    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        Self::build(Config::builder().add_source(File::from_str(contents, FileFormat::Toml)))
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, Error> {
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(Report::from)
            .change_context(Error::Config)
    }

    pub fn gas_configs(&self) -> HashMap<Domain, GasConfig> {
        self.gas_configs
            .iter()
            .map(|config| (config.domain, GasConfig::from(config)))
            .collect()
    }
}

/// Polls `check` until it yields a value, sleeping `interval` between attempts.
pub fn poll_until<T>(policy: &RetryPolicy, mut check: impl FnMut() -> Option<T>) -> Result<T, Error> {
    for attempt in 1..=policy.max_attempts {
        if let Some(value) = check() {
            return Ok(value);
        }

        debug!(attempt, max_attempts = policy.max_attempts, "condition not met yet");
        if attempt < policy.max_attempts {
            thread::sleep(policy.interval);
        }
    }

    bail!(Error::Timeout(policy.max_attempts))
}
