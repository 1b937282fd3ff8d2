use error_stack::{ensure, report, Result, ResultExt};
use hyperlane_ton_api::{Domain, ExitCode, GasConfig, HookMetadata, HookType};
use ton_utils::{Address, U256};

use super::InterchainGasPaymaster;
use crate::state::{DEFAULT_GAS_LIMIT, FALLBACK_DOMAIN, TOKEN_EXCHANGE_RATE_SCALE};

/// Gas limit a dispatch pays for. The standard variant must name a positive limit.
pub fn gas_limit(metadata: &HookMetadata) -> Result<U256, ExitCode> {
    match metadata.variant {
        HookMetadata::VARIANT_DEFAULT => Ok(U256::from(DEFAULT_GAS_LIMIT)),
        HookMetadata::VARIANT_STANDARD => {
            ensure!(
                !metadata.gas_limit.is_zero(),
                ExitCode::InsufficientGasPayment
            );
            Ok(metadata.gas_limit)
        }
        variant => Err(report!(ExitCode::UnknownSubOp))
            .attach_printable_lazy(|| format!("hook metadata variant {variant}")),
    }
}

impl InterchainGasPaymaster {
    pub fn gas_config(&self, domain: Domain) -> Option<GasConfig> {
        self.gas_configs
            .get(&domain)
            .or_else(|| self.gas_configs.get(&FALLBACK_DOMAIN))
            .copied()
    }

    /// `(gas_limit + overhead) * gas_price * exchange_rate / 10^10`, in nano units.
    pub fn quote_gas_payment(&self, destination: Domain, gas_limit: U256) -> Result<u128, ExitCode> {
        let config = self
            .gas_config(destination)
            .ok_or_else(|| report!(ExitCode::WrongDestDomain))
            .attach_printable_lazy(|| format!("no gas config for domain {destination}"))?;

        let quote = gas_limit
            .checked_add(config.gas_overhead)
            .and_then(|gas| gas.checked_mul(U256::from(config.gas_price)))
            .and_then(|cost| cost.checked_mul(U256::from(config.exchange_rate)))
            .and_then(|cost| cost.checked_div(U256::from(TOKEN_EXCHANGE_RATE_SCALE)))
            .ok_or_else(|| report!(ExitCode::InsufficientGasPayment))
            .attach_printable("gas quote overflows")?;

        u128::try_from(quote)
            .map_err(|_| report!(ExitCode::InsufficientGasPayment))
            .attach_printable_lazy(|| format!("gas quote {quote} exceeds the coin range"))
    }

    pub fn beneficiary(&self) -> Address {
        self.beneficiary
    }

    pub fn collected(&self) -> u128 {
        self.collected
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    pub fn hook_type(&self) -> HookType {
        HookType::InterchainGasPaymaster
    }
}
