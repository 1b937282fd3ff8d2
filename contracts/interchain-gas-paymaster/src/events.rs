use hyperlane_ton_api::{Domain, GasConfig};
use ton_utils::{Address, B256, U256};

pub enum Event {
    GasPayment {
        message_id: B256,
        destination: Domain,
        payment: u128,
        gas_amount: U256,
    },
    GasConfigSet {
        domain: Domain,
        config: GasConfig,
    },
    BeneficiarySet {
        beneficiary: Address,
    },
    Claimed {
        beneficiary: Address,
        amount: u128,
    },
}

impl From<Event> for ton_sandbox::Event {
    fn from(other: Event) -> Self {
        match other {
            Event::GasPayment {
                message_id,
                destination,
                payment,
                gas_amount,
            } => ton_sandbox::Event::new("gas_payment")
                .add_attribute("message_id", message_id)
                .add_attribute("destination", destination)
                .add_attribute("payment", payment)
                .add_attribute("gas_amount", gas_amount),
            Event::GasConfigSet { domain, config } => ton_sandbox::Event::new("gas_config_set")
                .add_attribute("domain", domain)
                .add_attribute("gas_overhead", config.gas_overhead)
                .add_attribute("gas_price", config.gas_price)
                .add_attribute("exchange_rate", config.exchange_rate),
            Event::BeneficiarySet { beneficiary } => {
                ton_sandbox::Event::new("beneficiary_set").add_attribute("beneficiary", beneficiary)
            }
            Event::Claimed {
                beneficiary,
                amount,
            } => ton_sandbox::Event::new("claimed")
                .add_attribute("beneficiary", beneficiary)
                .add_attribute("amount", amount),
        }
    }
}
