use ton_utils::{Address, B256};

pub enum Event {
    ProtocolFeePaid {
        message_id: B256,
        payer: Address,
        fee: u128,
    },
    ProtocolFeeSet {
        protocol_fee: u128,
    },
    BeneficiarySet {
        beneficiary: Address,
    },
    ProtocolFeeCollected {
        beneficiary: Address,
        amount: u128,
    },
}

impl From<Event> for ton_sandbox::Event {
    fn from(other: Event) -> Self {
        match other {
            Event::ProtocolFeePaid {
                message_id,
                payer,
                fee,
            } => ton_sandbox::Event::new("protocol_fee_paid")
                .add_attribute("message_id", message_id)
                .add_attribute("payer", payer)
                .add_attribute("fee", fee),
            Event::ProtocolFeeSet { protocol_fee } => {
                ton_sandbox::Event::new("protocol_fee_set").add_attribute("protocol_fee", protocol_fee)
            }
            Event::BeneficiarySet { beneficiary } => {
                ton_sandbox::Event::new("beneficiary_set").add_attribute("beneficiary", beneficiary)
            }
            Event::ProtocolFeeCollected {
                beneficiary,
                amount,
            } => ton_sandbox::Event::new("protocol_fee_collected")
                .add_attribute("beneficiary", beneficiary)
                .add_attribute("amount", amount),
        }
    }
}
