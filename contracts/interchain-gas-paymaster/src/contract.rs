use std::collections::HashMap;

use error_stack::{report, ResultExt};
use hyperlane_ton_api::msg::{
    load_payload, Claim, PostDispatch, SetBeneficiary, SetDestGasConfig, TransferOwnership,
};
use hyperlane_ton_api::{Domain, ExitCode, GasConfig, OpCode, Tag};
use hyperlane_ton_std::{read_header, Ownership};
use ton_sandbox::{Context, Contract, ContractError, Response};
use ton_utils::{Address, Cell, FnExt};

use crate::msg::InstantiateMsg;

mod execute;
mod query;

pub use query::gas_limit;

#[derive(Clone, Debug)]
pub struct InterchainGasPaymaster {
    ownership: Ownership,
    beneficiary: Address,
    gas_configs: HashMap<Domain, GasConfig>,
    /// Payments received since the last claim.
    collected: u128,
}

impl InterchainGasPaymaster {
    pub fn instantiate(msg: InstantiateMsg) -> Self {
        Self {
            ownership: Ownership::new(msg.owner),
            beneficiary: msg.beneficiary,
            gas_configs: msg.gas_configs,
            collected: 0,
        }
    }

    fn execute(&mut self, ctx: &Context, body: &Cell) -> error_stack::Result<Response, ExitCode> {
        let mut parser = body.parser();
        let Some(header) = read_header(&mut parser)? else {
            return Ok(Response::new());
        };

        match header.tag {
            Tag::Request(op) if op.is_post_dispatch() => {
                let request = load_payload::<PostDispatch>(&mut parser)?;
                self.post_dispatch(ctx, op, header.query_id, request)
            }
            Tag::Request(OpCode::SetDestGasConfig) => {
                let request = load_payload::<SetDestGasConfig>(&mut parser)?;
                self.set_dest_gas_config(ctx, request)
            }
            Tag::Request(OpCode::SetBeneficiary) => {
                let request = load_payload::<SetBeneficiary>(&mut parser)?;
                self.set_beneficiary(ctx, request.beneficiary)
            }
            Tag::Request(OpCode::Claim) => {
                load_payload::<Claim>(&mut parser)?;
                self.claim(ctx)
            }
            Tag::Request(OpCode::TransferOwnership) => {
                let request = load_payload::<TransferOwnership>(&mut parser)?;
                self.ownership
                    .transfer(ctx, request.owner)
                    .map(|transferred| Response::new().add_event(transferred))
            }
            tag => Err(report!(ExitCode::UnknownOpcode))
                .attach_printable_lazy(|| format!("unexpected message {tag:?}")),
        }
        .attach_printable_lazy(|| format!("gas paymaster at {}", ctx.address))?
        .then(Ok)
    }
}

impl Contract for InterchainGasPaymaster {
    fn receive(&mut self, ctx: &Context, body: &Cell) -> Result<Response, ContractError> {
        self.execute(ctx, body).map_err(ContractError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_ok::assert_ok;
    use hyperlane_ton_api::msg::{encode_body, Answer, Request};
    use hyperlane_ton_api::{HookMetadata, Message, MAILBOX_VERSION};
    use rand::Rng;
    use ton_sandbox::SendValue;
    use ton_utils::{buffer_to_cell, B256, U256};

    use super::*;
    use crate::state::{DEFAULT_GAS_LIMIT, FALLBACK_DOMAIN, TOKEN_EXCHANGE_RATE_SCALE};

    const DESTINATION: Domain = 4321;
    const OVERHEAD: u64 = 10_000;

    fn owner() -> Address {
        Address::derived("owner")
    }

    fn beneficiary() -> Address {
        Address::derived("beneficiary")
    }

    fn mailbox() -> Address {
        Address::derived("mailbox")
    }

    fn config() -> GasConfig {
        GasConfig {
            gas_oracle: B256::ZERO,
            gas_overhead: U256::from(OVERHEAD),
            exchange_rate: u128::from(TOKEN_EXCHANGE_RATE_SCALE),
            gas_price: 1,
        }
    }

    fn paymaster() -> InterchainGasPaymaster {
        InterchainGasPaymaster::instantiate(InstantiateMsg {
            owner: owner(),
            beneficiary: beneficiary(),
            gas_configs: HashMap::from([(DESTINATION, config())]),
        })
    }

    fn ctx(sender: Address, value: u128) -> Context {
        Context {
            address: Address::derived("igp"),
            sender,
            value,
            balance: value,
            lt: 1,
        }
    }

    fn post(destination: Domain, hook_metadata: Option<HookMetadata>) -> Cell {
        let request = PostDispatch {
            message: Message {
                version: MAILBOX_VERSION,
                nonce: 0,
                origin: 1234,
                sender: B256::repeat_byte(1),
                destination,
                recipient: B256::repeat_byte(2),
                body: Arc::new(buffer_to_cell(b"gas").unwrap()),
            },
            hook_metadata,
        };

        encode_body(OpCode::PostDispatchRequired, 3, &request).unwrap()
    }

    #[test]
    fn quote_scales_gas_by_price_and_exchange_rate() {
        let mut rng = rand::thread_rng();
        let gas_price = rng.gen_range(1..1_000u128);
        let exchange_rate = rng.gen_range(1..u128::from(TOKEN_EXCHANGE_RATE_SCALE));
        let gas_limit = rng.gen_range(1..10_000_000u64);

        let mut paymaster = paymaster();
        paymaster.gas_configs.insert(
            DESTINATION,
            GasConfig {
                gas_price,
                exchange_rate,
                ..config()
            },
        );

        let expected = (u128::from(gas_limit) + u128::from(OVERHEAD)) * gas_price * exchange_rate
            / u128::from(TOKEN_EXCHANGE_RATE_SCALE);
        assert_eq!(
            assert_ok!(paymaster.quote_gas_payment(DESTINATION, U256::from(gas_limit))),
            expected
        );
    }

    #[test]
    fn unknown_destination_falls_back_to_domain_zero() {
        let mut paymaster = paymaster();
        let err = paymaster
            .quote_gas_payment(1, U256::from(1u8))
            .unwrap_err();
        assert_eq!(err.current_context(), &ExitCode::WrongDestDomain);

        paymaster.gas_configs.insert(FALLBACK_DOMAIN, config());
        assert_eq!(
            assert_ok!(paymaster.quote_gas_payment(1, U256::from(1u8))),
            u128::from(OVERHEAD) + 1
        );
    }

    #[test]
    fn default_metadata_pays_for_the_default_gas_limit() {
        let mut paymaster = paymaster();
        let quote = u128::from(DEFAULT_GAS_LIMIT + OVERHEAD);

        let response = assert_ok!(paymaster.receive(
            &ctx(mailbox(), quote + 500),
            &post(DESTINATION, None)
        ));

        assert_eq!(paymaster.collected(), quote);
        assert_eq!(response.events[0].ty, "gas_payment");
        assert_eq!(
            response.events[0].attribute("payment"),
            Some(quote.to_string().as_str())
        );
        let reply = &response.messages[0];
        assert_eq!(reply.value, SendValue::Amount(500));
        assert_eq!(
            assert_ok!(Answer::<()>::from_body(&reply.body)),
            Answer::ok(OpCode::PostDispatchRequired, 3, ())
        );
    }

    #[test_log::test]
    fn underpayment_fails_and_collects_nothing() {
        let mut paymaster = paymaster();
        let metadata = HookMetadata::standard(U256::ZERO, U256::from(100_000u32), owner());

        let err = paymaster
            .receive(
                &ctx(mailbox(), u128::from(OVERHEAD) + 99_999),
                &post(DESTINATION, Some(metadata)),
            )
            .unwrap_err();

        assert_eq!(err.exit_code, i32::from(ExitCode::InsufficientGasPayment));
        assert_eq!(paymaster.collected(), 0);
    }

    #[test]
    fn standard_metadata_without_a_gas_limit_fails_closed() {
        let mut paymaster = paymaster();
        let metadata = HookMetadata::standard(U256::ZERO, U256::ZERO, owner());

        let err = paymaster
            .receive(&ctx(mailbox(), u128::MAX), &post(DESTINATION, Some(metadata)))
            .unwrap_err();
        assert_eq!(err.exit_code, i32::from(ExitCode::InsufficientGasPayment));

        let unknown = HookMetadata {
            variant: 7,
            ..HookMetadata::default()
        };
        let err = paymaster
            .receive(&ctx(mailbox(), u128::MAX), &post(DESTINATION, Some(unknown)))
            .unwrap_err();
        assert_eq!(err.exit_code, i32::from(ExitCode::UnknownSubOp));
    }

    #[test]
    fn excess_goes_to_the_refund_address() {
        let mut paymaster = paymaster();
        let refund = Address::derived("refund");
        let metadata = HookMetadata::standard(U256::ZERO, U256::from(1_000u32), refund);

        let response = assert_ok!(paymaster.receive(
            &ctx(mailbox(), 20_000),
            &post(DESTINATION, Some(metadata))
        ));

        let quote = 1_000 + u128::from(OVERHEAD);
        assert_eq!(response.messages[0].to, refund);
        assert_eq!(response.messages[0].value, SendValue::Amount(20_000 - quote));
        assert_eq!(response.messages[1].to, mailbox());
        assert_eq!(response.messages[1].value, SendValue::Amount(0));
    }

    #[test]
    fn only_the_beneficiary_claims() {
        let mut paymaster = paymaster();
        let quote = u128::from(DEFAULT_GAS_LIMIT + OVERHEAD);
        assert_ok!(paymaster.receive(&ctx(mailbox(), quote), &post(DESTINATION, None)));

        let claim = Claim.to_body(0).unwrap();
        let err = paymaster.receive(&ctx(owner(), 0), &claim).unwrap_err();
        assert_eq!(err.exit_code, i32::from(ExitCode::UnauthorizedSender));

        let response = assert_ok!(paymaster.receive(&ctx(beneficiary(), 0), &claim));
        assert_eq!(response.messages[0].value, SendValue::Amount(quote));
        assert_eq!(paymaster.collected(), 0);
    }

    #[test]
    fn owner_configures_destinations() {
        let mut paymaster = paymaster();
        let request = SetDestGasConfig {
            domain: 99,
            config: GasConfig {
                gas_price: 7,
                ..config()
            },
        }
        .to_body(0)
        .unwrap();

        let err = paymaster.receive(&ctx(beneficiary(), 0), &request).unwrap_err();
        assert_eq!(err.exit_code, i32::from(ExitCode::UnauthorizedSender));

        assert_ok!(paymaster.receive(&ctx(owner(), 0), &request));
        assert_eq!(paymaster.gas_config(99).map(|config| config.gas_price), Some(7));
    }
}
