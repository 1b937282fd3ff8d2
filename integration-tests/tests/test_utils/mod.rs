use std::sync::Arc;
use std::time::Duration;

use hyperlane_ton_api::{AmountEncoding, OpCode, TokenStandard, TokenTransferPayload};
use integration_tests::config::{DeploymentConfig, RetryPolicy, WarpRouteConfig};
use integration_tests::protocol::{Protocol, WarpRoute, REMOTE_DOMAIN};
use integration_tests::validator::{validator_set, Validator};
use ton_sandbox::{SendResult, TxPattern};
use ton_utils::{Address, ArcCell, B256, U256};

/// Router of the route on the remote domain.
pub const REMOTE_ROUTER: B256 = B256::repeat_byte(0x77);

pub fn config(standard: TokenStandard) -> DeploymentConfig {
    DeploymentConfig {
        warp_route: WarpRouteConfig {
            standard,
            amount_encoding: AmountEncoding::Uint256,
        },
        retry: RetryPolicy {
            max_attempts: 3,
            interval: Duration::ZERO,
        },
        ..Default::default()
    }
}

/// A protocol trusting `count` fresh validators of the remote domain at `threshold`.
pub fn setup_protocol(
    mut config: DeploymentConfig,
    count: usize,
    threshold: u8,
) -> (Protocol, Vec<Validator>) {
    let (validators, set) = validator_set(REMOTE_DOMAIN, count, threshold);
    config.validator_sets.push(set);

    (Protocol::deploy(config).unwrap(), validators)
}

/// A route of `standard` enrolled with the remote router.
pub fn setup_warp_route(standard: TokenStandard) -> (Protocol, Vec<Validator>, WarpRoute) {
    let (mut protocol, validators) = setup_protocol(config(standard), 1, 1);
    let route = protocol.deploy_warp_route("warp_route").unwrap();
    protocol
        .enroll_remote_router(&route, REMOTE_DOMAIN, REMOTE_ROUTER)
        .unwrap();

    (protocol, validators, route)
}

pub fn transfer_body(recipient: &Address, amount: u128) -> ArcCell {
    let payload = TokenTransferPayload {
        recipient: recipient.hash,
        amount: U256::from(amount),
    };

    Arc::new(payload.to_cell(AmountEncoding::Uint256).unwrap())
}

pub fn request(from: Address, to: Address, op: OpCode) -> TxPattern {
    TxPattern::builder().from(from).to(to).op(op.code()).build()
}

pub fn answer(from: Address, to: Address, op: OpCode) -> TxPattern {
    TxPattern::builder().from(from).to(to).op(op.answer()).build()
}

pub fn assert_flow(result: &SendResult, patterns: &[TxPattern]) {
    if let Err(err) = result.expect_transaction_flow(patterns) {
        panic!("{err:?}\ntransactions:\n{result}");
    }
}
