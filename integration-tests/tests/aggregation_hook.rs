use std::sync::Arc;

use assert_ok::assert_ok;
use hyperlane_ton_api::msg::{Dispatch, SetDefaultHook, SetRequiredHook};
use hyperlane_ton_api::{ExitCode, OpCode, TokenStandard};
use integration_tests::aggregation_hook_contract::AggregationHookContract;
use integration_tests::protocol::{Protocol, REMOTE_DOMAIN};
use integration_tests::Contract;
use ton_sandbox::TxPattern;
use ton_utils::{buffer_to_cell, Address, B256};

use crate::test_utils::{answer, assert_flow, config, request, setup_protocol};

mod test_utils;

/// Makes an aggregation of the merkle tree hook and the gas paymaster the required hook, with
/// the protocol fee hook as default hook.
fn setup_aggregation(authorize: bool) -> (Protocol, AggregationHookContract) {
    let (mut protocol, _) = setup_protocol(config(TokenStandard::Native), 1, 1);
    let deployer = protocol.deployer;

    let aggregation = assert_ok!(AggregationHookContract::instantiate_contract(
        &mut protocol.chain,
        deployer,
        "aggregation_hook",
        vec![
            protocol.merkle_tree_hook.contract_addr,
            protocol.igp.contract_addr,
        ],
    ));
    if authorize {
        let result = assert_ok!(protocol.merkle_tree_hook.authorize_hook(
            &mut protocol.chain,
            deployer,
            aggregation.contract_addr
        ));
        assert!(result.all_succeeded(), "{result}");
    }

    let mailbox = protocol.mailbox;
    let hook = aggregation.contract_addr;
    assert!(assert_ok!(mailbox.execute(&mut protocol.chain, deployer, &SetRequiredHook { hook })).all_succeeded());
    let hook = protocol.protocol_fee_hook.contract_addr;
    assert!(assert_ok!(mailbox.execute(&mut protocol.chain, deployer, &SetDefaultHook { hook })).all_succeeded());

    (protocol, aggregation)
}

fn dispatch_from(protocol: &mut Protocol, sender: Address, value: u128) -> ton_sandbox::SendResult {
    let dispatch = Dispatch {
        destination: REMOTE_DOMAIN,
        recipient: B256::repeat_byte(0x42),
        body: Arc::new(assert_ok!(buffer_to_cell(b"aggregated"))),
        hook_metadata: None,
    };

    let mailbox = protocol.mailbox;
    assert_ok!(mailbox.dispatch(&mut protocol.chain, sender, &dispatch, value))
}

#[test_log::test]
fn sub_hooks_run_in_order_and_the_remaining_value_flows_on() {
    let (mut protocol, aggregation) = setup_aggregation(true);
    let sender = protocol.account("sender");
    let quote = assert_ok!(protocol.quote_dispatch(REMOTE_DOMAIN, None));
    let fee = assert_ok!(protocol.protocol_fee_hook.query(&protocol.chain)).protocol_fee();
    assert!(quote > fee);

    let result = dispatch_from(&mut protocol, sender, quote);

    let mailbox = protocol.mailbox.contract_addr;
    let hook = aggregation.contract_addr;
    let merkle = protocol.merkle_tree_hook.contract_addr;
    let igp = protocol.igp.contract_addr;
    assert_flow(
        &result,
        &[
            request(mailbox, hook, OpCode::PostDispatchRequired),
            request(hook, merkle, OpCode::PostDispatch),
            answer(merkle, hook, OpCode::PostDispatch),
            request(hook, igp, OpCode::PostDispatch),
            answer(igp, hook, OpCode::PostDispatch),
            answer(hook, mailbox, OpCode::PostDispatchRequired),
            request(mailbox, protocol.protocol_fee_hook.contract_addr, OpCode::PostDispatchDefault),
            answer(mailbox, sender, OpCode::Dispatch),
        ],
    );
    assert!(result.all_succeeded(), "{result}");

    assert_eq!(assert_ok!(protocol.mailbox.query(&protocol.chain)).nonce(), 1);
    assert_eq!(assert_ok!(protocol.merkle_tree_hook.query(&protocol.chain)).count(), 1);
    assert_eq!(
        assert_ok!(protocol.igp.query(&protocol.chain)).collected(),
        quote - fee
    );
    assert_eq!(
        assert_ok!(protocol.protocol_fee_hook.query(&protocol.chain)).collected(),
        fee
    );
    assert_eq!(assert_ok!(aggregation.query(&protocol.chain)).pending_requests(), 0);
}

#[test]
fn failing_sub_hook_stops_the_fan_out_and_fails_the_dispatch() {
    let (mut protocol, aggregation) = setup_aggregation(true);
    let sender = protocol.account("sender");

    let result = dispatch_from(&mut protocol, sender, 1);

    assert_flow(
        &result,
        &[
            answer(protocol.merkle_tree_hook.contract_addr, aggregation.contract_addr, OpCode::PostDispatch),
            TxPattern::builder()
                .to(protocol.igp.contract_addr)
                .success(false)
                .exit_code(i32::from(ExitCode::InsufficientGasPayment))
                .build(),
            answer(aggregation.contract_addr, protocol.mailbox.contract_addr, OpCode::PostDispatchRequired),
            answer(protocol.mailbox.contract_addr, sender, OpCode::Dispatch),
        ],
    );
    assert!(result.events().any(|event| event.ty == "sub_hook_failed"));
    assert!(!result.has_transaction(
        &TxPattern::builder()
            .to(protocol.protocol_fee_hook.contract_addr)
            .build()
    ));

    assert_eq!(assert_ok!(protocol.mailbox.query(&protocol.chain)).nonce(), 0);
    // sub-hooks that already answered keep their effects
    assert_eq!(assert_ok!(protocol.merkle_tree_hook.query(&protocol.chain)).count(), 1);
    assert_eq!(assert_ok!(aggregation.query(&protocol.chain)).pending_requests(), 0);
}

#[test]
fn unauthorized_aggregation_is_refused_by_the_merkle_tree_hook() {
    let (mut protocol, aggregation) = setup_aggregation(false);
    let sender = protocol.account("sender");
    let quote = assert_ok!(protocol.quote_dispatch(REMOTE_DOMAIN, None));

    let result = dispatch_from(&mut protocol, sender, quote);

    assert_flow(
        &result,
        &[
            TxPattern::builder()
                .from(aggregation.contract_addr)
                .to(protocol.merkle_tree_hook.contract_addr)
                .success(false)
                .exit_code(i32::from(ExitCode::UnauthorizedSender))
                .build(),
            answer(protocol.mailbox.contract_addr, sender, OpCode::Dispatch),
        ],
    );
    assert!(!result.has_transaction(&TxPattern::builder().to(protocol.igp.contract_addr).build()));
    assert_eq!(assert_ok!(protocol.mailbox.query(&protocol.chain)).nonce(), 0);
    assert_eq!(assert_ok!(protocol.merkle_tree_hook.query(&protocol.chain)).count(), 0);
}
