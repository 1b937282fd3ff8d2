use assert_ok::assert_ok;
use hyperlane_ton_api::{ExitCode, OpCode, TokenStandard, WarpTransfer};
use integration_tests::protocol::{WarpToken, REMOTE_DOMAIN};
use integration_tests::Contract;
use ton_sandbox::TxPattern;
use ton_utils::B256;

use crate::test_utils::{answer, assert_flow, request, setup_warp_route, transfer_body, REMOTE_ROUTER};

mod test_utils;

/// A verified transfer from the remote router mints exactly the bridged amount to the recipient,
/// after the mailbox asked the router for its ISM and the ISM accepted the checkpoint.
#[test_log::test]
fn synthetic_transfer_mints_the_bridged_amount() {
    let (mut protocol, validators, route) = setup_warp_route(TokenStandard::Synthetic);
    let WarpToken::Synthetic { minter } = route.token else {
        panic!("expected a synthetic route");
    };
    let recipient = protocol.deployer;
    let wallet = minter.wallet(recipient);
    assert_eq!(wallet.balance(&protocol.chain), 0);

    let message = protocol.inbound_message(
        0,
        REMOTE_ROUTER,
        route.router_hash(),
        transfer_body(&recipient, 1000),
    );
    let result = assert_ok!(protocol.relay(&message, &[&validators[0]]));

    let mailbox = protocol.mailbox.contract_addr;
    let router = route.router.contract_addr;
    let ism = protocol.multisig_ism.contract_addr;
    assert_flow(
        &result,
        &[
            request(protocol.relayer, mailbox, OpCode::Process),
            request(mailbox, router, OpCode::GetIsm),
            answer(router, mailbox, OpCode::GetIsm),
            request(mailbox, ism, OpCode::Verify),
            answer(ism, mailbox, OpCode::Verify),
            request(mailbox, router, OpCode::Handle),
            request(router, minter.contract_addr, OpCode::JettonMint),
            TxPattern::builder()
                .from(minter.contract_addr)
                .to(wallet.contract_addr)
                .op(OpCode::JettonInternalTransfer.code())
                .deploy(true)
                .build(),
            request(wallet.contract_addr, router, OpCode::JettonExcesses),
            answer(router, mailbox, OpCode::Handle),
        ],
    );
    assert!(result.all_succeeded(), "{result}");
    assert_eq!(assert_ok!(route.router.query(&protocol.chain)).pending_credits(), 0);

    assert_eq!(wallet.balance(&protocol.chain), 1000);
    assert_eq!(assert_ok!(minter.query(&protocol.chain)).total_supply(), 1000);
    assert!(assert_ok!(protocol.mailbox.query(&protocol.chain)).is_delivered(&message.id()));
}

#[test]
fn replayed_message_is_rejected_without_minting_twice() {
    let (mut protocol, validators, route) = setup_warp_route(TokenStandard::Synthetic);
    let WarpToken::Synthetic { minter } = route.token else {
        panic!("expected a synthetic route");
    };
    let recipient = protocol.deployer;
    let message = protocol.inbound_message(
        7,
        REMOTE_ROUTER,
        route.router_hash(),
        transfer_body(&recipient, 250),
    );

    let first = assert_ok!(protocol.relay(&message, &[&validators[0]]));
    assert!(first.all_succeeded(), "{first}");

    let second = assert_ok!(protocol.relay(&message, &[&validators[0]]));
    assert_flow(
        &second,
        &[
            TxPattern::builder()
                .to(protocol.mailbox.contract_addr)
                .op(OpCode::Process.code())
                .success(false)
                .exit_code(i32::from(ExitCode::MessageDelivered))
                .build(),
            TxPattern::builder()
                .to(protocol.relayer)
                .bounced(true)
                .build(),
        ],
    );
    assert!(!second.has_transaction(&TxPattern::builder().op(OpCode::JettonMint.code()).build()));

    assert_eq!(minter.wallet(recipient).balance(&protocol.chain), 250);
    assert_eq!(assert_ok!(minter.query(&protocol.chain)).total_supply(), 250);
}

#[test]
fn transfer_from_an_unenrolled_router_is_rejected() {
    let (mut protocol, validators, route) = setup_warp_route(TokenStandard::Synthetic);
    let WarpToken::Synthetic { minter } = route.token else {
        panic!("expected a synthetic route");
    };
    let recipient = protocol.deployer;
    let impostor = B256::repeat_byte(0x66);
    let message = protocol.inbound_message(
        0,
        impostor,
        route.router_hash(),
        transfer_body(&recipient, 1000),
    );

    let result = assert_ok!(protocol.relay(&message, &[&validators[0]]));

    assert_flow(
        &result,
        &[
            TxPattern::builder()
                .to(route.router.contract_addr)
                .op(OpCode::Handle.code())
                .success(false)
                .exit_code(i32::from(ExitCode::WrongValidator))
                .build(),
            TxPattern::builder()
                .to(protocol.mailbox.contract_addr)
                .bounced(true)
                .success(true)
                .build(),
        ],
    );
    assert_eq!(minter.wallet(recipient).balance(&protocol.chain), 0);
    assert_eq!(assert_ok!(minter.query(&protocol.chain)).total_supply(), 0);
    // the failed delivery does not count as delivered
    assert!(!assert_ok!(protocol.mailbox.query(&protocol.chain)).is_delivered(&message.id()));
}

/// Burning synthetic tokens with a warp transfer attached bridges them through the mailbox.
#[test_log::test]
fn burn_dispatches_the_burnt_amount() {
    let (mut protocol, validators, route) = setup_warp_route(TokenStandard::Synthetic);
    let WarpToken::Synthetic { minter } = route.token else {
        panic!("expected a synthetic route");
    };
    let local_domain = protocol.local_domain();
    assert_ok!(protocol.enroll_remote_router(&route, local_domain, route.router_hash()));

    let holder = protocol.account("holder");
    let wallet = minter.wallet(holder);
    let mint = protocol.inbound_message(
        0,
        REMOTE_ROUTER,
        route.router_hash(),
        transfer_body(&holder, 100),
    );
    assert!(assert_ok!(protocol.relay(&mint, &[&validators[0]])).all_succeeded());
    assert_eq!(wallet.balance(&protocol.chain), 100);

    let quote = assert_ok!(protocol.quote_dispatch(local_domain, None));
    let warp = WarpTransfer {
        destination: local_domain,
        recipient: route.router_hash(),
        hook_metadata: None,
    };
    let result = assert_ok!(wallet.burn(&mut protocol.chain, holder, 10, Some(&warp), quote + 1_000));

    let router = route.router.contract_addr;
    let mailbox = protocol.mailbox.contract_addr;
    assert_flow(
        &result,
        &[
            request(holder, wallet.contract_addr, OpCode::JettonBurn),
            request(wallet.contract_addr, minter.contract_addr, OpCode::JettonBurnNotification),
            request(minter.contract_addr, router, OpCode::JettonBurnNotification),
            request(router, mailbox, OpCode::Dispatch),
            request(mailbox, protocol.igp.contract_addr, OpCode::PostDispatchRequired),
            request(mailbox, protocol.merkle_tree_hook.contract_addr, OpCode::PostDispatchDefault),
            answer(mailbox, router, OpCode::Dispatch),
        ],
    );
    assert!(result.all_succeeded(), "{result}");

    assert_eq!(wallet.balance(&protocol.chain), 90);
    assert_eq!(assert_ok!(minter.query(&protocol.chain)).total_supply(), 90);
    assert_eq!(assert_ok!(protocol.mailbox.query(&protocol.chain)).nonce(), 1);
    assert_eq!(assert_ok!(protocol.merkle_tree_hook.query(&protocol.chain)).count(), 1);
}

#[test]
fn burn_without_enough_value_for_the_hooks_is_minted_back() {
    let (mut protocol, validators, route) = setup_warp_route(TokenStandard::Synthetic);
    let WarpToken::Synthetic { minter } = route.token else {
        panic!("expected a synthetic route");
    };
    let holder = protocol.account("holder");
    let wallet = minter.wallet(holder);
    let mint = protocol.inbound_message(
        0,
        REMOTE_ROUTER,
        route.router_hash(),
        transfer_body(&holder, 100),
    );
    assert!(assert_ok!(protocol.relay(&mint, &[&validators[0]])).all_succeeded());

    let warp = WarpTransfer {
        destination: REMOTE_DOMAIN,
        recipient: B256::repeat_byte(0x42),
        hook_metadata: None,
    };
    let result = assert_ok!(wallet.burn(&mut protocol.chain, holder, 10, Some(&warp), 1));

    let router = route.router.contract_addr;
    assert_flow(
        &result,
        &[
            TxPattern::builder()
                .to(protocol.igp.contract_addr)
                .success(false)
                .exit_code(i32::from(ExitCode::InsufficientGasPayment))
                .build(),
            answer(protocol.mailbox.contract_addr, router, OpCode::Dispatch),
            request(router, minter.contract_addr, OpCode::JettonMint),
            request(minter.contract_addr, wallet.contract_addr, OpCode::JettonInternalTransfer),
        ],
    );
    assert!(result.all_succeeded(), "{result}");
    assert_eq!(
        result
            .events()
            .filter(|event| event.ty == "transfer_refunded")
            .count(),
        1
    );

    let mailbox = assert_ok!(protocol.mailbox.query(&protocol.chain));
    assert_eq!(mailbox.nonce(), 0);
    assert_eq!(mailbox.pending_dispatches(), 0);
    assert_eq!(wallet.balance(&protocol.chain), 100);
    assert_eq!(assert_ok!(minter.query(&protocol.chain)).total_supply(), 100);
    assert_eq!(assert_ok!(route.router.query(&protocol.chain)).pending_transfers(), 0);
}

#[test]
fn native_transfer_remote_locks_the_amount_and_pays_the_hooks() {
    let (mut protocol, _, route) = setup_warp_route(TokenStandard::Native);
    let sender = protocol.account("sender");
    let router = route.router.contract_addr;
    let router_balance = protocol.chain.balance(&router);
    let quote = assert_ok!(protocol.quote_dispatch(REMOTE_DOMAIN, None));

    let result = assert_ok!(route.router.transfer_remote(
        &mut protocol.chain,
        sender,
        REMOTE_DOMAIN,
        B256::repeat_byte(0x42),
        5_000,
        None,
        5_000 + quote,
    ));

    assert_flow(
        &result,
        &[
            request(sender, router, OpCode::TransferRemote),
            request(router, protocol.mailbox.contract_addr, OpCode::Dispatch),
            answer(protocol.mailbox.contract_addr, router, OpCode::Dispatch),
        ],
    );
    assert!(result.all_succeeded(), "{result}");
    assert_eq!(protocol.chain.balance(&router), router_balance + 5_000);
    assert_eq!(
        assert_ok!(protocol.igp.query(&protocol.chain)).collected(),
        quote
    );
}

#[test]
fn native_transfer_remote_without_enough_value_for_the_hooks_is_refunded() {
    let (mut protocol, _, route) = setup_warp_route(TokenStandard::Native);
    let sender = protocol.account("sender");
    let router = route.router.contract_addr;
    let sender_balance = protocol.chain.balance(&sender);
    let router_balance = protocol.chain.balance(&router);

    let result = assert_ok!(route.router.transfer_remote(
        &mut protocol.chain,
        sender,
        REMOTE_DOMAIN,
        B256::repeat_byte(0x42),
        5_000,
        None,
        5_001,
    ));

    assert_flow(
        &result,
        &[
            TxPattern::builder()
                .to(protocol.igp.contract_addr)
                .success(false)
                .exit_code(i32::from(ExitCode::InsufficientGasPayment))
                .build(),
            answer(protocol.mailbox.contract_addr, router, OpCode::Dispatch),
            TxPattern::builder().from(router).to(sender).value(5_001).build(),
        ],
    );
    assert!(result.all_succeeded(), "{result}");
    assert_eq!(assert_ok!(protocol.mailbox.query(&protocol.chain)).nonce(), 0);
    assert_eq!(protocol.chain.balance(&sender), sender_balance);
    assert_eq!(protocol.chain.balance(&router), router_balance);
}

#[test]
fn native_transfer_remote_below_the_amount_is_rejected() {
    let (mut protocol, _, route) = setup_warp_route(TokenStandard::Native);
    let sender = protocol.account("sender");

    let result = assert_ok!(route.router.transfer_remote(
        &mut protocol.chain,
        sender,
        REMOTE_DOMAIN,
        B256::repeat_byte(0x42),
        5_000,
        None,
        4_999,
    ));

    assert_flow(
        &result,
        &[
            TxPattern::builder()
                .to(route.router.contract_addr)
                .success(false)
                .exit_code(i32::from(ExitCode::MsgValueTooLow))
                .build(),
            TxPattern::builder().to(sender).bounced(true).build(),
        ],
    );
    assert_eq!(assert_ok!(protocol.mailbox.query(&protocol.chain)).nonce(), 0);
}

#[test]
fn native_inbound_transfer_pays_the_recipient() {
    let (mut protocol, validators, route) = setup_warp_route(TokenStandard::Native);
    let recipient = protocol.account("recipient");
    let before = protocol.chain.balance(&recipient);

    let message = protocol.inbound_message(
        0,
        REMOTE_ROUTER,
        route.router_hash(),
        transfer_body(&recipient, 3_000),
    );
    let result = assert_ok!(protocol.relay(&message, &[&validators[0]]));

    assert!(result.all_succeeded(), "{result}");
    assert_eq!(protocol.chain.balance(&recipient), before + 3_000);
}

#[test_log::test]
fn collateral_route_escrows_deposits_and_releases_inbound_transfers() {
    let (mut protocol, validators, route) = setup_warp_route(TokenStandard::Collateral);
    let WarpToken::Collateral { minter, escrow } = route.token else {
        panic!("expected a collateral route");
    };
    let holder = protocol.account("holder");
    let deployer = protocol.deployer;
    assert!(assert_ok!(minter.mint(&mut protocol.chain, deployer, holder, 500, 10_000_000)).all_succeeded());

    let warp = WarpTransfer {
        destination: REMOTE_DOMAIN,
        recipient: B256::repeat_byte(0x42),
        hook_metadata: None,
    };
    let deposit = assert_ok!(minter.wallet(holder).transfer(
        &mut protocol.chain,
        holder,
        route.router.contract_addr,
        100,
        Some((10_000_000, &warp)),
        20_000_000,
    ));

    assert_flow(
        &deposit,
        &[
            request(escrow.contract_addr, route.router.contract_addr, OpCode::JettonTransferNotification),
            request(route.router.contract_addr, protocol.mailbox.contract_addr, OpCode::Dispatch),
            answer(protocol.mailbox.contract_addr, route.router.contract_addr, OpCode::Dispatch),
        ],
    );
    assert!(deposit.all_succeeded(), "{deposit}");
    assert_eq!(escrow.balance(&protocol.chain), 100);
    assert_eq!(minter.wallet(holder).balance(&protocol.chain), 400);

    let recipient = protocol.account("recipient");
    let message = protocol.inbound_message(
        0,
        REMOTE_ROUTER,
        route.router_hash(),
        transfer_body(&recipient, 40),
    );
    let release = assert_ok!(protocol.relay(&message, &[&validators[0]]));

    assert!(release.all_succeeded(), "{release}");
    assert_eq!(escrow.balance(&protocol.chain), 60);
    assert_eq!(minter.wallet(recipient).balance(&protocol.chain), 40);
}

#[test]
fn collateral_deposit_that_cannot_be_dispatched_is_returned() {
    let (mut protocol, _, route) = setup_warp_route(TokenStandard::Collateral);
    let WarpToken::Collateral { minter, escrow } = route.token else {
        panic!("expected a collateral route");
    };
    let holder = protocol.account("holder");
    let deployer = protocol.deployer;
    assert!(assert_ok!(minter.mint(&mut protocol.chain, deployer, holder, 500, 10_000_000)).all_succeeded());

    let warp = WarpTransfer {
        destination: REMOTE_DOMAIN,
        recipient: B256::repeat_byte(0x42),
        hook_metadata: None,
    };
    let deposit = assert_ok!(minter.wallet(holder).transfer(
        &mut protocol.chain,
        holder,
        route.router.contract_addr,
        100,
        Some((1, &warp)),
        20_000_000,
    ));

    let router = route.router.contract_addr;
    assert_flow(
        &deposit,
        &[
            request(escrow.contract_addr, router, OpCode::JettonTransferNotification),
            TxPattern::builder()
                .to(protocol.igp.contract_addr)
                .success(false)
                .exit_code(i32::from(ExitCode::InsufficientGasPayment))
                .build(),
            answer(protocol.mailbox.contract_addr, router, OpCode::Dispatch),
            request(router, escrow.contract_addr, OpCode::JettonTransfer),
            request(
                escrow.contract_addr,
                minter.wallet(holder).contract_addr,
                OpCode::JettonInternalTransfer,
            ),
        ],
    );
    assert!(deposit.all_succeeded(), "{deposit}");
    assert_eq!(escrow.balance(&protocol.chain), 0);
    assert_eq!(minter.wallet(holder).balance(&protocol.chain), 500);
    assert_eq!(assert_ok!(protocol.mailbox.query(&protocol.chain)).nonce(), 0);
}

/// A release the escrow cannot cover fails the delivery, so the message can be relayed again once
/// the escrow holds enough.
#[test]
fn collateral_release_from_an_empty_escrow_stays_deliverable() {
    let (mut protocol, validators, route) = setup_warp_route(TokenStandard::Collateral);
    let WarpToken::Collateral { minter, escrow } = route.token else {
        panic!("expected a collateral route");
    };
    let router = route.router.contract_addr;
    let mailbox = protocol.mailbox.contract_addr;
    let recipient = protocol.account("recipient");
    let message = protocol.inbound_message(
        0,
        REMOTE_ROUTER,
        route.router_hash(),
        transfer_body(&recipient, 40),
    );

    let release = assert_ok!(protocol.relay(&message, &[&validators[0]]));

    assert_flow(
        &release,
        &[
            request(mailbox, router, OpCode::Handle),
            TxPattern::builder()
                .from(router)
                .to(escrow.contract_addr)
                .op(OpCode::JettonTransfer.code())
                .success(false)
                .build(),
            TxPattern::builder()
                .from(escrow.contract_addr)
                .to(router)
                .bounced(true)
                .success(true)
                .build(),
            answer(router, mailbox, OpCode::Handle),
        ],
    );
    assert_eq!(escrow.balance(&protocol.chain), 0);
    assert_eq!(minter.wallet(recipient).balance(&protocol.chain), 0);
    assert!(!assert_ok!(protocol.mailbox.query(&protocol.chain)).is_delivered(&message.id()));
    assert_eq!(assert_ok!(route.router.query(&protocol.chain)).pending_credits(), 0);

    let holder = protocol.account("holder");
    let deployer = protocol.deployer;
    assert!(assert_ok!(minter.mint(&mut protocol.chain, deployer, holder, 500, 10_000_000)).all_succeeded());
    let warp = WarpTransfer {
        destination: REMOTE_DOMAIN,
        recipient: B256::repeat_byte(0x42),
        hook_metadata: None,
    };
    let deposit = assert_ok!(minter.wallet(holder).transfer(
        &mut protocol.chain,
        holder,
        router,
        100,
        Some((10_000_000, &warp)),
        20_000_000,
    ));
    assert!(deposit.all_succeeded(), "{deposit}");

    let retry = assert_ok!(protocol.relay(&message, &[&validators[0]]));

    assert!(retry.all_succeeded(), "{retry}");
    assert_eq!(escrow.balance(&protocol.chain), 60);
    assert_eq!(minter.wallet(recipient).balance(&protocol.chain), 40);
    assert!(assert_ok!(protocol.mailbox.query(&protocol.chain)).is_delivered(&message.id()));
}
