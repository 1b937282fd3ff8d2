use ton_utils::{keccak256, Address};

const WALLET_SEED: &[u8] = b"jetton-wallet";

/// Address of the wallet `minter` deploys for `owner`.
pub fn wallet_address(minter: &Address, owner: &Address) -> Address {
    let hash = keccak256(
        [
            WALLET_SEED,
            [minter.workchain as u8].as_slice(),
            minter.hash.as_slice(),
            [owner.workchain as u8].as_slice(),
            owner.hash.as_slice(),
        ]
        .concat(),
    );

    Address::new(minter.workchain, hash)
}
