use hyperlane_ton_api::{AmountEncoding, Domain, TokenStandard};
use ton_utils::Address;

/// What the route moves and where it keeps it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    /// The chain's own currency, locked in the router.
    Native,
    /// Jettons minted and burnt by a minter the router administers.
    Synthetic { minter: Address },
    /// Jettons of `minter` escrowed in the router's own wallet.
    Collateral { minter: Address, wallet: Address },
}

impl Token {
    pub fn standard(&self) -> TokenStandard {
        match self {
            Token::Native => TokenStandard::Native,
            Token::Synthetic { .. } => TokenStandard::Synthetic,
            Token::Collateral { .. } => TokenStandard::Collateral,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub mailbox: Address,
    pub token: Token,
    pub amount_encoding: AmountEncoding,
}

/// An outbound transfer waiting for the mailbox to answer its DISPATCH. Until then the router
/// holds what `sender` gave up, so a failed dispatch can return it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingTransfer {
    pub sender: Address,
    pub amount: u128,
}

/// An inbound jetton credit on its way to the recipient. The HANDLE it came from is answered once
/// the recipient's wallet reports the excess, or failed if the credit bounces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingCredit {
    pub mailbox_query_id: u64,
    pub origin: Domain,
    /// Minter or escrow wallet the credit was requested from.
    pub source: Address,
    /// Jetton wallet of the recipient, which confirms the credit.
    pub wallet: Address,
    pub recipient: Address,
    pub amount: u128,
}
