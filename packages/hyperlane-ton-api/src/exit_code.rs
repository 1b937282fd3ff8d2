use strum::{EnumIter, FromRepr};

/// Numeric failure codes surfaced by the contracts, either as the exit code of a failed
/// transaction or inside a failed answer.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, FromRepr)]
#[repr(u16)]
pub enum ExitCode {
    #[error("cell overflow")]
    CellOverflow = 8,
    #[error("cell underflow")]
    CellUnderflow = 9,
    #[error("not enough balance to send outgoing messages")]
    NotEnoughTon = 37,
    #[error("insufficient jetton balance")]
    BalanceError = 47,
    #[error("message version does not match the mailbox version")]
    WrongMailboxVersion = 100,
    #[error("message is not destined for this domain")]
    WrongDestDomain = 101,
    #[error("message already delivered")]
    MessageDelivered = 102,
    #[error("sender is not authorized")]
    UnauthorizedSender = 103,
    #[error("message verification failed")]
    MessageVerificationFailed = 104,
    #[error("unknown sub operation")]
    UnknownSubOp = 105,
    #[error("insufficient gas payment")]
    InsufficientGasPayment = 106,
    #[error("wrong signature")]
    WrongSignature = 107,
    #[error("downstream call bounced")]
    CallBounced = 108,
    #[error("wrong validator")]
    WrongValidator = 110,
    #[error("public key recovery failed")]
    PubkeyRecovery = 111,
    #[error("storage location already announced")]
    StorageLocationReplay = 112,
    #[error("no validators configured for domain")]
    DomainValidatorsNotFound = 113,
    #[error("attached value too low")]
    MsgValueTooLow = 114,
    #[error("merkle tree is full")]
    MerkleTreeFull = 115,
    #[error("protocol fee exceeds the maximum")]
    ExceedsMaxProtocolFee = 116,
    #[error("insufficient protocol fee")]
    InsufficientProtocolFee = 117,
    #[error("unknown operation code")]
    UnknownOpcode = 0xffff,
}

impl ExitCode {
    pub const BITS: usize = 16;

    pub const fn code(self) -> u16 {
        self as u16
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        i32::from(code.code())
    }
}

impl TryFrom<i32> for ExitCode {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        u16::try_from(code)
            .ok()
            .and_then(ExitCode::from_repr)
            .ok_or(code)
    }
}
