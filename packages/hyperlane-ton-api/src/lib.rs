//! Wire layer of the hyperlane contracts on TON: the cell codec of every protocol structure,
//! the operation code registry, the exit code taxonomy and the request and answer bodies of
//! each contract entry point.

pub mod checkpoint;
mod codec;
mod error;
mod exit_code;
pub mod jetton;
pub mod msg;
pub mod op;
mod primitives;

pub use codec::CellCodec;
pub use error::{DecodeError, EncodeError};
pub use exit_code::ExitCode;
pub use op::{OpCode, Tag};
pub use primitives::{
    ensure_unique_keys, AmountEncoding, Domain, GasConfig, HookMetadata, HookType, Message,
    MultisigMetadata, Signature, TokenStandard, TokenTransferPayload, WarpTransfer,
    MAILBOX_VERSION,
};
