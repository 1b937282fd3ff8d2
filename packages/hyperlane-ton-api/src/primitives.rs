use std::collections::HashMap;
use std::fmt;
use error_stack::{bail, report, Result, ResultExt};
use itertools::Itertools;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use strum::FromRepr;
use ton_utils::{
    flatten_cell_data, keccak256, Address, ArcCell, Cell, CellBuilder, CellBuilderExt, CellParser,
    CellParserExt, TonCellError, B256, U256,
};

use crate::codec::{load_optional, CellCodec};
use crate::error::{DecodeError, EncodeError};

/// Logical chain identifier.
pub type Domain = u32;

pub const MAILBOX_VERSION: u8 = 3;

const SIGNATURE_DICT_KEY_BITS: usize = 32;
const COINS_MAX_BITS: usize = 120;

/// The cross-domain message envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub version: u8,
    pub nonce: u32,
    pub origin: Domain,
    pub sender: B256,
    pub destination: Domain,
    pub recipient: B256,
    pub body: ArcCell,
}

impl Message {
    /// Keccak hash of the packed message: fixed-width header fields in order, followed by the
    /// flattened data of the body cell tree.
    pub fn id(&self) -> B256 {
        keccak256(
            [
                [self.version].as_slice(),
                self.nonce.to_be_bytes().as_slice(),
                self.origin.to_be_bytes().as_slice(),
                self.sender.as_slice(),
                self.destination.to_be_bytes().as_slice(),
                self.recipient.as_slice(),
                flatten_cell_data(&self.body).as_slice(),
            ]
            .concat(),
        )
    }
}

impl CellCodec for Message {
    const KIND: &'static str = "message";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_u8(8, self.version)?;
        builder.store_u32(32, self.nonce)?;
        builder.store_u32(32, self.origin)?;
        builder.store_hash256(&self.sender)?;
        builder.store_u32(32, self.destination)?;
        builder.store_hash256(&self.recipient)?;
        builder.store_reference(&self.body)?;
        Ok(())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(Message {
            version: parser.load_u8(8)?,
            nonce: parser.load_u32(32)?,
            origin: parser.load_u32(32)?,
            sender: parser.load_hash256()?,
            destination: parser.load_u32(32)?,
            recipient: parser.load_hash256()?,
            body: parser.next_reference()?,
        })
    }
}

/// Per-dispatch instructions to the hook chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HookMetadata {
    pub variant: u16,
    pub msg_value: U256,
    pub gas_limit: U256,
    pub refund_address: Option<Address>,
}

impl HookMetadata {
    pub const VARIANT_DEFAULT: u16 = 0;
    pub const VARIANT_STANDARD: u16 = 1;

    pub fn standard(msg_value: U256, gas_limit: U256, refund_address: Address) -> Self {
        Self {
            variant: Self::VARIANT_STANDARD,
            msg_value,
            gas_limit,
            refund_address: Some(refund_address),
        }
    }
}

impl CellCodec for HookMetadata {
    const KIND: &'static str = "hook metadata";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_u32(16, u32::from(self.variant))?;
        builder.store_uint256(&self.msg_value)?;
        builder.store_uint256(&self.gas_limit)?;
        builder.store_account(self.refund_address.as_ref())?;
        Ok(())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        let variant = u16::try_from(parser.load_u32(16)?)
            .map_err(|_| TonCellError::InternalError("variant exceeds 16 bits".to_string()))?;

        Ok(HookMetadata {
            variant,
            msg_value: parser.load_uint256()?,
            gas_limit: parser.load_uint256()?,
            refund_address: parser.load_account()?,
        })
    }
}

/// ECDSA signature in its 65-byte wire form `v ‖ r ‖ s`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

impl Signature {
    pub const BYTES: usize = 65;

    pub fn to_bytes(&self) -> [u8; Self::BYTES] {
        let mut bytes = [0u8; Self::BYTES];
        bytes[0] = self.v;
        bytes[1..33].copy_from_slice(self.r.as_slice());
        bytes[33..].copy_from_slice(self.s.as_slice());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, TonCellError> {
        if bytes.len() != Self::BYTES {
            return Err(TonCellError::InternalError(format!(
                "signature must be {} bytes, got {}",
                Self::BYTES,
                bytes.len()
            )));
        }

        Ok(Signature {
            v: bytes[0],
            r: B256::from_slice(&bytes[1..33]),
            s: B256::from_slice(&bytes[33..]),
        })
    }
}

impl CellCodec for Signature {
    const KIND: &'static str = "signature";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_slice(&self.to_bytes())?;
        Ok(())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        let bytes = parser.load_bits(Signature::BYTES * 8)?;
        Signature::from_bytes(&bytes)
    }
}

/// Validator proof accompanying a process call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultisigMetadata {
    pub origin_merkle_hook: B256,
    pub root: B256,
    pub index: u32,
    /// In insertion order; stored in a dictionary keyed `0..n`.
    pub signatures: Vec<Signature>,
}

fn store_signature(
    builder: &mut CellBuilder,
    signature: Signature,
) -> std::result::Result<(), TonCellError> {
    signature.store(builder)
}

fn load_signature(parser: &mut CellParser) -> std::result::Result<Signature, TonCellError> {
    Signature::load(parser)
}

fn read_signature_key(key: &BigUint) -> std::result::Result<u32, TonCellError> {
    key.to_u32()
        .ok_or_else(|| TonCellError::InternalError(format!("signature key {key} exceeds 32 bits")))
}

impl CellCodec for MultisigMetadata {
    const KIND: &'static str = "multisig metadata";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        let signatures = self
            .signatures
            .iter()
            .enumerate()
            .map(|(index, signature)| (BigUint::from(index), *signature))
            .collect::<HashMap<_, _>>();

        builder.store_hash256(&self.origin_merkle_hook)?;
        builder.store_hash256(&self.root)?;
        builder.store_u32(32, self.index)?;
        builder.store_dict(SIGNATURE_DICT_KEY_BITS, store_signature, signatures)?;
        Ok(())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        let origin_merkle_hook = parser.load_hash256()?;
        let root = parser.load_hash256()?;
        let index = parser.load_u32(32)?;
        let dict =
            parser.load_dict(SIGNATURE_DICT_KEY_BITS, read_signature_key, load_signature)?;

        let signatures = dict
            .into_iter()
            .sorted_by_key(|(key, _)| *key)
            .enumerate()
            .map(|(position, (key, signature))| {
                if usize::try_from(key).ok() == Some(position) {
                    Ok(signature)
                } else {
                    Err(TonCellError::InternalError(format!(
                        "signature keys must be contiguous from 0, found {key} at position {position}"
                    )))
                }
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(MultisigMetadata {
            origin_merkle_hook,
            root,
            index,
            signatures,
        })
    }
}

/// Kind of a post-dispatch hook, as reported by its `hook_type` getter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromRepr)]
#[repr(u8)]
pub enum HookType {
    Unused = 0,
    Routing = 1,
    Aggregation = 2,
    MerkleTree = 3,
    InterchainGasPaymaster = 4,
    FallbackRouting = 5,
    IdAuthIsm = 6,
    Pausable = 7,
    ProtocolFee = 8,
}

/// Token standard a warp route is deployed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStandard {
    Native,
    Synthetic,
    Collateral,
}

impl fmt::Display for TokenStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenStandard::Native => write!(f, "native"),
            TokenStandard::Synthetic => write!(f, "synthetic"),
            TokenStandard::Collateral => write!(f, "collateral"),
        }
    }
}

/// Width of the amount field in a token transfer payload.
///
/// Every standard uses `Uint256` on the wire so that routes mixing standards agree on the layout.
/// `Coins` reproduces the variable-width layout some collateral deployments emit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountEncoding {
    #[default]
    Uint256,
    Coins,
}

/// Body of a warp-route message: who receives how much on the destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenTransferPayload {
    pub recipient: B256,
    pub amount: U256,
}

impl TokenTransferPayload {
    pub fn to_cell(&self, encoding: AmountEncoding) -> Result<Cell, EncodeError> {
        let mut builder = CellBuilder::new();
        builder
            .store_hash256(&self.recipient)
            .change_context(EncodeError::Cell("token transfer payload"))?;

        match encoding {
            AmountEncoding::Uint256 => builder.store_uint256(&self.amount),
            AmountEncoding::Coins => {
                if self.amount.bit_len() > COINS_MAX_BITS {
                    bail!(EncodeError::OutOfRange {
                        field: "coins amount",
                        value: self.amount.to_string(),
                    });
                }
                builder.store_coins(&ton_utils::u256_to_biguint(&self.amount))
            }
        }
        .change_context(EncodeError::Cell("token transfer payload"))?;

        builder
            .build()
            .change_context(EncodeError::Cell("token transfer payload"))
    }

    pub fn from_cell(cell: &Cell, encoding: AmountEncoding) -> Result<Self, DecodeError> {
        let mut parser = cell.parser();
        let recipient = parser
            .load_hash256()
            .change_context(DecodeError::Malformed("token transfer payload"))?;

        let amount = match encoding {
            AmountEncoding::Uint256 => parser.load_uint256(),
            AmountEncoding::Coins => parser
                .load_coins()
                .and_then(|coins| ton_utils::biguint_to_u256(&coins)),
        }
        .change_context(DecodeError::Malformed("token transfer payload"))?;

        Ok(Self { recipient, amount })
    }
}

/// Instructions a token holder attaches to a burn or escrow transfer: where the tokens go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WarpTransfer {
    pub destination: Domain,
    pub recipient: B256,
    pub hook_metadata: Option<HookMetadata>,
}

impl CellCodec for WarpTransfer {
    const KIND: &'static str = "warp transfer";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_u32(32, self.destination)?;
        builder.store_hash256(&self.recipient)?;
        crate::codec::store_optional(builder, self.hook_metadata.as_ref())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(WarpTransfer {
            destination: parser.load_u32(32)?,
            recipient: parser.load_hash256()?,
            hook_metadata: load_optional(parser)?,
        })
    }
}

/// Destination gas pricing used by the gas paymaster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasConfig {
    pub gas_oracle: B256,
    pub gas_overhead: U256,
    pub exchange_rate: u128,
    pub gas_price: u128,
}

impl CellCodec for GasConfig {
    const KIND: &'static str = "gas config";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_hash256(&self.gas_oracle)?;
        builder.store_uint256(&self.gas_overhead)?;
        builder.store_uint(128, &BigUint::from(self.exchange_rate))?;
        builder.store_uint(128, &BigUint::from(self.gas_price))?;
        Ok(())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(GasConfig {
            gas_oracle: parser.load_hash256()?,
            gas_overhead: parser.load_uint256()?,
            exchange_rate: load_u128(parser)?,
            gas_price: load_u128(parser)?,
        })
    }
}

fn load_u128(parser: &mut CellParser) -> std::result::Result<u128, TonCellError> {
    parser.load_uint(128)?.to_u128().ok_or_else(|| {
        TonCellError::InternalError("128-bit field does not fit into u128".to_string())
    })
}

/// Ensures no key occurs twice before entries are written into a dictionary.
pub fn ensure_unique_keys<K, V>(entries: &[(K, V)]) -> Result<(), EncodeError>
where
    K: fmt::Display + Eq + std::hash::Hash,
{
    match entries.iter().map(|(key, _)| key).duplicates().next() {
        Some(key) => Err(report!(EncodeError::DuplicateKey(key.to_string()))),
        None => Ok(()),
    }
}
