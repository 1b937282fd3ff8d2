use std::collections::HashMap;

use error_stack::{ensure, report, Result, ResultExt};
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use ton_utils::{
    string_to_cell, Address, ArcCell, Cell, CellBuilder, CellBuilderExt, CellParser,
    CellParserExt, CellTo, TonCellError, B256, BOUNCED_PREFIX, U256,
};

use crate::codec::{load_optional, load_ref, store_optional, store_optional_cell, store_ref, CellCodec};
use crate::error::{DecodeError, EncodeError};
use crate::op::{OpCode, Tag};
use crate::primitives::{Domain, GasConfig, HookMetadata, Message, MultisigMetadata, Signature};
use crate::ExitCode;

const VALIDATOR_DICT_KEY_BITS: usize = 32;

/// Leading `op:32 query_id:64` of every internal message body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub tag: Tag,
    pub query_id: u64,
}

impl Header {
    pub fn load(parser: &mut CellParser) -> Result<Self, DecodeError> {
        let code = parser
            .load_u32(32)
            .change_context(DecodeError::Malformed("header"))?;
        let query_id = parser
            .load_u64(64)
            .change_context(DecodeError::Malformed("header"))?;

        Ok(Header {
            tag: Tag::from(code),
            query_id,
        })
    }

    fn store(
        builder: &mut CellBuilder,
        code: u32,
        query_id: u64,
    ) -> std::result::Result<(), TonCellError> {
        builder.store_u32(32, code)?;
        builder.store_u64(64, query_id)?;
        Ok(())
    }
}

/// What is left of a body after it bounced: the prefix followed by the first 256 bits of the
/// original body, enough to recover its op and query id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounced {
    pub tag: Tag,
    pub query_id: u64,
}

impl Bounced {
    pub fn from_body(body: &Cell) -> Result<Self, DecodeError> {
        let mut parser = body.parser();
        let prefix = parser
            .load_u32(32)
            .change_context(DecodeError::Malformed("bounced body"))?;
        ensure!(prefix == BOUNCED_PREFIX, DecodeError::NotBounced);

        let header = Header::load(&mut parser)?;
        Ok(Bounced {
            tag: header.tag,
            query_id: header.query_id,
        })
    }
}

/// A request body: its op code followed by the payload layout of `CellCodec`.
pub trait Request: CellCodec {
    const OP: OpCode;

    fn to_body(&self, query_id: u64) -> Result<Cell, EncodeError> {
        encode_body(Self::OP, query_id, self)
    }

    /// Decodes a body that must carry this request's op code.
    fn from_body(body: &Cell) -> Result<(u64, Self), DecodeError> {
        let mut parser = body.parser();
        let header = Header::load(&mut parser)?;
        ensure!(
            header.tag == Tag::Request(Self::OP),
            DecodeError::UnexpectedOp {
                expected: Self::OP.code(),
                actual: header.tag.into(),
            }
        );

        let request = Self::load(&mut parser).change_context(DecodeError::Malformed(Self::KIND))?;
        Ok((header.query_id, request))
    }
}

/// Encodes `payload` under an explicit op code, for payloads shared between several codes.
pub fn encode_body<T: CellCodec>(op: OpCode, query_id: u64, payload: &T) -> Result<Cell, EncodeError> {
    let mut builder = CellBuilder::new();
    Header::store(&mut builder, op.code(), query_id)
        .and_then(|_| payload.store(&mut builder))
        .and_then(|_| builder.build())
        .change_context(EncodeError::Cell(T::KIND))
}

/// Loads the payload following an already parsed header. Malformed payloads abort the
/// transaction the way the VM does when it reads past the end of a cell.
pub fn load_payload<T: CellCodec>(parser: &mut CellParser) -> Result<T, ExitCode> {
    T::load(parser)
        .change_context(ExitCode::CellUnderflow)
        .attach_printable(T::KIND)
}

/// Reply to a request: `answer(op):32 query_id:64 ok:1`, then the payload or an exit code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Answer<T> {
    pub op: OpCode,
    pub query_id: u64,
    pub result: std::result::Result<T, ExitCode>,
}

impl<T: CellCodec> Answer<T> {
    pub fn ok(op: OpCode, query_id: u64, payload: T) -> Self {
        Self {
            op,
            query_id,
            result: Ok(payload),
        }
    }

    pub fn failed(op: OpCode, query_id: u64, code: ExitCode) -> Self {
        Self {
            op,
            query_id,
            result: Err(code),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn to_body(&self) -> Result<Cell, EncodeError> {
        let mut builder = CellBuilder::new();
        Header::store(&mut builder, self.op.answer(), self.query_id)
            .and_then(|_| match &self.result {
                Ok(payload) => {
                    builder.store_bit(true)?;
                    payload.store(&mut builder)
                }
                Err(code) => {
                    builder.store_bit(false)?;
                    builder.store_u32(ExitCode::BITS, u32::from(code.code()))?;
                    Ok(())
                }
            })
            .and_then(|_| builder.build())
            .change_context(EncodeError::Cell("answer"))
    }

    pub fn from_body(body: &Cell) -> Result<Self, DecodeError> {
        let mut parser = body.parser();
        let header = Header::load(&mut parser)?;

        match header.tag {
            Tag::Answer(op) => Ok(Self {
                op,
                query_id: header.query_id,
                result: Self::load_result(&mut parser)?,
            }),
            tag => Err(report!(DecodeError::UnexpectedOp {
                expected: 0,
                actual: tag.into(),
            }))
            .attach_printable("expected an answer"),
        }
    }

    /// Loads the `ok` flag and what follows it.
    pub fn load_result(
        parser: &mut CellParser,
    ) -> Result<std::result::Result<T, ExitCode>, DecodeError> {
        let ok = parser
            .load_bit()
            .change_context(DecodeError::Malformed("answer"))?;

        if ok {
            return T::load(parser)
                .map(Ok)
                .change_context(DecodeError::Malformed(T::KIND));
        }

        let raw = parser
            .load_u32(ExitCode::BITS)
            .change_context(DecodeError::Malformed("answer"))?;
        let code = u16::try_from(raw).change_context(DecodeError::Malformed("answer"))?;
        ExitCode::from_repr(code)
            .map(Err)
            .ok_or_else(|| report!(DecodeError::UnknownExitCode(code)))
    }
}

/// Payload-less bodies.
impl CellCodec for () {
    const KIND: &'static str = "empty payload";

    fn store(&self, _: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        Ok(())
    }

    fn load(_: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(())
    }
}

macro_rules! empty_request {
    ($name:ident, $op:expr, $kind:literal) => {
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name;

        impl CellCodec for $name {
            const KIND: &'static str = $kind;

            fn store(&self, _: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
                Ok(())
            }

            fn load(_: &mut CellParser) -> std::result::Result<Self, TonCellError> {
                Ok($name)
            }
        }

        impl Request for $name {
            const OP: OpCode = $op;
        }
    };
}

macro_rules! address_request {
    ($name:ident, $field:ident, $op:expr, $kind:literal) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct $name {
            pub $field: Address,
        }

        impl CellCodec for $name {
            const KIND: &'static str = $kind;

            fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
                builder.store_account(Some(&self.$field))?;
                Ok(())
            }

            fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
                Ok($name {
                    $field: parser.load_required_account()?,
                })
            }
        }

        impl Request for $name {
            const OP: OpCode = $op;
        }
    };
}

empty_request!(GetIsm, OpCode::GetIsm, "get ism");
empty_request!(CollectProtocolFee, OpCode::CollectProtocolFee, "collect protocol fee");
empty_request!(Claim, OpCode::Claim, "claim");

address_request!(SetDefaultIsm, ism, OpCode::SetDefaultIsm, "set default ism");
address_request!(SetDefaultHook, hook, OpCode::SetDefaultHook, "set default hook");
address_request!(SetRequiredHook, hook, OpCode::SetRequiredHook, "set required hook");
address_request!(SetBeneficiary, beneficiary, OpCode::SetBeneficiary, "set beneficiary");
address_request!(TransferOwnership, owner, OpCode::TransferOwnership, "transfer ownership");

/// Asks the mailbox to send a message to `recipient` on `destination`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatch {
    pub destination: Domain,
    pub recipient: B256,
    pub body: ArcCell,
    pub hook_metadata: Option<HookMetadata>,
}

impl CellCodec for Dispatch {
    const KIND: &'static str = "dispatch";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_u32(32, self.destination)?;
        builder.store_hash256(&self.recipient)?;
        builder.store_reference(&self.body)?;
        store_optional(builder, self.hook_metadata.as_ref())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(Dispatch {
            destination: parser.load_u32(32)?,
            recipient: parser.load_hash256()?,
            body: parser.next_reference()?,
            hook_metadata: load_optional(parser)?,
        })
    }
}

impl Request for Dispatch {
    const OP: OpCode = OpCode::Dispatch;
}

/// Payload of a successful dispatch answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dispatched {
    pub nonce: u32,
    pub message_id: B256,
}

impl CellCodec for Dispatched {
    const KIND: &'static str = "dispatched";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_u32(32, self.nonce)?;
        builder.store_hash256(&self.message_id)?;
        Ok(())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(Dispatched {
            nonce: parser.load_u32(32)?,
            message_id: parser.load_hash256()?,
        })
    }
}

/// Relayer submission of an inbound message and its proof.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Process {
    pub message: Message,
    pub metadata: Option<MultisigMetadata>,
}

impl CellCodec for Process {
    const KIND: &'static str = "process";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        store_ref(builder, &self.message)?;
        store_optional(builder, self.metadata.as_ref())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(Process {
            message: load_ref(parser)?,
            metadata: load_optional(parser)?,
        })
    }
}

impl Request for Process {
    const OP: OpCode = OpCode::Process;
}

/// Payload of a successful process answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Processed {
    pub message_id: B256,
}

impl CellCodec for Processed {
    const KIND: &'static str = "processed";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_hash256(&self.message_id)?;
        Ok(())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(Processed {
            message_id: parser.load_hash256()?,
        })
    }
}

/// Payload of a get-ism answer. `None` defers to the mailbox default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IsmAddress {
    pub ism: Option<Address>,
}

impl CellCodec for IsmAddress {
    const KIND: &'static str = "ism address";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_account(self.ism.as_ref())?;
        Ok(())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(IsmAddress {
            ism: parser.load_account()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verify {
    pub message: Message,
    pub metadata: MultisigMetadata,
}

impl CellCodec for Verify {
    const KIND: &'static str = "verify";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        store_ref(builder, &self.message)?;
        store_ref(builder, &self.metadata)
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(Verify {
            message: load_ref(parser)?,
            metadata: load_ref(parser)?,
        })
    }
}

impl Request for Verify {
    const OP: OpCode = OpCode::Verify;
}

/// Delivery of a verified message to its recipient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Handle {
    pub origin: Domain,
    pub sender: B256,
    pub body: ArcCell,
}

impl CellCodec for Handle {
    const KIND: &'static str = "handle";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_u32(32, self.origin)?;
        builder.store_hash256(&self.sender)?;
        builder.store_reference(&self.body)?;
        Ok(())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(Handle {
            origin: parser.load_u32(32)?,
            sender: parser.load_hash256()?,
            body: parser.next_reference()?,
        })
    }
}

impl Request for Handle {
    const OP: OpCode = OpCode::Handle;
}

/// Shared by the generic, required and default post-dispatch entry points; the generic one is
/// the `Request::OP`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostDispatch {
    pub message: Message,
    pub hook_metadata: Option<HookMetadata>,
}

impl PostDispatch {
    /// Metadata the hooks act on; absent metadata means the default variant.
    pub fn metadata_or_default(&self) -> HookMetadata {
        self.hook_metadata.clone().unwrap_or_default()
    }
}

impl CellCodec for PostDispatch {
    const KIND: &'static str = "post dispatch";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        store_ref(builder, &self.message)?;
        store_optional(builder, self.hook_metadata.as_ref())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(PostDispatch {
            message: load_ref(parser)?,
            hook_metadata: load_optional(parser)?,
        })
    }
}

impl Request for PostDispatch {
    const OP: OpCode = OpCode::PostDispatch;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetAuthorizedHook {
    pub hook: Address,
    pub authorized: bool,
}

impl CellCodec for SetAuthorizedHook {
    const KIND: &'static str = "set authorized hook";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_account(Some(&self.hook))?;
        builder.store_bit(self.authorized)?;
        Ok(())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(SetAuthorizedHook {
            hook: parser.load_required_account()?,
            authorized: parser.load_bit()?,
        })
    }
}

impl Request for SetAuthorizedHook {
    const OP: OpCode = OpCode::SetAuthorizedHook;
}

/// Points a recipient at its verifier; `None` falls back to the mailbox default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetIsm {
    pub ism: Option<Address>,
}

impl CellCodec for SetIsm {
    const KIND: &'static str = "set ism";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_account(self.ism.as_ref())?;
        Ok(())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(SetIsm {
            ism: parser.load_account()?,
        })
    }
}

impl Request for SetIsm {
    const OP: OpCode = OpCode::SetIsm;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetRouter {
    pub domain: Domain,
    pub router: B256,
}

impl CellCodec for SetRouter {
    const KIND: &'static str = "set router";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_u32(32, self.domain)?;
        builder.store_hash256(&self.router)?;
        Ok(())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(SetRouter {
            domain: parser.load_u32(32)?,
            router: parser.load_hash256()?,
        })
    }
}

impl Request for SetRouter {
    const OP: OpCode = OpCode::SetRouter;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRemote {
    pub destination: Domain,
    pub recipient: B256,
    pub amount: U256,
    pub hook_metadata: Option<HookMetadata>,
}

impl CellCodec for TransferRemote {
    const KIND: &'static str = "transfer remote";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_u32(32, self.destination)?;
        builder.store_hash256(&self.recipient)?;
        builder.store_uint256(&self.amount)?;
        store_optional(builder, self.hook_metadata.as_ref())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(TransferRemote {
            destination: parser.load_u32(32)?,
            recipient: parser.load_hash256()?,
            amount: parser.load_uint256()?,
            hook_metadata: load_optional(parser)?,
        })
    }
}

impl Request for TransferRemote {
    const OP: OpCode = OpCode::TransferRemote;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetProtocolFee {
    pub protocol_fee: u128,
}

impl CellCodec for SetProtocolFee {
    const KIND: &'static str = "set protocol fee";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_uint(128, &BigUint::from(self.protocol_fee))?;
        Ok(())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        let protocol_fee = parser.load_uint(128)?.to_u128().ok_or_else(|| {
            TonCellError::InternalError("protocol fee does not fit into u128".to_string())
        })?;

        Ok(SetProtocolFee { protocol_fee })
    }
}

impl Request for SetProtocolFee {
    const OP: OpCode = OpCode::SetProtocolFee;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetDestGasConfig {
    pub domain: Domain,
    pub config: GasConfig,
}

impl CellCodec for SetDestGasConfig {
    const KIND: &'static str = "set destination gas config";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_u32(32, self.domain)?;
        store_ref(builder, &self.config)
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(SetDestGasConfig {
            domain: parser.load_u32(32)?,
            config: load_ref(parser)?,
        })
    }
}

impl Request for SetDestGasConfig {
    const OP: OpCode = OpCode::SetDestGasConfig;
}

/// Replaces the validator set and threshold of one origin domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetValidatorsAndThreshold {
    pub domain: Domain,
    pub threshold: u8,
    pub validators: Vec<B256>,
}

fn store_validator(builder: &mut CellBuilder, validator: B256) -> std::result::Result<(), TonCellError> {
    builder.store_hash256(&validator)?;
    Ok(())
}

fn load_validator(parser: &mut CellParser) -> std::result::Result<B256, TonCellError> {
    parser.load_hash256()
}

fn read_validator_key(key: &BigUint) -> std::result::Result<u32, TonCellError> {
    key.to_u32()
        .ok_or_else(|| TonCellError::InternalError(format!("validator key {key} exceeds 32 bits")))
}

impl CellCodec for SetValidatorsAndThreshold {
    const KIND: &'static str = "set validators and threshold";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        let validators = self
            .validators
            .iter()
            .enumerate()
            .map(|(index, validator)| (BigUint::from(index), *validator))
            .collect::<HashMap<_, _>>();

        builder.store_u32(32, self.domain)?;
        builder.store_u8(8, self.threshold)?;
        builder.store_dict(VALIDATOR_DICT_KEY_BITS, store_validator, validators)?;
        Ok(())
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        let domain = parser.load_u32(32)?;
        let threshold = parser.load_u8(8)?;
        let mut validators = parser
            .load_dict(VALIDATOR_DICT_KEY_BITS, read_validator_key, load_validator)?
            .into_iter()
            .collect::<Vec<_>>();
        validators.sort_by_key(|(key, _)| *key);

        Ok(SetValidatorsAndThreshold {
            domain,
            threshold,
            validators: validators.into_iter().map(|(_, validator)| validator).collect(),
        })
    }
}

impl Request for SetValidatorsAndThreshold {
    const OP: OpCode = OpCode::SetValidatorsAndThreshold;
}

/// A validator's signed statement of where its checkpoint signatures live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Announce {
    pub validator: B256,
    pub storage_location: String,
    pub signature: Signature,
}

impl CellCodec for Announce {
    const KIND: &'static str = "announce";

    fn store(&self, builder: &mut CellBuilder) -> std::result::Result<(), TonCellError> {
        builder.store_hash256(&self.validator)?;
        builder.store_reference(&string_to_cell(&self.storage_location)?)?;
        store_ref(builder, &self.signature)
    }

    fn load(parser: &mut CellParser) -> std::result::Result<Self, TonCellError> {
        Ok(Announce {
            validator: parser.load_hash256()?,
            storage_location: parser.next_reference()?.cell_to_string()?,
            signature: load_ref(parser)?,
        })
    }
}

impl Request for Announce {
    const OP: OpCode = OpCode::Announce;
}

/// Body with an arbitrary optional payload cell, used for opaque forward payloads.
pub(crate) fn store_payload_cell(
    builder: &mut CellBuilder,
    cell: Option<&ArcCell>,
) -> std::result::Result<(), TonCellError> {
    store_optional_cell(builder, cell)
}
