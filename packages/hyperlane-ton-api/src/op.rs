use std::fmt;

use strum::{EnumIter, FromRepr, IntoStaticStr};

/// Bit that distinguishes a reply from the request it answers.
pub const ANSWER_BIT: u32 = 0x8000_0000;

/// Reply code of the request code `code`.
pub const fn answer(code: u32) -> u32 {
    code | ANSWER_BIT
}

/// Request code that `code` answers. Identity on request codes.
pub const fn request_of(code: u32) -> u32 {
    code & !ANSWER_BIT
}

pub const fn is_answer(code: u32) -> bool {
    code & ANSWER_BIT != 0
}

/// Operation codes understood by the contracts. Every code leaves the answer bit clear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, FromRepr, IntoStaticStr)]
#[repr(u32)]
pub enum OpCode {
    Dispatch = 0x084b_9dd4,
    Process = 0x2ced_8a23,
    GetIsm = 0x08f3_2175,
    Verify = 0x3b3c_ca17,
    Handle = 0x0b99_c08d,
    PostDispatch = 0x39ff_effb,
    PostDispatchRequired = 0x09f4_a643,
    PostDispatchDefault = 0x0a9f_b44c,
    SetDefaultIsm = 0x544d_8496,
    SetDefaultHook = 0x0e6c_735b,
    SetRequiredHook = 0x2f54_51cc,
    SetAuthorizedHook = 0x1954_95a2,
    SetIsm = 0x1b62_99a8,
    SetRouter = 0x4a65_7447,
    TransferRemote = 0x5d70_fba2,
    SetProtocolFee = 0x7724_0b7a,
    SetBeneficiary = 0x0fc3_adbc,
    TransferOwnership = 0x295e_75a9,
    CollectProtocolFee = 0x2ec5_06d3,
    SetDestGasConfig = 0x301b_f43f,
    Claim = 0x013a_3ca6,
    SetValidatorsAndThreshold = 0x4dad_45ea,
    Announce = 0x180b_3d44,
    JettonTransfer = 0x0f8a_7ea5,
    JettonTransferNotification = 0x7362_d09c,
    JettonInternalTransfer = 0x178d_4519,
    JettonExcesses = 0x5532_76db,
    JettonBurn = 0x595f_07bc,
    JettonBurnNotification = 0x7bdd_97de,
    JettonMint = 0x642b_7d07,
    JettonTopUp = 0x5372_158c,
    JettonChangeAdmin = 0x6501_f354,
}

impl OpCode {
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub const fn answer(self) -> u32 {
        answer(self.code())
    }

    /// True for the three entry points a hook accepts.
    pub const fn is_post_dispatch(self) -> bool {
        matches!(
            self,
            OpCode::PostDispatch | OpCode::PostDispatchRequired | OpCode::PostDispatchDefault
        )
    }
}

impl From<OpCode> for u32 {
    fn from(op: OpCode) -> Self {
        op.code()
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &'static str = self.into();
        write!(f, "{name}({:#010x})", self.code())
    }
}

/// Classification of the leading 32 bits of a message body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    Request(OpCode),
    Answer(OpCode),
    Unknown(u32),
}

impl From<u32> for Tag {
    fn from(code: u32) -> Self {
        let op = OpCode::from_repr(request_of(code));

        match op {
            Some(op) if is_answer(code) => Tag::Answer(op),
            Some(op) => Tag::Request(op),
            None => Tag::Unknown(code),
        }
    }
}

impl From<Tag> for u32 {
    fn from(tag: Tag) -> Self {
        match tag {
            Tag::Request(op) => op.code(),
            Tag::Answer(op) => op.answer(),
            Tag::Unknown(code) => code,
        }
    }
}
