use hyperlane_ton_api::msg::Dispatch;
use hyperlane_ton_api::{Domain, Message, MultisigMetadata, OpCode};
use ton_utils::{Address, B256};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub version: u8,
    pub local_domain: Domain,
}

/// The two hook calls every dispatch goes through, in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookStep {
    Required,
    Default,
}

impl HookStep {
    pub fn op(self) -> OpCode {
        match self {
            HookStep::Required => OpCode::PostDispatchRequired,
            HookStep::Default => OpCode::PostDispatchDefault,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchStage {
    /// Waiting for the dispatch ahead of it to finish.
    Queued,
    AwaitingHook {
        step: HookStep,
        hook: Address,
        query_id: u64,
        /// The message as it will be committed, nonce included.
        message: Message,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDispatch {
    pub caller: Address,
    pub caller_query_id: u64,
    /// Value the caller attached, spent on the hooks.
    pub value: u128,
    pub request: Dispatch,
    pub stage: DispatchStage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessStage {
    AwaitingIsm { recipient: Address },
    AwaitingVerification { ism: Address },
}

/// An inbound message between submission and delivery, keyed by the query id its calls carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingProcess {
    pub relayer: Address,
    pub relayer_query_id: u64,
    pub message: Message,
    pub message_id: B256,
    pub metadata: Option<MultisigMetadata>,
    pub stage: ProcessStage,
}

/// A HANDLE sent to a recipient that has not answered yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingDelivery {
    pub recipient: Address,
    pub message_id: B256,
}
