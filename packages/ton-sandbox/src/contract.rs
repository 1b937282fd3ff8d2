use std::any::Any;
use std::fmt;

use error_stack::{Context as ErrorContext, Report};
use ton_utils::{Address, Cell};

/// Execution environment of one transaction, as seen by the contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Context {
    /// Address of the account executing the transaction.
    pub address: Address,
    pub sender: Address,
    /// Value carried by the inbound message.
    pub value: u128,
    /// Account balance after the inbound value was credited.
    pub balance: u128,
    pub lt: u64,
}

/// How much an outgoing message carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendValue {
    Amount(u128),
    /// Whatever the inbound message brought in.
    RemainingInbound,
    /// The entire remaining balance of the account. Must be the last message of a response.
    AllBalance,
}

pub struct OutMessage {
    pub to: Address,
    pub value: SendValue,
    pub body: Cell,
    pub bounce: bool,
    /// Contract to deploy at `to` if the account is not initialised yet.
    pub init: Option<Box<dyn Contract>>,
}

impl OutMessage {
    pub fn new(to: Address, value: SendValue, body: Cell) -> Self {
        Self {
            to,
            value,
            body,
            bounce: true,
            init: None,
        }
    }

    pub fn non_bounceable(mut self) -> Self {
        self.bounce = false;
        self
    }

    pub fn with_init(mut self, contract: Box<dyn Contract>) -> Self {
        self.init = Some(contract);
        self
    }
}

impl fmt::Debug for OutMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutMessage")
            .field("to", &self.to)
            .field("value", &self.value)
            .field("bounce", &self.bounce)
            .field("deploy", &self.init.is_some())
            .finish()
    }
}

/// An external log entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub ty: String,
    pub attributes: Vec<(String, String)>,
}

impl Event {
    pub fn new(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            attributes: vec![],
        }
    }

    pub fn add_attribute(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push((key.into(), value.to_string()));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Actions a successful transaction performs, in order.
#[derive(Debug, Default)]
pub struct Response {
    pub messages: Vec<OutMessage>,
    pub events: Vec<Event>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(mut self, message: OutMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn add_messages(mut self, messages: impl IntoIterator<Item = OutMessage>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn add_event(mut self, event: impl Into<Event>) -> Self {
        self.events.push(event.into());
        self
    }
}

/// A failed compute phase.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("exit code {exit_code}: {reason}")]
pub struct ContractError {
    pub exit_code: i32,
    pub reason: String,
}

impl ContractError {
    pub fn new(exit_code: impl Into<i32>, reason: impl Into<String>) -> Self {
        Self {
            exit_code: exit_code.into(),
            reason: reason.into(),
        }
    }
}

impl<C> From<Report<C>> for ContractError
where
    C: ErrorContext + Copy + Into<i32>,
{
    fn from(report: Report<C>) -> Self {
        Self {
            exit_code: (*report.current_context()).into(),
            reason: format!("{report:?}"),
        }
    }
}

/// Code and state of an account.
pub trait Contract: ContractBase + Send + 'static {
    fn receive(&mut self, ctx: &Context, body: &Cell) -> Result<Response, ContractError>;

    /// Handles one of this account's own messages coming back bounced.
    fn on_bounce(&mut self, _ctx: &Context, _body: &Cell) -> Result<Response, ContractError> {
        Ok(Response::default())
    }
}

/// Object-safe plumbing every contract gets for free from `Clone`.
pub trait ContractBase {
    fn clone_box(&self) -> Box<dyn Contract>;
    fn as_any(&self) -> &dyn Any;
}

impl<T> ContractBase for T
where
    T: Contract + Clone,
{
    fn clone_box(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Clone for Box<dyn Contract> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
