use std::collections::{HashMap, VecDeque};

use error_stack::{bail, ensure, report, Result, ResultExt};
use tracing::{debug, warn};
use ton_utils::{Address, Cell, CellBuilder, TonCellError, BOUNCED_PREFIX};

use crate::contract::{Context, Contract, ContractError, Event, OutMessage, Response, SendValue};
use crate::flow::SendResult;

/// Bits of the original body a bounce carries back.
const BOUNCED_BODY_BITS: usize = 256;

/// Upper bound on transactions triggered by a single external send.
pub const DEFAULT_TRANSACTION_LIMIT: usize = 1_000;

/// Exit code of a message that reaches an account without code.
pub const EXIT_CODE_UNINITIALIZED: i32 = -1;
/// Exit code of a failed action phase (not enough balance for the outgoing messages).
pub const EXIT_CODE_NOT_ENOUGH_BALANCE: i32 = 37;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("account {0} does not exist")]
    UnknownAccount(Address),
    #[error("account {0} cannot afford sending {1}")]
    InsufficientFunds(Address, u128),
    #[error("transaction limit of {0} exceeded")]
    TransactionLimit(usize),
    #[error("account {0} is already initialised")]
    AlreadyDeployed(Address),
    #[error("failed to build a bounced body")]
    BounceBody,
}

#[derive(Clone)]
enum AccountState {
    Uninit,
    /// A plain wallet: accepts anything and runs no code.
    Wallet,
    Active(Box<dyn Contract>),
}

#[derive(Clone)]
struct Account {
    balance: u128,
    state: AccountState,
}

impl Account {
    fn uninit() -> Self {
        Self {
            balance: 0,
            state: AccountState::Uninit,
        }
    }
}

/// One processed internal message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub lt: u64,
    pub from: Address,
    pub to: Address,
    /// Leading 32 bits of the inbound body, if it has that many.
    pub op: Option<u32>,
    pub value: u128,
    pub success: bool,
    pub exit_code: i32,
    pub deployed: bool,
    /// The inbound message was a bounce.
    pub bounced: bool,
    pub events: Vec<Event>,
    pub out_messages: usize,
    pub error: Option<String>,
}

struct InternalMessage {
    from: Address,
    to: Address,
    value: u128,
    body: Cell,
    bounce: bool,
    bounced: bool,
    init: Option<Box<dyn Contract>>,
}

/// A simulated chain of accounts exchanging internal messages.
pub struct Blockchain {
    accounts: HashMap<Address, Account>,
    lt: u64,
    transaction_limit: usize,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            lt: 0,
            transaction_limit: DEFAULT_TRANSACTION_LIMIT,
        }
    }

    pub fn with_transaction_limit(mut self, limit: usize) -> Self {
        self.transaction_limit = limit;
        self
    }

    /// A funded wallet derived from `seed`, topped up by `balance` on every call.
    pub fn treasury(&mut self, seed: &str, balance: u128) -> Address {
        let address = Address::derived(format!("treasury:{seed}"));
        let account = self.accounts.entry(address).or_insert(Account {
            balance: 0,
            state: AccountState::Wallet,
        });
        account.balance = account.balance.saturating_add(balance);
        address
    }

    pub fn balance(&self, address: &Address) -> u128 {
        self.accounts
            .get(address)
            .map(|account| account.balance)
            .unwrap_or_default()
    }

    pub fn is_deployed(&self, address: &Address) -> bool {
        self.accounts
            .get(address)
            .is_some_and(|account| matches!(account.state, AccountState::Active(_)))
    }

    /// Current state of the contract at `address`, if it runs code of type `T`.
    pub fn contract<T: Contract>(&self, address: &Address) -> Option<&T> {
        match &self.accounts.get(address)?.state {
            AccountState::Active(contract) => contract.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Sends an internal message from a wallet and runs every transaction it causes.
    pub fn send(
        &mut self,
        from: Address,
        to: Address,
        value: u128,
        body: Cell,
    ) -> Result<SendResult, Error> {
        self.submit(from, to, value, body, None)
    }

    /// Like `send`, with a state init deploying `contract` at `to`.
    pub fn deploy(
        &mut self,
        from: Address,
        to: Address,
        value: u128,
        contract: Box<dyn Contract>,
        body: Cell,
    ) -> Result<SendResult, Error> {
        ensure!(!self.is_deployed(&to), Error::AlreadyDeployed(to));
        self.submit(from, to, value, body, Some(contract))
    }

    fn submit(
        &mut self,
        from: Address,
        to: Address,
        value: u128,
        body: Cell,
        init: Option<Box<dyn Contract>>,
    ) -> Result<SendResult, Error> {
        let sender = self
            .accounts
            .get_mut(&from)
            .ok_or_else(|| report!(Error::UnknownAccount(from)))?;
        sender.balance = sender
            .balance
            .checked_sub(value)
            .ok_or_else(|| report!(Error::InsufficientFunds(from, value)))?;

        let mut queue = VecDeque::from([InternalMessage {
            from,
            to,
            value,
            body,
            bounce: true,
            bounced: false,
            init,
        }]);
        let mut transactions = vec![];

        while let Some(message) = queue.pop_front() {
            if transactions.len() >= self.transaction_limit {
                bail!(Error::TransactionLimit(self.transaction_limit));
            }

            let (transaction, out) = self.execute(message)?;
            queue.extend(out);
            transactions.push(transaction);
        }

        Ok(SendResult::new(transactions))
    }

    fn execute(
        &mut self,
        message: InternalMessage,
    ) -> Result<(Transaction, Vec<InternalMessage>), Error> {
        self.lt = self.lt.saturating_add(1);
        let lt = self.lt;

        let snapshot = self.accounts.get(&message.to).cloned();
        let account = self
            .accounts
            .entry(message.to)
            .or_insert_with(Account::uninit);
        account.balance = account.balance.saturating_add(message.value);

        let mut deployed = false;
        let uninit = matches!(account.state, AccountState::Uninit);
        if let (true, Some(contract)) = (uninit, message.init) {
            account.state = AccountState::Active(contract);
            deployed = true;
        }

        let ctx = Context {
            address: message.to,
            sender: message.from,
            value: message.value,
            balance: account.balance,
            lt,
        };

        let computed = match &mut account.state {
            AccountState::Active(contract) if message.bounced => {
                contract.on_bounce(&ctx, &message.body)
            }
            AccountState::Active(contract) => contract.receive(&ctx, &message.body),
            AccountState::Wallet => Ok(Response::default()),
            AccountState::Uninit if message.bounce && !message.bounced => Err(ContractError::new(
                EXIT_CODE_UNINITIALIZED,
                "account is not initialised",
            )),
            AccountState::Uninit => Ok(Response::default()),
        };
        let outcome =
            computed.and_then(|response| self.apply_actions(&message.to, message.value, response));

        let op = first_word(&message.body);
        let mut transaction = Transaction {
            lt,
            from: message.from,
            to: message.to,
            op,
            value: message.value,
            success: true,
            exit_code: 0,
            deployed,
            bounced: message.bounced,
            events: vec![],
            out_messages: 0,
            error: None,
        };

        match outcome {
            Ok((out, events)) => {
                debug!(
                    lt,
                    from = %message.from,
                    to = %message.to,
                    op = ?op.map(|op| format!("{op:#010x}")),
                    value = message.value,
                    out_messages = out.len(),
                    "transaction succeeded"
                );

                transaction.events = events;
                transaction.out_messages = out.len();
                Ok((transaction, out))
            }
            Err(err) => {
                warn!(
                    lt,
                    from = %message.from,
                    to = %message.to,
                    op = ?op.map(|op| format!("{op:#010x}")),
                    exit_code = err.exit_code,
                    reason = %err.reason,
                    "transaction failed"
                );

                match snapshot {
                    Some(account) => self.accounts.insert(message.to, account),
                    None => self.accounts.remove(&message.to),
                };

                transaction.success = false;
                transaction.exit_code = err.exit_code;
                transaction.deployed = false;
                transaction.error = Some(err.reason);

                let bounce = if message.bounce && !message.bounced {
                    vec![InternalMessage {
                        from: message.to,
                        to: message.from,
                        value: message.value,
                        body: bounce_body(&message.body).change_context(Error::BounceBody)?,
                        bounce: false,
                        bounced: true,
                        init: None,
                    }]
                } else {
                    // the value stays with the failed account
                    let account = self
                        .accounts
                        .entry(message.to)
                        .or_insert_with(Account::uninit);
                    account.balance = account.balance.saturating_add(message.value);
                    vec![]
                };
                transaction.out_messages = bounce.len();

                Ok((transaction, bounce))
            }
        }
    }

    /// Action phase: debits the values of the outgoing messages. Fails as a whole when the
    /// balance does not cover them.
    fn apply_actions(
        &mut self,
        address: &Address,
        inbound: u128,
        response: Response,
    ) -> std::result::Result<(Vec<InternalMessage>, Vec<Event>), ContractError> {
        let not_enough_balance =
            || ContractError::new(EXIT_CODE_NOT_ENOUGH_BALANCE, "not enough balance");

        let account = self
            .accounts
            .get_mut(address)
            .ok_or_else(not_enough_balance)?;

        let mut out = Vec::with_capacity(response.messages.len());
        for message in response.messages {
            let value = match message.value {
                SendValue::Amount(value) => value,
                SendValue::RemainingInbound => inbound,
                SendValue::AllBalance => account.balance,
            };

            account.balance = account
                .balance
                .checked_sub(value)
                .ok_or_else(not_enough_balance)?;

            out.push(InternalMessage {
                from: *address,
                to: message.to,
                value,
                body: message.body,
                bounce: message.bounce,
                bounced: false,
                init: message.init,
            });
        }

        Ok((out, response.events))
    }
}

fn first_word(body: &Cell) -> Option<u32> {
    (body.bit_len() >= 32)
        .then(|| body.parser().load_u32(32).ok())
        .flatten()
}

/// `0xFFFFFFFF` followed by the first 256 bits of the original body.
pub fn bounce_body(original: &Cell) -> std::result::Result<Cell, TonCellError> {
    let kept = original.bit_len().min(BOUNCED_BODY_BITS);
    let bits = original.parser().load_bits(kept)?;

    let mut builder = CellBuilder::new();
    builder.store_u32(32, BOUNCED_PREFIX)?;
    builder.store_bits(kept, &bits)?;
    builder.build()
}
