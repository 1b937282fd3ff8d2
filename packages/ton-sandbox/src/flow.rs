use std::fmt;

use error_stack::{bail, Result};
use itertools::Itertools;
use ton_utils::Address;
use typed_builder::TypedBuilder;

use crate::blockchain::Transaction;
use crate::contract::Event;

/// Partial description of a transaction; unset fields match anything.
#[derive(Clone, Debug, Default, PartialEq, Eq, TypedBuilder)]
pub struct TxPattern {
    #[builder(default, setter(strip_option))]
    pub from: Option<Address>,
    #[builder(default, setter(strip_option))]
    pub to: Option<Address>,
    #[builder(default, setter(strip_option))]
    pub op: Option<u32>,
    #[builder(default, setter(strip_option))]
    pub value: Option<u128>,
    #[builder(default, setter(strip_option))]
    pub success: Option<bool>,
    #[builder(default, setter(strip_option))]
    pub exit_code: Option<i32>,
    #[builder(default, setter(strip_option))]
    pub deploy: Option<bool>,
    #[builder(default, setter(strip_option))]
    pub bounced: Option<bool>,
}

impl TxPattern {
    pub fn matches(&self, tx: &Transaction) -> bool {
        fn field<T: PartialEq>(expected: &Option<T>, actual: &T) -> bool {
            expected.as_ref().map_or(true, |expected| expected == actual)
        }

        field(&self.from, &tx.from)
            && field(&self.to, &tx.to)
            && self.op.map_or(true, |op| tx.op == Some(op))
            && field(&self.value, &tx.value)
            && field(&self.success, &tx.success)
            && field(&self.exit_code, &tx.exit_code)
            && field(&self.deploy, &tx.deployed)
            && field(&self.bounced, &tx.bounced)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FlowError {
    #[error("no transaction matches pattern #{index} {pattern:?} after the previous match")]
    Missing { index: usize, pattern: TxPattern },
}

/// Every transaction caused by one external send, in processing order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendResult {
    pub transactions: Vec<Transaction>,
}

impl SendResult {
    pub(crate) fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub fn has_transaction(&self, pattern: &TxPattern) -> bool {
        self.transactions.iter().any(|tx| pattern.matches(tx))
    }

    pub fn find(&self, pattern: &TxPattern) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| pattern.matches(tx))
    }

    /// Checks that the patterns match transactions in the given order, allowing unrelated
    /// transactions in between.
    pub fn expect_transaction_flow(&self, patterns: &[TxPattern]) -> Result<(), FlowError> {
        let mut remaining = self.transactions.iter();

        for (index, pattern) in patterns.iter().enumerate() {
            if !remaining.any(|tx| pattern.matches(tx)) {
                bail!(FlowError::Missing {
                    index,
                    pattern: pattern.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.transactions.iter().flat_map(|tx| tx.events.iter())
    }

    pub fn all_succeeded(&self) -> bool {
        self.transactions.iter().all(|tx| tx.success)
    }
}

impl fmt::Display for SendResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self.transactions.iter().map(|tx| {
            format!(
                "#{} {} -> {} op={} value={} exit={}{}{}",
                tx.lt,
                tx.from,
                tx.to,
                tx.op.map_or("-".to_string(), |op| format!("{op:#010x}")),
                tx.value,
                tx.exit_code,
                if tx.deployed { " deployed" } else { "" },
                if tx.bounced { " bounced" } else { "" },
            )
        });

        write!(f, "{}", lines.format("\n"))
    }
}
