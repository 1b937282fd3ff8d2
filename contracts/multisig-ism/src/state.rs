use error_stack::{ensure, Result};
use hyperlane_ton_api::ExitCode;
use itertools::Itertools;
use ton_utils::B256;

/// Validators of one origin domain, as right-aligned ethereum addresses, and how many of them
/// must sign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorSet {
    validators: Vec<B256>,
    threshold: u8,
}

impl ValidatorSet {
    pub fn new(validators: Vec<B256>, threshold: u8) -> Result<Self, ExitCode> {
        ensure!(threshold > 0, ExitCode::WrongValidator);
        ensure!(
            usize::from(threshold) <= validators.len(),
            ExitCode::WrongValidator
        );
        ensure!(validators.iter().all_unique(), ExitCode::WrongValidator);

        Ok(Self {
            validators,
            threshold,
        })
    }

    pub fn validators(&self) -> &[B256] {
        &self.validators
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn contains(&self, validator: &B256) -> bool {
        self.validators.contains(validator)
    }
}
