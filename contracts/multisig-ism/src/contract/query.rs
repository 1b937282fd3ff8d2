use error_stack::{report, Result, ResultExt};
use hyperlane_ton_api::checkpoint::CheckpointWithMessageId;
use hyperlane_ton_api::{Domain, ExitCode, Message, MultisigMetadata, Signature};
use itertools::Itertools;
use ton_utils::{Address, B256};
use tracing::warn;

use super::MultisigIsm;
use crate::state::ValidatorSet;

/// Number of distinct members of `set` that signed `digest`. Signatures that do not recover to a
/// member are skipped.
fn count_signers(set: &ValidatorSet, digest: &B256, signatures: &[Signature]) -> usize {
    signatures
        .iter()
        .filter_map(|signature| match signature.recover(digest) {
            Ok(signer) if set.contains(&signer) => Some(signer),
            Ok(signer) => {
                warn!(%signer, code = %ExitCode::WrongValidator, "signature from a non-validator");
                None
            }
            Err(err) => {
                warn!(%err, code = %ExitCode::from(err), "unusable signature");
                None
            }
        })
        .unique()
        .count()
}

impl MultisigIsm {
    /// Accepts iff enough validators of the origin domain signed the checkpoint committing the
    /// message.
    pub fn verify(&self, message: &Message, metadata: &MultisigMetadata) -> Result<(), ExitCode> {
        let set = self
            .validator_sets
            .get(&message.origin)
            .ok_or_else(|| report!(ExitCode::DomainValidatorsNotFound))
            .attach_printable_lazy(|| format!("origin domain {}", message.origin))?;

        let digest = CheckpointWithMessageId::new(
            message,
            metadata.origin_merkle_hook,
            metadata.root,
            metadata.index,
        )
        .eth_signed_hash();

        let signers = count_signers(set, &digest, &metadata.signatures);
        if signers < usize::from(set.threshold()) {
            return Err(report!(ExitCode::MessageVerificationFailed)).attach_printable(format!(
                "{signers} valid signatures, threshold {}",
                set.threshold()
            ));
        }

        Ok(())
    }

    pub fn validator_set(&self, domain: Domain) -> Option<&ValidatorSet> {
        self.validator_sets.get(&domain)
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }
}
