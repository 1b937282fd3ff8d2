use hyperlane_ton_api::checkpoint::{announcement_digest, eth_address, CheckpointWithMessageId};
use hyperlane_ton_api::msg::Announce;
use hyperlane_ton_api::{Domain, Message, MultisigMetadata, Signature};
use error_stack::{Report, Result, ResultExt};
use k256::ecdsa::SigningKey;
use ton_utils::{Address, B256};

use crate::config::DomainValidators;
use crate::contract::Error;

/// An off-chain validator signing checkpoints of its origin chain.
#[derive(Clone, Debug)]
pub struct Validator {
    key: SigningKey,
}

impl Validator {
    pub fn random() -> Self {
        Self {
            key: SigningKey::random(&mut rand::thread_rng()),
        }
    }

    pub fn address(&self) -> B256 {
        eth_address(self.key.verifying_key())
    }

    /// Signs the checkpoint committing `message` at `index` under `root`.
    pub fn sign_checkpoint(
        &self,
        message: &Message,
        origin_merkle_hook: B256,
        root: B256,
        index: u32,
    ) -> Result<Signature, Error> {
        let digest =
            CheckpointWithMessageId::new(message, origin_merkle_hook, root, index).eth_signed_hash();

        self.sign(&digest)
    }

    pub fn announce(
        &self,
        local_domain: Domain,
        mailbox: &Address,
        storage_location: &str,
    ) -> Result<Announce, Error> {
        let digest = announcement_digest(local_domain, mailbox, storage_location);

        Ok(Announce {
            validator: self.address(),
            storage_location: storage_location.to_string(),
            signature: self.sign(&digest)?,
        })
    }

    fn sign(&self, digest: &B256) -> Result<Signature, Error> {
        Signature::sign(&self.key, digest)
            .map_err(Report::from)
            .change_context(Error::Sign)
    }
}

/// `count` fresh validators with the config entry that trusts them for `domain`.
pub fn validator_set(domain: Domain, count: usize, threshold: u8) -> (Vec<Validator>, DomainValidators) {
    let validators = (0..count).map(|_| Validator::random()).collect::<Vec<_>>();
    let config = DomainValidators {
        domain,
        threshold,
        validators: validators.iter().map(Validator::address).collect(),
    };

    (validators, config)
}

/// Multisig proof for `message` at `index`, signed by `signers` in order.
pub fn multisig_metadata(
    message: &Message,
    signers: &[&Validator],
    origin_merkle_hook: B256,
    root: B256,
    index: u32,
) -> Result<MultisigMetadata, Error> {
    let signatures = signers
        .iter()
        .map(|validator| validator.sign_checkpoint(message, origin_merkle_hook, root, index))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MultisigMetadata {
        origin_merkle_hook,
        root,
        index,
        signatures,
    })
}
