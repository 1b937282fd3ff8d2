use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use ton_utils::{keccak256, Address, B256};

use crate::primitives::{Domain, Message, Signature};
use crate::ExitCode;

const DOMAIN_SEPARATOR: &[u8] = b"HYPERLANE";
const ANNOUNCEMENT_SEPARATOR: &[u8] = b"HYPERLANE_ANNOUNCEMENT";
const ETH_SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";
/// An ethereum address is the low 20 bytes of the key hash.
const ETH_ADDRESS_OFFSET: usize = 12;

/// Separates checkpoints of different origin merkle hooks and domains.
pub fn domain_hash(origin: Domain, origin_merkle_hook: &B256) -> B256 {
    keccak256(
        [
            origin.to_be_bytes().as_slice(),
            origin_merkle_hook.as_slice(),
            DOMAIN_SEPARATOR,
        ]
        .concat(),
    )
}

pub fn to_eth_signed_message_hash(digest: &B256) -> B256 {
    keccak256([ETH_SIGNED_MESSAGE_PREFIX, digest.as_slice()].concat())
}

/// The unit validators sign over: a message committed at `index` under `root`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckpointWithMessageId {
    pub origin: Domain,
    pub origin_merkle_hook: B256,
    pub root: B256,
    pub index: u32,
    pub message_id: B256,
}

impl CheckpointWithMessageId {
    pub fn new(message: &Message, origin_merkle_hook: B256, root: B256, index: u32) -> Self {
        Self {
            origin: message.origin,
            origin_merkle_hook,
            root,
            index,
            message_id: message.id(),
        }
    }

    pub fn signing_hash(&self) -> B256 {
        keccak256(
            [
                domain_hash(self.origin, &self.origin_merkle_hook).as_slice(),
                self.root.as_slice(),
                self.index.to_be_bytes().as_slice(),
                self.message_id.as_slice(),
            ]
            .concat(),
        )
    }

    pub fn eth_signed_hash(&self) -> B256 {
        to_eth_signed_message_hash(&self.signing_hash())
    }
}

/// Digest a validator signs to announce where it publishes its signatures.
pub fn announcement_digest(local_domain: Domain, mailbox: &Address, storage_location: &str) -> B256 {
    let domain = keccak256(
        [
            local_domain.to_be_bytes().as_slice(),
            mailbox.hash.as_slice(),
            ANNOUNCEMENT_SEPARATOR,
        ]
        .concat(),
    );

    to_eth_signed_message_hash(&keccak256(
        [domain.as_slice(), storage_location.as_bytes()].concat(),
    ))
}

/// Why a signature did not yield a validator.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("recovery byte {0} is neither 27/28 nor 0/1")]
    InvalidRecoveryByte(u8),
    #[error("failed to recover public key")]
    Unrecoverable,
}

impl From<RecoveryError> for ExitCode {
    fn from(err: RecoveryError) -> Self {
        match err {
            RecoveryError::InvalidRecoveryByte(_) => ExitCode::WrongSignature,
            RecoveryError::Unrecoverable => ExitCode::PubkeyRecovery,
        }
    }
}

/// Ethereum address of a public key, right-aligned in a 256-bit word.
pub fn eth_address(key: &VerifyingKey) -> B256 {
    let encoded = key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut word = B256::ZERO;
    word[ETH_ADDRESS_OFFSET..].copy_from_slice(&hash[ETH_ADDRESS_OFFSET..]);
    word
}

impl Signature {
    /// Recovers the signer of `prehash` as an ethereum address word.
    pub fn recover(&self, prehash: &B256) -> Result<B256, RecoveryError> {
        let v = match self.v {
            27 | 28 => self.v.wrapping_sub(27),
            0 | 1 => self.v,
            other => return Err(RecoveryError::InvalidRecoveryByte(other)),
        };
        let recovery_id = RecoveryId::from_byte(v).ok_or(RecoveryError::InvalidRecoveryByte(self.v))?;

        let signature = EcdsaSignature::from_scalars(self.r.0, self.s.0)
            .map_err(|_| RecoveryError::Unrecoverable)?;

        VerifyingKey::recover_from_prehash(prehash.as_slice(), &signature, recovery_id)
            .map(|key| eth_address(&key))
            .map_err(|_| RecoveryError::Unrecoverable)
    }

    /// Signs `prehash` with `key`, producing the `v ∈ {27, 28}` form validators publish.
    pub fn sign(key: &SigningKey, prehash: &B256) -> Result<Self, RecoveryError> {
        let (signature, recovery_id) = key
            .sign_prehash_recoverable(prehash.as_slice())
            .map_err(|_| RecoveryError::Unrecoverable)?;

        let (r, s) = signature.split_bytes();
        Ok(Signature {
            v: recovery_id.to_byte().wrapping_add(27),
            r: B256::from_slice(r.as_slice()),
            s: B256::from_slice(s.as_slice()),
        })
    }
}
