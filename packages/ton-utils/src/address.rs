use std::fmt;
use std::str::FromStr;

use alloy_primitives::B256;
use tonlib_core::cell::{CellBuilder, CellParser, TonCellError};

use crate::{keccak256, CellParserExt, HASH_BITS};

const ADDR_NONE_TAG: u8 = 0b00;
const ADDR_STD_TAG: u8 = 0b10;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("address must have the form <workchain>:<64 hex characters>, got {0}")]
    Format(String),
    #[error("invalid workchain {0}")]
    Workchain(String),
    #[error("invalid account hash {0}")]
    Hash(String),
}

/// An internal account address (`addr_std` without anycast).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    pub workchain: i8,
    pub hash: B256,
}

impl Address {
    pub const BASECHAIN: i8 = 0;

    pub const fn new(workchain: i8, hash: B256) -> Self {
        Self { workchain, hash }
    }

    /// Basechain address whose account hash is the keccak hash of `seed`.
    pub fn derived(seed: impl AsRef<[u8]>) -> Self {
        Self::new(Self::BASECHAIN, keccak256(seed))
    }

    /// Basechain address of the account identified by a domain-agnostic 32-byte hash.
    pub const fn from_hash(hash: B256) -> Self {
        Self::new(Self::BASECHAIN, hash)
    }

    pub(crate) fn store<'a>(
        &self,
        builder: &'a mut CellBuilder,
    ) -> Result<&'a mut CellBuilder, TonCellError> {
        builder.store_u8(2, ADDR_STD_TAG)?;
        builder.store_bit(false)?;
        builder.store_u8(8, self.workchain as u8)?;
        builder.store_slice(self.hash.as_slice())
    }

    pub(crate) fn load(parser: &mut CellParser) -> Result<Option<Self>, TonCellError> {
        match parser.load_u8(2)? {
            ADDR_NONE_TAG => Ok(None),
            ADDR_STD_TAG => {
                if parser.load_bit()? {
                    return Err(TonCellError::InternalError(
                        "anycast addresses are not supported".to_string(),
                    ));
                }
                let workchain = parser.load_u8(8)? as i8;
                let hash = parser.load_hash256()?;
                Ok(Some(Self::new(workchain, hash)))
            }
            tag => Err(TonCellError::InternalError(format!(
                "unsupported address tag {tag:#04b}"
            ))),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.workchain, hex::encode(self.hash))
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (workchain, hash) = s
            .split_once(':')
            .ok_or_else(|| AddressParseError::Format(s.to_string()))?;

        let workchain = workchain
            .parse::<i8>()
            .map_err(|_| AddressParseError::Workchain(workchain.to_string()))?;

        let bytes = hex::decode(hash).map_err(|_| AddressParseError::Hash(hash.to_string()))?;
        if bytes.len() != HASH_BITS / 8 {
            return Err(AddressParseError::Hash(hash.to_string()));
        }

        Ok(Self::new(workchain, B256::from_slice(&bytes)))
    }
}
