#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed {0} cell")]
    Malformed(&'static str),
    #[error("expected operation {expected:#010x}, got {actual:#010x}")]
    UnexpectedOp { expected: u32, actual: u32 },
    #[error("unknown exit code {0}")]
    UnknownExitCode(u16),
    #[error("body is not a bounced message")]
    NotBounced,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("failed to encode {0}")]
    Cell(&'static str),
    #[error("{value} is out of range for {field}")]
    OutOfRange { field: &'static str, value: String },
    #[error("duplicate dictionary key {0}")]
    DuplicateKey(String),
}
