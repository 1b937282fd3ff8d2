use ton_utils::Address;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub mailbox: Address,
}
