use hyperlane_ton_api::{Domain, ExitCode};
use ton_utils::{Address, B256, U256};

pub enum Event {
    RouterSet {
        domain: Domain,
        router: B256,
    },
    IsmSet {
        ism: Option<Address>,
    },
    SentTransferRemote {
        destination: Domain,
        recipient: B256,
        amount: U256,
    },
    ReceivedTransferRemote {
        origin: Domain,
        recipient: Address,
        amount: U256,
    },
    TransferRefunded {
        sender: Address,
        amount: u128,
        reason: ExitCode,
    },
}

impl From<Event> for ton_sandbox::Event {
    fn from(other: Event) -> Self {
        match other {
            Event::RouterSet { domain, router } => ton_sandbox::Event::new("router_set")
                .add_attribute("domain", domain)
                .add_attribute("router", router),
            Event::IsmSet { ism } => ton_sandbox::Event::new("ism_set").add_attribute(
                "ism",
                ism.map_or_else(|| "default".to_string(), |ism| ism.to_string()),
            ),
            Event::SentTransferRemote {
                destination,
                recipient,
                amount,
            } => ton_sandbox::Event::new("sent_transfer_remote")
                .add_attribute("destination", destination)
                .add_attribute("recipient", recipient)
                .add_attribute("amount", amount),
            Event::ReceivedTransferRemote {
                origin,
                recipient,
                amount,
            } => ton_sandbox::Event::new("received_transfer_remote")
                .add_attribute("origin", origin)
                .add_attribute("recipient", recipient)
                .add_attribute("amount", amount),
            Event::TransferRefunded {
                sender,
                amount,
                reason,
            } => ton_sandbox::Event::new("transfer_refunded")
                .add_attribute("sender", sender)
                .add_attribute("amount", amount)
                .add_attribute("reason", reason.code()),
        }
    }
}
