use hyperlane_ton_api::Domain;
use ton_utils::{Address, B256};

pub enum Event {
    Dispatch {
        sender: Address,
        destination: Domain,
        recipient: B256,
        /// BoC hex of the committed message.
        message: String,
    },
    DispatchId {
        message_id: B256,
    },
    Process {
        origin: Domain,
        sender: B256,
        recipient: B256,
    },
    ProcessId {
        message_id: B256,
    },
    DefaultIsmSet {
        ism: Address,
    },
    DefaultHookSet {
        hook: Address,
    },
    RequiredHookSet {
        hook: Address,
    },
}

impl From<Event> for ton_sandbox::Event {
    fn from(other: Event) -> Self {
        match other {
            Event::Dispatch {
                sender,
                destination,
                recipient,
                message,
            } => ton_sandbox::Event::new("dispatch")
                .add_attribute("sender", sender)
                .add_attribute("destination", destination)
                .add_attribute("recipient", recipient)
                .add_attribute("message", message),
            Event::DispatchId { message_id } => {
                ton_sandbox::Event::new("dispatch_id").add_attribute("message_id", message_id)
            }
            Event::Process {
                origin,
                sender,
                recipient,
            } => ton_sandbox::Event::new("process")
                .add_attribute("origin", origin)
                .add_attribute("sender", sender)
                .add_attribute("recipient", recipient),
            Event::ProcessId { message_id } => {
                ton_sandbox::Event::new("process_id").add_attribute("message_id", message_id)
            }
            Event::DefaultIsmSet { ism } => {
                ton_sandbox::Event::new("default_ism_set").add_attribute("ism", ism)
            }
            Event::DefaultHookSet { hook } => {
                ton_sandbox::Event::new("default_hook_set").add_attribute("hook", hook)
            }
            Event::RequiredHookSet { hook } => {
                ton_sandbox::Event::new("required_hook_set").add_attribute("hook", hook)
            }
        }
    }
}
