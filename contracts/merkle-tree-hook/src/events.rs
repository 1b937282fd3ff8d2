use ton_utils::{Address, B256};

pub enum Event {
    InsertedIntoTree { message_id: B256, index: u32 },
    HookAuthorized { hook: Address },
    HookUnauthorized { hook: Address },
}

impl From<Event> for ton_sandbox::Event {
    fn from(other: Event) -> Self {
        match other {
            Event::InsertedIntoTree { message_id, index } => {
                ton_sandbox::Event::new("inserted_into_tree")
                    .add_attribute("message_id", message_id)
                    .add_attribute("index", index)
            }
            Event::HookAuthorized { hook } => {
                ton_sandbox::Event::new("hook_authorized").add_attribute("hook", hook)
            }
            Event::HookUnauthorized { hook } => {
                ton_sandbox::Event::new("hook_unauthorized").add_attribute("hook", hook)
            }
        }
    }
}
