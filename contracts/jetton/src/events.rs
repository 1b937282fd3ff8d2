use ton_utils::Address;

pub enum Event {
    Minted {
        to: Address,
        amount: u128,
    },
    Burned {
        owner: Address,
        amount: u128,
    },
    AdminChanged {
        previous: Address,
        admin: Address,
    },
}

impl From<Event> for ton_sandbox::Event {
    fn from(other: Event) -> Self {
        match other {
            Event::Minted { to, amount } => ton_sandbox::Event::new("jetton_minted")
                .add_attribute("to", to)
                .add_attribute("amount", amount),
            Event::Burned { owner, amount } => ton_sandbox::Event::new("jetton_burned")
                .add_attribute("owner", owner)
                .add_attribute("amount", amount),
            Event::AdminChanged { previous, admin } => {
                ton_sandbox::Event::new("jetton_admin_changed")
                    .add_attribute("previous_admin", previous)
                    .add_attribute("admin", admin)
            }
        }
    }
}
