use ton_utils::B256;

pub enum Event {
    ValidatorAnnouncement {
        validator: B256,
        storage_location: String,
    },
}

impl From<Event> for ton_sandbox::Event {
    fn from(other: Event) -> Self {
        match other {
            Event::ValidatorAnnouncement {
                validator,
                storage_location,
            } => ton_sandbox::Event::new("validator_announcement")
                .add_attribute("validator", validator)
                .add_attribute("storage_location", storage_location),
        }
    }
}
