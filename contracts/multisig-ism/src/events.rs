use hyperlane_ton_api::Domain;
use itertools::Itertools;
use ton_utils::B256;

pub enum Event {
    ValidatorsAndThresholdSet {
        domain: Domain,
        threshold: u8,
        validators: Vec<B256>,
    },
}

impl From<Event> for ton_sandbox::Event {
    fn from(other: Event) -> Self {
        match other {
            Event::ValidatorsAndThresholdSet {
                domain,
                threshold,
                validators,
            } => ton_sandbox::Event::new("validators_and_threshold_set")
                .add_attribute("domain", domain)
                .add_attribute("threshold", threshold)
                .add_attribute(
                    "validators",
                    validators.iter().map(ToString::to_string).join(","),
                ),
        }
    }
}
