use hyperlane_ton_api::ExitCode;
use ton_utils::Address;

pub enum Event {
    SubHookFailed {
        request_id: u64,
        hook: Address,
        exit_code: ExitCode,
    },
}

impl From<Event> for ton_sandbox::Event {
    fn from(other: Event) -> Self {
        match other {
            Event::SubHookFailed {
                request_id,
                hook,
                exit_code,
            } => ton_sandbox::Event::new("sub_hook_failed")
                .add_attribute("request_id", request_id)
                .add_attribute("hook", hook)
                .add_attribute("exit_code", exit_code.code()),
        }
    }
}
