use hyperlane_ton_api::ExitCode;

/// Progress of one post-dispatch across the sub-hooks. At most one sub-hook call is outstanding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FanOut {
    Idle,
    AwaitingHook(usize),
    Done,
    Failed(ExitCode),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Start,
    HookSucceeded,
    HookFailed(ExitCode),
}

impl FanOut {
    /// Next state over `hooks` sub-hooks, or `None` if `input` cannot happen in this state.
    pub fn next(self, hooks: usize, input: Input) -> Option<FanOut> {
        match (self, input) {
            (FanOut::Idle, Input::Start) => Some(Self::first_pending(0, hooks)),
            (FanOut::AwaitingHook(index), Input::HookSucceeded) => {
                index.checked_add(1).map(|next| Self::first_pending(next, hooks))
            }
            (FanOut::AwaitingHook(_), Input::HookFailed(code)) => Some(FanOut::Failed(code)),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, FanOut::Done | FanOut::Failed(_))
    }

    fn first_pending(index: usize, hooks: usize) -> FanOut {
        if index < hooks {
            FanOut::AwaitingHook(index)
        } else {
            FanOut::Done
        }
    }
}
