//! Driver states

/// State of one integration call.
///
/// `Running` is the only non-terminal state. A soft failure keeps the
/// partial result and reports `success == false`; a hard failure surfaces as
/// an [`crate::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Succeeded,
    FailedSoft,
    FailedHard,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        self != Status::Running
    }
}
