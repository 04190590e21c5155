//! The control protocol shared by every interceptor hook.

use std::time::Duration;

/// Verdict returned by an interceptor hook.
///
/// Every hook answers the same question: what should the pipeline do next?
/// The three answers cover the whole protocol. `Proceed` keeps the normal
/// flow (and is what the default hook implementations return), `Retry`
/// schedules another attempt after the carried delay, and `Done` finishes
/// the call without (or instead of) invoking further.
///
/// What `Done` returns depends on where it is observed: before the first
/// attempt or after a failure it completes the call with the method's
/// default value; after a success it completes with the real result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    /// Continue with the default flow.
    Proceed,
    /// Invoke (or re-invoke) after pausing for the given delay.
    Retry(Duration),
    /// Finish the call here.
    Done,
}

impl Advice {
    /// Returns the pending delay, if this advice schedules an attempt.
    pub fn delay(self) -> Option<Duration> {
        match self {
            Advice::Retry(delay) => Some(delay),
            Advice::Proceed | Advice::Done => None,
        }
    }

    /// Returns true if this advice schedules another attempt.
    pub fn is_retry(self) -> bool {
        matches!(self, Advice::Retry(_))
    }

    /// Returns true if this advice finishes the call.
    pub fn is_done(self) -> bool {
        matches!(self, Advice::Done)
    }
}
