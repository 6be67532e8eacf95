//! Request lifecycle tracking.
//!
//! Every slice that calls the remote API tracks the call with the same three
//! fields: the last payload, whether a call is in flight, and the last failure
//! message. [`RequestState`] owns those fields and the transitions between them:
//!
//! ```text
//!            start()                 succeed(data) / resolve(data)
//!   idle ─────────────▶ loading ───────────────────────────────▶ data, no error
//!                          │
//!                          │ fail(message)
//!                          ▼
//!                    error, no data
//! ```
//!
//! `data` and `error` are never populated at the same time.

use serde::{Deserialize, Serialize};

/// Lifecycle of one asynchronous request slot
///
/// # Example
///
/// ```
/// use stellar_burgers_core::request::RequestState;
///
/// let mut slot = RequestState::<u32>::default();
/// slot.start();
/// assert!(slot.is_loading);
///
/// slot.succeed(42);
/// assert_eq!(slot.data, Some(42));
/// assert!(!slot.is_loading);
/// assert!(slot.error.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestState<T> {
    /// Payload of the last successful request
    pub data: Option<T>,
    /// Whether a request is currently in flight
    pub is_loading: bool,
    /// Message of the last failed request
    pub error: Option<String>,
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }
}

impl<T> RequestState<T> {
    /// Mark a request as started
    ///
    /// Previous data and error are kept until the request completes.
    pub fn start(&mut self) {
        self.is_loading = true;
    }

    /// Record a successful response
    pub fn succeed(&mut self, data: T) {
        self.resolve(Some(data));
    }

    /// Record a successful response that may carry no payload
    ///
    /// The slot is overwritten wholesale: a `None` payload clears any previous data.
    pub fn resolve(&mut self, data: Option<T>) {
        self.data = data;
        self.is_loading = false;
        self.error = None;
    }

    /// Record a failed response
    pub fn fail(&mut self, message: impl Into<String>) {
        self.data = None;
        self.is_loading = false;
        self.error = Some(message.into());
    }

    /// Drop the payload and the loading flag, keeping the last error
    pub fn discard(&mut self) {
        self.data = None;
        self.is_loading = false;
    }

    /// Borrow the payload of the last successful request
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Borrow the message of the last failed request
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn failure_replaces_data() {
        let mut slot = RequestState::default();
        slot.succeed(vec![1, 2, 3]);
        slot.start();
        assert!(slot.is_loading);
        assert_eq!(slot.data(), Some(&vec![1, 2, 3]));

        slot.fail("Network error");
        assert!(!slot.is_loading);
        assert!(slot.data().is_none());
        assert_eq!(slot.error(), Some("Network error"));
    }

    #[test]
    fn success_clears_previous_error() {
        let mut slot = RequestState::default();
        slot.fail("boom");
        slot.start();
        slot.succeed(1);
        assert_eq!(slot.data(), Some(&1));
        assert!(slot.error().is_none());
    }

    #[test]
    fn discard_keeps_error() {
        let mut slot: RequestState<u8> = RequestState::default();
        slot.fail("boom");
        slot.start();
        slot.discard();
        assert!(!slot.is_loading);
        assert_eq!(slot.error(), Some("boom"));
    }

    #[derive(Clone, Debug)]
    enum Step {
        Start,
        Succeed(u8),
        Fail,
        Discard,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            Just(Step::Start),
            any::<u8>().prop_map(Step::Succeed),
            Just(Step::Fail),
            Just(Step::Discard),
        ]
    }

    proptest! {
        #[test]
        fn data_and_error_never_coexist(steps in proptest::collection::vec(step(), 0..32)) {
            let mut slot = RequestState::default();
            for step in steps {
                match step {
                    Step::Start => slot.start(),
                    Step::Succeed(value) => slot.succeed(value),
                    Step::Fail => slot.fail("failed"),
                    Step::Discard => slot.discard(),
                }
                prop_assert!(!(slot.data.is_some() && slot.error.is_some()));
            }
        }
    }
}
