//! # Stellar Burgers Testing
//!
//! Testing utilities and helpers for the Stellar Burgers client state machine.
//!
//! This crate provides:
//! - Deterministic implementations of the core environment traits
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - [`collect_actions`], which drives effect futures to completion so a test
//!   can assert on the follow-up actions without a running `Store`
//!
//! ## Example
//!
//! ```ignore
//! use stellar_burgers_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new(DraftReducer::new())
//!     .with_env(test_environment())
//!     .given_state(DraftState::default())
//!     .when_action(DraftAction::AddIngredient { ingredient: bun("B", 10) })
//!     .then_state(|state| assert!(state.bun.is_some()))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

pub mod effects;

use chrono::{DateTime, Utc};
use stellar_burgers_core::environment::{Clock, IdGenerator};

/// Deterministic implementations of the core environment traits
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use stellar_burgers_testing::mocks::FixedClock;
    /// use stellar_burgers_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when a test advances it
    ///
    /// Used to expire short-lived credentials without sleeping.
    #[derive(Debug)]
    pub struct ManualClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        /// Create a clock stopped at `time`
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(time),
            }
        }

        /// Move the clock forward
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self
                .time
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            *time += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self
                .time
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
        }
    }

    /// Id generator yielding `"<prefix>-1"`, `"<prefix>-2"`, ...
    #[derive(Debug)]
    pub struct SequentialIds {
        prefix: String,
        next: AtomicU64,
    }

    impl SequentialIds {
        /// Create a generator whose ids start with `prefix`
        #[must_use]
        pub fn new(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
                next: AtomicU64::new(1),
            }
        }
    }

    impl Default for SequentialIds {
        fn default() -> Self {
            Self::new("id")
        }
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            format!("{}-{n}", self.prefix)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_time())
    }

    /// The instant every test clock starts at (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_time() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default()
    }
}

// Re-export commonly used items
pub use effects::collect_actions;
pub use mocks::{FixedClock, ManualClock, SequentialIds, test_clock, test_time};
pub use reducer_test::{ReducerTest, assertions};
