//! Reducer composition utilities
//!
//! An application is assembled from independent slices. [`scope_reducer`]
//! focuses a slice reducer on its part of the application state and lifts the
//! effects it returns into the application action type, so the application
//! reducer only has to route actions.
//!
//! # Example
//!
//! ```
//! use stellar_burgers_core::composition::scope_reducer;
//! use stellar_burgers_core::effect::Effect;
//! use stellar_burgers_core::reducer::Reducer;
//! use stellar_burgers_core::SmallVec;
//!
//! #[derive(Default)]
//! struct CounterState {
//!     count: i32,
//! }
//!
//! enum CounterAction {
//!     Increment,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => state.count += 1,
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! #[derive(Default)]
//! struct AppState {
//!     counter: CounterState,
//! }
//!
//! enum AppAction {
//!     Counter(CounterAction),
//! }
//!
//! fn counter(state: &mut AppState) -> &mut CounterState {
//!     &mut state.counter
//! }
//!
//! let scoped = scope_reducer(CounterReducer, counter, AppAction::Counter);
//! let mut state = AppState::default();
//! let effects = scoped.reduce(&mut state, CounterAction::Increment, &());
//! assert_eq!(state.counter.count, 1);
//! assert!(effects.is_empty());
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Scopes a slice reducer to its part of a larger state.
///
/// # Type Parameters
///
/// - `S`: The parent state type
/// - `A`: The parent action type
/// - `R`: The slice reducer
///
/// # Arguments
///
/// - `reducer`: The slice reducer
/// - `state`: Accessor for the slice's state inside the parent state
/// - `embed`: Wraps a slice action into the parent action type (usually an enum variant)
pub const fn scope_reducer<S, A, R>(
    reducer: R,
    state: fn(&mut S) -> &mut R::State,
    embed: fn(R::Action) -> A,
) -> ScopedReducer<S, A, R>
where
    R: Reducer,
{
    ScopedReducer {
        reducer,
        state,
        embed,
    }
}

/// A slice reducer focused on part of a parent state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, A, R>
where
    R: Reducer,
{
    reducer: R,
    state: fn(&mut S) -> &mut R::State,
    embed: fn(R::Action) -> A,
}

impl<S, A, R> ScopedReducer<S, A, R>
where
    R: Reducer,
    R::Action: 'static,
    A: 'static,
{
    /// Run the slice reducer against its part of `parent` and lift its effects
    pub fn reduce(
        &self,
        parent: &mut S,
        action: R::Action,
        env: &R::Environment,
    ) -> SmallVec<[Effect<A>; 4]> {
        let embed = self.embed;
        self.reducer
            .reduce((self.state)(parent), action, env)
            .into_iter()
            .filter(|effect| !effect.is_none())
            .map(|effect| effect.map(embed))
            .collect()
    }
}

impl<S, A, R> Clone for ScopedReducer<S, A, R>
where
    R: Reducer + Clone,
{
    fn clone(&self) -> Self {
        Self {
            reducer: self.reducer.clone(),
            state: self.state,
            embed: self.embed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smallvec;

    #[derive(Clone, Default)]
    struct SubState {
        value: i32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum SubAction {
        Add(i32),
        Fetch,
        Fetched(i32),
    }

    struct SubReducer;

    impl Reducer for SubReducer {
        type State = SubState;
        type Action = SubAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                SubAction::Add(n) | SubAction::Fetched(n) => {
                    state.value += n;
                    smallvec![Effect::None]
                },
                SubAction::Fetch => {
                    smallvec![Effect::Future(Box::pin(async { Some(SubAction::Fetched(3)) }))]
                },
            }
        }
    }

    #[derive(Clone, Default)]
    struct ParentState {
        sub: SubState,
        other: String,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum ParentAction {
        Sub(SubAction),
    }

    fn sub(state: &mut ParentState) -> &mut SubState {
        &mut state.sub
    }

    #[test]
    fn scoped_reducer_touches_only_its_slice() {
        let scoped = scope_reducer(SubReducer, sub, ParentAction::Sub);

        let mut state = ParentState {
            sub: SubState { value: 5 },
            other: "test".to_string(),
        };

        let effects = scoped.reduce(&mut state, SubAction::Add(3), &());
        assert_eq!(state.sub.value, 8);
        assert_eq!(state.other, "test");
        assert!(effects.is_empty());
    }

    #[tokio::test]
    async fn scoped_reducer_lifts_feedback_actions() {
        let scoped = scope_reducer(SubReducer, sub, ParentAction::Sub);
        let mut state = ParentState::default();

        let mut effects = scoped.reduce(&mut state, SubAction::Fetch, &());
        assert_eq!(effects.len(), 1);

        let Some(Effect::Future(fut)) = effects.pop() else {
            unreachable!("fetch produces a future effect");
        };
        assert_eq!(fut.await, Some(ParentAction::Sub(SubAction::Fetched(3))));
    }
}
