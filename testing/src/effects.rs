//! Driving effects without a `Store`
//!
//! Reducer unit tests usually stop at "the reducer returned a future effect".
//! [`collect_actions`] goes one step further: it runs those futures against the
//! test environment's fakes and returns the follow-up actions, so a test can
//! feed them back through the reducer and assert on the final state.

use futures::future::BoxFuture;
use stellar_burgers_core::effect::Effect;

/// Run every effect to completion and collect the actions they produce
///
/// `Parallel` children are run one after another; ordering between
/// independent requests is not significant for the slices under test.
///
/// # Example
///
/// ```
/// use stellar_burgers_core::effect::Effect;
/// use stellar_burgers_testing::collect_actions;
///
/// # tokio_test::block_on(async {
/// let effects = vec![
///     Effect::None,
///     Effect::Future(Box::pin(async { Some(1) })),
///     Effect::Future(Box::pin(async { None })),
/// ];
/// assert_eq!(collect_actions(effects).await, vec![1]);
/// # });
/// ```
pub async fn collect_actions<A, I>(effects: I) -> Vec<A>
where
    A: Send + 'static,
    I: IntoIterator<Item = Effect<A>>,
{
    let mut actions = Vec::new();
    for effect in effects {
        run(effect, &mut actions).await;
    }
    actions
}

fn run<A>(effect: Effect<A>, actions: &mut Vec<A>) -> BoxFuture<'_, ()>
where
    A: Send + 'static,
{
    Box::pin(async move {
        match effect {
            Effect::None => {},
            Effect::Future(fut) => {
                if let Some(action) = fut.await {
                    actions.push(action);
                }
            },
            Effect::Parallel(effects) => {
                for effect in effects {
                    run(effect, actions).await;
                }
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn nested_parallel_effects_are_flattened() {
        let effects = vec![Effect::merge(vec![
            Effect::Future(Box::pin(async { Some("a") })),
            Effect::merge(vec![Effect::Future(Box::pin(async { Some("b") }))]),
        ])];

        assert_eq!(collect_actions(effects).await, vec!["a", "b"]);
    }
}
