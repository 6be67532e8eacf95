//! Declarative macros for ergonomic effect construction
//!
//! Nearly every effect in the client is "call the API, then report success or
//! failure back to the reducer". These macros remove the boilerplate of boxing
//! the future and mapping its result.

/// Create an `Effect::Future` from a fallible request
///
/// The request future must resolve to `Result<T, E>` where `E: Display`. On
/// success `on_success` receives the payload; on failure `on_error` receives the
/// error rendered as a `String`. Both branches produce the follow-up action.
///
/// # Example
///
/// ```rust,ignore
/// use stellar_burgers_core::request_effect;
///
/// let catalog = Arc::clone(&env.catalog);
/// request_effect! {
///     request: async move { catalog.fetch_ingredients().await },
///     on_success: |ingredients| CatalogAction::Loaded { ingredients },
///     on_error: |error| CatalogAction::LoadFailed { error }
/// }
/// ```
#[macro_export]
macro_rules! request_effect {
    (
        request: $request:expr,
        on_success: |$success_param:ident| $success_body:expr,
        on_error: |$error_param:ident| $error_body:expr
    ) => {
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move {
            match $request.await {
                ::std::result::Result::Ok($success_param) => ::std::option::Option::Some($success_body),
                ::std::result::Result::Err(error) => {
                    let $error_param: ::std::string::String = error.to_string();
                    ::std::option::Option::Some($error_body)
                },
            }
        }))
    };
}

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use stellar_burgers_core::async_effect;
///
/// async_effect! {
///     let outcome = auth.logout(token).await;
///     Some(SessionAction::LogoutFinished { error: outcome.err().map(|e| e.to_string()) })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}
