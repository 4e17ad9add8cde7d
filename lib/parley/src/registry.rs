//! The built-in sender registry and free-standing execution helpers.

use std::any::Any;
use std::sync::{Arc, LazyLock};

use crate::{Auth, Executor, HyperClient, Query, RawClient, Result, SenderRegistry, Session};

/// A registry populated with the built-in transports.
///
/// | Client | Mode |
/// |--------|------|
/// | [`HyperClient`] | async |
/// | [`RawClient`] | async |
/// | `reqwest::Client` (feature `reqwest`) | async |
/// | `reqwest::blocking::Client` (feature `blocking`) | blocking |
///
/// The returned registry is owned: register more client types before
/// sharing it with executors.
#[must_use]
pub fn default_registry() -> SenderRegistry {
    let mut registry = SenderRegistry::new();
    registry
        .register_client::<HyperClient>()
        .register_client::<RawClient>();

    #[cfg(feature = "reqwest")]
    registry.register_async::<reqwest::Client, _>(crate::ReqwestSender);

    #[cfg(feature = "blocking")]
    registry.register::<reqwest::blocking::Client, _>(crate::ReqwestBlockingSender);

    registry
}

static SHARED: LazyLock<Arc<SenderRegistry>> = LazyLock::new(|| Arc::new(default_registry()));

/// The process-wide instance of [`default_registry`], built on first use.
#[must_use]
pub fn shared_registry() -> Arc<SenderRegistry> {
    Arc::clone(&SHARED)
}

/// An [`Executor`] for `client` backed by [`shared_registry`].
///
/// # Example
///
/// ```no_run
/// use parley::{Auth, RawClient, Request, query};
///
/// # async fn run() -> parley::Result<()> {
/// let github = parley::executor(RawClient::new()).with_auth(("user", "token"));
/// let response = github.execute_async(&query::request(Request::get("https://api.github.com/user"))).await?;
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn executor<C>(client: C) -> Executor<C> {
    Executor::new(shared_registry(), client)
}

/// Execute a query once with `client`, using [`shared_registry`].
///
/// `auth` is an [`Auth`] or a `(username, password)` tuple.
///
/// # Errors
///
/// Returns [`crate::Error::UnsupportedClient`] if no blocking sender is
/// registered for `C`, and otherwise any error raised by the query.
pub fn execute<Q, C>(query: &Q, auth: impl Into<Auth>, client: &C) -> Result<Q::Output>
where
    Q: Query + ?Sized,
    C: Any,
{
    let registry = shared_registry();
    let auth = auth.into();
    query.execute(&Session::new(&registry, client, &auth))
}

/// Execute a query once with `client` and its asynchronous sender, using
/// [`shared_registry`].
///
/// # Errors
///
/// Returns [`crate::Error::UnsupportedClient`] if no asynchronous sender is
/// registered for `C`, and otherwise any error raised by the query.
pub async fn execute_async<Q, C>(query: &Q, auth: impl Into<Auth>, client: &C) -> Result<Q::Output>
where
    Q: Query + Sync + ?Sized,
    Q::Exchange: Send,
    Q::Output: Send,
    C: Any + Send + Sync,
{
    let registry = shared_registry();
    let auth = auth.into();
    query.execute_async(&Session::new(&registry, client, &auth)).await
}
