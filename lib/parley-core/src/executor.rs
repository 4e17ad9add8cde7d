//! Query execution.
//!
//! An [`Executor`] binds a [`SenderRegistry`], a client and an [`Auth`]
//! strategy. Executing a query drives its exchange: every request the
//! exchange emits is authenticated, dispatched through the sender registered
//! for the client's type, and the response is fed back until the exchange
//! completes.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use parley_core::exchange;
//! use parley_core::{Executor, Request, Response, SenderRegistry, query};
//!
//! struct Canned;
//!
//! let registry = SenderRegistry::new().with(|_: &Canned, request: Request| {
//!     let user = request.header("Authorization").unwrap_or("anonymous").to_string();
//!     Ok(Response::new(200).with_body(user))
//! });
//!
//! let whoami = query::from_fn(|| {
//!     exchange::once(Request::get("https://example.com/me"), |response: Response| response.text())
//! });
//!
//! let executor = Executor::new(Arc::new(registry), Canned).with_auth(("user", "pw"));
//! assert_eq!(executor.execute(&whoami).expect("executes"), "Basic dXNlcjpwdw==");
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tracing::trace;

use crate::exchange::{self, Exchange, Step};
use crate::pagination::{AsyncPaginator, Pagelike, Paginator};
use crate::{Auth, Query, Request, Response, Result, SenderRegistry};

/// Everything a query needs to run once: the registry, the client and the
/// authentication strategy.
///
/// Queries overriding [`Query::execute`] receive a session to access the
/// transport directly.
pub struct Session<'a, C> {
    registry: &'a SenderRegistry,
    client: &'a C,
    auth: &'a Auth,
}

impl<C> Clone for Session<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Session<'_, C> {}

impl<C> fmt::Debug for Session<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("registry", self.registry)
            .field("client", &std::any::type_name::<C>())
            .field("auth", self.auth)
            .finish()
    }
}

impl<'a, C> Session<'a, C> {
    /// Assemble a session.
    #[must_use]
    pub const fn new(registry: &'a SenderRegistry, client: &'a C, auth: &'a Auth) -> Self {
        Self {
            registry,
            client,
            auth,
        }
    }

    /// The client.
    #[must_use]
    pub const fn client(&self) -> &'a C {
        self.client
    }

    /// The authentication strategy.
    #[must_use]
    pub const fn auth(&self) -> &'a Auth {
        self.auth
    }

    /// The sender registry.
    #[must_use]
    pub const fn registry(&self) -> &'a SenderRegistry {
        self.registry
    }

    /// Apply the authentication strategy to a request.
    #[must_use]
    pub fn authenticate(&self, request: Request) -> Request {
        self.auth.apply(request)
    }
}

impl<'a, C: Any> Session<'a, C> {
    /// Authenticate and send one request with the blocking sender of `C`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnsupportedClient`] if no blocking sender is
    /// registered for `C`, otherwise the sender's error.
    pub fn send(&self, request: Request) -> Result<Response> {
        self.registry.send(self.client, self.authenticate(request))
    }

    /// Drive an exchange to completion with the blocking sender of `C`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Protocol`] if the exchange completes without
    /// sending a request, and propagates exchange and transport errors.
    pub fn run<E>(&self, exchange: E) -> Result<E::Output>
    where
        E: Exchange<Request = Request, Response = Response>,
    {
        exchange::drive(exchange, |request| {
            trace!(method = %request.method(), url = request.url(), "exchange yielded request");
            self.send(request)
        })
    }

    /// Execute a query within this session.
    ///
    /// # Errors
    ///
    /// Returns any error of the query execution.
    pub fn execute<Q: Query + ?Sized>(&self, query: &Q) -> Result<Q::Output> {
        query.execute(self)
    }

    /// Iterate over the pages of a paginated query.
    pub fn paginate<Q>(self, query: &'a Q) -> Paginator<'a, Q, C>
    where
        Q: Query,
        Q::Output: Pagelike,
    {
        Paginator::new(self, query)
    }
}

impl<'a, C: Any + Send + Sync> Session<'a, C> {
    /// Authenticate and send one request with the asynchronous sender of `C`.
    ///
    /// The returned future fails with [`crate::Error::UnsupportedClient`] if
    /// no asynchronous sender is registered for `C`.
    pub fn send_async(&self, request: Request) -> BoxFuture<'a, Result<Response>> {
        self.registry.send_async(self.client, self.authenticate(request))
    }

    /// Drive an exchange to completion with the asynchronous sender of `C`.
    ///
    /// The future suspends only while a request is in flight. Dropping it
    /// cancels the outstanding request and discards the exchange.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Protocol`] if the exchange completes without
    /// sending a request, and propagates exchange and transport errors.
    pub async fn run_async<E>(&self, mut exchange: E) -> Result<E::Output>
    where
        E: Exchange<Request = Request, Response = Response>,
    {
        let mut request = match exchange.start()? {
            Step::Send(request) => request,
            Step::Done(_) => return Err(exchange::not_started()),
        };
        loop {
            trace!(method = %request.method(), url = request.url(), "exchange yielded request");
            let response = self.send_async(request).await?;
            match exchange.resume(response)? {
                Step::Send(next) => request = next,
                Step::Done(value) => return Ok(value),
            }
        }
    }

    /// Iterate asynchronously over the pages of a paginated query.
    pub fn paginate_async<Q>(self, query: &'a Q) -> AsyncPaginator<'a, Q, C>
    where
        Q: Query,
        Q::Output: Pagelike,
    {
        AsyncPaginator::new(self, query)
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Executes queries with a client, a sender registry and an [`Auth`].
#[derive(Debug, Clone)]
pub struct Executor<C> {
    registry: Arc<SenderRegistry>,
    client: C,
    auth: Auth,
}

impl<C> Executor<C> {
    /// An executor without authentication.
    #[must_use]
    pub fn new(registry: Arc<SenderRegistry>, client: C) -> Self {
        Self {
            registry,
            client,
            auth: Auth::None,
        }
    }

    /// Replace the authentication strategy.
    ///
    /// Accepts an [`Auth`] or a `(username, password)` tuple for basic
    /// authentication.
    #[must_use]
    pub fn with_auth(mut self, auth: impl Into<Auth>) -> Self {
        self.auth = auth.into();
        self
    }

    /// The client.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// The authentication strategy.
    #[must_use]
    pub const fn auth(&self) -> &Auth {
        &self.auth
    }

    /// The sender registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<SenderRegistry> {
        &self.registry
    }

    /// A session borrowing this executor.
    #[must_use]
    pub fn session(&self) -> Session<'_, C> {
        Session::new(&self.registry, &self.client, &self.auth)
    }
}

impl<C: Any> Executor<C> {
    /// Execute a query with the blocking sender registered for `C`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnsupportedClient`] before any I/O if no
    /// blocking sender is registered for `C`, and otherwise any error raised
    /// while running the query.
    pub fn execute<Q: Query + ?Sized>(&self, query: &Q) -> Result<Q::Output> {
        query.execute(&self.session())
    }

    /// Iterate over the pages of a paginated query.
    ///
    /// Each call starts again from the first page.
    pub fn paginate<'a, Q>(&'a self, query: &'a Q) -> Paginator<'a, Q, C>
    where
        Q: Query,
        Q::Output: Pagelike,
    {
        self.session().paginate(query)
    }
}

impl<C: Any + Send + Sync> Executor<C> {
    /// Execute a query with the asynchronous sender registered for `C`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnsupportedClient`] before any I/O if no
    /// asynchronous sender is registered for `C`, and otherwise any error
    /// raised while running the query.
    pub async fn execute_async<Q>(&self, query: &Q) -> Result<Q::Output>
    where
        Q: Query + Sync + ?Sized,
        Q::Exchange: Send,
        Q::Output: Send,
    {
        query.execute_async(&self.session()).await
    }

    /// Iterate asynchronously over the pages of a paginated query.
    pub fn paginate_async<'a, Q>(&'a self, query: &'a Q) -> AsyncPaginator<'a, Q, C>
    where
        Q: Query,
        Q::Output: Pagelike,
    {
        self.session().paginate_async(query)
    }
}
