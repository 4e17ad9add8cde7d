//! Transport capabilities and the registry dispatching on client type.
//!
//! A *client* is any value able to perform HTTP I/O (a connection pool, a
//! socket factory, a test double). The executor never calls a client
//! directly: it looks up the [`Sender`] or [`AsyncSender`] registered for the
//! client's type in a [`SenderRegistry`] and dispatches through it.
//!
//! Client types that know how to send requests themselves implement
//! [`HttpClient`] or [`BlockingHttpClient`] and are registered with
//! [`SenderRegistry::register_client`] and
//! [`SenderRegistry::register_blocking_client`].

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

use futures_util::future::{self, BoxFuture};
use tracing::debug;

use crate::{Error, Request, Response, Result};

/// Blocking transport for clients of type `C`.
pub trait Sender<C>: Send + Sync {
    /// Send one request with `client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the response cannot
    /// be read.
    fn send(&self, client: &C, request: Request) -> Result<Response>;
}

impl<C, F> Sender<C> for F
where
    F: Fn(&C, Request) -> Result<Response> + Send + Sync,
{
    fn send(&self, client: &C, request: Request) -> Result<Response> {
        self(client, request)
    }
}

/// Asynchronous transport for clients of type `C`.
pub trait AsyncSender<C>: Send + Sync {
    /// Send one request with `client`.
    ///
    /// Dropping the returned future cancels the request.
    fn send<'a>(&'a self, client: &'a C, request: Request) -> BoxFuture<'a, Result<Response>>;
}

/// Asynchronous HTTP client.
///
/// Implemented by client types that carry their own transport, such as the
/// built-in hyper and raw-socket clients.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    /// - Invalid response
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

/// Blocking HTTP client.
pub trait BlockingHttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn execute(&self, request: Request) -> Result<Response>;
}

struct ViaHttpClient<C>(PhantomData<fn(&C)>);

impl<C: HttpClient> AsyncSender<C> for ViaHttpClient<C> {
    fn send<'a>(&'a self, client: &'a C, request: Request) -> BoxFuture<'a, Result<Response>> {
        Box::pin(client.execute(request))
    }
}

struct ViaBlockingClient<C>(PhantomData<fn(&C)>);

impl<C: BlockingHttpClient> Sender<C> for ViaBlockingClient<C> {
    fn send(&self, client: &C, request: Request) -> Result<Response> {
        client.execute(request)
    }
}

// ============================================================================
// Type erasure
// ============================================================================

trait ErasedSender: Send + Sync {
    fn send(&self, client: &dyn Any, request: Request) -> Result<Response>;
}

trait ErasedAsyncSender: Send + Sync {
    fn send<'a>(
        &'a self,
        client: &'a (dyn Any + Send + Sync),
        request: Request,
    ) -> BoxFuture<'a, Result<Response>>;
}

struct Typed<C, S> {
    sender: S,
    _client: PhantomData<fn(&C)>,
}

impl<C, S> Typed<C, S> {
    fn new(sender: S) -> Self {
        Self {
            sender,
            _client: PhantomData,
        }
    }
}

impl<C: Any, S: Sender<C>> ErasedSender for Typed<C, S> {
    fn send(&self, client: &dyn Any, request: Request) -> Result<Response> {
        let client = client
            .downcast_ref::<C>()
            .ok_or_else(Error::unsupported_client::<C>)?;
        self.sender.send(client, request)
    }
}

impl<C: Any + Send + Sync, S: AsyncSender<C>> ErasedAsyncSender for Typed<C, S> {
    fn send<'a>(
        &'a self,
        client: &'a (dyn Any + Send + Sync),
        request: Request,
    ) -> BoxFuture<'a, Result<Response>> {
        let client: &dyn Any = client;
        match client.downcast_ref::<C>() {
            Some(client) => self.sender.send(client, request),
            None => Box::pin(future::ready(Err(Error::unsupported_client::<C>()))),
        }
    }
}

struct Entry<S: ?Sized> {
    client: &'static str,
    sender: Box<S>,
}

// ============================================================================
// Registry
// ============================================================================

/// Maps client types to the transports able to send with them.
///
/// The registry only grows: registering a client type again replaces the
/// previous entry for that type, and nothing is ever removed. It is shared
/// read-only (behind an `Arc`) by executors.
///
/// # Example
///
/// ```
/// use parley_core::{Request, Response, SenderRegistry};
///
/// struct Echo;
///
/// let mut registry = SenderRegistry::new();
/// registry.register(|_: &Echo, request: Request| {
///     Ok(Response::new(200).with_body(request.url().to_string()))
/// });
///
/// let response = registry.send(&Echo, Request::get("/ping")).expect("registered");
/// assert_eq!(response.text().expect("utf-8"), "/ping");
/// assert!(registry.send(&42_u8, Request::get("/")).is_err());
/// ```
#[derive(Default)]
pub struct SenderRegistry {
    blocking: HashMap<TypeId, Entry<dyn ErasedSender>>,
    non_blocking: HashMap<TypeId, Entry<dyn ErasedAsyncSender>>,
}

impl SenderRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the blocking sender for clients of type `C`.
    pub fn register<C, S>(&mut self, sender: S) -> &mut Self
    where
        C: Any,
        S: Sender<C> + 'static,
    {
        debug!(client = type_name::<C>(), "registering blocking sender");
        self.blocking.insert(
            TypeId::of::<C>(),
            Entry {
                client: type_name::<C>(),
                sender: Box::new(Typed::<C, S>::new(sender)),
            },
        );
        self
    }

    /// Register the asynchronous sender for clients of type `C`.
    pub fn register_async<C, S>(&mut self, sender: S) -> &mut Self
    where
        C: Any + Send + Sync,
        S: AsyncSender<C> + 'static,
    {
        debug!(client = type_name::<C>(), "registering async sender");
        self.non_blocking.insert(
            TypeId::of::<C>(),
            Entry {
                client: type_name::<C>(),
                sender: Box::new(Typed::<C, S>::new(sender)),
            },
        );
        self
    }

    /// Register an [`HttpClient`] type as its own asynchronous sender.
    pub fn register_client<C>(&mut self) -> &mut Self
    where
        C: HttpClient + Any,
    {
        self.register_async::<C, _>(ViaHttpClient::<C>(PhantomData))
    }

    /// Register a [`BlockingHttpClient`] type as its own blocking sender.
    pub fn register_blocking_client<C>(&mut self) -> &mut Self
    where
        C: BlockingHttpClient + Any,
    {
        self.register::<C, _>(ViaBlockingClient::<C>(PhantomData))
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with<C, S>(mut self, sender: S) -> Self
    where
        C: Any,
        S: Sender<C> + 'static,
    {
        self.register::<C, S>(sender);
        self
    }

    /// Builder-style [`register_async`](Self::register_async).
    #[must_use]
    pub fn with_async<C, S>(mut self, sender: S) -> Self
    where
        C: Any + Send + Sync,
        S: AsyncSender<C> + 'static,
    {
        self.register_async::<C, S>(sender);
        self
    }

    /// Returns `true` if a blocking sender is registered for `C`.
    #[must_use]
    pub fn supports_blocking<C: Any>(&self) -> bool {
        self.blocking.contains_key(&TypeId::of::<C>())
    }

    /// Returns `true` if an asynchronous sender is registered for `C`.
    #[must_use]
    pub fn supports_async<C: Any>(&self) -> bool {
        self.non_blocking.contains_key(&TypeId::of::<C>())
    }

    /// Send a request with the blocking sender registered for `C`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedClient`] without any I/O when no blocking
    /// sender is registered for `C`, otherwise the sender's error.
    pub fn send<C: Any>(&self, client: &C, request: Request) -> Result<Response> {
        let Some(entry) = self.blocking.get(&TypeId::of::<C>()) else {
            return Err(Error::unsupported_client::<C>());
        };
        debug!(
            client = entry.client,
            method = %request.method(),
            url = request.url(),
            "sending request"
        );
        entry.sender.send(client, request)
    }

    /// Send a request with the asynchronous sender registered for `C`.
    ///
    /// The returned future fails with [`Error::UnsupportedClient`] without
    /// any I/O when no asynchronous sender is registered for `C`.
    pub fn send_async<'a, C>(&'a self, client: &'a C, request: Request) -> BoxFuture<'a, Result<Response>>
    where
        C: Any + Send + Sync,
    {
        let Some(entry) = self.non_blocking.get(&TypeId::of::<C>()) else {
            return Box::pin(future::ready(Err(Error::unsupported_client::<C>())));
        };
        debug!(
            client = entry.client,
            method = %request.method(),
            url = request.url(),
            "sending request"
        );
        entry.sender.send(client, request)
    }
}

impl fmt::Debug for SenderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut blocking: Vec<_> = self.blocking.values().map(|entry| entry.client).collect();
        let mut non_blocking: Vec<_> = self.non_blocking.values().map(|entry| entry.client).collect();
        blocking.sort_unstable();
        non_blocking.sort_unstable();
        f.debug_struct("SenderRegistry")
            .field("blocking", &blocking)
            .field("async", &non_blocking)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert2::{check, let_assert};

    use super::*;

    struct FakeClient {
        status: u16,
    }

    fn fake_send(client: &FakeClient, request: Request) -> Result<Response> {
        Ok(Response::new(client.status).with_body(request.url().to_string()))
    }

    struct SelfSending;

    impl HttpClient for SelfSending {
        async fn execute(&self, request: Request) -> Result<Response> {
            Ok(Response::new(200).with_header("X-Url", request.url()))
        }
    }

    impl BlockingHttpClient for SelfSending {
        fn execute(&self, request: Request) -> Result<Response> {
            Ok(Response::new(201).with_header("X-Url", request.url()))
        }
    }

    #[test]
    fn dispatches_on_client_type() {
        let mut registry = SenderRegistry::new();
        registry.register(fake_send);

        let response = registry
            .send(&FakeClient { status: 418 }, Request::get("/tea"))
            .expect("registered");
        check!(response.status() == 418);
        check!(response.text().expect("utf-8") == "/tea");
    }

    #[test]
    fn unregistered_client_fails_without_io() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let registry = SenderRegistry::new().with(move |_: &FakeClient, _: Request| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Response::new(200))
        });

        let result = registry.send(&String::from("not a client"), Request::get("/"));
        let_assert!(Err(Error::UnsupportedClient { type_name }) = result);
        check!(type_name == "alloc::string::String");
        check!(calls.load(Ordering::SeqCst) == 0);
    }

    #[test]
    fn later_registration_wins() {
        let mut registry = SenderRegistry::new();
        registry
            .register(|_: &FakeClient, _: Request| Ok(Response::new(500)))
            .register(|_: &FakeClient, _: Request| Ok(Response::new(204)));

        let response = registry
            .send(&FakeClient { status: 0 }, Request::get("/"))
            .expect("registered");
        check!(response.status() == 204);
    }

    #[test]
    fn blocking_and_async_are_separate() {
        let mut registry = SenderRegistry::new();
        registry.register_blocking_client::<SelfSending>();

        check!(registry.supports_blocking::<SelfSending>());
        check!(!registry.supports_async::<SelfSending>());
        check!(!registry.supports_blocking::<FakeClient>());
    }

    #[test]
    fn blocking_client_sends_itself() {
        let registry = {
            let mut registry = SenderRegistry::new();
            registry.register_blocking_client::<SelfSending>();
            registry
        };
        let response = registry
            .send(&SelfSending, Request::get("/self"))
            .expect("registered");
        check!(response.status() == 201);
        check!(response.header("x-url") == Some("/self"));
    }

    #[tokio::test]
    async fn async_client_sends_itself() {
        let mut registry = SenderRegistry::new();
        registry.register_client::<SelfSending>();

        let response = registry
            .send_async(&SelfSending, Request::get("/async"))
            .await
            .expect("registered");
        check!(response.status() == 200);
        check!(response.header("x-url") == Some("/async"));
    }

    #[tokio::test]
    async fn async_unregistered_client_fails() {
        let registry = SenderRegistry::new();
        let result = registry.send_async(&FakeClient { status: 200 }, Request::get("/")).await;
        let_assert!(Err(Error::UnsupportedClient { type_name }) = result);
        check!(type_name.ends_with("FakeClient"));
    }

    #[test]
    fn debug_lists_registered_clients() {
        let mut registry = SenderRegistry::new();
        registry.register(fake_send);
        let debug = format!("{registry:?}");
        check!(debug.contains("FakeClient"));
    }
}
