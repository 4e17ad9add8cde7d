//! Pagination over queries returning page-like values.
//!
//! A paginated query returns a [`Pagelike`] value: the content of one page
//! and, unless it is the last page, the query fetching the next one. A
//! [`Paginator`] executes these queries one after the other, yielding the
//! content of each page.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use parley_core::exchange::{self, BoxExchange, ExchangeExt};
//! use parley_core::{Executor, Page, Query, Request, Response, SenderRegistry};
//!
//! /// Posts served ten at a time, starting at `offset`.
//! struct RecentPosts {
//!     offset: usize,
//! }
//!
//! impl Query for RecentPosts {
//!     type Output = Page<Vec<String>, RecentPosts>;
//!     type Exchange = BoxExchange<Self::Output>;
//!
//!     fn exchange(&self) -> Self::Exchange {
//!         let offset = self.offset;
//!         let request = Request::get("/posts").with_param("offset", offset.to_string());
//!         exchange::once(request, move |response: Response| {
//!             let posts: Vec<String> = response.json()?;
//!             let next = (posts.len() == 10).then(|| RecentPosts { offset: offset + 10 });
//!             Ok(Page::new(posts, next))
//!         })
//!         .boxed()
//!     }
//! }
//!
//! /// An archive of 25 posts.
//! struct Archive;
//!
//! let registry = SenderRegistry::new().with(|_: &Archive, request: Request| {
//!     let offset: usize = request
//!         .params()
//!         .get("offset")
//!         .and_then(|offset| offset.parse().ok())
//!         .unwrap_or_default();
//!     let posts: Vec<String> = (offset..25).take(10).map(|n| format!("post {n}")).collect();
//!     Ok(Response::new(200).with_body(serde_json::json!(posts).to_string()))
//! });
//! let executor = Executor::new(Arc::new(registry), Archive);
//!
//! let sizes = executor
//!     .paginate(&RecentPosts { offset: 0 })
//!     .map(|posts| posts.map(|posts| posts.len()))
//!     .collect::<parley_core::Result<Vec<_>>>()?;
//!
//! assert_eq!(sizes, [10, 10, 5]);
//! # Ok::<(), parley_core::Error>(())
//! ```

use std::any::Any;
use std::mem;

use futures_core::Stream;

use crate::{Query, Result, Session};

/// A page of results with an optional query for the next page.
pub trait Pagelike: Sized {
    /// Content of the page.
    type Content;
    /// Query fetching the next page.
    type Next: Query<Output = Self>;

    /// Split into content and the next page query (`None` on the last page).
    fn into_parts(self) -> (Self::Content, Option<Self::Next>);
}

/// The simplest [`Pagelike`]: content plus an optional next query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T, Q> {
    /// Content of the page.
    pub content: T,
    /// Query fetching the next page, `None` on the last page.
    pub next_query: Option<Q>,
}

impl<T, Q> Page<T, Q> {
    /// A page followed by the page fetched with `next_query`.
    pub const fn new(content: T, next_query: Option<Q>) -> Self {
        Self {
            content,
            next_query,
        }
    }

    /// The last page.
    pub const fn last(content: T) -> Self {
        Self::new(content, None)
    }
}

impl<T, Q> Pagelike for Page<T, Q>
where
    Q: Query<Output = Self>,
{
    type Content = T;
    type Next = Q;

    fn into_parts(self) -> (T, Option<Q>) {
        (self.content, self.next_query)
    }
}

/// A query whose pages are iterated rather than returned.
///
/// Every call to [`Paginated::pages`] or [`Paginated::pages_async`] starts
/// over from the first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginated<Q>(Q);

/// Wrap a query returning pages.
pub const fn paginated<Q>(query: Q) -> Paginated<Q>
where
    Q: Query,
    Q::Output: Pagelike,
{
    Paginated(query)
}

impl<Q> Paginated<Q>
where
    Q: Query,
    Q::Output: Pagelike,
{
    /// The query of the first page.
    pub const fn first(&self) -> &Q {
        &self.0
    }

    /// Iterate over the pages with a blocking transport.
    pub fn pages<'a, C: Any>(&'a self, session: Session<'a, C>) -> Paginator<'a, Q, C> {
        Paginator::new(session, &self.0)
    }

    /// Iterate over the pages with an asynchronous transport.
    pub fn pages_async<'a, C>(&'a self, session: Session<'a, C>) -> AsyncPaginator<'a, Q, C>
    where
        C: Any + Send + Sync,
    {
        AsyncPaginator::new(session, &self.0)
    }
}

type Content<Q> = <<Q as Query>::Output as Pagelike>::Content;
type NextQuery<Q> = <<Q as Query>::Output as Pagelike>::Next;

enum Cursor<'a, Q, N> {
    First(&'a Q),
    Next(N),
    Exhausted,
}

/// Iterator over the content of successive pages.
///
/// Each call to [`Iterator::next`] executes one query. After the last page,
/// or after an error, the iterator is exhausted.
pub struct Paginator<'a, Q, C>
where
    Q: Query,
    Q::Output: Pagelike,
{
    session: Session<'a, C>,
    cursor: Cursor<'a, Q, NextQuery<Q>>,
}

impl<'a, Q, C> Paginator<'a, Q, C>
where
    Q: Query,
    Q::Output: Pagelike,
{
    pub(crate) const fn new(session: Session<'a, C>, first: &'a Q) -> Self {
        Self {
            session,
            cursor: Cursor::First(first),
        }
    }

    fn advance(&mut self, page: Result<Q::Output>) -> Result<Content<Q>> {
        let (content, next) = page?.into_parts();
        if let Some(next) = next {
            self.cursor = Cursor::Next(next);
        }
        Ok(content)
    }
}

impl<Q, C> Iterator for Paginator<'_, Q, C>
where
    Q: Query,
    Q::Output: Pagelike,
    C: Any,
{
    type Item = Result<Content<Q>>;

    fn next(&mut self) -> Option<Self::Item> {
        let page = match mem::replace(&mut self.cursor, Cursor::Exhausted) {
            Cursor::First(query) => query.execute(&self.session),
            Cursor::Next(query) => query.execute(&self.session),
            Cursor::Exhausted => return None,
        };
        Some(self.advance(page))
    }
}

/// Asynchronous counterpart of [`Paginator`].
pub struct AsyncPaginator<'a, Q, C>
where
    Q: Query,
    Q::Output: Pagelike,
{
    inner: Paginator<'a, Q, C>,
}

impl<'a, Q, C> AsyncPaginator<'a, Q, C>
where
    Q: Query,
    Q::Output: Pagelike,
{
    pub(crate) const fn new(session: Session<'a, C>, first: &'a Q) -> Self {
        Self {
            inner: Paginator::new(session, first),
        }
    }
}

impl<'a, Q, C> AsyncPaginator<'a, Q, C>
where
    Q: Query + Sync,
    Q::Exchange: Send,
    Q::Output: Pagelike + Send,
    NextQuery<Q>: Send + Sync,
    <NextQuery<Q> as Query>::Exchange: Send,
    C: Any + Send + Sync,
{
    /// Fetch the next page, or `None` once the pages are exhausted.
    pub async fn next_page(&mut self) -> Option<Result<Content<Q>>> {
        let session = self.inner.session;
        let page = match mem::replace(&mut self.inner.cursor, Cursor::Exhausted) {
            Cursor::First(query) => query.execute_async(&session).await,
            Cursor::Next(query) => query.execute_async(&session).await,
            Cursor::Exhausted => return None,
        };
        Some(self.inner.advance(page))
    }

    /// Convert into a stream of page contents.
    pub fn into_stream(self) -> impl Stream<Item = Result<Content<Q>>> + 'a {
        futures_util::stream::unfold(self, |mut pager| async move {
            let item = pager.next_page().await?;
            Some((item, pager))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use assert2::{check, let_assert};
    use futures_util::StreamExt;

    use super::*;
    use crate::exchange::{self, BoxExchange, ExchangeExt};
    use crate::{Auth, Error, Executor, HttpClient, Request, Response, SenderRegistry};

    /// Serves three pages of numbers using a `cursor` parameter.
    #[derive(Default)]
    struct NumberServer {
        requests: Mutex<Vec<Request>>,
        fail_on: Option<&'static str>,
    }

    impl NumberServer {
        fn serve(&self, request: Request) -> Result<Response> {
            let cursor = request.params().get("cursor").cloned();
            self.requests.lock().expect("lock").push(request);
            if self.fail_on.is_some_and(|fail| cursor.as_deref() == Some(fail)) {
                return Err(Error::connection("server went away"));
            }
            let body = match cursor.as_deref() {
                None => r#"{"numbers":[1,2,3],"next":"abc"}"#,
                Some("abc") => r#"{"numbers":[4,5,6],"next":"def"}"#,
                Some("def") => r#"{"numbers":[7,8],"next":null}"#,
                Some(other) => return Err(Error::http(404, format!("unknown cursor {other}"))),
            };
            Ok(Response::new(200).with_body(body))
        }

        fn cursors(&self) -> Vec<Option<String>> {
            self.requests
                .lock()
                .expect("lock")
                .iter()
                .map(|request| request.params().get("cursor").cloned())
                .collect()
        }
    }

    impl HttpClient for NumberServer {
        async fn execute(&self, request: Request) -> Result<Response> {
            self.serve(request)
        }
    }

    #[derive(serde::Deserialize)]
    struct Body {
        numbers: Vec<u32>,
        next: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Numbers {
        max: u32,
        cursor: Option<String>,
    }

    impl Query for Numbers {
        type Output = Page<Vec<u32>, Numbers>;
        type Exchange = BoxExchange<Self::Output>;

        fn exchange(&self) -> Self::Exchange {
            let mut request = Request::get("/numbers").with_param("max", self.max.to_string());
            if let Some(cursor) = &self.cursor {
                request = request.with_param("cursor", cursor);
            }
            let max = self.max;
            exchange::once(request, move |response: Response| {
                let body: Body = response.json()?;
                let next_query = body.next.map(|cursor| Numbers {
                    max,
                    cursor: Some(cursor),
                });
                Ok(Page::new(body.numbers, next_query))
            })
            .boxed()
        }
    }

    fn executor(server: NumberServer) -> Executor<NumberServer> {
        let mut registry = SenderRegistry::new();
        registry
            .register(|server: &NumberServer, request: Request| server.serve(request))
            .register_client::<NumberServer>();
        Executor::new(Arc::new(registry), server)
    }

    fn first_page() -> Numbers {
        Numbers {
            max: 10,
            cursor: None,
        }
    }

    #[test]
    fn iterates_all_pages_and_restarts() {
        let executor = executor(NumberServer::default());
        let query = first_page();

        for _ in 0..2 {
            let pages: Vec<_> = executor
                .paginate(&query)
                .collect::<Result<_>>()
                .expect("all pages");
            check!(pages == [vec![1, 2, 3], vec![4, 5, 6], vec![7, 8]]);
        }

        let cursors = executor.client().cursors();
        check!(cursors.len() == 6);
        check!(cursors[0].is_none());
        check!(cursors[1].as_deref() == Some("abc"));
        check!(cursors[2].as_deref() == Some("def"));
        check!(cursors[3].is_none());
    }

    #[test]
    fn pages_are_fetched_lazily() {
        let executor = executor(NumberServer::default());
        let query = first_page();
        let mut pages = executor.paginate(&query);

        check!(executor.client().cursors().is_empty());
        let_assert!(Some(Ok(first)) = pages.next());
        check!(first == [1, 2, 3]);
        check!(executor.client().cursors().len() == 1);
    }

    #[test]
    fn error_exhausts_the_paginator() {
        let executor = executor(NumberServer {
            fail_on: Some("abc"),
            ..NumberServer::default()
        });
        let query = first_page();
        let mut pages = executor.paginate(&query);

        check!(pages.next().is_some_and(|page| page.is_ok()));
        let_assert!(Some(Err(Error::Connection(_))) = pages.next());
        check!(pages.next().is_none());
        check!(executor.client().cursors().len() == 2);
    }

    #[test]
    fn paginated_wrapper_uses_session() {
        let executor = executor(NumberServer::default());
        let numbers = paginated(first_page());

        let total: u32 = numbers
            .pages(executor.session())
            .map(|page| page.map(|numbers| numbers.iter().sum::<u32>()))
            .sum::<Result<u32>>()
            .expect("all pages");
        check!(total == 36);
        check!(numbers.first() == &first_page());
    }

    #[test]
    fn auth_applies_to_every_page() {
        let executor = executor(NumberServer::default()).with_auth(Auth::bearer("t"));
        let query = first_page();
        let count = executor.paginate(&query).count();
        check!(count == 3);
        for request in executor.client().requests.lock().expect("lock").iter() {
            check!(request.header("Authorization") == Some("Bearer t"));
        }
    }

    #[tokio::test]
    async fn async_pages_restart() {
        let executor = executor(NumberServer::default());
        let query = first_page();

        for _ in 0..2 {
            let mut pages = executor.paginate_async(&query);
            let mut all = Vec::new();
            while let Some(page) = pages.next_page().await {
                all.push(page.expect("page"));
            }
            check!(all == [vec![1, 2, 3], vec![4, 5, 6], vec![7, 8]]);
        }
        check!(executor.client().cursors().len() == 6);
    }

    #[tokio::test]
    async fn async_pages_as_stream() {
        let executor = executor(NumberServer::default());
        let numbers = paginated(first_page());

        let pages: Vec<_> = numbers
            .pages_async(executor.session())
            .into_stream()
            .collect()
            .await;

        check!(pages.len() == 3);
        let_assert!(Some(Ok(last)) = pages.last());
        check!(last == &vec![7, 8]);
    }

    #[test]
    fn page_query_executes_alone() {
        let executor = executor(NumberServer::default());
        let tagged = crate::query::from_fn(|| {
            first_page()
                .exchange()
                .map_yield(|request: Request| request.with_header("X-Page", "yes"))
        });

        let page = executor.execute(&tagged).expect("first page");
        check!(page.content == [1, 2, 3]);
        check!(page.next_query.and_then(|next| next.cursor).as_deref() == Some("abc"));
        let requests = executor.client().requests.lock().expect("lock").clone();
        check!(requests[0].header("x-page") == Some("yes"));
    }
}
