//! Middleware layer: cross-cutting handlers that run before the terminal
//! route handler.
//!
//! A middleware receives the [`Request`] and a [`Next`] capability. It may
//! do its work and call `next.run(req).await` to continue the chain, or
//! return its own [`Response`] without calling `next`, which terminates the
//! chain — nothing downstream (later middleware, the terminal handler) runs
//! for that request:
//!
//! ```rust
//! use portico::{middleware::Next, Request, Response, Status};
//!
//! async fn reject_empty_agents(req: Request, next: Next) -> Response {
//!     if req.header("user-agent").is_none() {
//!         return Response::status(Status::BadRequest); // chain stops here
//!     }
//!     next.run(req).await
//! }
//! ```
//!
//! Registration order is execution order, exactly. Global middleware
//! (registered with [`Router::layer`](crate::Router::layer)) runs for every
//! request before any route-scoped middleware; route-scoped middleware
//! (registered with [`Router::guarded`](crate::Router::guarded)) runs only
//! for its route, before the terminal handler.
//!
//! Built-ins:
//! - [`access_log`] — one timestamped line per request
//! - [`require_query`] — gate a route on an exact query-parameter match

mod access_log;
mod query_gate;

pub use access_log::access_log;
pub use query_gate::require_query;

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// Internal dispatch interface, mirrors `ErasedHandler` with the extra
/// [`Next`] argument.
#[doc(hidden)]
pub trait ErasedMiddleware {
    fn handle(&self, req: Request, next: Next) -> BoxFuture;
}

/// A shared, type-erased middleware entry.
#[doc(hidden)]
pub type BoxedMiddleware = Arc<dyn ErasedMiddleware + Send + Sync + 'static>;

/// Implemented for every valid middleware entry.
///
/// Automatically satisfied for any
///
/// ```text
/// async fn name(req: Request, next: Next) -> impl IntoResponse
/// ```
///
/// Sealed like [`Handler`](crate::Handler): only the blanket impl applies.
pub trait Middleware: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedMiddleware;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_middleware(self) -> BoxedMiddleware {
        Arc::new(FnMiddleware(self))
    }
}

struct FnMiddleware<F>(F);

impl<F, Fut, R> ErasedMiddleware for FnMiddleware<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        let fut = (self.0)(req, next);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The continuation handed to each middleware entry.
///
/// `Next` is the chain driver: it holds the ordered entries, a cursor, and
/// the terminal handler. [`Next::run`] invokes the entry at the cursor with
/// the cursor advanced, or the terminal handler once the entries are
/// exhausted. A middleware that never calls `run` has terminated the chain;
/// the driver only advances when asked, so nothing downstream executes.
///
/// `run` consumes `self` — a middleware cannot invoke the rest of the chain
/// twice.
pub struct Next {
    chain: Arc<[BoxedMiddleware]>,
    cursor: usize,
    terminal: BoxedHandler,
}

impl Next {
    pub(crate) fn new(chain: Arc<[BoxedMiddleware]>, terminal: BoxedHandler) -> Self {
        Self { chain, cursor: 0, terminal }
    }

    /// Runs the remainder of the chain and the terminal handler.
    pub async fn run(mut self, req: Request) -> Response {
        match self.chain.get(self.cursor).map(Arc::clone) {
            Some(entry) => {
                self.cursor += 1;
                entry.handle(req, self).await
            }
            None => self.terminal.call(req).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::handler::Handler;
    use crate::method::Method;
    use crate::request::test_request;
    use crate::status::Status;

    fn chain_of(entries: Vec<BoxedMiddleware>, terminal: impl Handler) -> Next {
        Next::new(entries.into(), terminal.into_boxed_handler())
    }

    async fn terminal_ok(_req: Request) -> Response {
        Response::text("terminal")
    }

    #[tokio::test]
    async fn empty_chain_falls_through_to_terminal() {
        let next = chain_of(Vec::new(), terminal_ok);
        let res = next.run(test_request(Method::Get, "/")).await;
        assert_eq!(res.body(), b"terminal");
    }

    #[tokio::test]
    async fn entries_run_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut entries: Vec<BoxedMiddleware> = Vec::new();
        for name in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            entries.push(
                (move |req: Request, next: Next| {
                    seen.lock().unwrap().push(name);
                    next.run(req)
                })
                .into_boxed_middleware(),
            );
        }
        let res = chain_of(entries, terminal_ok)
            .run(test_request(Method::Get, "/"))
            .await;
        assert_eq!(res.body(), b"terminal");
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn short_circuit_skips_rest_of_chain_and_terminal() {
        let later_ran = Arc::new(AtomicUsize::new(0));

        let stop = |_req: Request, _next: Next| async {
            Response::builder().status(Status::Forbidden).text("stop")
        };
        let counter = {
            let later_ran = Arc::clone(&later_ran);
            move |req: Request, next: Next| {
                later_ran.fetch_add(1, Ordering::SeqCst);
                next.run(req)
            }
        };
        let terminal = {
            let later_ran = Arc::clone(&later_ran);
            move |_req: Request| {
                later_ran.fetch_add(1, Ordering::SeqCst);
                async { Response::text("terminal") }
            }
        };

        let entries = vec![stop.into_boxed_middleware(), counter.into_boxed_middleware()];
        let res = chain_of(entries, terminal)
            .run(test_request(Method::Get, "/"))
            .await;

        assert_eq!(res.status_code(), 403);
        assert_eq!(res.body(), b"stop");
        assert_eq!(later_ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn middleware_can_annotate_the_request() {
        #[derive(Clone)]
        struct Tag(&'static str);

        let annotate = |mut req: Request, next: Next| {
            req.extensions_mut().insert(Tag("seen"));
            next.run(req)
        };
        let terminal = |req: Request| async move {
            match req.extensions().get::<Tag>() {
                Some(Tag(s)) => Response::text(*s),
                None => Response::status(Status::InternalServerError),
            }
        };

        let res = chain_of(vec![annotate.into_boxed_middleware()], terminal)
            .run(test_request(Method::Get, "/"))
            .await;
        assert_eq!(res.body(), b"seen");
    }
}
