//! Radix-tree request router and pipeline dispatch.
//!
//! One tree per HTTP method, O(path-length) lookup. The router also owns the
//! middleware pipeline: global layers run for every request in registration
//! order, then the matched route's scoped middleware, then its terminal
//! handler. Requests that match no route fall through to a built-in 404
//! handler — after the global layers, so an access-log layer still observes
//! them.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{BoxedMiddleware, Middleware, Next};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// A registered route: its scoped middleware and terminal handler.
struct Endpoint {
    guards: Arc<[BoxedMiddleware]>,
    handler: BoxedHandler,
}

/// The application router.
///
/// Build it once at startup; it is immutable afterwards and shared across
/// concurrent requests behind an `Arc`. Each registration method consumes
/// and returns `self` so registrations chain naturally:
///
/// ```rust
/// use portico::{middleware, Method, Request, Response, Router};
///
/// async fn home(_req: Request) -> Response {
///     Response::text("Welcome to the homepage!")
/// }
///
/// let app = Router::new()
///     .layer(middleware::access_log)
///     .on(Method::Get, "/", home);
/// ```
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Endpoint>>,
    layers: Vec<BoxedMiddleware>,
    not_found: BoxedHandler,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            layers: Vec::new(),
            not_found: default_not_found.into_boxed_handler(),
        }
    }

    /// Appends a global middleware layer.
    ///
    /// Layers run for every request — matched or not — in the order they
    /// were registered, before any route-scoped middleware.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(middleware.into_boxed_middleware());
        self
    }

    /// Registers a terminal handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves
    /// them. Exact paths and parameters may coexist; overlap resolution is
    /// the radix tree's (static segments win over parameters).
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, Vec::new(), handler)
    }

    /// Registers a route gated by a scoped middleware.
    ///
    /// The guard runs after the global layers and only for this route; the
    /// terminal handler runs only if the guard continues the chain.
    pub fn guarded(
        self,
        method: Method,
        path: &str,
        guard: impl Middleware,
        handler: impl Handler,
    ) -> Self {
        self.add(method, path, vec![guard.into_boxed_middleware()], handler)
    }

    fn add(
        mut self,
        method: Method,
        path: &str,
        guards: Vec<BoxedMiddleware>,
        handler: impl Handler,
    ) -> Self {
        let endpoint = Endpoint {
            guards: guards.into(),
            handler: handler.into_boxed_handler(),
        };
        self.routes
            .entry(method)
            .or_default()
            .insert(path, endpoint)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Runs one request through the full pipeline and returns its response.
    ///
    /// This is the transport-independent entry point: the server shell calls
    /// it per request, and tests call it directly without a socket. The
    /// effective chain is global layers, then the matched route's guards,
    /// then its terminal handler — or the built-in 404 handler when nothing
    /// matches.
    pub async fn handle(&self, mut req: Request) -> Response {
        let (guards, terminal): (Arc<[BoxedMiddleware]>, BoxedHandler) =
            match self.lookup(&mut req) {
                Some(endpoint) => endpoint,
                None => (Vec::new().into(), Arc::clone(&self.not_found)),
            };
        let chain: Vec<BoxedMiddleware> = self
            .layers
            .iter()
            .chain(guards.iter())
            .cloned()
            .collect();
        Next::new(chain.into(), terminal).run(req).await
    }

    /// Exact (method, path) lookup. Stores any matched path parameters on
    /// the request.
    fn lookup(&self, req: &mut Request) -> Option<(Arc<[BoxedMiddleware]>, BoxedHandler)> {
        let tree = self.routes.get(&req.method())?;
        let (guards, handler, params) = {
            let matched = tree.at(req.path()).ok()?;
            let params: HashMap<String, String> = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            (
                Arc::clone(&matched.value.guards),
                Arc::clone(&matched.value.handler),
                params,
            )
        };
        req.set_params(params);
        Some((guards, handler))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// Response for requests that match no route.
async fn default_not_found(_req: Request) -> Response {
    Response::builder().status(Status::NotFound).text("Not Found")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::middleware::require_query;
    use crate::request::test_request;

    async fn home(_req: Request) -> Response {
        Response::text("Welcome to the homepage!")
    }

    async fn admin(_req: Request) -> Response {
        Response::text("Welcome to the admin page!")
    }

    async fn public_page(_req: Request) -> Response {
        Response::text("This is a public page.")
    }

    fn demo_app() -> Router {
        Router::new()
            .on(Method::Get, "/", home)
            .guarded(Method::Get, "/admin", require_query("user", "admin"), admin)
            .on(Method::Get, "/public", public_page)
    }

    async fn get(app: &Router, target: &str) -> Response {
        app.handle(test_request(Method::Get, target)).await
    }

    #[tokio::test]
    async fn homepage_is_open() {
        let app = demo_app();
        let res = get(&app, "/").await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body(), b"Welcome to the homepage!");
    }

    #[tokio::test]
    async fn open_routes_ignore_query_parameters() {
        let app = demo_app();
        for target in ["/?user=guest", "/public?user=admin&x=1"] {
            assert_eq!(get(&app, target).await.status_code(), 200);
        }
    }

    #[tokio::test]
    async fn admin_with_credential() {
        let app = demo_app();
        let res = get(&app, "/admin?user=admin").await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body(), b"Welcome to the admin page!");
    }

    #[tokio::test]
    async fn admin_without_credential() {
        let app = demo_app();
        for target in ["/admin", "/admin?user=guest"] {
            let res = get(&app, target).await;
            assert_eq!(res.status_code(), 403);
            assert_eq!(res.body(), br#"{"message":"Access Denied"}"#);
        }
    }

    #[tokio::test]
    async fn public_page_is_open() {
        let app = demo_app();
        let res = get(&app, "/public").await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body(), b"This is a public page.");
    }

    #[tokio::test]
    async fn unregistered_path_is_not_found() {
        let app = demo_app();
        let res = get(&app, "/unknown").await;
        assert_eq!(res.status_code(), 404);
        assert_eq!(res.body(), b"Not Found");
    }

    #[tokio::test]
    async fn non_get_method_on_registered_path_is_not_found() {
        let app = demo_app();
        let res = app.handle(test_request(Method::Post, "/")).await;
        assert_eq!(res.status_code(), 404);
    }

    #[tokio::test]
    async fn layers_run_before_guards_and_observe_every_request() {
        let seen: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let layer = {
            let seen = Arc::clone(&seen);
            move |req: Request, next: Next| {
                seen.lock().unwrap().push("layer");
                next.run(req)
            }
        };
        let guard = {
            let seen = Arc::clone(&seen);
            move |req: Request, next: Next| {
                seen.lock().unwrap().push("guard");
                next.run(req)
            }
        };

        let app = Router::new()
            .layer(layer)
            .guarded(Method::Get, "/admin", guard, admin)
            .guarded(
                Method::Get,
                "/locked",
                require_query("user", "admin"),
                admin,
            );

        // Matched route: layer first, then the scoped guard.
        get(&app, "/admin").await;
        assert_eq!(*seen.lock().unwrap(), vec!["layer", "guard"]);

        // Rejected by access control: the layer still saw it, exactly once.
        seen.lock().unwrap().clear();
        let res = get(&app, "/locked?user=guest").await;
        assert_eq!(res.status_code(), 403);
        assert_eq!(*seen.lock().unwrap(), vec!["layer"]);

        // No matching route: the layer still saw it, exactly once.
        seen.lock().unwrap().clear();
        let res = get(&app, "/unknown").await;
        assert_eq!(res.status_code(), 404);
        assert_eq!(*seen.lock().unwrap(), vec!["layer"]);
    }

    #[tokio::test]
    async fn repeated_requests_yield_identical_responses() {
        let app = demo_app();
        for target in ["/", "/admin?user=admin", "/admin?user=guest", "/unknown"] {
            let first = get(&app, target).await;
            for _ in 0..3 {
                let again = get(&app, target).await;
                assert_eq!(again.status_code(), first.status_code());
                assert_eq!(again.body(), first.body());
            }
        }
    }

    #[tokio::test]
    async fn path_parameters_reach_the_handler() {
        async fn show(req: Request) -> Response {
            Response::text(req.param("id").unwrap_or("missing").to_owned())
        }
        let app = Router::new().on(Method::Get, "/users/{id}", show);
        let res = get(&app, "/users/42").await;
        assert_eq!(res.body(), b"42");
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn duplicate_registration_panics_at_startup() {
        let _ = Router::new()
            .on(Method::Get, "/", home)
            .on(Method::Get, "/", public_page);
    }
}
