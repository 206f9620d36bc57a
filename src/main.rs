//! The demo application: three static pages, one of them gated.
//!
//! Run with `cargo run`, then:
//!
//! ```text
//! curl http://localhost:3000/                      → Welcome to the homepage!
//! curl http://localhost:3000/admin?user=admin      → Welcome to the admin page!
//! curl http://localhost:3000/admin                 → 403 {"message":"Access Denied"}
//! curl http://localhost:3000/public                → This is a public page.
//! curl http://localhost:3000/unknown               → 404 Not Found
//! ```
//!
//! Every request prints one access-log line to stdout:
//!
//! ```text
//! [2026-08-30T14:07:02.113Z] GET request to /admin?user=admin
//! ```

use portico::{middleware, Method, Request, Response, Router, Server, DEFAULT_ADDR};

#[tokio::main]
async fn main() {
    // Bare formatter: no level, target, or timestamp prefix, so the access
    // log's own `[<timestamp>] <METHOD> request to <target>` line reaches
    // stdout verbatim.
    tracing_subscriber::fmt()
        .without_time()
        .with_level(false)
        .with_target(false)
        .init();

    let app = Router::new()
        .layer(middleware::access_log)
        .on(Method::Get, "/", home)
        .guarded(
            Method::Get,
            "/admin",
            middleware::require_query("user", "admin"),
            admin,
        )
        .on(Method::Get, "/public", public);

    if let Err(e) = Server::bind(DEFAULT_ADDR).serve(app).await {
        eprintln!("server error: {e}");
        std::process::exit(1);
    }
}

// GET / — available to everyone.
async fn home(_req: Request) -> Response {
    Response::text("Welcome to the homepage!")
}

// GET /admin — reachable only through the `user=admin` gate.
async fn admin(_req: Request) -> Response {
    Response::text("Welcome to the admin page!")
}

// GET /public — available to everyone.
async fn public(_req: Request) -> Response {
    Response::text("This is a public page.")
}
