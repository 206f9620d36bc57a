//! # portico
//!
//! A minimal HTTP router with an explicit middleware chain.
//! Nothing more. Nothing less.
//!
//! ## The model
//!
//! Every request runs through one pipeline: the global middleware layers in
//! registration order, then the matched route's scoped middleware, then that
//! route's terminal handler. Each middleware gets the request and a
//! [`middleware::Next`] capability — call `next.run(req).await` to continue,
//! or return a [`Response`] to terminate the chain on the spot. A returned
//! response is final; nothing downstream runs or writes.
//!
//! Requests that match no route get a 404 from a built-in fallback — after
//! the global layers, so a logging layer observes every request, including
//! the ones access control later rejects.
//!
//! The route table and middleware lists are built once at startup and never
//! mutated; no state survives a request.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use portico::{middleware, Method, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .layer(middleware::access_log)
//!         .on(Method::Get, "/", home)
//!         .guarded(
//!             Method::Get,
//!             "/admin",
//!             middleware::require_query("user", "admin"),
//!             admin,
//!         );
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn home(_req: Request) -> Response {
//!     Response::text("Welcome to the homepage!")
//! }
//!
//! async fn admin(_req: Request) -> Response {
//!     Response::text("Welcome to the admin page!")
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod middleware;

pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response};
pub use router::Router;
pub use server::{Server, DEFAULT_ADDR};
pub use status::Status;
