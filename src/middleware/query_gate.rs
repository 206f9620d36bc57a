//! Query-parameter access gate.

use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The fixed rejection body. Express-style: no space after the colon.
const DENIED_BODY: &[u8] = br#"{"message":"Access Denied"}"#;

/// Builds a route-scoped middleware that gates on one query parameter.
///
/// The request continues down the chain only if `query[param]` is present
/// and byte-for-byte equal to `expected` — case-sensitive, no trimming, no
/// decoding. Anything else (absent, empty, `"Admin"`, `"admin "`) is
/// rejected with `403` and the JSON body `{"message":"Access Denied"}`,
/// and the terminal handler never runs.
///
/// This is a plumbing demonstration, **not an auth boundary**: a plaintext
/// query-string equality check has no secrecy, no sessions, no replay
/// protection. Anyone who can read the URL can pass the gate.
///
/// ```rust
/// use portico::{middleware, Method, Request, Response, Router};
///
/// async fn admin(_req: Request) -> Response {
///     Response::text("Welcome to the admin page!")
/// }
///
/// let app = Router::new().guarded(
///     Method::Get,
///     "/admin",
///     middleware::require_query("user", "admin"),
///     admin,
/// );
/// ```
pub fn require_query(param: &'static str, expected: &'static str) -> impl Middleware {
    move |req: Request, next: Next| async move {
        let allowed = req.query(param) == Some(expected);
        if allowed {
            next.run(req).await
        } else {
            Response::builder()
                .status(Status::Forbidden)
                .json(DENIED_BODY.to_vec())
        }
    }
}
