//! Request-logging middleware.

use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::middleware::Next;
use crate::request::Request;
use crate::response::Response;

/// Logs one line per request, then always continues the chain.
///
/// The line carries an ISO-8601 UTC timestamp, the method, and the original
/// request target including its query string:
///
/// ```text
/// [2026-08-30T14:07:02.113Z] GET request to /admin?user=admin
/// ```
///
/// Register it as a global layer so it observes every request — including
/// ones a later middleware rejects and ones that match no route:
///
/// ```rust
/// use portico::{middleware, Router};
///
/// let app = Router::new().layer(middleware::access_log);
/// ```
pub async fn access_log(req: Request, next: Next) -> Response {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    info!(
        target: "portico::access",
        "[{timestamp}] {} request to {}",
        req.method(),
        req.target(),
    );
    next.run(req).await
}
