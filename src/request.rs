//! Incoming HTTP request type.

use std::collections::HashMap;

use http::Extensions;

use crate::method::Method;

/// An incoming HTTP request as the pipeline sees it.
///
/// The transport builds one `Request` per incoming request and hands it to
/// the router; middleware and handlers pass it along by value. The request is
/// read-only from the pipeline's perspective except for the [`extensions`]
/// slot, which middleware may use to hand derived state to later handlers.
///
/// [`extensions`]: Request::extensions_mut
pub struct Request {
    method: Method,
    path: String,
    target: String,
    query: HashMap<String, String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    params: HashMap<String, String>,
    extensions: Extensions,
}

impl Request {
    /// Builds a request from its wire-level parts. `target` is the original
    /// request target, path plus optional `?query`.
    pub(crate) fn new(
        method: Method,
        target: &str,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Self {
        let (path, raw_query) = match target.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (target, None),
        };
        Self {
            method,
            path: path.to_owned(),
            target: target.to_owned(),
            query: raw_query.map(parse_query).unwrap_or_default(),
            headers,
            body,
            params: HashMap::new(),
            extensions: Extensions::new(),
        }
    }

    pub fn method(&self) -> Method { self.method }

    /// The request path, without the query component.
    pub fn path(&self) -> &str { &self.path }

    /// The original request target: path plus query string, as received.
    pub fn target(&self) -> &str { &self.target }

    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a query parameter by exact key.
    ///
    /// Keys are unique: on `?a=1&a=2` the last occurrence wins. Values are
    /// the raw strings from the request target, not percent-decoded —
    /// callers that compare them do so byte-for-byte.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    /// Per-request annotation slot, typed by `TypeId`.
    ///
    /// Middleware may stash derived values here for handlers further down
    /// the chain. The slot dies with the request.
    pub fn extensions(&self) -> &Extensions { &self.extensions }

    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }
}

/// Splits a raw query string into a key → value map. Empty segments are
/// skipped; a segment without `=` maps the whole segment to `""`; duplicate
/// keys resolve to the last occurrence.
fn parse_query(raw: &str) -> HashMap<String, String> {
    raw.split('&')
        .filter(|seg| !seg.is_empty())
        .map(|seg| match seg.split_once('=') {
            Some((k, v)) => (k.to_owned(), v.to_owned()),
            None => (seg.to_owned(), String::new()),
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn test_request(method: Method, target: &str) -> Request {
    Request::new(method, target, Vec::new(), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_path_and_query() {
        let req = test_request(Method::Get, "/admin?user=admin");
        assert_eq!(req.path(), "/admin");
        assert_eq!(req.target(), "/admin?user=admin");
        assert_eq!(req.query("user"), Some("admin"));
    }

    #[test]
    fn no_query_component() {
        let req = test_request(Method::Get, "/admin");
        assert_eq!(req.path(), "/admin");
        assert_eq!(req.query("user"), None);
    }

    #[test]
    fn last_duplicate_key_wins() {
        let req = test_request(Method::Get, "/?user=guest&user=admin");
        assert_eq!(req.query("user"), Some("admin"));
    }

    #[test]
    fn bare_key_maps_to_empty_string() {
        let req = test_request(Method::Get, "/?user&flag=1");
        assert_eq!(req.query("user"), Some(""));
        assert_eq!(req.query("flag"), Some("1"));
    }

    #[test]
    fn values_are_not_decoded_or_trimmed() {
        let req = test_request(Method::Get, "/?user=admin%20");
        assert_eq!(req.query("user"), Some("admin%20"));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = Request::new(
            Method::Get,
            "/",
            vec![("Content-Type".to_owned(), "text/plain".to_owned())],
            Vec::new(),
        );
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.header("accept"), None);
    }
}
