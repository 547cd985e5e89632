//! Request builders for `tower::ServiceExt::oneshot` router tests.

use axum::body::Body;
use axum::http::{Method, Request, header};

use crate::auth::MockAuth;

/// Build a request with an optional JSON body and optional gateway identity.
pub fn json_request(
    method: Method,
    uri: &str,
    auth: Option<&MockAuth>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        for (name, value) in auth.headers().iter() {
            builder = builder.header(name, value);
        }
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
