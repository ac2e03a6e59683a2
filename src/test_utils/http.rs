use axum::{body::Body, response::Response};

/// Checks that htmx will navigate the browser to `endpoint`.
#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    let location = response
        .headers()
        .get("hx-redirect")
        .expect("Headers missing hx-redirect")
        .to_str()
        .expect("Could not convert hx-redirect to str");

    assert_eq!(location, endpoint);
}
