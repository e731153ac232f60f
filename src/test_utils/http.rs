use axum::{body::Body, http::StatusCode, response::Response};

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK);
}

#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    let hx_redirect = response
        .headers()
        .get("hx-redirect")
        .expect("Headers missing hx-redirect")
        .to_str()
        .expect("Could not convert to str");

    assert_eq!(hx_redirect, endpoint);
}

pub(crate) async fn response_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not get response body");

    String::from_utf8_lossy(&body).to_string()
}
