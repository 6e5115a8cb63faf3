//! End-to-end requests through the axum router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use sha2::{Digest, Sha256};
use tower::ServiceExt;

use zw_domain::config::Config;
use zw_web::api;
use zw_web::state::AppState;
use zw_web::WebRuntime;

fn app_with(state: AppState) -> Router {
    api::router(state.clone()).with_state(state)
}

fn app() -> Router {
    app_with(AppState::new(
        Arc::new(Config::default()),
        Arc::new(WebRuntime::new()),
    ))
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The `name=value` part of the response's session cookie.
fn session_cookie(response: &Response) -> String {
    let raw = response.headers()["set-cookie"].to_str().unwrap();
    raw.split(';').next().unwrap().to_owned()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let resp = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("\"ok\""));
}

#[tokio::test]
async fn home_counts_visits_per_session() {
    let app = app();

    let first = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()["content-type"], "text/html");
    let cookie = session_cookie(&first);
    assert!(cookie.starts_with("app_session_id="));
    assert!(body_text(first).await.contains("Visit number 1 "));

    let second = send(
        &app,
        Request::get("/").header("cookie", &cookie).body(Body::empty()).unwrap(),
    )
    .await;
    assert!(second.headers().get("set-cookie").is_none());
    assert!(body_text(second).await.contains("Visit number 2 "));

    let stranger = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
    assert_ne!(session_cookie(&stranger), cookie);
    assert!(body_text(stranger).await.contains("Visit number 1 "));
}

#[tokio::test]
async fn echo_returns_body() {
    let app = app();
    let resp = send(&app, Request::post("/echo").body(Body::from("ping")).unwrap()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "text/plain");
    assert_eq!(body_text(resp).await, "ping");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let state = AppState::new(
        Arc::new(Config::default()),
        Arc::new(WebRuntime::new().with_max_body_bytes(4)),
    );
    let app = app_with(state);
    let resp = send(
        &app,
        Request::post("/echo")
            .header("content-length", "10")
            .body(Body::from("0123456789"))
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_text(resp).await, "payload too large");
}

#[tokio::test]
async fn encoded_path_reaches_handler_decoded() {
    let app = app();
    let resp = send(&app, Request::get("/caf%C3%A9/").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(resp).await, "no page at /café");
}

#[tokio::test]
async fn settings_round_trip_within_session() {
    let app = app();
    let first = send(&app, Request::get("/settings/color").body(Body::empty()).unwrap()).await;
    let cookie = session_cookie(&first);
    assert_eq!(body_text(first).await, "");

    let put = send(
        &app,
        Request::post("/settings/color")
            .header("cookie", &cookie)
            .body(Body::from(" red\n"))
            .unwrap(),
    )
    .await;
    assert_eq!(put.status(), StatusCode::NO_CONTENT);

    let get = send(
        &app,
        Request::get("/settings/color")
            .header("cookie", &cookie)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(body_text(get).await, "red");
}

#[tokio::test]
async fn settings_reject_other_methods() {
    let app = app();
    let resp = send(&app, Request::delete("/settings/color").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn back_redirects_to_referer() {
    let app = app();
    let resp = send(
        &app,
        Request::get("/back")
            .header("referer", "http://example.test/page")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers()["location"], "http://example.test/page");

    let resp = send(&app, Request::get("/back").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.headers()["location"], "/");
}

#[tokio::test]
async fn unknown_page_is_not_found() {
    let app = app();
    let resp = send(&app, Request::get("/nope/").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(resp).await, "no page at /nope");
}

#[tokio::test]
async fn session_listing_is_open_without_token() {
    let app = app();
    send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
    send(&app, Request::get("/").body(Body::empty()).unwrap()).await;

    let resp = send(&app, Request::get("/v1/sessions").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json["enabled"], true);
    assert_eq!(json["count"], 2);
    assert_eq!(json["sessions"][0]["settings"], 1);
}

#[tokio::test]
async fn session_listing_requires_configured_token() {
    let state = AppState {
        admin_token_hash: Some(Sha256::digest(b"s3cret").to_vec()),
        ..AppState::new(Arc::new(Config::default()), Arc::new(WebRuntime::new()))
    };
    let app = app_with(state);

    let resp = send(&app, Request::get("/v1/sessions").body(Body::empty()).unwrap()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(
        &app,
        Request::get("/v1/sessions")
            .header("authorization", "Bearer wrong")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(
        &app,
        Request::get("/v1/sessions")
            .header("authorization", "Bearer s3cret")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn disabled_sessions_are_reported() {
    let state = AppState::new(
        Arc::new(Config::default()),
        Arc::new(WebRuntime::new().with_registry(None)),
    );
    let app = app_with(state);
    let home = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
    assert!(home.headers().get("set-cookie").is_none());

    let resp = send(&app, Request::get("/v1/sessions").body(Body::empty()).unwrap()).await;
    let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json["enabled"], false);
}
