use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::from_fn,
    routing::get,
    Router,
};
use tower::ServiceExt;

async fn ok_handler() -> StatusCode {
    StatusCode::OK
}

#[tokio::test]
async fn correlation_id_is_generated_when_absent() {
    let app = Router::new()
        .route("/thing", get(ok_handler))
        .layer(from_fn(request_logging_middleware));

    let response = app
        .oneshot(Request::get("/thing").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-correlation-id"));
}

#[tokio::test]
async fn correlation_id_is_echoed_back_when_supplied() {
    let app = Router::new()
        .route("/thing", get(ok_handler))
        .layer(from_fn(request_logging_middleware));

    let response = app
        .oneshot(
            Request::get("/thing")
                .header("x-correlation-id", "caller-supplied-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-correlation-id").unwrap(),
        "caller-supplied-id"
    );
}

#[tokio::test]
async fn health_path_still_gets_a_correlation_id() {
    let app = Router::new()
        .route(HEALTH_PATH, get(ok_handler))
        .layer(from_fn(request_logging_middleware));

    let response = app
        .oneshot(Request::get(HEALTH_PATH).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-correlation-id"));
}
