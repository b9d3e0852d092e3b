// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{setup_stack, TestStack};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::{Extension, Router};
use hostreamly_webhooks::presentation::routes;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

fn test_app(stack: &TestStack) -> Router {
    routes::routes()
        .layer(Extension(stack.trigger.clone()))
        .layer(Extension(stack.deliveries.clone()))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let stack = setup_stack().await;
    let app = test_app(&stack);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_trigger_endpoint_returns_counts() {
    let stack = setup_stack().await;
    let app = test_app(&stack);

    // No subscriptions exist, the event is still accepted
    let request = Request::builder()
        .method("POST")
        .uri(format!("/v1/owners/{}/events", Uuid::new_v4()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "event": "video.created", "data": {} }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["triggered"], 0);
    assert_eq!(body["successful"], 0);
    assert_eq!(body["failed"], 0);
}

#[tokio::test]
async fn test_stats_endpoint_returns_zeroes_for_unknown_owner() {
    let stack = setup_stack().await;
    let app = test_app(&stack);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/v1/owners/{}/webhooks/stats", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["successful"], 0);
}

#[tokio::test]
async fn test_list_deliveries_endpoint() {
    let stack = setup_stack().await;
    let app = test_app(&stack);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/v1/owners/{}/webhooks/deliveries?limit=5",
                    Uuid::new_v4()
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_get_unknown_delivery_is_404() {
    let stack = setup_stack().await;
    let app = test_app(&stack);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/v1/webhooks/deliveries/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
