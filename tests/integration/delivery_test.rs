// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{setup_stack, start_capture_server, test_webhook};
use hmac::{Hmac, Mac};
use hostreamly_webhooks::delivery::trigger::TriggerOptions;
use hostreamly_webhooks::domain::models::delivery::DeliveryStatus;
use hostreamly_webhooks::domain::models::webhook::WebhookEventType;
use hostreamly_webhooks::domain::repositories::delivery_repository::DeliveryRepository;
use hostreamly_webhooks::domain::repositories::webhook_repository::WebhookRepository;
use serde_json::json;
use sha2::Sha256;
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_signature_matches_raw_body() {
    let stack = setup_stack().await;
    let owner_id = Uuid::new_v4();
    let secret = "whsec_test";

    let (url, captured) = start_capture_server().await;
    let mut webhook = test_webhook(owner_id, &url, vec![WebhookEventType::VideoCreated]);
    webhook.secret = Some(secret.to_string());
    stack.webhooks.create(&webhook).await.unwrap();

    stack
        .trigger
        .trigger_event(
            owner_id,
            WebhookEventType::VideoCreated,
            json!({ "video_id": "v1" }),
            TriggerOptions::default(),
        )
        .await
        .unwrap();

    let requests = captured.lock();
    assert_eq!(requests.len(), 1);

    let signature = requests[0]
        .headers
        .get("x-webhook-signature")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    // Recompute over the raw bytes the receiver actually saw
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(&requests[0].body);
    let expected = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));

    assert_eq!(signature, expected);
}

#[tokio::test]
async fn test_custom_headers_are_sent() {
    let stack = setup_stack().await;
    let owner_id = Uuid::new_v4();

    let (url, captured) = start_capture_server().await;
    let mut webhook = test_webhook(owner_id, &url, vec![WebhookEventType::VideoCreated]);
    webhook.headers = Some(HashMap::from([(
        "X-Tenant".to_string(),
        "acme".to_string(),
    )]));
    stack.webhooks.create(&webhook).await.unwrap();

    stack
        .trigger
        .trigger_event(
            owner_id,
            WebhookEventType::VideoCreated,
            json!({}),
            TriggerOptions::default(),
        )
        .await
        .unwrap();

    let requests = captured.lock();
    assert_eq!(requests[0].headers.get("x-tenant").unwrap(), "acme");
}

#[tokio::test]
async fn test_success_records_delivery_and_marks_webhook() {
    let stack = setup_stack().await;
    let owner_id = Uuid::new_v4();

    let (url, _captured) = start_capture_server().await;
    let webhook = test_webhook(owner_id, &url, vec![WebhookEventType::VideoCreated]);
    stack.webhooks.create(&webhook).await.unwrap();

    stack
        .trigger
        .trigger_event(
            owner_id,
            WebhookEventType::VideoCreated,
            json!({ "video_id": "v1" }),
            TriggerOptions::default(),
        )
        .await
        .unwrap();

    let records = stack
        .deliveries
        .find_recent_for_owner(owner_id, 10)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.status, DeliveryStatus::Success);
    assert_eq!(record.attempt_count, 1);
    assert_eq!(record.response_status, Some(200));
    assert!(record.delivered_at.is_some());

    let updated = stack.webhooks.find_by_id(webhook.id).await.unwrap().unwrap();
    assert!(updated.last_triggered_at.is_some());
}

#[tokio::test]
async fn test_client_error_is_terminal() {
    let stack = setup_stack().await;
    let owner_id = Uuid::new_v4();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let webhook = test_webhook(
        owner_id,
        &format!("{}/hook", server.uri()),
        vec![WebhookEventType::VideoDeleted],
    );
    stack.webhooks.create(&webhook).await.unwrap();

    let outcome = stack
        .trigger
        .trigger_event(
            owner_id,
            WebhookEventType::VideoDeleted,
            json!({ "video_id": "v1" }),
            TriggerOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.failed, 1);
    // A 4xx means the receiver refused the event, no retry
    assert_eq!(stack.scheduler.queue_len(), 0);
    stack.scheduler.process_retry_queue().await;
    assert_eq!(stack.scheduler.queue_len(), 0);

    let records = stack
        .deliveries
        .find_recent_for_owner(owner_id, 10)
        .await
        .unwrap();
    assert_eq!(records[0].status, DeliveryStatus::Failed);
    assert_eq!(records[0].response_status, Some(404));
}

#[tokio::test]
async fn test_response_body_is_truncated_before_storage() {
    let stack = setup_stack().await;
    let owner_id = Uuid::new_v4();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a".repeat(1500)))
        .mount(&server)
        .await;

    let webhook = test_webhook(
        owner_id,
        &format!("{}/hook", server.uri()),
        vec![WebhookEventType::VideoCreated],
    );
    stack.webhooks.create(&webhook).await.unwrap();

    stack
        .trigger
        .trigger_event(
            owner_id,
            WebhookEventType::VideoCreated,
            json!({}),
            TriggerOptions::default(),
        )
        .await
        .unwrap();

    let records = stack
        .deliveries
        .find_recent_for_owner(owner_id, 10)
        .await
        .unwrap();
    let body = records[0].response_body.as_deref().unwrap();
    assert_eq!(body.len(), 1003);
    assert!(body.ends_with("..."));
}

#[tokio::test]
async fn test_invalid_url_is_terminal() {
    let stack = setup_stack().await;
    let owner_id = Uuid::new_v4();

    let webhook = test_webhook(
        owner_id,
        "not a valid url",
        vec![WebhookEventType::VideoCreated],
    );
    stack.webhooks.create(&webhook).await.unwrap();

    let outcome = stack
        .trigger
        .trigger_event(
            owner_id,
            WebhookEventType::VideoCreated,
            json!({}),
            TriggerOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.failed, 1);
    // A config mistake cannot be fixed by retrying
    assert_eq!(stack.scheduler.queue_len(), 0);

    let records = stack
        .deliveries
        .find_recent_for_owner(owner_id, 10)
        .await
        .unwrap();
    assert_eq!(records[0].status, DeliveryStatus::Failed);
    assert_eq!(records[0].response_status, None);
    assert!(records[0]
        .response_body
        .as_deref()
        .unwrap()
        .contains("invalid webhook URL"));
}

#[tokio::test]
async fn test_timeout_is_a_retryable_failure() {
    let stack = setup_stack().await;
    let owner_id = Uuid::new_v4();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let mut webhook = test_webhook(
        owner_id,
        &format!("{}/hook", server.uri()),
        vec![WebhookEventType::VideoCreated],
    );
    webhook.timeout_seconds = 1;
    stack.webhooks.create(&webhook).await.unwrap();

    let outcome = stack
        .trigger
        .trigger_event(
            owner_id,
            WebhookEventType::VideoCreated,
            json!({}),
            TriggerOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.failed, 1);
    assert_eq!(stack.scheduler.queue_len(), 1);

    let records = stack
        .deliveries
        .find_recent_for_owner(owner_id, 10)
        .await
        .unwrap();
    assert_eq!(records[0].status, DeliveryStatus::Failed);
    // No HTTP response was received
    assert_eq!(records[0].response_status, None);
    assert!(records[0].response_body.is_some());
}
