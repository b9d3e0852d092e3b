// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{setup_stack, test_webhook};
use chrono::{Duration as ChronoDuration, Utc};
use hostreamly_webhooks::delivery::trigger::TriggerOptions;
use hostreamly_webhooks::domain::models::delivery::DeliveryRecord;
use hostreamly_webhooks::domain::models::webhook::WebhookEventType;
use hostreamly_webhooks::domain::repositories::delivery_repository::DeliveryRepository;
use hostreamly_webhooks::domain::repositories::webhook_repository::WebhookRepository;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server_with_status(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_stats_aggregate_per_owner() {
    let stack = setup_stack().await;
    let owner_id = Uuid::new_v4();

    let ok_server = server_with_status(200).await;
    let failing_server = server_with_status(404).await;

    for server in [&ok_server, &failing_server] {
        let webhook = test_webhook(
            owner_id,
            &format!("{}/hook", server.uri()),
            vec![WebhookEventType::VideoCreated],
        );
        stack.webhooks.create(&webhook).await.unwrap();
    }

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

    let stats = stack.trigger.get_webhook_stats(owner_id).await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.successful, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.pending, 0);

    // Other owners see nothing
    let other = stack
        .trigger
        .get_webhook_stats(Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(other.total, 0);
}

#[tokio::test]
async fn test_recent_deliveries_are_ordered_and_limited() {
    let stack = setup_stack().await;
    let owner_id = Uuid::new_v4();

    let webhook = test_webhook(
        owner_id,
        "http://localhost/webhook",
        vec![WebhookEventType::VideoCreated],
    );
    stack.webhooks.create(&webhook).await.unwrap();

    let base = Utc::now() - ChronoDuration::hours(1);
    for i in 0..3 {
        let mut record = DeliveryRecord::new(
            &webhook,
            WebhookEventType::VideoCreated,
            json!({ "seq": i }),
        );
        record.created_at = base + ChronoDuration::minutes(i);
        stack.deliveries.create(&record).await.unwrap();
    }

    let records = stack
        .deliveries
        .find_recent_for_owner(owner_id, 2)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].payload["seq"], 2);
    assert_eq!(records[1].payload["seq"], 1);
}
