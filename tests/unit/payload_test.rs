// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::DateTime;
use hostreamly_webhooks::delivery::trigger::build_event_payload;
use hostreamly_webhooks::domain::models::webhook::WebhookEventType;
use serde_json::{json, Map};
use uuid::Uuid;

#[test]
fn test_payload_shape() {
    let owner_id = Uuid::new_v4();
    let payload = build_event_payload(
        owner_id,
        &WebhookEventType::VideoCreated,
        json!({
            "video_id": "v1",
            "title": "Demo",
            "duration": 120,
            "size": 5000,
            "format": "mp4"
        }),
        None,
    );

    assert_eq!(payload["event"], "video.created");
    assert_eq!(payload["data"]["video_id"], "v1");
    assert_eq!(payload["data"]["title"], "Demo");
    assert_eq!(payload["data"]["duration"], 120);
    assert_eq!(payload["data"]["size"], 5000);
    assert_eq!(payload["data"]["format"], "mp4");
    assert_eq!(payload["data"]["owner_id"], owner_id.to_string());

    let timestamp = payload["timestamp"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[test]
fn test_additional_data_merged_at_top_level() {
    let mut additional = Map::new();
    additional.insert("source".to_string(), json!("encoder"));

    let payload = build_event_payload(
        Uuid::new_v4(),
        &WebhookEventType::EncodingCompleted,
        json!({ "video_id": "v1" }),
        Some(&additional),
    );

    assert_eq!(payload["source"], "encoder");
    // The data object is untouched by additional fields
    assert!(payload["data"].get("source").is_none());
}

#[test]
fn test_null_data_still_carries_owner() {
    let owner_id = Uuid::new_v4();
    let payload = build_event_payload(
        owner_id,
        &WebhookEventType::VideoDeleted,
        serde_json::Value::Null,
        None,
    );

    assert_eq!(payload["data"]["owner_id"], owner_id.to_string());
}

#[test]
fn test_scalar_data_is_wrapped() {
    let payload = build_event_payload(
        Uuid::new_v4(),
        &WebhookEventType::Custom("ping".to_string()),
        json!(42),
        None,
    );

    assert_eq!(payload["data"]["value"], 42);
}
