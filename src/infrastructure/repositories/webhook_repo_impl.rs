// Copyright 2025 Hostreamly
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::webhook::{Webhook, WebhookEventType};
use crate::domain::repositories::webhook_repository::{RepositoryError, WebhookRepository};
use crate::infrastructure::database::entities::webhook;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use uuid::Uuid;

/// Webhook订阅仓库实现
#[derive(Clone)]
pub struct WebhookRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl WebhookRepoImpl {
    /// 创建新的Webhook订阅仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WebhookRepository for WebhookRepoImpl {
    async fn create(&self, webhook: &Webhook) -> Result<Webhook, RepositoryError> {
        let active_model: webhook::ActiveModel = webhook.clone().into();

        webhook::Entity::insert(active_model)
            .exec(self.db.as_ref())
            .await?;

        Ok(webhook.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Webhook>, RepositoryError> {
        let model = webhook::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_active_for_event(
        &self,
        owner_id: Uuid,
        event_type: &WebhookEventType,
    ) -> Result<Vec<Webhook>, RepositoryError> {
        let models = webhook::Entity::find()
            .filter(webhook::Column::OwnerId.eq(owner_id))
            .filter(webhook::Column::IsActive.eq(true))
            .all(self.db.as_ref())
            .await?;

        // Event membership is checked in memory, the events column is a JSON array
        let webhooks = models
            .into_iter()
            .map(Webhook::from)
            .filter(|w| w.subscribes_to(event_type))
            .collect();

        Ok(webhooks)
    }

    async fn mark_triggered(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        webhook::Entity::update_many()
            .col_expr(
                webhook::Column::LastTriggeredAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(at)),
            )
            .filter(webhook::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        Ok(())
    }
}

impl From<webhook::Model> for Webhook {
    fn from(model: webhook::Model) -> Self {
        let events = model
            .events
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str())
                    .filter_map(|s| s.parse::<WebhookEventType>().ok())
                    .collect()
            })
            .unwrap_or_default();

        let headers = model
            .headers
            .and_then(|v| serde_json::from_value(v).ok());

        Self {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            url: model.url,
            events,
            secret: model.secret,
            headers,
            retry_count: model.retry_count,
            timeout_seconds: model.timeout_seconds,
            is_active: model.is_active,
            last_triggered_at: model.last_triggered_at.map(Into::into),
            created_at: model.created_at.into(),
        }
    }
}

impl From<Webhook> for webhook::ActiveModel {
    fn from(webhook: Webhook) -> Self {
        let events = JsonValue::Array(
            webhook
                .events
                .iter()
                .map(|e| JsonValue::String(e.to_string()))
                .collect(),
        );

        let headers = webhook.headers.map(|h| {
            JsonValue::Object(
                h.into_iter()
                    .map(|(k, v)| (k, JsonValue::String(v)))
                    .collect(),
            )
        });

        Self {
            id: Set(webhook.id),
            owner_id: Set(webhook.owner_id),
            name: Set(webhook.name),
            url: Set(webhook.url),
            events: Set(events),
            secret: Set(webhook.secret),
            headers: Set(headers),
            retry_count: Set(webhook.retry_count),
            timeout_seconds: Set(webhook.timeout_seconds),
            is_active: Set(webhook.is_active),
            last_triggered_at: Set(webhook.last_triggered_at.map(Into::into)),
            created_at: Set(webhook.created_at.into()),
        }
    }
}
