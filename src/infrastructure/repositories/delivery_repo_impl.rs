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

use crate::domain::models::delivery::{DeliveryRecord, DeliveryStatus, WebhookStats};
use crate::domain::models::webhook::WebhookEventType;
use crate::domain::repositories::delivery_repository::DeliveryRepository;
use crate::domain::repositories::webhook_repository::RepositoryError;
use crate::infrastructure::database::entities::webhook_delivery::{self, SeaDeliveryStatus};
use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// 投递记录仓库实现
#[derive(Clone)]
pub struct DeliveryRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl DeliveryRepoImpl {
    /// 创建新的投递记录仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<DeliveryStatus> for SeaDeliveryStatus {
    fn from(status: DeliveryStatus) -> Self {
        match status {
            DeliveryStatus::Pending => SeaDeliveryStatus::Pending,
            DeliveryStatus::Success => SeaDeliveryStatus::Success,
            DeliveryStatus::Failed => SeaDeliveryStatus::Failed,
        }
    }
}

impl From<SeaDeliveryStatus> for DeliveryStatus {
    fn from(status: SeaDeliveryStatus) -> Self {
        match status {
            SeaDeliveryStatus::Pending => DeliveryStatus::Pending,
            SeaDeliveryStatus::Success => DeliveryStatus::Success,
            SeaDeliveryStatus::Failed => DeliveryStatus::Failed,
        }
    }
}

#[async_trait]
impl DeliveryRepository for DeliveryRepoImpl {
    async fn create(&self, record: &DeliveryRecord) -> Result<DeliveryRecord, RepositoryError> {
        let active_model: webhook_delivery::ActiveModel = record.clone().into();

        webhook_delivery::Entity::insert(active_model)
            .exec(self.db.as_ref())
            .await?;

        Ok(record.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DeliveryRecord>, RepositoryError> {
        let model = webhook_delivery::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn update(&self, record: &DeliveryRecord) -> Result<DeliveryRecord, RepositoryError> {
        let mut active: webhook_delivery::ActiveModel =
            webhook_delivery::Entity::find_by_id(record.id)
                .one(self.db.as_ref())
                .await?
                .ok_or(RepositoryError::NotFound)?
                .into();

        active.status = Set(record.status.into());
        active.response_status = Set(record.response_status.map(|s| s as i16));
        active.response_body = Set(record.response_body.clone());
        active.attempt_count = Set(record.attempt_count);
        active.delivered_at = Set(record.delivered_at.map(Into::into));
        active.updated_at = Set(record.updated_at.into());

        let updated_model = active.update(self.db.as_ref()).await?;

        Ok(updated_model.into())
    }

    async fn stats_for_owner(&self, owner_id: Uuid) -> Result<WebhookStats, RepositoryError> {
        let base = webhook_delivery::Entity::find()
            .filter(webhook_delivery::Column::OwnerId.eq(owner_id));

        let total = base.clone().count(self.db.as_ref()).await?;
        let successful = base
            .clone()
            .filter(webhook_delivery::Column::Status.eq(SeaDeliveryStatus::Success))
            .count(self.db.as_ref())
            .await?;
        let failed = base
            .clone()
            .filter(webhook_delivery::Column::Status.eq(SeaDeliveryStatus::Failed))
            .count(self.db.as_ref())
            .await?;
        let pending = base
            .filter(webhook_delivery::Column::Status.eq(SeaDeliveryStatus::Pending))
            .count(self.db.as_ref())
            .await?;

        Ok(WebhookStats {
            total,
            successful,
            failed,
            pending,
        })
    }

    async fn find_recent_for_owner(
        &self,
        owner_id: Uuid,
        limit: u64,
    ) -> Result<Vec<DeliveryRecord>, RepositoryError> {
        let models = webhook_delivery::Entity::find()
            .filter(webhook_delivery::Column::OwnerId.eq(owner_id))
            .order_by_desc(webhook_delivery::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}

impl From<webhook_delivery::Model> for DeliveryRecord {
    fn from(model: webhook_delivery::Model) -> Self {
        Self {
            id: model.id,
            webhook_id: model.webhook_id,
            owner_id: model.owner_id,
            event_type: model
                .event_type
                .parse()
                .unwrap_or(WebhookEventType::Custom(String::new())),
            status: model.status.into(),
            response_status: model.response_status.map(|s| s as i32),
            response_body: model.response_body,
            attempt_count: model.attempt_count,
            payload: model.payload,
            delivered_at: model.delivered_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl From<DeliveryRecord> for webhook_delivery::ActiveModel {
    fn from(record: DeliveryRecord) -> Self {
        Self {
            id: Set(record.id),
            webhook_id: Set(record.webhook_id),
            owner_id: Set(record.owner_id),
            event_type: Set(record.event_type.to_string()),
            status: Set(record.status.into()),
            response_status: Set(record.response_status.map(|s| s as i16)),
            response_body: Set(record.response_body),
            attempt_count: Set(record.attempt_count),
            payload: Set(record.payload),
            delivered_at: Set(record.delivered_at.map(Into::into)),
            created_at: Set(record.created_at.into()),
            updated_at: Set(record.updated_at.into()),
        }
    }
}
