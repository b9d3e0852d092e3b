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

use crate::delivery::trigger::{TriggerOptions, WebhookTrigger};
use crate::domain::models::delivery::{DeliveryRecord, TriggerOutcome, WebhookStats};
use crate::domain::models::webhook::WebhookEventType;
use crate::domain::repositories::delivery_repository::DeliveryRepository;
use crate::domain::repositories::webhook_repository::{RepositoryError, WebhookRepository};
use crate::presentation::errors::AppError;
use axum::extract::{Path, Query};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// 事件触发请求体
#[derive(Debug, Deserialize)]
pub struct TriggerEventDto {
    /// 事件类型名，如`video.created`
    pub event: String,
    /// 事件数据
    pub data: Value,
    /// 合并到负载顶层的附加字段
    pub additional_data: Option<Map<String, Value>>,
}

/// 投递历史查询参数
#[derive(Debug, Deserialize)]
pub struct DeliveryQueryDto {
    /// 返回条数上限
    pub limit: Option<u64>,
}

/// 触发一个事件（供内部业务服务调用）
pub async fn trigger_event<W, D>(
    Extension(trigger): Extension<Arc<WebhookTrigger<W, D>>>,
    Path(owner_id): Path<Uuid>,
    Json(dto): Json<TriggerEventDto>,
) -> Result<Json<TriggerOutcome>, AppError>
where
    W: WebhookRepository + 'static,
    D: DeliveryRepository + 'static,
{
    // Event name parsing is infallible, unknown names become Custom events
    let event_type: WebhookEventType = dto.event.parse().unwrap();
    let options = TriggerOptions {
        additional_data: dto.additional_data,
    };

    let outcome = trigger
        .trigger_event(owner_id, event_type, dto.data, options)
        .await?;

    Ok(Json(outcome))
}

/// 查询用户的投递统计
pub async fn get_stats<W, D>(
    Extension(trigger): Extension<Arc<WebhookTrigger<W, D>>>,
    Path(owner_id): Path<Uuid>,
) -> Result<Json<WebhookStats>, AppError>
where
    W: WebhookRepository + 'static,
    D: DeliveryRepository + 'static,
{
    let stats = trigger.get_webhook_stats(owner_id).await?;
    Ok(Json(stats))
}

/// 查询用户最近的投递记录
pub async fn list_deliveries<W, D>(
    Extension(trigger): Extension<Arc<WebhookTrigger<W, D>>>,
    Path(owner_id): Path<Uuid>,
    Query(params): Query<DeliveryQueryDto>,
) -> Result<Json<Vec<DeliveryRecord>>, AppError>
where
    W: WebhookRepository + 'static,
    D: DeliveryRepository + 'static,
{
    let limit = params.limit.unwrap_or(50).min(500);
    let records = trigger.recent_deliveries(owner_id, limit).await?;
    Ok(Json(records))
}

/// 按ID查询单条投递记录
pub async fn get_delivery<D>(
    Extension(repo): Extension<Arc<D>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryRecord>, AppError>
where
    D: DeliveryRepository + 'static,
{
    let record = repo
        .find_by_id(id)
        .await?
        .ok_or(RepositoryError::NotFound)?;
    Ok(Json(record))
}
