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

use crate::delivery::engine::DeliveryEngine;
use crate::domain::models::delivery::{DeliveryRecord, TriggerOutcome, WebhookStats};
use crate::domain::models::webhook::WebhookEventType;
use crate::domain::repositories::delivery_repository::DeliveryRepository;
use crate::domain::repositories::webhook_repository::{RepositoryError, WebhookRepository};
use crate::workers::retry_worker::RetryScheduler;
use chrono::Utc;
use futures::future::join_all;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// 触发事件时的可选参数
#[derive(Debug, Default, Clone)]
pub struct TriggerOptions {
    /// 合并到负载顶层的附加字段
    pub additional_data: Option<Map<String, Value>>,
}

/// Webhook事件触发器
///
/// 查询匹配的订阅、构建统一负载并发起并发投递。
/// 各订阅的投递彼此独立，单个失败不会阻塞或影响其他订阅。
pub struct WebhookTrigger<W, D> {
    /// 订阅仓库
    webhooks: Arc<W>,
    /// 投递记录仓库
    deliveries: Arc<D>,
    /// 投递引擎
    engine: Arc<DeliveryEngine<W, D>>,
    /// 重试调度器
    scheduler: Arc<RetryScheduler<W, D>>,
}

impl<W, D> WebhookTrigger<W, D>
where
    W: WebhookRepository,
    D: DeliveryRepository,
{
    /// 创建新的事件触发器
    pub fn new(
        webhooks: Arc<W>,
        deliveries: Arc<D>,
        engine: Arc<DeliveryEngine<W, D>>,
        scheduler: Arc<RetryScheduler<W, D>>,
    ) -> Self {
        Self {
            webhooks,
            deliveries,
            engine,
            scheduler,
        }
    }

    /// 触发一个事件
    ///
    /// 向指定用户的所有匹配订阅并发投递。没有匹配订阅时直接
    /// 返回零计数，不视为错误。
    ///
    /// # 返回值
    ///
    /// * `Ok(TriggerOutcome)` - 各订阅投递结果的计数汇总
    /// * `Err(RepositoryError)` - 订阅查询或记录读写失败
    pub async fn trigger_event(
        &self,
        owner_id: Uuid,
        event_type: WebhookEventType,
        event_data: Value,
        options: TriggerOptions,
    ) -> Result<TriggerOutcome, RepositoryError> {
        let webhooks = self
            .webhooks
            .find_active_for_event(owner_id, &event_type)
            .await?;

        if webhooks.is_empty() {
            debug!("No active subscriptions for {} event {}", owner_id, event_type);
            return Ok(TriggerOutcome::default());
        }

        let payload = build_event_payload(
            owner_id,
            &event_type,
            event_data,
            options.additional_data.as_ref(),
        );

        info!(
            "Triggering {} for {} subscription(s)",
            event_type,
            webhooks.len()
        );

        // Fire all deliveries in parallel and wait for every one to settle
        let results = join_all(
            webhooks
                .iter()
                .map(|w| self.engine.deliver(w, &payload, None)),
        )
        .await;

        let mut outcome = TriggerOutcome {
            triggered: webhooks.len(),
            ..Default::default()
        };
        let mut first_error = None;

        for (webhook, result) in webhooks.iter().zip(results) {
            match result {
                Ok(delivery) => {
                    if delivery.delivered() {
                        outcome.successful += 1;
                    } else {
                        outcome.failed += 1;
                        if delivery.retryable() {
                            self.scheduler.schedule_retry(
                                webhook.clone(),
                                payload.clone(),
                                delivery.record.id,
                            );
                        }
                    }
                }
                // Database errors propagate, but only after every delivery settled
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        Ok(outcome)
    }

    /// 查询指定用户的投递统计
    pub async fn get_webhook_stats(&self, owner_id: Uuid) -> Result<WebhookStats, RepositoryError> {
        self.deliveries.stats_for_owner(owner_id).await
    }

    /// 查询指定用户最近的投递记录
    pub async fn recent_deliveries(
        &self,
        owner_id: Uuid,
        limit: u64,
    ) -> Result<Vec<DeliveryRecord>, RepositoryError> {
        self.deliveries.find_recent_for_owner(owner_id, limit).await
    }
}

/// 构建统一的事件负载
///
/// 形如`{event, timestamp, data: {...event_data, owner_id}, ...additional}`，
/// timestamp为投递时刻的ISO-8601时间。
pub fn build_event_payload(
    owner_id: Uuid,
    event_type: &WebhookEventType,
    event_data: Value,
    additional: Option<&Map<String, Value>>,
) -> Value {
    let mut data = match event_data {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    data.insert(
        "owner_id".to_string(),
        Value::String(owner_id.to_string()),
    );

    let mut payload = Map::new();
    payload.insert("event".to_string(), Value::String(event_type.to_string()));
    payload.insert(
        "timestamp".to_string(),
        Value::String(Utc::now().to_rfc3339()),
    );
    payload.insert("data".to_string(), Value::Object(data));

    if let Some(extra) = additional {
        for (key, value) in extra {
            payload.insert(key.clone(), value.clone());
        }
    }

    Value::Object(payload)
}
