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

use crate::delivery::signature::sign_payload;
use crate::domain::models::delivery::{truncate_response_body, DeliveryRecord, DeliveryStatus};
use crate::domain::models::webhook::{Webhook, WebhookEventType};
use crate::domain::repositories::delivery_repository::DeliveryRepository;
use crate::domain::repositories::webhook_repository::{RepositoryError, WebhookRepository};
use chrono::Utc;
use metrics::{counter, histogram};
use reqwest::{header, Client};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};
use url::Url;
use uuid::Uuid;

/// 单次投递的处置结果
///
/// 决定一次已完成的尝试之后是否还会重试。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryDisposition {
    /// 投递成功（2xx）
    Delivered,
    /// 接收方拒绝（非2xx且<500）或URL无效，视为永久失败，不再重试
    Rejected,
    /// 瞬时失败（5xx、网络错误或超时），可重试
    Retryable,
}

/// 一次投递尝试的完整结果
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    /// 持久化后的投递记录
    pub record: DeliveryRecord,
    /// 处置结果
    pub disposition: DeliveryDisposition,
}

impl DeliveryOutcome {
    /// 本次尝试是否成功
    pub fn delivered(&self) -> bool {
        self.disposition == DeliveryDisposition::Delivered
    }

    /// 失败是否可重试
    pub fn retryable(&self) -> bool {
        self.disposition == DeliveryDisposition::Retryable
    }
}

/// Webhook投递引擎
///
/// 负责单次投递：签名、发送HTTP POST并持久化结果。
/// HTTP层面的失败不会抛出，只有数据库错误会向调用方传播。
pub struct DeliveryEngine<W, D> {
    /// HTTP客户端
    client: Client,
    /// 订阅仓库
    webhooks: Arc<W>,
    /// 投递记录仓库
    deliveries: Arc<D>,
}

impl<W, D> DeliveryEngine<W, D>
where
    W: WebhookRepository,
    D: DeliveryRepository,
{
    /// 创建新的投递引擎
    ///
    /// # 参数
    ///
    /// * `webhooks` - 订阅仓库
    /// * `deliveries` - 投递记录仓库
    /// * `user_agent` - 外发请求的User-Agent
    pub fn new(webhooks: Arc<W>, deliveries: Arc<D>, user_agent: &str) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(user_agent).unwrap_or_else(|_| {
                header::HeaderValue::from_static("Hostreamly-Webhook/0.1.0")
            }),
        );
        Self {
            webhooks,
            deliveries,
            client: Client::builder()
                .default_headers(headers)
                .redirect(reqwest::redirect::Policy::limited(3))
                .build()
                .unwrap(),
        }
    }

    /// 执行一次投递尝试
    ///
    /// 首次投递创建记录；重试时传入`existing_delivery_id`复用原记录，
    /// attempt_count递增，状态与响应字段被覆盖。
    ///
    /// # 返回值
    ///
    /// * `Ok(DeliveryOutcome)` - 尝试已完成（无论HTTP层成败）
    /// * `Err(RepositoryError)` - 投递记录读写失败
    pub async fn deliver(
        &self,
        webhook: &Webhook,
        payload: &Value,
        existing_delivery_id: Option<Uuid>,
    ) -> Result<DeliveryOutcome, RepositoryError> {
        counter!("webhook_delivery_attempts_total").increment(1);

        let mut record = self.prepare_record(webhook, payload, existing_delivery_id).await?;

        // A malformed URL can never succeed, fail it permanently up front
        if let Err(e) = Url::parse(&webhook.url) {
            record.status = DeliveryStatus::Failed;
            record.response_status = None;
            record.response_body =
                Some(truncate_response_body(&format!("invalid webhook URL: {}", e)));
            record.updated_at = Utc::now();
            let record = self.deliveries.update(&record).await?;

            error!(
                "Webhook {} has invalid URL {}: {}",
                record.id, webhook.url, e
            );
            counter!("webhook_delivery_failed_total", "reason" => "invalid_url").increment(1);
            return Ok(DeliveryOutcome {
                record,
                disposition: DeliveryDisposition::Rejected,
            });
        }

        info!(
            "Delivering webhook {} (attempt {}) to {}",
            record.id, record.attempt_count, webhook.url
        );

        let body = payload.to_string();
        let start = std::time::Instant::now();

        let mut request = self
            .client
            .post(&webhook.url)
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Webhook-Timestamp", Utc::now().to_rfc3339())
            .header("X-Webhook-ID", record.id.to_string())
            .header("X-Webhook-Event", record.event_type.to_string())
            .timeout(webhook.timeout());

        if let Some(custom) = &webhook.headers {
            for (name, value) in custom {
                request = request.header(name.as_str(), value.as_str());
            }
        }

        if let Some(secret) = &webhook.secret {
            request = request.header("X-Webhook-Signature", sign_payload(secret, &body));
        }

        let response = request.body(body).send().await;

        let duration = start.elapsed();
        histogram!("webhook_delivery_duration_seconds").record(duration.as_secs_f64());

        let disposition = match response {
            Ok(resp) => {
                let status = resp.status();
                record.response_status = Some(status.as_u16() as i32);
                let text = resp.text().await.unwrap_or_default();
                record.response_body = Some(truncate_response_body(&text));

                if status.is_success() {
                    record.status = DeliveryStatus::Success;
                    record.delivered_at = Some(Utc::now());
                    self.webhooks.mark_triggered(webhook.id, Utc::now()).await?;

                    info!("Webhook {} delivered successfully", record.id);
                    counter!("webhook_delivery_success_total").increment(1);
                    DeliveryDisposition::Delivered
                } else if status.is_server_error() {
                    record.status = DeliveryStatus::Failed;

                    error!(
                        "Webhook {} delivery failed with status: {}",
                        record.id, status
                    );
                    counter!("webhook_delivery_failed_total", "reason" => "server_error")
                        .increment(1);
                    DeliveryDisposition::Retryable
                } else {
                    // Non-2xx below 500: the receiver refused the event, assumed permanent
                    record.status = DeliveryStatus::Failed;

                    error!(
                        "Webhook {} rejected by receiver with status: {}",
                        record.id, status
                    );
                    counter!("webhook_delivery_failed_total", "reason" => "client_error")
                        .increment(1);
                    DeliveryDisposition::Rejected
                }
            }
            Err(e) => {
                // Network failure or timeout, no response to record
                record.status = DeliveryStatus::Failed;
                record.response_status = None;
                record.response_body = Some(truncate_response_body(&e.to_string()));

                error!("Webhook {} delivery failed with error: {}", record.id, e);
                counter!("webhook_delivery_failed_total", "reason" => "network_error").increment(1);
                DeliveryDisposition::Retryable
            }
        };

        record.updated_at = Utc::now();
        let record = self.deliveries.update(&record).await?;

        Ok(DeliveryOutcome {
            record,
            disposition,
        })
    }

    /// 准备本次尝试要写入的投递记录
    ///
    /// 重试时按ID取回原记录并递增attempt_count；原记录意外缺失时
    /// 以同一ID重建，保证重试不会产生重复记录。
    async fn prepare_record(
        &self,
        webhook: &Webhook,
        payload: &Value,
        existing_delivery_id: Option<Uuid>,
    ) -> Result<DeliveryRecord, RepositoryError> {
        if let Some(id) = existing_delivery_id {
            if let Some(mut record) = self.deliveries.find_by_id(id).await? {
                record.attempt_count += 1;
                return Ok(record);
            }

            let mut record =
                DeliveryRecord::new(webhook, event_type_of(payload), payload.clone());
            record.id = id;
            return self.deliveries.create(&record).await;
        }

        let record = DeliveryRecord::new(webhook, event_type_of(payload), payload.clone());
        self.deliveries.create(&record).await
    }
}

/// 从负载中读取事件类型
fn event_type_of(payload: &Value) -> WebhookEventType {
    payload
        .get("event")
        .and_then(|v| v.as_str())
        .map(|s| s.parse::<WebhookEventType>().unwrap())
        .unwrap_or_else(|| WebhookEventType::Custom("unknown".to_string()))
}
