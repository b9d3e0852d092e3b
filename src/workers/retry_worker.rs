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

use crate::config::settings::WebhookSettings;
use crate::delivery::engine::{DeliveryDisposition, DeliveryEngine};
use crate::domain::models::webhook::Webhook;
use crate::domain::repositories::delivery_repository::DeliveryRepository;
use crate::domain::repositories::webhook_repository::WebhookRepository;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use metrics::counter;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

/// 重试队列项
///
/// 进程内的临时描述符，不做持久化；成功、耗尽重试次数或
/// 超过保留时限时销毁。进程重启会丢弃所有待重试项。
#[derive(Debug, Clone)]
pub struct RetryItem {
    /// 目标订阅快照
    pub webhook: Webhook,
    /// 事件负载
    pub payload: Value,
    /// 复用的投递记录ID
    pub delivery_id: Uuid,
    /// 已尝试投递次数（含首次投递）
    pub attempts: i32,
    /// 计划重试时间
    pub scheduled_for: DateTime<Utc>,
    /// 入队时间，用于超龄清理
    pub enqueued_at: DateTime<Utc>,
}

/// 重试策略
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 首次重试延迟
    pub initial_delay: ChronoDuration,
    /// 指数退避的时间单位，第n次重试延迟为`2^n`个单位
    pub backoff_unit: ChronoDuration,
    /// 队列扫描间隔
    pub sweep_interval: Duration,
    /// 队列项最长保留时间
    pub max_age: ChronoDuration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: ChronoDuration::minutes(5),
            backoff_unit: ChronoDuration::minutes(1),
            sweep_interval: Duration::from_secs(300),
            max_age: ChronoDuration::hours(24),
        }
    }
}

impl From<&WebhookSettings> for RetryPolicy {
    fn from(settings: &WebhookSettings) -> Self {
        Self {
            initial_delay: ChronoDuration::seconds(settings.initial_retry_delay_seconds as i64),
            backoff_unit: ChronoDuration::minutes(1),
            sweep_interval: Duration::from_secs(settings.retry_interval_seconds),
            max_age: ChronoDuration::hours(settings.max_retry_age_hours as i64),
        }
    }
}

/// Webhook重试调度器
///
/// 维护进程内重试队列并周期性扫描到期项，对瞬时失败的投递
/// 按指数退避重新尝试。扫描互斥由协作式标志保证，同一时刻
/// 只有一轮扫描在执行。
pub struct RetryScheduler<W, D> {
    /// 投递引擎
    engine: Arc<DeliveryEngine<W, D>>,
    /// 重试策略
    policy: RetryPolicy,
    /// 重试队列
    queue: Mutex<Vec<RetryItem>>,
    /// 扫描进行中标志
    is_processing: AtomicBool,
}

impl<W, D> RetryScheduler<W, D>
where
    W: WebhookRepository,
    D: DeliveryRepository,
{
    /// 创建新的重试调度器
    pub fn new(engine: Arc<DeliveryEngine<W, D>>, policy: RetryPolicy) -> Self {
        Self {
            engine,
            policy,
            queue: Mutex::new(Vec::new()),
            is_processing: AtomicBool::new(false),
        }
    }

    /// 为一次失败的投递安排首次重试
    pub fn schedule_retry(&self, webhook: Webhook, payload: Value, delivery_id: Uuid) {
        let scheduled_for = Utc::now() + self.policy.initial_delay;

        info!(
            "Scheduling retry for delivery {} at {}",
            delivery_id, scheduled_for
        );
        counter!("webhook_retry_scheduled_total").increment(1);

        self.queue.lock().push(RetryItem {
            webhook,
            payload,
            delivery_id,
            attempts: 1,
            scheduled_for,
            enqueued_at: Utc::now(),
        });
    }

    /// 当前队列长度
    pub fn queue_len(&self) -> usize {
        self.queue.lock().len()
    }

    /// 队列快照
    pub fn pending(&self) -> Vec<RetryItem> {
        self.queue.lock().clone()
    }

    /// 处理到期的重试项
    ///
    /// 扫描已在进行或队列为空时直接返回。到期项被取出后逐个
    /// 重新投递：成功即移除；仍可重试则按`2^attempts`个退避单位
    /// 顺延；达到订阅的重试上限后丢弃。最后清除超龄项。
    pub async fn process_retry_queue(&self) {
        if self.queue.lock().is_empty() {
            return;
        }
        if self.is_processing.swap(true, Ordering::SeqCst) {
            return;
        }

        let now = Utc::now();
        let due: Vec<RetryItem> = {
            let mut queue = self.queue.lock();
            let (due, rest): (Vec<_>, Vec<_>) = queue
                .drain(..)
                .partition(|i| i.scheduled_for <= now && i.attempts <= i.webhook.max_retries());
            *queue = rest;
            due
        };

        if !due.is_empty() {
            info!("Processing {} due webhook retries", due.len());
        }

        for mut item in due {
            let result = self
                .engine
                .deliver(&item.webhook, &item.payload, Some(item.delivery_id))
                .await;

            match result {
                Ok(outcome) => match outcome.disposition {
                    DeliveryDisposition::Delivered => {
                        info!("Retry for delivery {} succeeded", item.delivery_id);
                    }
                    DeliveryDisposition::Rejected => {
                        // Receiver now refuses the event, stop retrying
                        warn!(
                            "Delivery {} rejected by receiver on retry, giving up",
                            item.delivery_id
                        );
                    }
                    DeliveryDisposition::Retryable => {
                        item.attempts += 1;

                        if item.attempts > item.webhook.max_retries() {
                            warn!(
                                "Delivery {} dropped after exhausting {} retries",
                                item.delivery_id,
                                item.webhook.max_retries()
                            );
                            counter!("webhook_retry_exhausted_total").increment(1);
                        } else {
                            let exponent = (item.attempts as u32).min(16);
                            item.scheduled_for =
                                Utc::now() + self.policy.backoff_unit * 2i32.pow(exponent);
                            self.queue.lock().push(item);
                        }
                    }
                },
                Err(e) => {
                    // Database hiccup, keep the item and try again next sweep
                    error!(
                        "Retry for delivery {} failed to record outcome: {}",
                        item.delivery_id, e
                    );
                    item.scheduled_for = Utc::now() + self.policy.initial_delay;
                    self.queue.lock().push(item);
                }
            }
        }

        // Safety valve against unbounded queue growth
        let cutoff = Utc::now() - self.policy.max_age;
        let mut queue = self.queue.lock();
        let before = queue.len();
        queue.retain(|i| i.enqueued_at > cutoff);
        let purged = before - queue.len();
        drop(queue);
        if purged > 0 {
            warn!("Purged {} stale webhook retries", purged);
            counter!("webhook_retry_purged_total").increment(purged as u64);
        }

        self.is_processing.store(false, Ordering::SeqCst);
    }

    /// 运行重试扫描循环
    ///
    /// 按固定间隔扫描重试队列，直到任务被取消
    pub async fn run(self: Arc<Self>) {
        info!("Webhook retry scheduler started");
        let mut ticker = tokio::time::interval(self.policy.sweep_interval);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.process_retry_queue().await;
        }
    }
}
