// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::webhook::{Webhook, WebhookEventType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 响应体入库前保留的最大字符数
pub const RESPONSE_BODY_LIMIT: usize = 1000;

/// Webhook投递记录实体
///
/// 表示对单个订阅的一次事件通知的持久化结果。首次投递时创建，
/// 重试时原地更新（attempt_count递增），本子系统不删除记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// 投递唯一标识符，重试时复用
    pub id: Uuid,
    /// 目标Webhook订阅ID
    pub webhook_id: Uuid,
    /// 所属用户ID
    pub owner_id: Uuid,
    /// 事件类型
    pub event_type: WebhookEventType,
    /// 投递状态
    pub status: DeliveryStatus,
    /// 最后一次HTTP响应状态码
    pub response_status: Option<i32>,
    /// 最后一次HTTP响应体（截断存储）
    pub response_body: Option<String>,
    /// 已尝试投递次数（含首次）
    pub attempt_count: i32,
    /// 事件负载快照
    pub payload: Value,
    /// 成功投递时间
    pub delivered_at: Option<DateTime<Utc>>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl DeliveryRecord {
    /// 为首次投递尝试创建一条新记录
    pub fn new(webhook: &Webhook, event_type: WebhookEventType, payload: Value) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            webhook_id: webhook.id,
            owner_id: webhook.owner_id,
            event_type,
            status: DeliveryStatus::Pending,
            response_status: None,
            response_body: None,
            attempt_count: 1,
            payload,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 投递状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// 待处理，尝试尚未得出结果
    #[default]
    Pending,
    /// 投递成功（2xx响应）
    Success,
    /// 投递失败（非2xx响应或网络错误）
    Failed,
}

/// 单次事件触发的聚合结果
///
/// 各订阅的成败互不影响，只做计数汇总。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TriggerOutcome {
    /// 匹配到的订阅数
    pub triggered: usize,
    /// 投递成功数
    pub successful: usize,
    /// 投递失败数
    pub failed: usize,
}

/// 用户维度的投递统计
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct WebhookStats {
    /// 总投递数
    pub total: u64,
    /// 成功数
    pub successful: u64,
    /// 失败数
    pub failed: u64,
    /// 待处理数
    pub pending: u64,
}

/// 截断响应体用于入库
///
/// 超过限制时保留前1000个字符并追加`...`后缀
pub fn truncate_response_body(body: &str) -> String {
    if body.chars().count() <= RESPONSE_BODY_LIMIT {
        body.to_string()
    } else {
        let mut truncated: String = body.chars().take(RESPONSE_BODY_LIMIT).collect();
        truncated.push_str("...");
        truncated
    }
}
