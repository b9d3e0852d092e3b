// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// 未配置重试次数时的默认重试上限
pub const DEFAULT_RETRY_COUNT: i32 = 3;

/// 未配置超时时的默认请求超时（秒）
pub const DEFAULT_TIMEOUT_SECONDS: i32 = 30;

/// Webhook订阅实体
///
/// 表示客户端配置的一个Webhook端点及其订阅的事件集合。
/// 订阅由管理后台创建，本子系统只读（仅更新last_triggered_at）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webhook {
    /// Webhook唯一标识符
    pub id: Uuid,
    /// 所属用户ID，用于权限隔离和归属管理
    pub owner_id: Uuid,
    /// 配置名称，便于管理后台展示
    pub name: String,
    /// 回调URL，接收事件通知的目标地址
    pub url: String,
    /// 订阅的事件类型集合，非空
    pub events: Vec<WebhookEventType>,
    /// 签名密钥，配置后对负载进行HMAC签名
    pub secret: Option<String>,
    /// 自定义HTTP请求头
    pub headers: Option<HashMap<String, String>>,
    /// 最大重试次数
    pub retry_count: i32,
    /// 请求超时时间（秒）
    pub timeout_seconds: i32,
    /// 是否启用
    pub is_active: bool,
    /// 最近一次成功触发时间
    pub last_triggered_at: Option<DateTime<Utc>>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Webhook {
    /// 判断订阅是否包含指定事件类型
    pub fn subscribes_to(&self, event_type: &WebhookEventType) -> bool {
        self.events.iter().any(|e| e == event_type)
    }

    /// 获取生效的重试上限
    ///
    /// 未配置（<= 0）时回退到默认值
    pub fn max_retries(&self) -> i32 {
        if self.retry_count > 0 {
            self.retry_count
        } else {
            DEFAULT_RETRY_COUNT
        }
    }

    /// 获取生效的请求超时
    pub fn timeout(&self) -> Duration {
        let secs = if self.timeout_seconds > 0 {
            self.timeout_seconds
        } else {
            DEFAULT_TIMEOUT_SECONDS
        };
        Duration::from_secs(secs as u64)
    }
}

/// Webhook事件类型枚举
///
/// 定义了视频托管平台中支持的Webhook事件类型，每种类型
/// 对应不同的业务场景和通知内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventType {
    /// 视频创建，视频上传登记完成时触发
    VideoCreated,
    /// 视频更新，视频元数据变更时触发
    VideoUpdated,
    /// 视频删除，视频被移除时触发
    VideoDeleted,
    /// 转码完成，视频编码流水线成功结束时触发
    EncodingCompleted,
    /// 转码失败，视频编码流水线失败时触发
    EncodingFailed,
    /// 直播开始
    LivestreamStarted,
    /// 直播结束
    LivestreamEnded,
    /// 存储达到限额
    StorageLimitReached,
    /// 带宽达到限额
    BandwidthLimitReached,
    /// 其他事件类型，用于扩展自定义事件
    Custom(String),
}

impl fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebhookEventType::VideoCreated => write!(f, "video.created"),
            WebhookEventType::VideoUpdated => write!(f, "video.updated"),
            WebhookEventType::VideoDeleted => write!(f, "video.deleted"),
            WebhookEventType::EncodingCompleted => write!(f, "video.encoding.completed"),
            WebhookEventType::EncodingFailed => write!(f, "video.encoding.failed"),
            WebhookEventType::LivestreamStarted => write!(f, "livestream.started"),
            WebhookEventType::LivestreamEnded => write!(f, "livestream.ended"),
            WebhookEventType::StorageLimitReached => write!(f, "storage.limit_reached"),
            WebhookEventType::BandwidthLimitReached => write!(f, "bandwidth.limit_reached"),
            WebhookEventType::Custom(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for WebhookEventType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "video.created" => WebhookEventType::VideoCreated,
            "video.updated" => WebhookEventType::VideoUpdated,
            "video.deleted" => WebhookEventType::VideoDeleted,
            "video.encoding.completed" => WebhookEventType::EncodingCompleted,
            "video.encoding.failed" => WebhookEventType::EncodingFailed,
            "livestream.started" => WebhookEventType::LivestreamStarted,
            "livestream.ended" => WebhookEventType::LivestreamEnded,
            "storage.limit_reached" => WebhookEventType::StorageLimitReached,
            "bandwidth.limit_reached" => WebhookEventType::BandwidthLimitReached,
            other => WebhookEventType::Custom(other.to_string()),
        })
    }
}

impl Serialize for WebhookEventType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for WebhookEventType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        // Unknown names map to Custom, parsing never fails
        Ok(s.parse().unwrap())
    }
}
