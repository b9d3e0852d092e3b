// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::events::{
    EncodingEventData, LivestreamEndedData, LivestreamEventData, UsageLimitEventData,
    VideoEventData,
};
use crate::delivery::trigger::{TriggerOptions, WebhookTrigger};
use crate::domain::models::delivery::TriggerOutcome;
use crate::domain::models::webhook::WebhookEventType;
use crate::domain::repositories::delivery_repository::DeliveryRepository;
use crate::domain::repositories::webhook_repository::WebhookRepository;
use anyhow::Result;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Webhook事件通知门面
///
/// 为上游业务（视频流水线、直播控制、计费）提供按事件类型
/// 封装好的便捷方法。只负责组装负载并转发给触发器，本身不做
/// 校验，触发器抛出的错误原样向上传播。
pub struct WebhookNotifier<W, D> {
    trigger: Arc<WebhookTrigger<W, D>>,
}

impl<W, D> WebhookNotifier<W, D>
where
    W: WebhookRepository,
    D: DeliveryRepository,
{
    /// 创建新的事件通知门面
    pub fn new(trigger: Arc<WebhookTrigger<W, D>>) -> Self {
        Self { trigger }
    }

    async fn emit(
        &self,
        owner_id: Uuid,
        event_type: WebhookEventType,
        data: Value,
    ) -> Result<TriggerOutcome> {
        let outcome = self
            .trigger
            .trigger_event(owner_id, event_type, data, TriggerOptions::default())
            .await?;
        Ok(outcome)
    }

    /// 视频创建通知
    pub async fn on_video_created(
        &self,
        owner_id: Uuid,
        video: &VideoEventData,
    ) -> Result<TriggerOutcome> {
        self.emit(
            owner_id,
            WebhookEventType::VideoCreated,
            serde_json::to_value(video)?,
        )
        .await
    }

    /// 视频更新通知
    pub async fn on_video_updated(
        &self,
        owner_id: Uuid,
        video: &VideoEventData,
    ) -> Result<TriggerOutcome> {
        self.emit(
            owner_id,
            WebhookEventType::VideoUpdated,
            serde_json::to_value(video)?,
        )
        .await
    }

    /// 视频删除通知
    pub async fn on_video_deleted(&self, owner_id: Uuid, video_id: &str) -> Result<TriggerOutcome> {
        self.emit(
            owner_id,
            WebhookEventType::VideoDeleted,
            json!({ "video_id": video_id }),
        )
        .await
    }

    /// 转码完成通知
    pub async fn on_encoding_completed(
        &self,
        owner_id: Uuid,
        encoding: &EncodingEventData,
    ) -> Result<TriggerOutcome> {
        self.emit(
            owner_id,
            WebhookEventType::EncodingCompleted,
            serde_json::to_value(encoding)?,
        )
        .await
    }

    /// 转码失败通知
    pub async fn on_encoding_failed(
        &self,
        owner_id: Uuid,
        video_id: &str,
        error: &str,
    ) -> Result<TriggerOutcome> {
        self.emit(
            owner_id,
            WebhookEventType::EncodingFailed,
            json!({ "video_id": video_id, "error": error }),
        )
        .await
    }

    /// 直播开始通知
    pub async fn on_livestream_started(
        &self,
        owner_id: Uuid,
        stream: &LivestreamEventData,
    ) -> Result<TriggerOutcome> {
        self.emit(
            owner_id,
            WebhookEventType::LivestreamStarted,
            serde_json::to_value(stream)?,
        )
        .await
    }

    /// 直播结束通知
    pub async fn on_livestream_ended(
        &self,
        owner_id: Uuid,
        stream: &LivestreamEndedData,
    ) -> Result<TriggerOutcome> {
        self.emit(
            owner_id,
            WebhookEventType::LivestreamEnded,
            serde_json::to_value(stream)?,
        )
        .await
    }

    /// 存储限额通知
    pub async fn on_storage_limit_reached(
        &self,
        owner_id: Uuid,
        usage: &UsageLimitEventData,
    ) -> Result<TriggerOutcome> {
        self.emit(
            owner_id,
            WebhookEventType::StorageLimitReached,
            serde_json::to_value(usage)?,
        )
        .await
    }

    /// 带宽限额通知
    pub async fn on_bandwidth_limit_reached(
        &self,
        owner_id: Uuid,
        usage: &UsageLimitEventData,
    ) -> Result<TriggerOutcome> {
        self.emit(
            owner_id,
            WebhookEventType::BandwidthLimitReached,
            serde_json::to_value(usage)?,
        )
        .await
    }
}
