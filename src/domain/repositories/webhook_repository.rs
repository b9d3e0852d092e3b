// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::webhook::{Webhook, WebhookEventType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}

/// Webhook订阅仓库特质
///
/// 定义Webhook订阅数据访问接口。订阅由管理后台写入，
/// 投递子系统只负责查询和更新触发时间。
#[async_trait]
pub trait WebhookRepository: Send + Sync {
    /// 创建Webhook订阅
    async fn create(&self, webhook: &Webhook) -> Result<Webhook, RepositoryError>;
    /// 根据ID查找Webhook订阅
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Webhook>, RepositoryError>;
    /// 查找指定用户订阅了某事件类型的所有启用订阅
    async fn find_active_for_event(
        &self,
        owner_id: Uuid,
        event_type: &WebhookEventType,
    ) -> Result<Vec<Webhook>, RepositoryError>;
    /// 更新订阅的最近触发时间
    async fn mark_triggered(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepositoryError>;
}
