// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::webhook_repository::RepositoryError;
use crate::domain::models::delivery::{DeliveryRecord, WebhookStats};
use async_trait::async_trait;
use uuid::Uuid;

/// 投递记录仓库特质
///
/// 定义Webhook投递历史数据访问接口
#[async_trait]
pub trait DeliveryRepository: Send + Sync {
    /// 创建投递记录
    async fn create(&self, record: &DeliveryRecord) -> Result<DeliveryRecord, RepositoryError>;
    /// 根据ID查找投递记录
    async fn find_by_id(&self, id: Uuid) -> Result<Option<DeliveryRecord>, RepositoryError>;
    /// 更新投递记录（重试时原地覆盖）
    async fn update(&self, record: &DeliveryRecord) -> Result<DeliveryRecord, RepositoryError>;
    /// 统计指定用户的投递结果
    async fn stats_for_owner(&self, owner_id: Uuid) -> Result<WebhookStats, RepositoryError>;
    /// 查询指定用户最近的投递记录
    async fn find_recent_for_owner(
        &self,
        owner_id: Uuid,
        limit: u64,
    ) -> Result<Vec<DeliveryRecord>, RepositoryError>;
}
