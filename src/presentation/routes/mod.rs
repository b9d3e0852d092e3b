// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::infrastructure::repositories::delivery_repo_impl::DeliveryRepoImpl;
use crate::infrastructure::repositories::webhook_repo_impl::WebhookRepoImpl;
use crate::presentation::handlers::delivery_handler;
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

/// 创建应用路由
///
/// 只读的观测接口加一个供内部服务调用的事件触发入口，
/// 订阅的增删改由管理后台负责，不在本服务暴露。
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version))
        .route(
            "/v1/owners/{owner_id}/events",
            post(delivery_handler::trigger_event::<WebhookRepoImpl, DeliveryRepoImpl>),
        )
        .route(
            "/v1/owners/{owner_id}/webhooks/stats",
            get(delivery_handler::get_stats::<WebhookRepoImpl, DeliveryRepoImpl>),
        )
        .route(
            "/v1/owners/{owner_id}/webhooks/deliveries",
            get(delivery_handler::list_deliveries::<WebhookRepoImpl, DeliveryRepoImpl>),
        )
        .route(
            "/v1/webhooks/deliveries/{id}",
            get(delivery_handler::get_delivery::<DeliveryRepoImpl>),
        )
}

/// 健康检查
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// 版本信息
async fn version() -> Json<serde_json::Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}
