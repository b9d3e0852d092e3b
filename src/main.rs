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

use axum::Extension;
use hostreamly_webhooks::config::settings::Settings;
use hostreamly_webhooks::delivery::engine::DeliveryEngine;
use hostreamly_webhooks::delivery::trigger::WebhookTrigger;
use hostreamly_webhooks::infrastructure::database::connection;
use hostreamly_webhooks::infrastructure::repositories::delivery_repo_impl::DeliveryRepoImpl;
use hostreamly_webhooks::infrastructure::repositories::webhook_repo_impl::WebhookRepoImpl;
use hostreamly_webhooks::presentation::routes;
use hostreamly_webhooks::utils::telemetry;
use hostreamly_webhooks::workers::retry_worker::{RetryPolicy, RetryScheduler};
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting hostreamly-webhooks...");

    // Initialize Prometheus Metrics
    hostreamly_webhooks::infrastructure::metrics::init_metrics();

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    // Run database migrations
    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Initialize components
    let webhook_repo = Arc::new(WebhookRepoImpl::new(db.clone()));
    let delivery_repo = Arc::new(DeliveryRepoImpl::new(db.clone()));
    let engine = Arc::new(DeliveryEngine::new(
        webhook_repo.clone(),
        delivery_repo.clone(),
        &settings.webhook.user_agent,
    ));
    let scheduler = Arc::new(RetryScheduler::new(
        engine.clone(),
        RetryPolicy::from(&settings.webhook),
    ));
    let trigger = Arc::new(WebhookTrigger::new(
        webhook_repo.clone(),
        delivery_repo.clone(),
        engine,
        scheduler.clone(),
    ));

    // 5. Start retry sweep worker
    let sweep_handle = tokio::spawn(scheduler.run());

    // 6. Start HTTP server
    let app = routes::routes()
        .layer(Extension(trigger))
        .layer(Extension(delivery_repo))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down workers...");
    sweep_handle.abort();
    info!("Shutdown complete");

    Ok(())
}

/// 等待关闭信号
async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => tracing::error!("Unable to listen for shutdown signal: {}", err),
    }
}
