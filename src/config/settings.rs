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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含数据库、服务器和Webhook投递等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 服务器配置
    pub server: ServerSettings,
    /// Webhook投递配置
    pub webhook: WebhookSettings,
}

/// 数据库配置设置
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// Webhook投递配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookSettings {
    /// 外发请求的User-Agent
    pub user_agent: String,
    /// 重试队列扫描间隔（秒）
    pub retry_interval_seconds: u64,
    /// 首次重试延迟（秒）
    pub initial_retry_delay_seconds: u64,
    /// 重试项最长保留时间（小时），超龄强制清除
    pub max_retry_age_hours: u64,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            user_agent: "Hostreamly-Webhook/0.1.0".to_string(),
            retry_interval_seconds: 300,
            initial_retry_delay_seconds: 300,
            max_retry_age_hours: 24,
        }
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default DB pool settings
            .set_default("database.max_connections", 100)?
            .set_default("database.min_connections", 10)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default Webhook delivery settings
            .set_default("webhook.user_agent", "Hostreamly-Webhook/0.1.0")?
            .set_default("webhook.retry_interval_seconds", 300)?
            .set_default("webhook.initial_retry_delay_seconds", 300)?
            .set_default("webhook.max_retry_age_hours", 24)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("HOSTREAMLY").separator("__"));

        builder.build()?.try_deserialize()
    }
}
