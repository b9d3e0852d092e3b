// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用层模块
///
/// 事件通知门面与数据传输对象
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 投递模块
///
/// 实现Webhook签名、投递与事件触发
pub mod delivery;

/// 领域模块
///
/// 包含核心业务实体和仓库接口
pub mod domain;

/// 基础设施模块
///
/// 提供外部服务集成，如数据库和指标导出
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由和处理器
pub mod presentation;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现后台重试调度
pub mod workers;
