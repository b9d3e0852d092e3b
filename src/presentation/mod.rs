// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 错误处理
pub mod errors;
/// 请求处理器
pub mod handlers;
/// 路由
pub mod routes;
