// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 投递引擎
pub mod engine;
/// 负载签名
pub mod signature;
/// 事件触发
pub mod trigger;
