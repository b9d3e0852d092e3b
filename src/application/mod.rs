// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据传输对象
pub mod dto;
/// 事件通知门面
pub mod notifier;
