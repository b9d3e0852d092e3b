// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 投递记录模型
pub mod delivery;
/// Webhook订阅模型
pub mod webhook;
