// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 投递记录仓库接口
pub mod delivery_repository;
/// Webhook订阅仓库接口
pub mod webhook_repository;
