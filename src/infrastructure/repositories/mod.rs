// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod delivery_repo_impl;
pub mod webhook_repo_impl;
