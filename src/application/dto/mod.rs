// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod events;
