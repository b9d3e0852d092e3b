// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 视频事件数据传输对象
///
/// 视频创建与更新通知携带的字段子集
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoEventData {
    /// 视频ID（流媒体服务侧的GUID）
    pub video_id: String,
    /// 视频标题
    pub title: String,
    /// 时长（秒）
    pub duration: i64,
    /// 文件大小（字节）
    pub size: i64,
    /// 封装格式
    pub format: String,
}

/// 转码完成事件数据传输对象
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingEventData {
    /// 视频ID
    pub video_id: String,
    /// 转码产出的清晰度档位
    pub resolutions: Vec<String>,
}

/// 直播开始事件数据传输对象
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivestreamEventData {
    /// 直播间ID
    pub stream_id: String,
    /// 直播标题
    pub title: String,
}

/// 直播结束事件数据传输对象
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivestreamEndedData {
    /// 直播间ID
    pub stream_id: String,
    /// 直播时长（秒）
    pub duration_seconds: i64,
    /// 峰值观看人数
    pub peak_viewers: i64,
}

/// 用量限额事件数据传输对象
///
/// 存储与带宽限额告警共用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageLimitEventData {
    /// 已用量（字节）
    pub used: i64,
    /// 限额（字节）
    pub limit: i64,
    /// 已用百分比
    pub percentage: f64,
}
