// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// 为序列化后的事件负载生成签名
///
/// 接收方可用共享密钥对请求体重新计算HMAC-SHA256以校验来源。
///
/// # 参数
///
/// * `secret` - 订阅配置的签名密钥
/// * `payload` - 序列化后的JSON负载
///
/// # 返回值
///
/// 返回`sha256=<hex>`格式的签名串
pub fn sign_payload(secret: &str, payload: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    let digest = mac.finalize().into_bytes();
    format!("sha256={}", hex::encode(digest))
}
