// Copyright (c) 2025 Hostreamly
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use hmac::{Hmac, Mac};
use hostreamly_webhooks::delivery::signature::sign_payload;
use sha2::Sha256;

#[test]
fn test_signature_format() {
    let signature = sign_payload("secret", r#"{"event":"video.created"}"#);

    assert!(signature.starts_with("sha256="));
    let hex_part = &signature["sha256=".len()..];
    assert_eq!(hex_part.len(), 64);
    assert!(hex_part.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_signature_is_deterministic() {
    let a = sign_payload("secret", "payload");
    let b = sign_payload("secret", "payload");
    assert_eq!(a, b);
}

#[test]
fn test_signature_depends_on_secret_and_payload() {
    let base = sign_payload("secret", "payload");
    assert_ne!(base, sign_payload("other-secret", "payload"));
    assert_ne!(base, sign_payload("secret", "other-payload"));
}

#[test]
fn test_signature_verifiable_by_receiver() {
    // A receiver holding the shared secret recomputes the HMAC over the raw body
    let secret = "whsec_12345";
    let body = r#"{"event":"video.created","data":{"video_id":"v1"}}"#;

    let signature = sign_payload(secret, body);

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body.as_bytes());
    let expected = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));

    assert_eq!(signature, expected);
}
