//! One-shot messages carried across the post/redirect/get cycle in a cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar};

use super::Message;

pub const FLASH_COOKIE: &str = "admin_flash";

/// Browsers drop cookies past 4096 bytes; leave room for the name and attributes.
const MAX_VALUE_BYTES: usize = 3800;

fn encode(messages: &[Message]) -> Option<String> {
    serde_json::to_string(messages).ok()
}

fn decode(value: &str) -> Vec<Message> {
    serde_json::from_str(value).unwrap_or_default()
}

/// Size of the value once percent-encoded on the wire.
fn wire_len(value: &str) -> usize {
    urlencoding::encode(value).len()
}

/// Queues `messages` for the next page, keeping any not yet shown. The oldest
/// are dropped first when the queue would not fit in one cookie.
pub fn push(jar: CookieJar, messages: &[Message]) -> CookieJar {
    if messages.is_empty() {
        return jar;
    }
    let mut queued = jar.get(FLASH_COOKIE).map(|c| decode(c.value())).unwrap_or_default();
    queued.extend_from_slice(messages);

    while !queued.is_empty() {
        match encode(&queued) {
            Some(value) if wire_len(&value) <= MAX_VALUE_BYTES => {
                return jar.add(Cookie::build((FLASH_COOKIE, value)).path("/admin").http_only(true));
            }
            _ => {
                queued.remove(0);
            }
        }
    }
    tracing::warn!("flash messages too large for a cookie, dropped");
    jar
}

/// Removes and returns the queued messages.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<Message>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, Vec::new());
    };
    let messages = decode(cookie.value());
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/admin")), messages)
}
