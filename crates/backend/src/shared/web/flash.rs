use axum::http::{header, HeaderMap, HeaderValue};
use contracts::shared::messages::FlashMessage;

/// Cookie carrying messages across a redirect
pub const FLASH_COOKIE: &str = "flash";

/// Messages stored in the request's flash cookie.
/// A missing or unreadable cookie yields no messages.
pub fn read(headers: &HeaderMap) -> Vec<FlashMessage> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == FLASH_COOKIE)
        .map(|(_, value)| decode(value))
        .unwrap_or_default()
}

fn decode(value: &str) -> Vec<FlashMessage> {
    if value.is_empty() {
        return Vec::new();
    }
    let parsed = urlencoding::decode(value)
        .map_err(|e| e.to_string())
        .and_then(|json| serde_json::from_str(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(messages) => messages,
        Err(e) => {
            tracing::debug!("Ignoring unreadable flash cookie: {}", e);
            Vec::new()
        }
    }
}

/// `Set-Cookie` value storing `messages` for the next request
pub fn store(messages: &[FlashMessage]) -> Option<HeaderValue> {
    let json = serde_json::to_string(messages).ok()?;
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        FLASH_COOKIE,
        urlencoding::encode(&json)
    ))
    .ok()
}

/// `Set-Cookie` value removing the flash cookie
pub fn clear() -> HeaderValue {
    HeaderValue::from_static("flash=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}
