use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use contracts::shared::messages::FlashMessage;

use super::flash;

/// Header set by the frontend on asynchronous requests
pub const REQUESTED_WITH: &str = "x-requested-with";

pub fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get(REQUESTED_WITH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("XMLHttpRequest"))
}

/// Per-request view state: response flavour and messages pending display
#[derive(Debug, Clone, Default)]
pub struct ViewContext {
    pub ajax: bool,
    /// Messages left by the previous request
    pub messages: Vec<FlashMessage>,
}

#[async_trait]
impl<S> FromRequestParts<S> for ViewContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            ajax: is_ajax(&parts.headers),
            messages: flash::read(&parts.headers),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_is_ajax() {
        let mut headers = HeaderMap::new();
        assert!(!is_ajax(&headers));
        headers.insert(REQUESTED_WITH, HeaderValue::from_static("XMLHttpRequest"));
        assert!(is_ajax(&headers));
        headers.insert(REQUESTED_WITH, HeaderValue::from_static("fetch"));
        assert!(!is_ajax(&headers));
    }
}
