//! 세션 쿠키 처리
//!
//! 세션 ID 는 결과 디렉토리 이름으로도 쓰이므로 UUID 형식만 받아들인다.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session_id";

/// 요청 쿠키에서 유효한 세션 ID 를 찾는다
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| Uuid::parse_str(value).is_ok())
        .map(str::to_string)
}

/// 기존 세션 ID 를 쓰거나 새로 발급한다. 새로 발급한 경우 Set-Cookie 값도 돌려준다.
pub fn resolve(headers: &HeaderMap, ttl_secs: u64) -> (String, Option<String>) {
    match session_id(headers) {
        Some(id) => (id, None),
        None => {
            let id = Uuid::new_v4().to_string();
            let cookie = format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
                SESSION_COOKIE, id, ttl_secs
            );
            (id, Some(cookie))
        }
    }
}

pub fn with_cookie(mut response: Response, cookie: Option<String>) -> Response {
    if let Some(value) = cookie.and_then(|c| HeaderValue::from_str(&c).ok()) {
        response.headers_mut().append(SET_COOKIE, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_session_id_from_cookie() {
        let id = Uuid::new_v4().to_string();
        let h = headers(&format!("theme=dark; session_id={}", id));
        assert_eq!(session_id(&h), Some(id));
    }

    #[test]
    fn test_rejects_non_uuid_session() {
        let h = headers("session_id=../../etc");
        assert_eq!(session_id(&h), None);
        assert_eq!(session_id(&HeaderMap::new()), None);
    }

    #[test]
    fn test_resolve_issues_cookie_only_when_missing() {
        let (id, cookie) = resolve(&HeaderMap::new(), 3600);
        let cookie = cookie.unwrap();
        assert!(cookie.starts_with(&format!("session_id={};", id)));
        assert!(cookie.contains("Max-Age=3600"));

        let (same, cookie) = resolve(&headers(&format!("session_id={}", id)), 3600);
        assert_eq!(same, id);
        assert!(cookie.is_none());
    }
}
