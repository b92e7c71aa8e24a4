use std::path::Path as FsPath;

use axum::extract::{Form, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info};

use crate::service::ScrapeRequest;
use crate::status::TaskStatus;

use super::pages;
use super::session::{self, with_cookie};
use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ScrapeForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "taskID")]
    pub task_id: String,
}

#[derive(Debug)]
pub enum WebError {
    NoSession,
    InvalidFileName,
    FileNotFound,
    Internal(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            WebError::NoSession => (
                StatusCode::FORBIDDEN,
                "사용자 정보를 찾을 수 없습니다. 다시 로그인해주세요.".to_string(),
            ),
            WebError::InvalidFileName => {
                (StatusCode::BAD_REQUEST, "잘못된 파일 이름입니다.".to_string())
            }
            WebError::FileNotFound => (StatusCode::NOT_FOUND, "파일을 찾을 수 없습니다.".to_string()),
            WebError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, e),
        };
        (status, message).into_response()
    }
}

pub async fn index() -> Html<String> {
    Html(pages::index())
}

/// 세션을 발급하고 작업 요청 화면을 보여준다
pub async fn login(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (session_id, cookie) = session::resolve(&headers, state.session_ttl_secs);
    debug!("Dashboard for session {}", session_id);
    with_cookie(Html(pages::dashboard(None)).into_response(), cookie)
}

/// 백그라운드 작업을 시작하고 상태 화면으로 보낸다
pub async fn scrape(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ScrapeForm>,
) -> Response {
    let (session_id, cookie) = session::resolve(&headers, state.session_ttl_secs);

    let fields = [&form.name, &form.password, &form.task_id];
    if fields.iter().any(|f| f.trim().is_empty()) {
        let page = pages::dashboard(Some("모든 필드를 입력해주세요."));
        return with_cookie(Html(page).into_response(), cookie);
    }

    let request = ScrapeRequest::new(form.name, form.password, form.task_id.trim())
        .with_session_id(session_id.as_str());
    if !state.service.spawn(request) {
        let page = pages::dashboard(Some("이미 진행 중인 작업이 있습니다."));
        return with_cookie(Html(page).into_response(), cookie);
    }

    info!("Task started for session {}", session_id);
    with_cookie(Redirect::to("/status").into_response(), cookie)
}

fn current_status(state: &AppState, headers: &HeaderMap) -> TaskStatus {
    session::session_id(headers)
        .map(|id| state.service.status().get(&id))
        .unwrap_or_else(TaskStatus::not_started)
}

pub async fn status(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    Html(pages::status(&current_status(&state, &headers)))
}

pub async fn status_json(State(state): State<AppState>, headers: HeaderMap) -> Json<TaskStatus> {
    Json(current_status(&state, &headers))
}

/// 세션 디렉토리의 파일을 첨부 파일로 내려준다
pub async fn download(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(filename): Path<String>,
) -> Result<Response, WebError> {
    let session_id = session::session_id(&headers).ok_or(WebError::NoSession)?;
    if !is_plain_file_name(&filename) {
        return Err(WebError::InvalidFileName);
    }

    let path = state.service.config().session_dir(&session_id).join(&filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(WebError::FileNotFound),
        Err(e) => return Err(WebError::Internal(e.to_string())),
    };
    info!("Serving {:?} ({} bytes)", path, bytes.len());

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    let mut response = bytes.into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type(&filename)));
    headers.insert(CONTENT_DISPOSITION, disposition);
    Ok(response)
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && FsPath::new(name).file_name().map(|f| f == name).unwrap_or(false)
}

fn content_type(name: &str) -> &'static str {
    match FsPath::new(name).extension().and_then(|e| e.to_str()) {
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("html") => "text/html; charset=utf-8",
        Some("log") | Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_file_name() {
        assert!(is_plain_file_name("hospital_data_20240101_120000.xlsx"));
        assert!(is_plain_file_name("page_source.html"));
        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("../secret"));
        assert!(!is_plain_file_name("a\\b"));
    }

    #[test]
    fn test_content_type() {
        assert!(content_type("a.xlsx").contains("spreadsheetml"));
        assert_eq!(content_type("page_source.html"), "text/html; charset=utf-8");
        assert_eq!(content_type("blob"), "application/octet-stream");
    }
}
