//! 운영자용 웹 화면
//!
//! 로그인 폼 → 작업 요청 → 상태 조회 → 결과 파일 다운로드

pub mod handlers;
mod pages;
pub mod session;

use axum::routing::{get, post};
use axum::Router;

use crate::service::ScraperService;

#[derive(Debug, Clone)]
pub struct AppState {
    pub service: ScraperService,
    pub session_ttl_secs: u64,
}

impl AppState {
    pub fn new(service: ScraperService, session_ttl_secs: u64) -> Self {
        Self {
            service,
            session_ttl_secs,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", post(handlers::login))
        .route("/scrape", post(handlers::scrape))
        .route("/status", get(handlers::status))
        .route("/status.json", get(handlers::status_json))
        .route("/downloads/{filename}", get(handlers::download))
        .with_state(state)
}
