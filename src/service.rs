use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::Semaphore;
use tower::Service;
use tracing::{info, warn};

use crate::browser::ChromeDriver;
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::hospital::{HospitalScraper, ReportOutput, TaskRequest};
use crate::status::{ProgressSink, StatusStore, TaskStatus};

/// 스크래핑 요청
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub username: String,
    pub password: String,
    pub task_id: String,
    pub session_id: String,
}

impl ScrapeRequest {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        task_id: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            task_id: task_id.into(),
            session_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }
}

impl From<ScrapeRequest> for TaskRequest {
    fn from(req: ScrapeRequest) -> Self {
        TaskRequest::new(req.username, req.password, req.task_id, req.session_id)
    }
}

/// tower::Service 를 구현한 수집 서비스
///
/// 호출 한 번이 브라우저 하나를 띄워 작업 한 건을 끝까지 수행한다.
/// 동시에 브라우저를 잡는 작업 수는 `max_concurrent` 로 제한된다.
#[derive(Debug, Clone)]
pub struct ScraperService {
    config: ScraperConfig,
    status: StatusStore,
    permits: Arc<Semaphore>,
}

impl ScraperService {
    pub fn new(config: ScraperConfig, status: StatusStore, max_concurrent: usize) -> Self {
        Self {
            config,
            status,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn status(&self) -> &StatusStore {
        &self.status
    }

    /// 백그라운드로 작업을 시작하고 바로 반환한다
    ///
    /// 같은 세션의 작업이 아직 진행 중이면 시작하지 않고 false 를 반환한다.
    /// 결과는 상태 저장소를 통해서만 전달된다.
    pub fn spawn(&self, req: ScrapeRequest) -> bool {
        if !self
            .status
            .try_begin(&req.session_id, TaskStatus::processing("작업이 시작되었습니다."))
        {
            warn!("Task already running for session {}", req.session_id);
            return false;
        }

        let mut service = self.clone();
        tokio::spawn(async move {
            let session_id = req.session_id.clone();
            if let Err(e) = service.call(req).await {
                warn!("Task for session {} ended with error: {}", session_id, e);
            }
        });
        true
    }
}

impl Service<ScrapeRequest> for ScraperService {
    type Response = ReportOutput;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        info!(
            "Scrape request received: session={} task_id={}",
            req.session_id, req.task_id
        );
        let config = self.config.clone();
        let permits = self.permits.clone();
        let sink = self.status.sink(req.session_id.clone());

        Box::pin(async move {
            sink.report(TaskStatus::processing("작업이 시작되었습니다."));
            let task: TaskRequest = req.into();

            // 브라우저를 띄우기 전에 걸러낸다
            if task.task_id.trim().is_empty() {
                let e = ScraperError::MissingTaskId;
                sink.report(TaskStatus::error(format!("오류 발생: {}", e)));
                return Err(e);
            }

            if permits.available_permits() == 0 {
                sink.report(TaskStatus::processing("다른 작업이 끝나기를 기다리는 중..."));
            }
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

            let driver = match ChromeDriver::launch(&config).await {
                Ok(driver) => driver,
                Err(e) => {
                    sink.report(TaskStatus::error(format!("오류 발생: {}", e)));
                    return Err(e);
                }
            };

            let output = HospitalScraper::new(config, driver).run(&task, &sink).await?;
            info!(
                "Scrape completed: session={} file={} rows={}",
                task.session_id, output.file_name, output.rows
            );
            Ok(output)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::status::TaskState;

    #[test]
    fn test_scrape_request_builder() {
        let req = ScrapeRequest::new("user", "pass", "42").with_session_id("s1");

        assert_eq!(req.username, "user");
        assert_eq!(req.password, "pass");
        assert_eq!(req.task_id, "42");
        assert_eq!(req.session_id, "s1");
    }

    #[test]
    fn test_scrape_request_generates_session_id() {
        let a = ScrapeRequest::new("u", "p", "1");
        let b = ScrapeRequest::new("u", "p", "1");
        assert_ne!(a.session_id, b.session_id);
    }

    #[test]
    fn test_scrape_request_to_task() {
        let req = ScrapeRequest::new("user", "pass", "42").with_session_id("s1");
        let task: TaskRequest = req.into();

        assert_eq!(task.username, "user");
        assert_eq!(task.task_id, "42");
        assert_eq!(task.session_id, "s1");
    }

    #[tokio::test]
    async fn test_missing_task_id_fails_without_browser() {
        let store = StatusStore::new();
        let mut service = ScraperService::new(ScraperConfig::default(), store.clone(), 1);

        let result = service
            .call(ScrapeRequest::new("user", "pass", "").with_session_id("s1"))
            .await;

        assert!(matches!(result, Err(ScraperError::MissingTaskId)));
        let status = store.get("s1");
        assert_eq!(status.status, TaskState::Error);
        assert_eq!(
            status.message,
            "오류 발생: 작업 ID가 없어 작업을 진행할 수 없습니다."
        );
    }

    #[tokio::test]
    async fn test_spawn_reports_through_status_store() {
        let store = StatusStore::new();
        let service = ScraperService::new(ScraperConfig::default(), store.clone(), 1);

        assert!(service.spawn(ScrapeRequest::new("user", "pass", "").with_session_id("s1")));

        let mut status = store.get("s1");
        for _ in 0..100 {
            if status.status == TaskState::Error {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            status = store.get("s1");
        }
        assert_eq!(status.status, TaskState::Error);
    }

    #[tokio::test]
    #[ignore] // 실환경 테스트: cargo test test_live_scrape -- --ignored --nocapture
    async fn test_live_scrape() {
        tracing_subscriber::fmt()
            .with_env_filter("info,hospital_scraper=debug")
            .init();

        let username = std::env::var("AGENT_NAME").expect("AGENT_NAME not set");
        let password = std::env::var("AGENT_PASSWORD").expect("AGENT_PASSWORD not set");
        let task_id = std::env::var("AGENT_TASK_ID").expect("AGENT_TASK_ID not set");

        let store = StatusStore::new();
        let config = ScraperConfig::new().with_output_dir("./downloads");
        let mut service = ScraperService::new(config, store.clone(), 1);
        let request = ScrapeRequest::new(username, password, task_id);
        let session_id = request.session_id.clone();

        match service.call(request).await {
            Ok(output) => {
                println!("\n=== Scrape Result ===");
                println!("Excel: {:?} ({} rows)", output.excel_path, output.rows);
                println!("Page source: {:?}", output.page_source_path);
            }
            Err(e) => panic!("Scrape failed: {:?} / {:?}", e, store.get(&session_id)),
        }
    }

    #[tokio::test]
    async fn test_spawn_rejects_session_with_running_task() {
        let store = StatusStore::new();
        store.set("s1", TaskStatus::processing("진행 중"));
        let service = ScraperService::new(ScraperConfig::default(), store.clone(), 1);

        assert!(!service.spawn(ScrapeRequest::new("user", "pass", "42").with_session_id("s1")));
        assert_eq!(store.get("s1").message, "진행 중");
    }
}
