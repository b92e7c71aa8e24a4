//! 병원 정보 수집 실행부
//!
//! 로그인 → 작업 페이지 이동 → 블록 목록 수집 → 블록별 펼치기/추출 → 보고서 생성.
//! 블록 하나의 실패는 로그만 남기고 건너뛰며, 그 외 실패는 작업 전체를 중단한다.

use base64::Engine;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::status::{ProgressSink, TaskStatus};
use crate::traits::PageDriver;

use super::extract::{extract_record, TOGGLE_SELECTOR};
use super::report::ReportBuilder;
use super::types::{ExtractedRecord, HospitalRecords, ReportOutput, ScrapePhase};

pub const LOGIN_NAME_SELECTOR: &str = "[name='name']";
pub const LOGIN_PASSWORD_SELECTOR: &str = "[type='password']";
pub const LOGIN_SUBMIT_SELECTOR: &str = "[type='submit']";
/// 페이지 루트 콘텐츠 컨테이너
pub const ROOT_SELECTOR: &str = "body > main";
pub const BLOCK_SELECTOR: &str = "body > main > div > div.pt-2 > div";

/// 몇 블록마다 진행 상황을 보고할지
const PROGRESS_EVERY: usize = 5;

/// 수집 작업 한 건의 입력
#[derive(Debug, Clone)]
pub struct TaskRequest {
    /// 로그인 아이디
    pub username: String,
    pub password: String,
    pub task_id: String,
    /// 결과 디렉토리와 상태 키로 쓰이는 세션 ID
    pub session_id: String,
}

impl TaskRequest {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        task_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            task_id: task_id.into(),
            session_id: session_id.into(),
        }
    }
}

/// 브라우저 세션 하나를 소유하고 수집 작업 한 건을 수행
pub struct HospitalScraper<D: PageDriver> {
    config: ScraperConfig,
    driver: D,
    phase: ScrapePhase,
}

impl<D: PageDriver> HospitalScraper<D> {
    pub fn new(config: ScraperConfig, driver: D) -> Self {
        Self {
            config,
            driver,
            phase: ScrapePhase::Idle,
        }
    }

    pub fn phase(&self) -> ScrapePhase {
        self.phase
    }

    /// 작업을 끝까지 수행하고 브라우저를 해제한다
    ///
    /// 성공/실패 모두 최종 상태를 `progress` 에 기록한다. 실패 시 그때까지
    /// 모은 데이터는 버리고 보고서를 만들지 않는다.
    pub async fn run(
        mut self,
        request: &TaskRequest,
        progress: &dyn ProgressSink,
    ) -> Result<ReportOutput, ScraperError> {
        let outcome = self.run_inner(request, progress).await;

        match &outcome {
            Ok(output) => {
                self.enter(ScrapePhase::Done);
                progress.report(TaskStatus::completed(
                    output.file_name.clone(),
                    request.session_id.clone(),
                ));
            }
            Err(e) => {
                error!("Scrape failed during {}: {}", self.phase, e);
                self.capture_debug_screenshot().await;
                self.enter(ScrapePhase::Failed);
                progress.report(TaskStatus::error(format!("오류 발생: {}", e)));
            }
        }

        if let Err(e) = self.driver.quit().await {
            warn!("Failed to release browser: {}", e);
        }
        outcome
    }

    async fn run_inner(
        &mut self,
        request: &TaskRequest,
        progress: &dyn ProgressSink,
    ) -> Result<ReportOutput, ScraperError> {
        if request.task_id.trim().is_empty() {
            return Err(ScraperError::MissingTaskId);
        }

        progress.report(TaskStatus::processing("웹사이트에 접속 중..."));
        self.login(request).await?;
        progress.report(TaskStatus::processing("로그인 완료, 데이터 수집 중..."));

        self.open_task_page(&request.task_id).await?;

        self.enter(ScrapePhase::Enumerating);
        let blocks = self.driver.find_elements(BLOCK_SELECTOR).await?;
        let total = blocks.len();
        info!("Found {} record blocks", total);
        progress.report(TaskStatus::processing(format!(
            "총 {}개 병원 정보 수집 중...",
            total
        )));

        let mut records = HospitalRecords::new();
        for (offset, block) in blocks.iter().enumerate() {
            let index = offset + 1;
            match self.process_block(index, block).await {
                Ok(record) => records.merge(record),
                Err(e) => error!("Error while processing block {}: {}", index, e),
            }

            if index % PROGRESS_EVERY == 0 {
                progress.report(TaskStatus::processing(format!(
                    "{}/{} 병원 정보 수집 중...",
                    index, total
                )));
            }
        }

        self.enter(ScrapePhase::Aggregated);
        info!("Aggregated {} hospitals from {} blocks", records.len(), total);
        progress.report(TaskStatus::processing(
            "데이터 수집 완료, 엑셀 파일 생성 중...",
        ));

        let page_source = self.driver.page_source().await?;
        let builder = ReportBuilder::new(self.config.session_dir(&request.session_id));
        let output = builder.build(&records, &page_source)?;
        self.enter(ScrapePhase::ReportReady);

        Ok(output)
    }

    async fn login(&mut self, request: &TaskRequest) -> Result<(), ScraperError> {
        self.enter(ScrapePhase::Authenticating);
        let config = &self.config;
        let driver = &self.driver;

        driver.navigate(&config.login_url()).await?;

        let name_field = driver
            .wait_for(LOGIN_NAME_SELECTOR, config.page_timeout, config.poll_interval)
            .await
            .map_err(|e| ScraperError::Login(format!("아이디 입력란을 찾을 수 없습니다 ({})", e)))?;
        driver.type_text(&name_field, &request.username).await?;
        debug!("Username entered");

        let password_field = driver
            .find_element(LOGIN_PASSWORD_SELECTOR)
            .await
            .map_err(|e| ScraperError::Login(format!("비밀번호 입력란: {}", e)))?;
        driver.type_text(&password_field, &request.password).await?;
        debug!("Password entered");

        let submit = driver
            .find_element(LOGIN_SUBMIT_SELECTOR)
            .await
            .map_err(|e| ScraperError::Login(format!("로그인 버튼: {}", e)))?;
        driver.click(&submit).await?;

        if !config.post_login_delay.is_zero() {
            sleep(config.post_login_delay).await;
        }
        info!("Login submitted");
        Ok(())
    }

    async fn open_task_page(&mut self, task_id: &str) -> Result<(), ScraperError> {
        self.enter(ScrapePhase::Navigating);
        let url = self.config.check_list_url(task_id);
        self.driver.navigate(&url).await?;
        self.driver
            .wait_for(ROOT_SELECTOR, self.config.page_timeout, self.config.poll_interval)
            .await
            .map_err(|e| ScraperError::Navigation(format!("작업 페이지 로딩 실패 ({})", e)))?;
        info!("Task page loaded: {}", url);
        Ok(())
    }

    /// 토글을 펼친 뒤 블록 내용을 추출
    async fn process_block(
        &mut self,
        index: usize,
        block: &D::Element,
    ) -> Result<ExtractedRecord, ScraperError> {
        self.enter(ScrapePhase::Expanding { index });
        let driver = &self.driver;
        let config = &self.config;

        let toggle = driver.find_within(block, TOGGLE_SELECTOR).await?;
        driver.scroll_into_view(&toggle).await?;
        driver
            .wait_until_clickable(&toggle, config.toggle_timeout, config.poll_interval)
            .await?;
        driver.click(&toggle).await?;

        // 클릭으로 페이지가 이동하지 않았는지 확인
        driver
            .wait_for(ROOT_SELECTOR, config.page_timeout, config.poll_interval)
            .await?;

        self.enter(ScrapePhase::Extracting { index });
        extract_record(&self.driver, block).await
    }

    fn enter(&mut self, phase: ScrapePhase) {
        debug!("Phase: {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    async fn capture_debug_screenshot(&self) {
        if !self.config.debug {
            return;
        }
        match self.driver.screenshot().await {
            Ok(Some(png)) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
                debug!("Failure screenshot: data:image/png;base64,{}", encoded);
            }
            Ok(None) => {}
            Err(e) => debug!("Failed to capture screenshot: {}", e),
        }
    }
}
