use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};

use crate::error::ScraperError;

/// 원격 제어 브라우저의 최소 기능 집합
///
/// 수집 로직은 이 트레이트만 사용하므로 브라우저 엔진은 교체 가능하다.
/// `wait_for` / `wait_until_clickable` 기본 구현은 `poll` 간격으로
/// 조회를 반복하다 시간 초과 시 `ScraperError::Timeout` 을 반환한다.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// 요소 핸들
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<(), ScraperError>;

    async fn find_element(&self, selector: &str) -> Result<Self::Element, ScraperError>;

    async fn find_elements(&self, selector: &str) -> Result<Vec<Self::Element>, ScraperError>;

    /// `parent` 하위에서 요소 검색
    async fn find_within(
        &self,
        parent: &Self::Element,
        selector: &str,
    ) -> Result<Self::Element, ScraperError>;

    async fn find_all_within(
        &self,
        parent: &Self::Element,
        selector: &str,
    ) -> Result<Vec<Self::Element>, ScraperError>;

    async fn click(&self, element: &Self::Element) -> Result<(), ScraperError>;

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<(), ScraperError>;

    async fn type_text(&self, element: &Self::Element, text: &str) -> Result<(), ScraperError>;

    async fn read_text(&self, element: &Self::Element) -> Result<String, ScraperError>;

    /// 표시되어 있고 비활성화되지 않은 상태인지
    async fn is_clickable(&self, element: &Self::Element) -> Result<bool, ScraperError>;

    async fn page_source(&self) -> Result<String, ScraperError>;

    /// 브라우저 세션 해제
    async fn quit(&mut self) -> Result<(), ScraperError>;

    /// PNG 스크린샷 (지원하지 않는 드라이버는 None)
    async fn screenshot(&self) -> Result<Option<Vec<u8>>, ScraperError> {
        Ok(None)
    }

    /// 선택자에 해당하는 요소가 나타날 때까지 대기
    async fn wait_for(
        &self,
        selector: &str,
        timeout: Duration,
        poll: Duration,
    ) -> Result<Self::Element, ScraperError> {
        let start = Instant::now();
        loop {
            if let Ok(element) = self.find_element(selector).await {
                return Ok(element);
            }
            if start.elapsed() >= timeout {
                return Err(ScraperError::Timeout(format!(
                    "{:?} 이내에 '{}' 요소가 나타나지 않았습니다",
                    timeout, selector
                )));
            }
            sleep(poll).await;
        }
    }

    /// 요소가 클릭 가능해질 때까지 대기
    async fn wait_until_clickable(
        &self,
        element: &Self::Element,
        timeout: Duration,
        poll: Duration,
    ) -> Result<(), ScraperError> {
        let start = Instant::now();
        loop {
            if self.is_clickable(element).await.unwrap_or(false) {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(ScraperError::Timeout(format!(
                    "{:?} 이내에 요소가 클릭 가능한 상태가 되지 않았습니다",
                    timeout
                )));
            }
            sleep(poll).await;
        }
    }
}
