use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://agent-front.green-ribbon.co.kr";

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// 대상 사이트 루트 URL (끝의 `/` 없이)
    pub base_url: String,
    /// 세션별 결과 디렉토리의 상위 경로
    pub output_dir: PathBuf,
    pub headless: bool,
    /// 미지정 시 CHROME_PATH / CHROMIUM_PATH 환경변수 사용
    pub chrome_path: Option<PathBuf>,
    /// 페이지 단위 요소 대기 시간
    pub page_timeout: Duration,
    /// 토글 버튼 클릭 가능 대기 시간
    pub toggle_timeout: Duration,
    pub poll_interval: Duration,
    /// 로그인 버튼 클릭 후 대기 시간
    pub post_login_delay: Duration,
    /// 치명적 오류 시 스크린샷을 로그로 남김
    pub debug: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("./downloads"),
            headless: true,
            chrome_path: None,
            page_timeout: Duration::from_secs(10),
            toggle_timeout: Duration::from_secs(2),
            poll_interval: Duration::from_millis(250),
            post_login_delay: Duration::from_secs(3),
            debug: false,
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    pub fn with_toggle_timeout(mut self, timeout: Duration) -> Self {
        self.toggle_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_post_login_delay(mut self, delay: Duration) -> Self {
        self.post_login_delay = delay;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// 로그인 페이지 URL
    pub fn login_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    /// 작업별 체크리스트 페이지 URL
    pub fn check_list_url(&self, task_id: &str) -> String {
        format!("{}/v2/check-list/{}", self.base_url, task_id)
    }

    /// 세션별 결과 저장 디렉토리
    pub fn session_dir(&self, session_id: &str) -> PathBuf {
        self.output_dir.join(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScraperConfig::new()
            .with_base_url("https://example.test/")
            .with_headless(false)
            .with_output_dir("/tmp/downloads")
            .with_page_timeout(Duration::from_secs(20))
            .with_toggle_timeout(Duration::from_millis(500));

        assert_eq!(config.base_url, "https://example.test");
        assert!(!config.headless);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/downloads"));
        assert_eq!(config.page_timeout, Duration::from_secs(20));
        assert_eq!(config.toggle_timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_urls() {
        let config = ScraperConfig::new();
        assert_eq!(
            config.login_url(),
            "https://agent-front.green-ribbon.co.kr/"
        );
        assert_eq!(
            config.check_list_url("42"),
            "https://agent-front.green-ribbon.co.kr/v2/check-list/42"
        );
        assert_eq!(
            config.session_dir("abc"),
            PathBuf::from("./downloads").join("abc")
        );
    }

    #[test]
    fn test_default_timeouts() {
        let config = ScraperConfig::default();
        assert_eq!(config.page_timeout, Duration::from_secs(10));
        assert_eq!(config.toggle_timeout, Duration::from_secs(2));
        assert!(config.headless);
    }
}
