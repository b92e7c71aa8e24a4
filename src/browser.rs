//! chromiumoxide 기반 `PageDriver` 구현

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::PageDriver;

const CLICKABLE_JS: &str = r#"
    function() {
        const rect = this.getBoundingClientRect();
        const style = window.getComputedStyle(this);
        return rect.width > 0 && rect.height > 0
            && style.visibility !== 'hidden'
            && style.pointerEvents !== 'none'
            && !this.disabled;
    }
"#;

/// Chrome 브라우저 세션 한 개를 소유하는 드라이버
pub struct ChromeDriver {
    browser: Option<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    user_data_dir: PathBuf,
}

impl ChromeDriver {
    /// 브라우저를 실행하고 빈 페이지를 연다
    pub async fn launch(config: &ScraperConfig) -> Result<Self, ScraperError> {
        info!("Launching browser...");

        // 동시 실행 워커끼리 프로필이 겹치지 않도록 고유 디렉토리 사용
        let unique_id = format!("{}-{}", std::process::id(), uuid::Uuid::new_v4());
        let user_data_dir = std::env::temp_dir().join(format!("hospital-scraper-{}", unique_id));

        let chrome_path = config.chrome_path.clone().or_else(|| {
            std::env::var("CHROME_PATH")
                .or_else(|_| std::env::var("CHROMIUM_PATH"))
                .ok()
                .map(PathBuf::from)
        });

        let mut builder = BrowserConfig::builder().user_data_dir(&user_data_dir);
        if let Some(path) = chrome_path {
            builder = builder.chrome_executable(path);
        }
        if !config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .no_sandbox()
            .window_size(1920, 1080)
            .request_timeout(Duration::from_secs(60))
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        if config.debug {
            builder = builder.arg("--enable-logging=stderr").arg("--v=1");
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("브라우저 설정 오류: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {:?}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(ScraperError::BrowserInit(e.to_string()));
            }
        };

        info!("Browser launched");
        Ok(Self {
            browser: Some(browser),
            page,
            handler,
            user_data_dir,
        })
    }
}

#[async_trait]
impl PageDriver for ChromeDriver {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        debug!("Navigating to {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| ScraperError::Navigation(format!("{}: {}", url, e)))?;
        Ok(())
    }

    async fn find_element(&self, selector: &str) -> Result<Element, ScraperError> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("{}: {}", selector, e)))
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<Element>, ScraperError> {
        self.page
            .find_elements(selector)
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("{}: {}", selector, e)))
    }

    async fn find_within(&self, parent: &Element, selector: &str) -> Result<Element, ScraperError> {
        parent
            .find_element(selector)
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("{}: {}", selector, e)))
    }

    async fn find_all_within(
        &self,
        parent: &Element,
        selector: &str,
    ) -> Result<Vec<Element>, ScraperError> {
        parent
            .find_elements(selector)
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("{}: {}", selector, e)))
    }

    async fn click(&self, element: &Element) -> Result<(), ScraperError> {
        element
            .click()
            .await
            .map_err(|e| ScraperError::Navigation(format!("클릭 실패: {}", e)))?;
        Ok(())
    }

    async fn scroll_into_view(&self, element: &Element) -> Result<(), ScraperError> {
        element
            .scroll_into_view()
            .await
            .map_err(|e| ScraperError::JavaScript(format!("스크롤 실패: {}", e)))?;
        Ok(())
    }

    async fn type_text(&self, element: &Element, text: &str) -> Result<(), ScraperError> {
        element
            .click()
            .await
            .map_err(|e| ScraperError::Login(format!("입력란 선택 실패: {}", e)))?;
        element
            .type_str(text)
            .await
            .map_err(|e| ScraperError::Login(format!("입력 실패: {}", e)))?;
        Ok(())
    }

    async fn read_text(&self, element: &Element) -> Result<String, ScraperError> {
        let text = element
            .inner_text()
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;
        Ok(text.unwrap_or_default())
    }

    async fn is_clickable(&self, element: &Element) -> Result<bool, ScraperError> {
        let returns = element
            .call_js_fn(CLICKABLE_JS, false)
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;
        Ok(returns
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    async fn page_source(&self) -> Result<String, ScraperError> {
        self.page
            .content()
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))
    }

    async fn screenshot(&self) -> Result<Option<Vec<u8>>, ScraperError> {
        let png = self
            .page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;
        Ok(Some(png))
    }

    async fn quit(&mut self) -> Result<(), ScraperError> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };
        info!("Closing browser...");

        let closed = browser.close().await;
        if let Err(e) = browser.wait().await {
            debug!("Browser process wait failed: {}", e);
        }
        self.handler.abort();

        if let Err(e) = std::fs::remove_dir_all(&self.user_data_dir) {
            debug!("Failed to remove user data dir {:?}: {}", self.user_data_dir, e);
        }

        closed.map_err(|e| {
            warn!("Browser close failed: {}", e);
            ScraperError::BrowserInit(format!("브라우저 종료 실패: {}", e))
        })?;
        info!("Browser closed");
        Ok(())
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        // quit() 없이 해제된 경우에도 이벤트 핸들러는 정리한다
        self.handler.abort();
    }
}
