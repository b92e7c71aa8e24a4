//! 프로세스 설정
//!
//! 기본값 → `config/default` → `config/{APP_ENVIRONMENT}` → `HOSPITAL_SCRAPER__*` 환경변수
//! 순서로 덮어쓴다.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::config::{ScraperConfig, DEFAULT_BASE_URL};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub scraper: ScraperSettings,
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScraperSettings {
    pub base_url: String,
    pub output_dir: String,
    pub headless: bool,
    pub chrome_path: Option<String>,
    pub page_timeout_secs: u64,
    pub toggle_timeout_secs: u64,
    pub post_login_delay_secs: u64,
    /// 요소 대기 폴링 간격 (밀리초)
    pub poll_interval_ms: u64,
    pub max_concurrent_tasks: usize,
    pub debug: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// 세션 쿠키 유효 시간 (초)
    pub ttl_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("HOSPITAL_SCRAPER").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("scraper.base_url", DEFAULT_BASE_URL)?
            .set_default("scraper.output_dir", "./downloads")?
            .set_default("scraper.headless", true)?
            .set_default("scraper.page_timeout_secs", 10)?
            .set_default("scraper.toggle_timeout_secs", 2)?
            .set_default("scraper.post_login_delay_secs", 3)?
            .set_default("scraper.poll_interval_ms", 250)?
            .set_default("scraper.max_concurrent_tasks", 4)?
            .set_default("scraper.debug", false)?
            .set_default("session.ttl_secs", 3600)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn scraper_config(&self) -> ScraperConfig {
        let s = &self.scraper;
        let mut config = ScraperConfig::new()
            .with_base_url(s.base_url.as_str())
            .with_output_dir(s.output_dir.as_str())
            .with_headless(s.headless)
            .with_page_timeout(Duration::from_secs(s.page_timeout_secs))
            .with_toggle_timeout(Duration::from_secs(s.toggle_timeout_secs))
            .with_post_login_delay(Duration::from_secs(s.post_login_delay_secs))
            .with_poll_interval(Duration::from_millis(s.poll_interval_ms))
            .with_debug(s.debug);
        if let Some(path) = s.chrome_path.as_deref().filter(|p| !p.is_empty()) {
            config = config.with_chrome_path(path);
        }
        config
    }
}
