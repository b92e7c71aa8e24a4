//! 병원 정보 수집 라이브러리
//!
//! - 체크리스트 페이지에서 병원 이름/주소/담당자 이름 수집
//! - 도로명 주소 정규화 후 중복 주소를 강조한 엑셀 생성
//! - 세션별 작업 상태 조회와 결과 다운로드를 위한 웹 화면
//!
//! # 사용 예
//!
//! ```rust,ignore
//! use hospital_scraper::{ScrapeRequest, ScraperConfig, ScraperService, StatusStore};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = StatusStore::new();
//!     let config = ScraperConfig::new().with_output_dir("./downloads");
//!     let mut service = ScraperService::new(config, store.clone(), 1);
//!
//!     let request = ScrapeRequest::new("agent", "password", "12345");
//!     let output = service.call(request).await.unwrap();
//!     println!("Excel saved: {:?}", output.excel_path);
//! }
//! ```
//!
//! # 주소 정규화
//!
//! ```
//! use hospital_scraper::hospital::normalize_address;
//!
//! assert_eq!(normalize_address("대원로8 2,3층"), "대원로8");
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod hospital;
pub mod service;
pub mod settings;
pub mod status;
pub mod telemetry;
pub mod traits;
pub mod web;

// 주요 타입 재노출
pub use browser::ChromeDriver;
pub use config::ScraperConfig;
pub use error::ScraperError;
pub use hospital::{HospitalScraper, ReportOutput, TaskRequest};
pub use service::{ScrapeRequest, ScraperService};
pub use settings::Settings;
pub use status::{ProgressSink, StatusStore, TaskState, TaskStatus};
pub use traits::PageDriver;
