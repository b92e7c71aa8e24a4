//! 병원 정보 수집 모듈
//!
//! 체크리스트 페이지의 병원 블록을 펼쳐 이름/주소/담당자 이름을 모으고,
//! 주소를 정규화해 중복 주소가 표시된 엑셀 파일을 만든다.

mod extract;
mod normalize;
mod report;
mod scraper;
mod types;

pub use extract::{extract_record, is_person_name, EXCLUDED_KEYWORDS};
pub use normalize::normalize_address;
pub use report::{build_rows, mark_duplicates, ReportBuilder, HEADERS, NO_NAMES, PAGE_SOURCE_FILE};
pub use scraper::{HospitalScraper, TaskRequest};
pub use types::{
    ExtractedRecord, HospitalRecord, HospitalRecords, ReportOutput, ReportRow, ScrapePhase,
};
