use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("브라우저 초기화 오류: {0}")]
    BrowserInit(String),

    #[error("페이지 이동 오류: {0}")]
    Navigation(String),

    #[error("로그인 오류: {0}")]
    Login(String),

    #[error("시간 초과: {0}")]
    Timeout(String),

    #[error("요소를 찾을 수 없습니다: {0}")]
    ElementNotFound(String),

    #[error("스크립트 실행 오류: {0}")]
    JavaScript(String),

    #[error("작업 ID가 없어 작업을 진행할 수 없습니다.")]
    MissingTaskId,

    #[error("엑셀 생성 오류: {0}")]
    Report(String),

    #[error("파일 처리 오류: {0}")]
    FileIO(#[from] std::io::Error),
}

impl ScraperError {
    /// 대기 시간 초과로 인한 오류인지 여부
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScraperError::Timeout(_))
    }
}
