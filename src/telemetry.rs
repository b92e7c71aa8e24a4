//! 로그 초기화
//!
//! stderr 와 함께 실행마다 `{output_dir}/scraper_log_{YYYYMMDD_HHMMSS}.log` 파일에도 기록한다.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{FixedOffset, Utc};
use tracing_subscriber::fmt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const KST_OFFSET_SECS: i32 = 9 * 3600;

/// 한국 표준시 기준 `YYYYMMDD_HHMMSS`
pub fn kst_timestamp() -> String {
    let now = Utc::now();
    match FixedOffset::east_opt(KST_OFFSET_SECS) {
        Some(kst) => now.with_timezone(&kst).format("%Y%m%d_%H%M%S").to_string(),
        None => now.format("%Y%m%d_%H%M%S").to_string(),
    }
}

pub fn log_file_name() -> String {
    format!("scraper_log_{}.log", kst_timestamp())
}

/// 출력 디렉토리에 이번 실행의 로그 파일을 만든다
pub fn open_log_file(output_dir: &Path) -> io::Result<(File, PathBuf)> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(log_file_name());
    let file = File::create(&path)?;
    Ok((file, path))
}

type FileLayer<S> = fmt::Layer<S, fmt::format::DefaultFields, fmt::format::Format, Mutex<File>>;

fn file_layer<S>(file: File) -> FileLayer<S> {
    fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file))
}

/// 전역 subscriber 설치. 생성된 로그 파일 경로를 반환한다.
pub fn init_telemetry(output_dir: &Path) -> io::Result<PathBuf> {
    let (file, path) = open_log_file(output_dir)?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hospital_scraper=debug".into()),
        )
        .with(fmt::layer())
        .with(file_layer(file))
        .init();
    Ok(path)
}
