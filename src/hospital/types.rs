//! 병원 수집 관련 타입 정의

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// 블록 하나에서 추출한 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    pub hospital_name: String,
    pub address: String,
    pub names: BTreeSet<String>,
}

/// 병원 표시 이름 하나에 모인 주소/이름 집합
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HospitalRecord {
    pub addresses: BTreeSet<String>,
    pub names: BTreeSet<String>,
}

/// 한 번의 수집 동안 병원 이름별로 병합되는 레코드 모음
#[derive(Debug, Clone, Default)]
pub struct HospitalRecords {
    records: BTreeMap<String, HospitalRecord>,
}

impl HospitalRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// 같은 병원 이름이면 주소와 이름을 합집합으로 병합
    pub fn merge(&mut self, record: ExtractedRecord) {
        let entry = self.records.entry(record.hospital_name).or_default();
        entry.addresses.insert(record.address);
        entry.names.extend(record.names);
    }

    pub fn get(&self, hospital_name: &str) -> Option<&HospitalRecord> {
        self.records.get(hospital_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &HospitalRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 수집 진행 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapePhase {
    Idle,
    Authenticating,
    Navigating,
    Enumerating,
    Expanding { index: usize },
    Extracting { index: usize },
    Aggregated,
    ReportReady,
    Done,
    Failed,
}

impl ScrapePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScrapePhase::Done | ScrapePhase::Failed)
    }
}

impl fmt::Display for ScrapePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrapePhase::Idle => write!(f, "idle"),
            ScrapePhase::Authenticating => write!(f, "authenticating"),
            ScrapePhase::Navigating => write!(f, "navigating"),
            ScrapePhase::Enumerating => write!(f, "enumerating"),
            ScrapePhase::Expanding { index } => write!(f, "expanding block {}", index),
            ScrapePhase::Extracting { index } => write!(f, "extracting block {}", index),
            ScrapePhase::Aggregated => write!(f, "aggregated"),
            ScrapePhase::ReportReady => write!(f, "report ready"),
            ScrapePhase::Done => write!(f, "done"),
            ScrapePhase::Failed => write!(f, "failed"),
        }
    }
}

/// 엑셀 한 행
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub hospital_name: String,
    /// 정규화된 주소
    pub address: String,
    /// ", " 로 이어 붙인 이름 또는 "없음"
    pub names: String,
    /// 같은 주소가 두 번 이상 나타나 강조 표시 대상인지
    pub highlighted: bool,
}

/// 보고서 생성 결과
#[derive(Debug, Clone)]
pub struct ReportOutput {
    /// 세션 디렉토리 기준 엑셀 파일 이름
    pub file_name: String,
    pub excel_path: PathBuf,
    pub page_source_path: PathBuf,
    pub rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, address: &str, names: &[&str]) -> ExtractedRecord {
        ExtractedRecord {
            hospital_name: name.to_string(),
            address: address.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    #[test]
    fn test_merge_same_hospital_unions_sets() {
        let mut records = HospitalRecords::new();
        records.merge(record("서울병원", "강남로12", &["김철수", "이영희"]));
        records.merge(record("서울병원", "강남로14", &["이영희", "박민수"]));
        records.merge(record("부산병원", "해운대로1", &[]));

        assert_eq!(records.len(), 2);
        let seoul = records.get("서울병원").unwrap();
        assert_eq!(
            seoul.addresses.iter().cloned().collect::<Vec<_>>(),
            vec!["강남로12".to_string(), "강남로14".to_string()]
        );
        assert_eq!(seoul.names.len(), 3);
        assert!(records.get("부산병원").unwrap().names.is_empty());
    }

    #[test]
    fn test_merge_duplicate_address_collapses() {
        let mut records = HospitalRecords::new();
        records.merge(record("서울병원", "강남로12", &["김철수"]));
        records.merge(record("서울병원", "강남로12", &["김철수"]));

        let seoul = records.get("서울병원").unwrap();
        assert_eq!(seoul.addresses.len(), 1);
        assert_eq!(seoul.names.len(), 1);
    }

    #[test]
    fn test_phase_terminal() {
        assert!(ScrapePhase::Done.is_terminal());
        assert!(ScrapePhase::Failed.is_terminal());
        assert!(!ScrapePhase::Expanding { index: 3 }.is_terminal());
        assert_eq!(ScrapePhase::Extracting { index: 3 }.to_string(), "extracting block 3");
    }
}
