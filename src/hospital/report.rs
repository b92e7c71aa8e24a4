//! 수집 결과를 엑셀로 저장하고 중복 주소를 강조 표시한다

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook};
use tracing::info;

use crate::error::ScraperError;
use crate::telemetry::kst_timestamp;

use super::normalize::normalize_address;
use super::types::{HospitalRecords, ReportOutput, ReportRow};

pub const HEADERS: [&str; 3] = ["병원 이름", "주소", "추출된 이름"];
pub const NO_NAMES: &str = "없음";
pub const PAGE_SOURCE_FILE: &str = "page_source.html";
const HIGHLIGHT_RGB: u32 = 0xFFFF00;

/// 병원별 레코드를 정규화된 주소 순으로 정렬한 행 목록으로 변환
pub fn build_rows(records: &HospitalRecords) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = records
        .iter()
        .map(|(hospital_name, record)| {
            let joined = record
                .addresses
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            let names = if record.names.is_empty() {
                NO_NAMES.to_string()
            } else {
                record
                    .names
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            ReportRow {
                hospital_name: hospital_name.clone(),
                address: normalize_address(&joined),
                names,
                highlighted: false,
            }
        })
        .collect();

    rows.sort_by(|a, b| a.address.cmp(&b.address));
    mark_duplicates(&mut rows);
    rows
}

/// 주소 셀 값이 정확히 같은 행이 둘 이상이면 모두 강조 대상으로 표시
pub fn mark_duplicates(rows: &mut [ReportRow]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in rows.iter() {
        *counts.entry(row.address.clone()).or_default() += 1;
    }
    for row in rows.iter_mut() {
        row.highlighted = counts.get(&row.address).copied().unwrap_or(0) > 1;
    }
}

/// 세션 디렉토리에 엑셀과 페이지 소스를 기록
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    session_dir: PathBuf,
}

impl ReportBuilder {
    pub fn new(session_dir: impl Into<PathBuf>) -> Self {
        Self {
            session_dir: session_dir.into(),
        }
    }

    pub fn build(
        &self,
        records: &HospitalRecords,
        page_source: &str,
    ) -> Result<ReportOutput, ScraperError> {
        std::fs::create_dir_all(&self.session_dir)?;

        let rows = build_rows(records);
        let file_name = report_file_name();
        let excel_path = self.session_dir.join(&file_name);
        write_workbook(&excel_path, &rows)?;
        info!(
            "Saved report with {} rows ({} highlighted): {:?}",
            rows.len(),
            rows.iter().filter(|r| r.highlighted).count(),
            excel_path
        );

        let page_source_path = self.session_dir.join(PAGE_SOURCE_FILE);
        std::fs::write(&page_source_path, page_source)?;
        info!("Saved page source: {:?}", page_source_path);

        Ok(ReportOutput {
            file_name,
            excel_path,
            page_source_path,
            rows: rows.len(),
        })
    }
}

fn report_file_name() -> String {
    format!("hospital_data_{}.xlsx", kst_timestamp())
}

fn write_workbook(path: &Path, rows: &[ReportRow]) -> Result<(), ScraperError> {
    let report_err = |e: rust_xlsxwriter::XlsxError| ScraperError::Report(e.to_string());

    let header_format = Format::new().set_bold();
    let highlight_format = Format::new()
        .set_background_color(Color::RGB(HIGHLIGHT_RGB))
        .set_pattern(FormatPattern::Solid);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1").map_err(report_err)?;

    for (col, header) in HEADERS.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(report_err)?;
    }
    sheet.set_column_width(0, 30).map_err(report_err)?;
    sheet.set_column_width(1, 50).map_err(report_err)?;
    sheet.set_column_width(2, 40).map_err(report_err)?;

    for (idx, row) in rows.iter().enumerate() {
        let r = idx as u32 + 1;
        sheet
            .write_string(r, 0, row.hospital_name.as_str())
            .map_err(report_err)?;
        if row.highlighted {
            sheet
                .write_string_with_format(r, 1, row.address.as_str(), &highlight_format)
                .map_err(report_err)?;
        } else {
            sheet
                .write_string(r, 1, row.address.as_str())
                .map_err(report_err)?;
        }
        sheet
            .write_string(r, 2, row.names.as_str())
            .map_err(report_err)?;
    }

    workbook.save(path).map_err(report_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hospital::types::ExtractedRecord;

    fn record(name: &str, address: &str, names: &[&str]) -> ExtractedRecord {
        ExtractedRecord {
            hospital_name: name.to_string(),
            address: address.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    #[test]
    fn test_rows_sorted_by_normalized_address() {
        let mut records = HospitalRecords::new();
        records.merge(record("다병원", "해운대로 570 3층", &["김철수"]));
        records.merge(record("가병원", "강남로12, 3층(101호)", &[]));

        let rows = build_rows(&records);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].hospital_name, "가병원");
        assert_eq!(rows[0].address, "강남로12(101호)");
        assert_eq!(rows[0].names, NO_NAMES);
        assert_eq!(rows[1].address, "해운대로570");
        assert_eq!(rows[1].names, "김철수");
    }

    #[test]
    fn test_multiple_addresses_joined_before_normalizing() {
        let mut records = HospitalRecords::new();
        records.merge(record("가병원", "강남로12", &["김철수"]));
        records.merge(record("가병원", "강남로14", &["이영희"]));

        let rows = build_rows(&records);
        assert_eq!(rows.len(), 1);
        // "강남로12, 강남로14" 에서 첫 쉼표 뒤는 잘린다
        assert_eq!(rows[0].address, "강남로12");
        assert_eq!(rows[0].names, "김철수, 이영희");
    }

    #[test]
    fn test_floor_marker_in_second_address_does_not_win() {
        let mut records = HospitalRecords::new();
        records.merge(record("가병원", "부산 해운대로 570", &[]));
        records.merge(record("가병원", "서울 강남로 12 3층", &[]));
        records.merge(record("나병원", "강남로12", &[]));

        let rows = build_rows(&records);
        let row = rows.iter().find(|r| r.hospital_name == "가병원").unwrap();
        assert_eq!(row.address, normalize_address("부산 해운대로 570"));
        assert_eq!(row.address, "부산해운대로570");
        assert!(!rows.iter().any(|r| r.highlighted));
    }

    #[test]
    fn test_only_repeated_addresses_highlighted() {
        let mut records = HospitalRecords::new();
        records.merge(record("가병원", "대원로8 2,3층", &[]));
        records.merge(record("나병원", "대원로8 4층", &[]));
        records.merge(record("다병원", "해운대로570", &[]));

        let rows = build_rows(&records);
        let highlighted: Vec<&str> = rows
            .iter()
            .filter(|r| r.highlighted)
            .map(|r| r.hospital_name.as_str())
            .collect();
        assert_eq!(highlighted, vec!["가병원", "나병원"]);
        assert!(!rows.iter().any(|r| r.hospital_name == "다병원" && r.highlighted));
    }

    #[test]
    fn test_build_writes_excel_and_page_source() {
        let dir = tempfile::tempdir().unwrap();
        let session_dir = dir.path().join("session-1");
        let mut records = HospitalRecords::new();
        records.merge(record("가병원", "강남로12", &["김철수"]));

        let output = ReportBuilder::new(&session_dir)
            .build(&records, "<html></html>")
            .unwrap();

        assert!(output.file_name.starts_with("hospital_data_"));
        assert!(output.file_name.ends_with(".xlsx"));
        assert_eq!(output.rows, 1);
        assert!(output.excel_path.exists());
        assert!(std::fs::metadata(&output.excel_path).unwrap().len() > 0);
        assert_eq!(
            std::fs::read_to_string(session_dir.join(PAGE_SOURCE_FILE)).unwrap(),
            "<html></html>"
        );
    }

    fn read_part(path: &Path, name: &str) -> String {
        use std::io::Read;

        let file = std::fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_workbook_fills_only_duplicate_address_cells() {
        let dir = tempfile::tempdir().unwrap();
        let mut records = HospitalRecords::new();
        records.merge(record("가병원", "대원로8 2,3층", &["김철수"]));
        records.merge(record("나병원", "대원로8 4층", &[]));
        records.merge(record("다병원", "해운대로570", &[]));

        let rows = build_rows(&records);
        let output = ReportBuilder::new(dir.path())
            .build(&records, "")
            .unwrap();

        // 주소 열(B) 셀의 스타일 번호
        let sheet = read_part(&output.excel_path, "xl/worksheets/sheet1.xml");
        let cell_re = regex::Regex::new(r#"<c r="B(\d+)"(?: s="(\d+)")?"#).unwrap();
        let styles: HashMap<u32, Option<String>> = cell_re
            .captures_iter(&sheet)
            .map(|c| (c[1].parse().unwrap(), c.get(2).map(|m| m.as_str().to_string())))
            .collect();

        let header_style = styles[&1].clone();
        let filled: Vec<u32> = (2..=rows.len() as u32 + 1)
            .filter(|r| styles[r].is_some() && styles[r] != header_style)
            .collect();
        let expected: Vec<u32> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.highlighted)
            .map(|(idx, _)| idx as u32 + 2)
            .collect();
        assert_eq!(filled.len(), 2);
        assert_eq!(filled, expected);
        assert_eq!(styles[&filled[0]], styles[&filled[1]]);

        let style_xml = read_part(&output.excel_path, "xl/styles.xml");
        assert!(style_xml.contains("FFFF00"));
        assert!(style_xml.contains(r#"patternType="solid""#));
    }

    #[test]
    fn test_build_with_no_records_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let output = ReportBuilder::new(dir.path())
            .build(&HospitalRecords::new(), "")
            .unwrap();
        assert_eq!(output.rows, 0);
        assert!(output.excel_path.exists());
    }
}
