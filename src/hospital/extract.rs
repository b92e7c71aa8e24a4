//! 블록(병원 상세 패널) 하나에서 병원 이름, 주소, 담당자 이름을 읽어낸다

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::ScraperError;
use crate::traits::PageDriver;

use super::types::ExtractedRecord;

pub const HOSPITAL_NAME_SELECTOR: &str = "div.flex.items-center.space-x-2 > p.font-semibold";
pub const ADDRESS_SELECTOR: &str = "p.text-sm.underline.cursor-pointer";
pub const TOGGLE_SELECTOR: &str =
    "div.flex.items-center.justify-center.border.border-input.py-2.rounded-md.mt-6.cursor-pointer";
/// 토글을 펼친 뒤 이름 후보를 담고 있는 텍스트 요소
pub const NAME_TEXT_SELECTOR: &str = "div p";

/// 이름처럼 생겼지만 화면 라벨인 단어
pub const EXCLUDED_KEYWORDS: &[&str] = &[
    "고객정보복사",
    "실손",
    "특급대행",
    "진행중",
    "자보",
    "골절",
    "배정완료",
];

static PERSON_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[가-힣]{2,4}$").expect("valid name regex"));

/// 한글 2~4자이고 제외 단어가 아니면 사람 이름으로 본다
pub fn is_person_name(text: &str) -> bool {
    PERSON_NAME_RE.is_match(text) && !EXCLUDED_KEYWORDS.contains(&text)
}

/// 펼쳐진 블록에서 레코드 추출. 페이지는 변경하지 않는다.
///
/// 병원 이름이나 주소 요소가 없으면 `ElementNotFound` 를 반환하고
/// 호출 측이 해당 블록만 건너뛴다.
pub async fn extract_record<D: PageDriver>(
    driver: &D,
    block: &D::Element,
) -> Result<ExtractedRecord, ScraperError> {
    let name_el = driver
        .find_within(block, HOSPITAL_NAME_SELECTOR)
        .await
        .map_err(|e| ScraperError::ElementNotFound(format!("병원 이름: {}", e)))?;
    let hospital_name = driver.read_text(&name_el).await?.trim().to_string();

    let address_el = driver
        .find_within(block, ADDRESS_SELECTOR)
        .await
        .map_err(|e| ScraperError::ElementNotFound(format!("주소: {}", e)))?;
    let address = driver.read_text(&address_el).await?.trim().to_string();

    let mut names = BTreeSet::new();
    for element in driver.find_all_within(block, NAME_TEXT_SELECTOR).await? {
        let text = driver.read_text(&element).await?;
        let text = text.trim();
        if is_person_name(text) {
            names.insert(text.to_string());
        }
    }

    debug!(
        "Extracted hospital={} address={} names={}",
        hospital_name,
        address,
        names.len()
    );

    Ok(ExtractedRecord {
        hospital_name,
        address,
        names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_name_shape() {
        assert!(is_person_name("김철수"));
        assert!(is_person_name("남궁민수"));
        assert!(is_person_name("이안"));
        assert!(!is_person_name("김"));
        assert!(!is_person_name("김철수영희"));
        assert!(!is_person_name("Kim"));
        assert!(!is_person_name("김 철수"));
        assert!(!is_person_name("김철수1"));
    }

    #[test]
    fn test_excluded_keywords() {
        assert!(!is_person_name("자보"));
        assert!(!is_person_name("실손"));
        assert!(!is_person_name("진행중"));
        assert!(!is_person_name("배정완료"));
        assert!(!is_person_name("골절"));
    }
}
