//! 도로명 주소 정규화
//!
//! 공백과 층/호/동 표기를 걷어내 같은 위치의 주소가 같은 문자열이 되도록 만든다.
//! 괄호 안(법정동, 건물명)은 그대로 보존한다.

use once_cell::sync::Lazy;
use regex::Regex;

/// 괄호 부분을 가리는 자리표시 문자 (사용자 영역 문자라 실제 주소에는 나오지 않음)
const PLACEHOLDER: char = '\u{E000}';
const PLACEHOLDER_STR: &str = "\u{E000}";

static PAREN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]+\)").expect("valid paren regex"));

static ROAD_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([가-힣]+로|[가-힣]+길)([0-9-]+)").expect("valid road regex"));

// "대원로8 2,3층" 처럼 번지 바로 뒤에 층 표기가 오는 경우 (원문 기준, 공백 경계 유지)
static ROAD_FLOOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([가-힣]+(?:로|길))\s*([0-9-]+)[\s,]*([0-9]+(?:,[0-9]+)*층)")
        .expect("valid road floor regex")
});

static QUALIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]+층|[0-9]+호|[A-Za-z]동|[가-힣]동").expect("valid qualifier regex")
});

/// 원본 주소를 비교 가능한 짧은 형태로 바꾼다. 실패하지 않는다.
///
/// ```
/// use hospital_scraper::hospital::normalize_address;
///
/// assert_eq!(normalize_address("서울시 강남로12, 3층(101호)"), "강남로12(101호)");
/// assert_eq!(normalize_address("대원로8 2,3층"), "대원로8");
/// ```
pub fn normalize_address(raw: &str) -> String {
    let address = truncate_at_comma(&strip_whitespace(raw));

    if raw.chars().any(|c| c.is_whitespace() || c == ',') {
        // 첫 쉼표 뒤에서 시작하는 일치는 잘려 나갈 다음 주소의 것이다
        let limit = first_comma(raw).unwrap_or(raw.len());
        if let Some(caps) = ROAD_FLOOR_RE
            .captures(raw)
            .filter(|caps| caps.get(0).is_some_and(|m| m.start() < limit))
        {
            let paren = PAREN_RE
                .find(raw)
                .map(|m| strip_whitespace(m.as_str()))
                .unwrap_or_default();
            return format!("{}{}{}", &caps[1], &caps[2], paren);
        }
    }

    let parens: Vec<&str> = PAREN_RE.find_iter(&address).map(|m| m.as_str()).collect();
    let masked = PAREN_RE.replace_all(&address, PLACEHOLDER_STR);

    let cleaned = match ROAD_NUMBER_RE.find(&masked) {
        Some(road) => {
            let (head, tail) = masked.split_at(road.end());
            let tail = strip_qualifiers(tail);
            // 괄호 앞에 남은 건물명 등은 버린다
            let tail = match tail.find(PLACEHOLDER) {
                Some(idx) if idx > 0 => &tail[idx..],
                _ => tail.as_str(),
            };
            format!("{}{}", head, tail)
        }
        None => masked.into_owned(),
    };

    restore_parens(&cleaned, &parens)
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// 괄호 밖 첫 쉼표의 바이트 위치
fn first_comma(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some(idx),
            _ => {}
        }
    }
    None
}

/// 괄호 밖 첫 쉼표부터 다음 괄호 직전까지 제거 (괄호가 없으면 쉼표에서 자름)
fn truncate_at_comma(address: &str) -> String {
    let Some(comma) = first_comma(address) else {
        return address.to_string();
    };
    match address[comma..].find('(') {
        Some(offset) => format!("{}{}", &address[..comma], &address[comma + offset..]),
        None => address[..comma].to_string(),
    }
}

fn strip_qualifiers(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = QUALIFIER_RE.replace_all(&current, "").into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

fn restore_parens(masked: &str, parens: &[&str]) -> String {
    let mut restored = String::with_capacity(masked.len());
    let mut parens = parens.iter();
    for c in masked.chars() {
        if c == PLACEHOLDER {
            if let Some(paren) = parens.next() {
                restored.push_str(paren);
                continue;
            }
        }
        restored.push(c);
    }
    restored
}
