//! 최소한의 HTML 화면

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::status::{TaskState, TaskStatus};

fn layout(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="utf-8">
<title>{title}</title>
{head_extra}
</head>
<body>
<h1>{title}</h1>
{body}
</body>
</html>
"#,
        title = encode_text(title),
        head_extra = head_extra,
        body = body,
    )
}

pub fn index() -> String {
    layout(
        "병원 정보 수집",
        "",
        r#"<form method="post" action="/login">
<button type="submit">시작하기</button>
</form>"#,
    )
}

pub fn dashboard(error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<p class="error">{}</p>"#, encode_text(e)))
        .unwrap_or_default();
    let body = format!(
        r#"{error}
<form method="post" action="/scrape">
<label>아이디 <input type="text" name="name"></label>
<label>비밀번호 <input type="password" name="password"></label>
<label>작업 ID <input type="text" name="taskID"></label>
<button type="submit">수집 시작</button>
</form>
<p><a href="/status">작업 상태 보기</a></p>"#
    );
    layout("작업 요청", "", &body)
}

pub fn status(status: &TaskStatus) -> String {
    let refresh = if status.is_processing() {
        r#"<meta http-equiv="refresh" content="3">"#
    } else {
        ""
    };

    let mut body = format!(
        r#"<p class="status-{state}">{message}</p>"#,
        state = state_name(status.status),
        message = encode_text(&status.message),
    );
    if let (TaskState::Completed, Some(file)) = (status.status, status.file.as_deref()) {
        body.push_str(&format!(
            r#"
<p><a href="/downloads/{href}">{name} 다운로드</a></p>"#,
            href = encode_double_quoted_attribute(file),
            name = encode_text(file),
        ));
    }
    if !status.is_processing() {
        body.push_str("\n<p><a href=\"/\">처음으로</a></p>");
    }

    layout("작업 상태", refresh, &body)
}

fn state_name(state: TaskState) -> &'static str {
    match state {
        TaskState::NotStarted => "not_started",
        TaskState::Processing => "processing",
        TaskState::Error => "error",
        TaskState::Completed => "completed",
    }
}
