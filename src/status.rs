//! 세션별 작업 상태 저장소
//!
//! 세션 하나에 대해 쓰는 워커는 하나뿐이고, 상태는 항상 레코드 전체를 교체한다.
//! 조회 측은 중간 상태를 볼 수 있지만 일부만 바뀐 레코드는 보지 않는다.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    NotStarted,
    Processing,
    Error,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub status: TaskState,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl TaskStatus {
    pub fn not_started() -> Self {
        Self::with_state(TaskState::NotStarted, "작업이 시작되지 않았습니다.")
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::with_state(TaskState::Processing, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_state(TaskState::Error, message)
    }

    pub fn completed(file: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            status: TaskState::Completed,
            message: "작업이 완료되었습니다.".to_string(),
            file: Some(file.into()),
            user_id: Some(user_id.into()),
        }
    }

    fn with_state(status: TaskState, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            file: None,
            user_id: None,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.status == TaskState::Processing
    }
}

/// 진행 상황 보고 대상
pub trait ProgressSink: Send + Sync {
    fn report(&self, status: TaskStatus);
}

/// 프로세스 수명 동안 유지되는 세션 ID → 상태 테이블
#[derive(Debug, Clone, Default)]
pub struct StatusStore {
    inner: Arc<DashMap<String, TaskStatus>>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 기록이 없으면 `not_started`
    pub fn get(&self, session_id: &str) -> TaskStatus {
        self.inner
            .get(session_id)
            .map(|s| s.value().clone())
            .unwrap_or_else(TaskStatus::not_started)
    }

    pub fn set(&self, session_id: &str, status: TaskStatus) {
        debug!(
            "Status update session={} status={:?} message={}",
            session_id, status.status, status.message
        );
        self.inner.insert(session_id.to_string(), status);
    }

    /// 진행 중인 작업이 없을 때만 `status` 로 교체하고 true 를 반환
    pub fn try_begin(&self, session_id: &str, status: TaskStatus) -> bool {
        match self.inner.entry(session_id.to_string()) {
            Entry::Occupied(mut entry) => {
                if entry.get().is_processing() {
                    return false;
                }
                entry.insert(status);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(status);
                true
            }
        }
    }

    pub fn sink(&self, session_id: impl Into<String>) -> SessionProgress {
        SessionProgress {
            store: self.clone(),
            session_id: session_id.into(),
        }
    }
}

/// 특정 세션에 고정된 `ProgressSink`
#[derive(Debug, Clone)]
pub struct SessionProgress {
    store: StatusStore,
    session_id: String,
}

impl SessionProgress {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl ProgressSink for SessionProgress {
    fn report(&self, status: TaskStatus) {
        self.store.set(&self.session_id, status);
    }
}
