//! 사용자/로그로 내보내는 알림.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// 코어가 내보내는 알림 이벤트.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// 설정 파일을 읽지 못해 기본값으로 대체함
    LoadFallback { path: PathBuf, reason: String },
    /// 기본값으로 대체한 뒤 그 기본값조차 저장하지 못함
    DefaultsNotPersisted { path: PathBuf, reason: String },
    /// 키 하나의 동기화 실패
    SyncWarning { key: String, field: String },
    /// 교차 필드 검증 실패 (사용자에게 그대로 보여줄 문구)
    ValidationFailed { message: String },
    /// 설정 저장 성공
    Saved { path: PathBuf },
    /// 폼 입력값 저장 성공
    EntriesSaved { path: PathBuf },
    /// 계산 후 변동성 결과 파일을 읽지 못함
    VolatilityUnavailable { path: PathBuf, reason: String },
}

impl Notice {
    /// 경고 수준 이벤트인지.
    pub fn is_warning(&self) -> bool {
        !matches!(self, Notice::Saved { .. } | Notice::EntriesSaved { .. })
    }

    /// 알림이 가리키는 파일.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Notice::LoadFallback { path, .. }
            | Notice::DefaultsNotPersisted { path, .. }
            | Notice::Saved { path }
            | Notice::EntriesSaved { path }
            | Notice::VolatilityUnavailable { path, .. } => Some(path),
            Notice::SyncWarning { .. } | Notice::ValidationFailed { .. } => None,
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::LoadFallback { path, reason } => write!(
                f,
                "No settings file found at {} ({reason}); creating one with defaults",
                path.display()
            ),
            Notice::DefaultsNotPersisted { path, reason } => write!(
                f,
                "Could not write default settings to {}: {reason}",
                path.display()
            ),
            Notice::SyncWarning { key, field } => write!(
                f,
                "Problem synchronizing settings key '{key}' with field '{field}'"
            ),
            Notice::ValidationFailed { message } => write!(f, "{message}"),
            Notice::Saved { .. } => write!(f, "Saving global settings successful."),
            Notice::EntriesSaved { .. } => write!(f, "Saving user settings successful."),
            Notice::VolatilityUnavailable { path, reason } => write!(
                f,
                "No volatilities to show from {}: {reason}",
                path.display()
            ),
        }
    }
}

/// 알림을 받는 쪽. 저장 위치나 형식은 구현이 정한다.
pub trait NotificationSink {
    fn publish(&mut self, notice: Notice);
}

/// tracing으로만 내보낸다.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn publish(&mut self, notice: Notice) {
        emit(&notice);
    }
}

/// 알림을 보관하면서 tracing으로도 내보낸다. GUI 상태 패널이 읽어간다.
#[derive(Debug, Default, Clone)]
pub struct NoticeLog {
    notices: Vec<Notice>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// 쌓인 알림을 꺼내고 비운다.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

impl NotificationSink for NoticeLog {
    fn publish(&mut self, notice: Notice) {
        emit(&notice);
        self.notices.push(notice);
    }
}

fn emit(notice: &Notice) {
    if let Notice::SyncWarning { key, field } = notice {
        warn!(%key, %field, "{notice}");
        return;
    }
    match (notice.is_warning(), notice.path()) {
        (true, Some(path)) => warn!(path = %path.display(), "{notice}"),
        (true, None) => warn!("{notice}"),
        (false, Some(path)) => info!(path = %path.display(), "{notice}"),
        (false, None) => info!("{notice}"),
    }
}
