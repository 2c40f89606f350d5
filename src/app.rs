use std::path::PathBuf;

use crate::numeric::ParseError;
use crate::session::SessionError;
use crate::settings::{self, SettingsError};
use crate::user_entries::{self, EntriesError};

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug)]
pub enum AppError {
    /// 파일 입출력 오류
    Io(std::io::Error),
    /// 설정 저장 오류
    Settings(SettingsError),
    /// 입력값 파일 오류
    Entries(EntriesError),
    /// 조립/검증/계산 실패
    Session(SessionError),
    /// 숫자 해석 오류
    Parse(ParseError),
    /// 대응표에 없는 설정 키
    UnknownSetting(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Io(e) => write!(f, "입출력 오류: {e}"),
            AppError::Settings(e) => write!(f, "설정 오류: {e}"),
            AppError::Entries(e) => write!(f, "{e}"),
            AppError::Session(e) => write!(f, "{e}"),
            AppError::Parse(e) => write!(f, "{e}"),
            AppError::UnknownSetting(key) => write!(f, "알 수 없는 키: {key}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<SettingsError> for AppError {
    fn from(value: SettingsError) -> Self {
        AppError::Settings(value)
    }
}

impl From<EntriesError> for AppError {
    fn from(value: EntriesError) -> Self {
        AppError::Entries(value)
    }
}

impl From<SessionError> for AppError {
    fn from(value: SessionError) -> Self {
        AppError::Session(value)
    }
}

impl From<ParseError> for AppError {
    fn from(value: ParseError) -> Self {
        AppError::Parse(value)
    }
}

/// 실행에 필요한 파일 위치.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub settings: PathBuf,
    pub entries: PathBuf,
    pub log: PathBuf,
}

impl AppPaths {
    /// 명시하지 않은 경로는 실행 파일 옆의 기본 위치를 쓴다.
    pub fn resolve(settings: Option<PathBuf>, entries: Option<PathBuf>) -> Self {
        let settings = settings.unwrap_or_else(settings::default_settings_path);
        let entries = entries.unwrap_or_else(user_entries::default_entries_path);
        let log = settings.with_file_name(crate::logging::LOG_FILE_NAME);
        Self {
            settings,
            entries,
            log,
        }
    }
}
