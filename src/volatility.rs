//! 계산이 남긴 변동성 결과(volas_for_gui.json)를 읽어 표시용으로 만든다.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::derived::format_percent;

/// 계산이 활성 프로필의 입력 폴더에 남기는 파일 이름.
pub const VOLATILITY_FILE_NAME: &str = "volas_for_gui.json";

/// 파일에 담긴 변동성. 값은 비율(0.25 = 25%)이다.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Volatilities {
    /// 연 변동성
    pub vola: f64,
    /// 점프 포함 현물 변동성
    pub jump_vola: f64,
    /// 점프 제외 변동성
    pub no_jumps_vola: f64,
}

/// 화면 표시 문자열.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolatilityDisplay {
    pub year: String,
    pub spot_with_jumps: String,
    pub without_jumps: String,
}

impl Volatilities {
    pub fn display(&self) -> VolatilityDisplay {
        VolatilityDisplay {
            year: format_percent(self.vola),
            spot_with_jumps: format_percent(self.jump_vola),
            without_jumps: format_percent(self.no_jumps_vola),
        }
    }
}

/// 변동성 파일을 읽을 때 발생 가능한 오류를 표현한다.
#[derive(Debug)]
pub enum VolatilityError {
    /// 파일 입출력 오류
    Io(std::io::Error),
    /// JSON 파싱 오류
    Json(serde_json::Error),
}

impl std::fmt::Display for VolatilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolatilityError::Io(e) => write!(f, "변동성 파일 입출력 오류: {e}"),
            VolatilityError::Json(e) => write!(f, "변동성 파일 파싱 오류: {e}"),
        }
    }
}

impl std::error::Error for VolatilityError {}

impl From<std::io::Error> for VolatilityError {
    fn from(value: std::io::Error) -> Self {
        VolatilityError::Io(value)
    }
}

impl From<serde_json::Error> for VolatilityError {
    fn from(value: serde_json::Error) -> Self {
        VolatilityError::Json(value)
    }
}

/// 폴더 안의 변동성 파일 경로.
pub fn volatility_path(dir: &Path) -> PathBuf {
    dir.join(VOLATILITY_FILE_NAME)
}

pub fn load(path: &Path) -> Result<Volatilities, VolatilityError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
