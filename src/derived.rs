//! 1차 입력값으로부터 화면 표시용 파생값을 계산한다.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::numeric::{self, ParseError};

/// 하루 24시간 동안 같은 출력으로 운전한다는 가정.
pub const HOURS_PER_DAY: f64 = 24.0;
/// 360일 이자 계산 관행.
pub const DAYS_PER_YEAR: u32 = 360;
/// 연이율 표시 계산의 유효 숫자 정밀도.
const RATE_SIGNIFICANT_DIGITS: u32 = 6;
const RATE_DECIMAL_PLACES: u32 = 4;

/// 출력[MW] 문자열에서 일일 에너지[MWh]를 계산한다.
///
/// 빈 입력이나 해석할 수 없는 입력이면 `None`을 돌려주어 표시를 갱신하지 않는다.
pub fn power_to_energy(power_text: &str) -> Option<String> {
    if power_text.is_empty() {
        return None;
    }
    let power = numeric::normalize_decimal(power_text).ok()?;
    Some(((power * HOURS_PER_DAY).trunc() as i64).to_string())
}

/// 연이율(%) 입력을 일 단위 이율 표시 문자열(`0.01%`)로 바꾼다.
///
/// 입력을 고칠 때마다 다시 계산하므로 이진 부동소수점 대신 십진 연산을 쓴다.
pub fn annualize_rate(rate_percent_text: &str) -> Result<String, ParseError> {
    let rate = parse_rate(rate_percent_text)?;
    let per_day = (rate / Decimal::from(DAYS_PER_YEAR))
        .round_sf(RATE_SIGNIFICANT_DIGITS)
        .ok_or_else(|| rate_error(rate_percent_text))?
        .round_dp(RATE_DECIMAL_PLACES)
        .normalize();
    Ok(format!("{per_day}%"))
}

fn rate_error(text: &str) -> ParseError {
    ParseError {
        input: text.to_string(),
        expected: "연이율",
    }
}

fn parse_rate(text: &str) -> Result<Decimal, ParseError> {
    let mut normalized = numeric::normalize_decimal_text(text.trim());
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    if normalized.ends_with('.') {
        normalized.push('0');
    }
    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    }
    Decimal::from_str(&normalized).map_err(|_| rate_error(text))
}

/// 비율(0.1234)을 백분율 문자열(`12.34%`)로 표시한다. 변동성 표시에 쓴다.
pub fn format_percent(fraction: f64) -> String {
    let pct = (fraction * 100.0 * 100.0).round() / 100.0;
    format!("{pct}%")
}
