//! 입력 필드의 숫자 문자열 처리.
//!
//! 사용자는 소수점으로 `.`와 `,`를 섞어 쓴다. 모든 `,`를 `.`로 바꾼 뒤 해석하며
//! 천 단위 구분자는 지원하지 않는다.

/// 숫자 해석 실패를 표현한다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 원래 입력 문자열
    pub input: String,
    /// 기대한 형식
    pub expected: &'static str,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "숫자 해석 오류 ({}): '{}'", self.expected, self.input)
    }
}

impl std::error::Error for ParseError {}

/// 키 입력 필터가 허용하는 문자 집합.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// 숫자만
    Integer,
    /// 숫자와 `.` `,`
    Decimal,
}

impl Charset {
    pub fn allows(self, c: char) -> bool {
        match self {
            Charset::Integer => c.is_ascii_digit(),
            Charset::Decimal => c.is_ascii_digit() || c == '.' || c == ',',
        }
    }
}

/// 모든 `,`를 `.`로 치환한다. 이미 정규화된 문자열에는 영향이 없다.
pub fn normalize_decimal_text(text: &str) -> String {
    text.replace(',', ".")
}

/// 쉼표/점 소수 표기를 f64로 해석한다. 빈 문자열은 0이 아니라 오류다.
pub fn normalize_decimal(text: &str) -> Result<f64, ParseError> {
    let normalized = normalize_decimal_text(text);
    match normalized.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError {
            input: text.to_string(),
            expected: "소수",
        }),
    }
}

/// 시나리오 수처럼 정수만 받는 필드를 해석한다.
pub fn parse_count(text: &str) -> Result<u32, ParseError> {
    text.trim().parse::<u32>().map_err(|_| ParseError {
        input: text.to_string(),
        expected: "정수",
    })
}

/// 방금 입력된 마지막 문자가 허용 집합 밖이면 그 문자만 지운다.
pub fn filter_keystroke(text: &str, charset: Charset) -> String {
    match text.chars().last() {
        Some(last) if !charset.allows(last) => {
            let mut out = text.to_string();
            out.pop();
            out
        }
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_and_dot_parse_the_same() {
        assert_eq!(normalize_decimal("2,5").unwrap(), 2.5);
        assert_eq!(normalize_decimal("2.5").unwrap(), 2.5);
        assert_eq!(normalize_decimal("-7").unwrap(), -7.0);
    }

    #[test]
    fn malformed_decimal_is_rejected() {
        for bad in ["", "1,2,3", "1.2.3", "12a", "abc", ",", "inf", "NaN"] {
            assert!(normalize_decimal(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn normalizing_twice_is_stable() {
        let once = normalize_decimal_text("1,25");
        assert_eq!(normalize_decimal_text(&once), once);
        assert_eq!(normalize_decimal(&once).unwrap(), 1.25);
    }

    #[test]
    fn count_rejects_fractions() {
        assert_eq!(parse_count("12").unwrap(), 12);
        assert!(parse_count("1.5").is_err());
        assert!(parse_count("").is_err());
    }

    #[test]
    fn keystroke_filter_drops_only_last_char() {
        assert_eq!(filter_keystroke("12a", Charset::Decimal), "12");
        assert_eq!(filter_keystroke("12,", Charset::Decimal), "12,");
        assert_eq!(filter_keystroke("12,", Charset::Integer), "12");
        assert_eq!(filter_keystroke("", Charset::Integer), "");
        // 앞쪽 문자는 건드리지 않는다
        assert_eq!(filter_keystroke("x1", Charset::Integer), "x1");
        assert_eq!(filter_keystroke("1€", Charset::Decimal), "1");
    }

    #[test]
    fn filtered_text_stays_in_charset() {
        for charset in [Charset::Integer, Charset::Decimal] {
            for last in ['0', '9', '.', ',', 'z', '-', ' ', 'ä'] {
                let text = format!("123{last}");
                let out = filter_keystroke(&text, charset);
                assert!(out.chars().all(|c| charset.allows(c)), "{out:?}");
                assert_eq!(filter_keystroke(&out, charset), out);
            }
        }
    }
}
