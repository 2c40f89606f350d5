//! 폼 값과 설정을 합쳐 계산에 넘길 파라미터 묶음을 만든다.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::form::{fields, RawFormValues};
use crate::numeric::{self, ParseError};
use crate::settings::SettingsRecord;

/// 서로 배타적인 두 프로필.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Profile {
    Gas,
    Power,
}

impl Profile {
    /// 이 프로필의 입력 데이터 경로 설정 키.
    pub fn import_key(self) -> &'static str {
        match self {
            Profile::Gas => "path_gas",
            Profile::Power => "path_power",
        }
    }

    /// 이 프로필의 결과 내보내기 경로 설정 키.
    pub fn export_key(self) -> &'static str {
        match self {
            Profile::Gas => "export_path_gas",
            Profile::Power => "export_path_power",
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Profile::Gas => write!(f, "Gas"),
            Profile::Power => write!(f, "Power"),
        }
    }
}

/// (min, max) 범위.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// 저장량 관련 값 [MWh].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeLimits {
    /// 초기 저장량
    pub initial: f64,
    /// 시작 시점 허용 범위
    pub start: Range,
    /// 전체 허용 범위
    pub total: Range,
    /// 종료 시점 허용 범위
    pub end: Range,
}

/// 외부 계산에 넘기는 완성된 파라미터 묶음. 요청마다 새로 만들고 고치지 않는다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterBundle {
    pub profile: Profile,
    pub import_path: PathBuf,
    pub export_path: PathBuf,
    /// 연이율(%)을 360일 기준 일 단위 비율로 바꾼 값
    pub interest_rate: f64,
    pub start_date: String,
    pub end_date: String,
    pub use_scenarios: u32,
    pub volumes: VolumeLimits,
    /// 인출(Ausspeicher) 출력 범위 [MW]
    pub withdrawal_rate: Range,
    /// 주입(Einspeicher) 출력 범위 [MW]
    pub injection_rate: Range,
    /// 주입 비용 [€/MWh]
    pub inject_costs: f64,
    /// 인출 비용 [€/MWh]
    pub eject_costs: f64,
    pub storage_value_exists: bool,
    pub run_delta: bool,
    /// 가격 변동폭 [€/MWh]
    pub variation: f64,
    /// 상향 변동 활성 시 1
    pub up: i8,
    /// 하향 변동 활성 시 -1
    pub down: i8,
    pub means_only: bool,
    pub show_statistics: bool,
    pub time_step: i64,
    pub annualization_factor: i64,
    pub jump_distance: i64,
}

/// 조립 실패. 어느 경우든 부분 결과는 만들지 않는다.
#[derive(Debug, Clone, PartialEq)]
pub enum AssembleError {
    /// 숫자 필드 해석 실패
    Parse { field: &'static str, source: ParseError },
    /// 필드 값이 없거나 문자열이 아님
    MissingField(&'static str),
    /// Gas/Power 둘 다 선택됨
    ProfileConflict,
    /// 활성 프로필의 경로 설정이 비어 있음
    MissingSetting(&'static str),
    /// 모델 설정 값이 정수가 아님
    InvalidSetting { key: &'static str, value: String },
}

impl std::fmt::Display for AssembleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssembleError::Parse { field, source } => write!(f, "입력 필드 {field}: {source}"),
            AssembleError::MissingField(field) => write!(f, "입력 필드 {field}에 값이 없음"),
            AssembleError::ProfileConflict => write!(f, "Gas와 Power가 동시에 선택됨"),
            AssembleError::MissingSetting(key) => {
                write!(f, "설정 '{key}'이 비어 있음 (Settings 창에서 지정)")
            }
            AssembleError::InvalidSetting { key, value } => {
                write!(f, "설정 '{key}'은 정수여야 함: {value}")
            }
        }
    }
}

impl std::error::Error for AssembleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssembleError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// 폼 값과 설정으로 파라미터 묶음을 만든다.
pub fn assemble(form: &RawFormValues, settings: &SettingsRecord) -> Result<ParameterBundle, AssembleError> {
    let profile = select_profile(form)?;
    let import_path = settings
        .path(profile.import_key())
        .ok_or(AssembleError::MissingSetting(profile.import_key()))?;
    let export_path = settings
        .path(profile.export_key())
        .ok_or(AssembleError::MissingSetting(profile.export_key()))?;

    let direction = form.text(fields::DIRECTION).unwrap_or_default();
    let count_text = text(form, fields::NUM_SCENARIOS)?;
    let use_scenarios = numeric::parse_count(count_text).map_err(|source| AssembleError::Parse {
        field: fields::NUM_SCENARIOS,
        source,
    })?;

    Ok(ParameterBundle {
        profile,
        import_path,
        export_path,
        interest_rate: decimal(form, fields::INTEREST_RATE)? / 36_000.0,
        start_date: form.text(fields::START_DATE).unwrap_or_default().to_string(),
        end_date: form.text(fields::END_DATE).unwrap_or_default().to_string(),
        use_scenarios,
        volumes: VolumeLimits {
            initial: decimal(form, fields::INITIAL_VOLUME)?,
            start: range(form, fields::START_VOLUME_MIN, fields::START_VOLUME_MAX)?,
            total: range(form, fields::TOTAL_VOLUME_MIN, fields::TOTAL_VOLUME_MAX)?,
            end: range(form, fields::END_VOLUME_MIN, fields::END_VOLUME_MAX)?,
        },
        withdrawal_rate: range(form, fields::WITHDRAWAL_RATE_MIN, fields::WITHDRAWAL_RATE_MAX)?,
        injection_rate: range(form, fields::INJECTION_RATE_MIN, fields::INJECTION_RATE_MAX)?,
        inject_costs: decimal(form, fields::INJECT_COSTS)?,
        eject_costs: decimal(form, fields::EJECT_COSTS)?,
        storage_value_exists: yes(form, fields::STORAGE_VALUE),
        run_delta: yes(form, fields::RUN_DELTA),
        variation: decimal(form, fields::VARIATION)?,
        up: if direction.contains("UP") { 1 } else { 0 },
        down: if direction.contains("DOWN") { -1 } else { 0 },
        means_only: yes(form, fields::MEANS_ONLY),
        show_statistics: yes(form, fields::SHOW_STATISTICS),
        time_step: whole_setting(settings, "time_step")?,
        annualization_factor: whole_setting(settings, "annualization_factor")?,
        jump_distance: whole_setting(settings, "jump_distance_factor")?,
    })
}

/// Gas가 켜져 있으면 Gas, 아니면 Power.
pub fn select_profile(form: &RawFormValues) -> Result<Profile, AssembleError> {
    match (form.toggle(fields::GAS), form.toggle(fields::POWER)) {
        (true, true) => Err(AssembleError::ProfileConflict),
        (true, false) => Ok(Profile::Gas),
        (false, _) => Ok(Profile::Power),
    }
}

fn text<'a>(form: &'a RawFormValues, field: &'static str) -> Result<&'a str, AssembleError> {
    form.text(field).ok_or(AssembleError::MissingField(field))
}

fn decimal(form: &RawFormValues, field: &'static str) -> Result<f64, AssembleError> {
    numeric::normalize_decimal(text(form, field)?)
        .map_err(|source| AssembleError::Parse { field, source })
}

fn range(form: &RawFormValues, min: &'static str, max: &'static str) -> Result<Range, AssembleError> {
    Ok(Range::new(decimal(form, min)?, decimal(form, max)?))
}

fn yes(form: &RawFormValues, field: &str) -> bool {
    form.text(field) == Some("Yes")
}

fn whole_setting(settings: &SettingsRecord, key: &'static str) -> Result<i64, AssembleError> {
    let invalid = |value: String| AssembleError::InvalidSetting { key, value };
    match settings.get(key) {
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| invalid(n.to_string())),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| invalid(s.clone())),
        Some(other) => Err(invalid(other.to_string())),
        None => Err(invalid("nothing".to_string())),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 검증을 통과하는 표준 입력.
    pub(crate) fn sample_form() -> RawFormValues {
        let mut form = RawFormValues::new();
        form.set_toggle(fields::GAS, true);
        form.set_toggle(fields::POWER, false);
        for (field, text) in [
            (fields::INTEREST_RATE, "3,6"),
            (fields::START_DATE, "2024-01-01"),
            (fields::END_DATE, "2024-12-31"),
            (fields::NUM_SCENARIOS, "100"),
            (fields::INITIAL_VOLUME, "150"),
            (fields::START_VOLUME_MIN, "100"),
            (fields::START_VOLUME_MAX, "200"),
            (fields::TOTAL_VOLUME_MIN, "0"),
            (fields::TOTAL_VOLUME_MAX, "500"),
            (fields::END_VOLUME_MIN, "50"),
            (fields::END_VOLUME_MAX, "400"),
            (fields::WITHDRAWAL_RATE_MIN, "0"),
            (fields::WITHDRAWAL_RATE_MAX, "2,5"),
            (fields::INJECTION_RATE_MIN, "0"),
            (fields::INJECTION_RATE_MAX, "1.5"),
            (fields::INJECT_COSTS, "0,1"),
            (fields::EJECT_COSTS, "0.2"),
            (fields::STORAGE_VALUE, "Yes"),
            (fields::RUN_DELTA, "No"),
            (fields::VARIATION, "1"),
            (fields::DIRECTION, "UP&DOWN"),
            (fields::MEANS_ONLY, "No"),
            (fields::SHOW_STATISTICS, "Yes"),
        ] {
            form.set_text(field, text);
        }
        form
    }

    pub(crate) fn sample_settings() -> SettingsRecord {
        let mut rec = SettingsRecord::defaults();
        rec.set("path_gas", Value::from("/import/gas"));
        rec.set("export_path_gas", Value::from("/export/gas"));
        rec.set("path_power", Value::from("/import/power"));
        rec.set("export_path_power", Value::from("/export/power"));
        rec
    }

    #[test]
    fn assembles_sample() {
        let bundle = assemble(&sample_form(), &sample_settings()).unwrap();
        assert_eq!(bundle.profile, Profile::Gas);
        assert_eq!(bundle.import_path, PathBuf::from("/import/gas"));
        assert_eq!(bundle.export_path, PathBuf::from("/export/gas"));
        assert!((bundle.interest_rate - 0.0001).abs() < 1e-12);
        assert_eq!(bundle.use_scenarios, 100);
        assert_eq!(bundle.volumes.start, Range::new(100.0, 200.0));
        assert_eq!(bundle.withdrawal_rate, Range::new(0.0, 2.5));
        assert_eq!(bundle.inject_costs, 0.1);
        assert!(bundle.storage_value_exists);
        assert!(!bundle.run_delta);
        assert_eq!((bundle.up, bundle.down), (1, -1));
        assert_eq!(bundle.annualization_factor, 250);
    }

    #[test]
    fn power_profile_uses_power_paths() {
        let mut form = sample_form();
        form.set_toggle(fields::GAS, false);
        form.set_toggle(fields::POWER, true);
        let bundle = assemble(&form, &sample_settings()).unwrap();
        assert_eq!(bundle.profile, Profile::Power);
        assert_eq!(bundle.import_path, PathBuf::from("/import/power"));
        assert_eq!(bundle.export_path, PathBuf::from("/export/power"));
    }

    #[test]
    fn both_profiles_conflict() {
        let mut form = sample_form();
        form.set_toggle(fields::POWER, true);
        assert_eq!(select_profile(&form), Err(AssembleError::ProfileConflict));
    }

    #[test]
    fn direction_axes_are_independent() {
        for (text, up, down) in [("UP", 1, 0), ("DOWN", 0, -1), ("UP&DOWN", 1, -1), ("", 0, 0)] {
            let mut form = sample_form();
            form.set_text(fields::DIRECTION, text);
            let bundle = assemble(&form, &sample_settings()).unwrap();
            assert_eq!((bundle.up, bundle.down), (up, down), "{text}");
        }
    }

    #[test]
    fn unparsable_field_aborts() {
        let mut form = sample_form();
        form.set_text(fields::END_VOLUME_MAX, "4,0,0");
        let err = assemble(&form, &sample_settings()).unwrap_err();
        assert!(matches!(err, AssembleError::Parse { field, .. } if field == fields::END_VOLUME_MAX));

        let mut form = sample_form();
        form.set_text(fields::VARIATION, "");
        assert!(assemble(&form, &sample_settings()).is_err());
    }

    #[test]
    fn empty_profile_path_is_reported() {
        let mut settings = sample_settings();
        settings.set("export_path_gas", Value::Null);
        assert_eq!(
            assemble(&sample_form(), &settings),
            Err(AssembleError::MissingSetting("export_path_gas"))
        );
    }

    #[test]
    fn model_settings_accept_numeric_strings() {
        let mut settings = sample_settings();
        settings.set("time_step", Value::from("2"));
        settings.set("jump_distance_factor", Value::from("x"));
        let err = assemble(&sample_form(), &settings).unwrap_err();
        assert!(matches!(err, AssembleError::InvalidSetting { key: "jump_distance_factor", .. }));
        settings.set("jump_distance_factor", Value::from(4));
        let bundle = assemble(&sample_form(), &settings).unwrap();
        assert_eq!((bundle.time_step, bundle.jump_distance), (2, 4));
    }
}
