//! 폼 필드 식별자와 한 번의 이벤트 처리 동안만 유효한 필드 값 모음.

use std::collections::BTreeMap;

use crate::numeric::Charset;

/// 폼 필드 식별자를 모아두는 네임스페이스.
pub mod fields {
    // 설정 창
    pub const PATH_POWER: &str = "settings.path_power";
    pub const PATH_GAS: &str = "settings.path_gas";
    pub const EXPORT_PATH_POWER: &str = "settings.export_path_power";
    pub const EXPORT_PATH_GAS: &str = "settings.export_path_gas";
    pub const TIME_STEP: &str = "settings.time_step";
    pub const ANNUALIZATION_FACTOR: &str = "settings.annualization_factor";
    pub const JUMP_DISTANCE: &str = "settings.jump_distance_factor";

    // 메인 폼
    pub const GAS: &str = "form.gas";
    pub const POWER: &str = "form.power";
    pub const INTEREST_RATE: &str = "form.interest_rate";
    pub const START_DATE: &str = "form.start_date";
    pub const END_DATE: &str = "form.end_date";
    pub const NUM_SCENARIOS: &str = "form.num_scenarios";
    pub const TOTAL_VOLUME_MIN: &str = "form.total_volume_min";
    pub const TOTAL_VOLUME_MAX: &str = "form.total_volume_max";
    pub const START_VOLUME_MIN: &str = "form.start_volume_min";
    pub const START_VOLUME_MAX: &str = "form.start_volume_max";
    pub const END_VOLUME_MIN: &str = "form.end_volume_min";
    pub const END_VOLUME_MAX: &str = "form.end_volume_max";
    pub const INITIAL_VOLUME: &str = "form.initial_volume";
    pub const INJECTION_RATE_MIN: &str = "form.injection_rate_min";
    pub const INJECTION_RATE_MAX: &str = "form.injection_rate_max";
    pub const WITHDRAWAL_RATE_MIN: &str = "form.withdrawal_rate_min";
    pub const WITHDRAWAL_RATE_MAX: &str = "form.withdrawal_rate_max";
    pub const INJECT_COSTS: &str = "form.inject_costs";
    pub const EJECT_COSTS: &str = "form.eject_costs";
    pub const STORAGE_VALUE: &str = "form.storage_value";
    pub const RUN_DELTA: &str = "form.run_delta";
    pub const VARIATION: &str = "form.variation";
    pub const DIRECTION: &str = "form.direction";
    pub const MEANS_ONLY: &str = "form.means_only";
    pub const SHOW_STATISTICS: &str = "form.show_statistics";
}

/// 키 입력 필터 대상 필드와 허용 문자 집합.
pub const FILTERED_FIELDS: &[(&str, Charset)] = &[
    (fields::NUM_SCENARIOS, Charset::Integer),
    (fields::INTEREST_RATE, Charset::Decimal),
    (fields::TOTAL_VOLUME_MIN, Charset::Decimal),
    (fields::TOTAL_VOLUME_MAX, Charset::Decimal),
    (fields::START_VOLUME_MIN, Charset::Decimal),
    (fields::START_VOLUME_MAX, Charset::Decimal),
    (fields::END_VOLUME_MIN, Charset::Decimal),
    (fields::END_VOLUME_MAX, Charset::Decimal),
    (fields::INITIAL_VOLUME, Charset::Decimal),
    (fields::INJECTION_RATE_MIN, Charset::Decimal),
    (fields::INJECTION_RATE_MAX, Charset::Decimal),
    (fields::WITHDRAWAL_RATE_MIN, Charset::Decimal),
    (fields::WITHDRAWAL_RATE_MAX, Charset::Decimal),
    (fields::INJECT_COSTS, Charset::Decimal),
    (fields::EJECT_COSTS, Charset::Decimal),
    (fields::VARIATION, Charset::Decimal),
];

/// 필드에 적용할 키 입력 필터를 찾는다.
pub fn charset_for(field: &str) -> Option<Charset> {
    FILTERED_FIELDS
        .iter()
        .find(|(id, _)| *id == field)
        .map(|(_, charset)| *charset)
}

/// 필드 하나의 현재 값.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 입력란/드롭다운 문자열
    Text(String),
    /// 라디오/체크 상태
    Toggle(bool),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            FieldValue::Toggle(_) => None,
        }
    }
}

/// 필드 식별자 -> 현재 값.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFormValues {
    values: BTreeMap<String, FieldValue>,
}

impl RawFormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, field: &str, text: impl Into<String>) {
        self.values
            .insert(field.to_string(), FieldValue::Text(text.into()));
    }

    pub fn set_toggle(&mut self, field: &str, on: bool) {
        self.values.insert(field.to_string(), FieldValue::Toggle(on));
    }

    pub fn insert(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.to_string(), value);
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.values.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// 문자열 값. 토글이거나 없으면 `None`.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(FieldValue::as_text)
    }

    /// 토글 상태. 없으면 꺼진 것으로 본다.
    pub fn toggle(&self, field: &str) -> bool {
        matches!(self.values.get(field), Some(FieldValue::Toggle(true)))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
