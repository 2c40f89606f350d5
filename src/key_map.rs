//! 설정 키와 폼 필드 식별자 사이의 양방향 대응표.
//!
//! 표는 프로세스당 한 번 만들어지고 이후에는 읽기 전용이다.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::form::fields;

/// 설정 키 <-> 필드 식별자 대응표.
#[derive(Debug, Clone, Default)]
pub struct FieldKeyMap {
    to_field: BTreeMap<&'static str, &'static str>,
    to_key: BTreeMap<&'static str, &'static str>,
}

impl FieldKeyMap {
    /// 쌍 목록으로 표를 만든다. 중복된 키/필드는 마지막 쌍이 이긴다.
    pub fn from_pairs(pairs: &[(&'static str, &'static str)]) -> Self {
        let mut map = Self::default();
        for &(key, field) in pairs {
            if let Some(old_field) = map.to_field.insert(key, field) {
                map.to_key.remove(old_field);
            }
            if let Some(old_key) = map.to_key.insert(field, key) {
                if old_key != key {
                    map.to_field.remove(old_key);
                }
            }
        }
        map
    }

    pub fn field_for(&self, key: &str) -> Option<&'static str> {
        self.to_field.get(key).copied()
    }

    pub fn key_for(&self, field: &str) -> Option<&'static str> {
        self.to_key.get(field).copied()
    }

    /// (설정 키, 필드) 쌍을 키 순서대로 돈다.
    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.to_field.iter().map(|(k, f)| (*k, *f))
    }

    pub fn len(&self) -> usize {
        self.to_field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_field.is_empty()
    }
}

const SETTINGS_PAIRS: &[(&str, &str)] = &[
    ("path_power", fields::PATH_POWER),
    ("path_gas", fields::PATH_GAS),
    ("export_path_power", fields::EXPORT_PATH_POWER),
    ("export_path_gas", fields::EXPORT_PATH_GAS),
    ("time_step", fields::TIME_STEP),
    ("annualization_factor", fields::ANNUALIZATION_FACTOR),
    ("jump_distance_factor", fields::JUMP_DISTANCE),
];

const ENTRY_PAIRS: &[(&str, &str)] = &[
    ("gas", fields::GAS),
    ("power", fields::POWER),
    ("interest_rate", fields::INTEREST_RATE),
    ("start_date", fields::START_DATE),
    ("end_date", fields::END_DATE),
    ("num_scenarios", fields::NUM_SCENARIOS),
    ("init_vol", fields::INITIAL_VOLUME),
    ("speicherwert", fields::STORAGE_VALUE),
    ("ausspeicher_leistung_min", fields::WITHDRAWAL_RATE_MIN),
    ("ausspeicher_leistung_max", fields::WITHDRAWAL_RATE_MAX),
    ("einspeicher_leistung_min", fields::INJECTION_RATE_MIN),
    ("einspeicher_leistung_max", fields::INJECTION_RATE_MAX),
    ("tot_vol_min", fields::TOTAL_VOLUME_MIN),
    ("tot_vol_max", fields::TOTAL_VOLUME_MAX),
    ("vol_start_min", fields::START_VOLUME_MIN),
    ("vol_start_max", fields::START_VOLUME_MAX),
    ("vol_end_min", fields::END_VOLUME_MIN),
    ("vol_end_max", fields::END_VOLUME_MAX),
    ("inject_costs", fields::INJECT_COSTS),
    ("eject_costs", fields::EJECT_COSTS),
    ("run_delta", fields::RUN_DELTA),
    ("variation", fields::VARIATION),
    ("action", fields::DIRECTION),
    ("means_only", fields::MEANS_ONLY),
    ("show_statistics", fields::SHOW_STATISTICS),
];

/// 설정 파일 키와 설정 창 필드의 대응표.
pub fn settings_key_map() -> &'static FieldKeyMap {
    static MAP: OnceLock<FieldKeyMap> = OnceLock::new();
    MAP.get_or_init(|| FieldKeyMap::from_pairs(SETTINGS_PAIRS))
}

/// 저장된 입력값 키와 메인 폼 필드의 대응표.
pub fn entries_key_map() -> &'static FieldKeyMap {
    static MAP: OnceLock<FieldKeyMap> = OnceLock::new();
    MAP.get_or_init(|| FieldKeyMap::from_pairs(ENTRY_PAIRS))
}
