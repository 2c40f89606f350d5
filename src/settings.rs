//! 전역 설정(settings_file.json)의 로드/저장과 폼 동기화.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::form::{FieldValue, RawFormValues};
use crate::key_map::FieldKeyMap;
use crate::notify::{Notice, NotificationSink};

/// 실행 파일 옆에 두는 설정 파일 이름.
pub const SETTINGS_FILE_NAME: &str = "settings_file.json";

/// 설정 키 -> 값. 값은 null, 문자열(경로), 숫자, bool 중 하나다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsRecord {
    entries: BTreeMap<String, Value>,
}

impl SettingsRecord {
    /// 최초 실행 시 쓰는 기본 템플릿.
    pub fn defaults() -> Self {
        let mut rec = Self::default();
        for key in ["path_power", "path_gas", "export_path_power", "export_path_gas"] {
            rec.set(key, Value::Null);
        }
        rec.set("time_step", Value::from(1));
        rec.set("annualization_factor", Value::from(250));
        rec.set("jump_distance_factor", Value::from(3));
        rec
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 비어있지 않은 문자열 값. null이나 빈 문자열은 `None`.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn path(&self, key: &str) -> Option<PathBuf> {
        self.text(key).map(PathBuf::from)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `template`에 있지만 빠진 키를 채운다. 채운 키 수를 돌려준다.
    pub fn backfill(&mut self, template: &SettingsRecord) -> usize {
        let mut filled = 0;
        for (key, value) in &template.entries {
            if !self.entries.contains_key(key) {
                self.entries.insert(key.clone(), value.clone());
                filled += 1;
            }
        }
        filled
    }

    fn from_json(content: &str) -> Result<Self, SettingsError> {
        match serde_json::from_str::<Value>(content)? {
            Value::Object(map) => Ok(Self {
                entries: map.into_iter().collect(),
            }),
            _ => Err(SettingsError::NotAnObject),
        }
    }

    fn to_json(&self) -> Result<String, SettingsError> {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(serde_json::to_string_pretty(&Value::Object(map))?)
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug)]
pub enum SettingsError {
    /// 파일 입출력 오류
    Io(std::io::Error),
    /// JSON 파싱/직렬화 오류
    Json(serde_json::Error),
    /// 최상위가 객체가 아님
    NotAnObject,
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "설정 파일 입출력 오류: {e}"),
            SettingsError::Json(e) => write!(f, "설정 파일 JSON 오류: {e}"),
            SettingsError::NotAnObject => write!(f, "설정 파일 최상위는 JSON 객체여야 함"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(value: std::io::Error) -> Self {
        SettingsError::Io(value)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(value: serde_json::Error) -> Self {
        SettingsError::Json(value)
    }
}

/// 키 하나의 동기화 실패.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub key: String,
    pub field: String,
}

impl SyncFailure {
    fn notice(&self) -> Notice {
        Notice::SyncWarning {
            key: self.key.clone(),
            field: self.field.clone(),
        }
    }
}

/// 저장 결과. 동기화에 실패한 키는 이전 값을 유지한 채 기록된다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub updated: Vec<String>,
    pub failures: Vec<SyncFailure>,
}

/// 설정 파일을 읽는다. 실패하면 알리고 기본값을 쓰며, 곧바로 기본값을 파일로 남긴다.
pub fn load(path: &Path, defaults: &SettingsRecord, sink: &mut dyn NotificationSink) -> SettingsRecord {
    match read_record(path) {
        Ok(mut record) => {
            let filled = record.backfill(defaults);
            if filled > 0 {
                tracing::debug!(filled, path = %path.display(), "backfilled missing settings keys");
            }
            record
        }
        Err(err) => {
            sink.publish(Notice::LoadFallback {
                path: path.to_path_buf(),
                reason: err.to_string(),
            });
            let record = defaults.clone();
            if let Err(err) = write_record(path, &record) {
                sink.publish(Notice::DefaultsNotPersisted {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                });
            } else {
                sink.publish(Notice::Saved {
                    path: path.to_path_buf(),
                });
            }
            record
        }
    }
}

/// 설정을 파일 전체를 덮어써서 저장한다.
///
/// `overlay`가 있으면 대응표의 각 키에 대해 매핑된 필드 값을 먼저 복사한다.
/// 필드가 없는 키는 실패로 모아 알리고 이전 값을 그대로 둔다.
pub fn save(
    path: &Path,
    record: &mut SettingsRecord,
    overlay: Option<&RawFormValues>,
    key_map: &FieldKeyMap,
    sink: &mut dyn NotificationSink,
) -> Result<SaveReport, SettingsError> {
    let mut report = SaveReport::default();
    if let Some(values) = overlay {
        for (key, field) in key_map.pairs() {
            match values.get(field) {
                Some(value) => {
                    record.set(key, field_to_json(value));
                    report.updated.push(key.to_string());
                }
                None => report.failures.push(SyncFailure {
                    key: key.to_string(),
                    field: field.to_string(),
                }),
            }
        }
        for failure in &report.failures {
            sink.publish(failure.notice());
        }
    }
    write_record(path, record)?;
    sink.publish(Notice::Saved {
        path: path.to_path_buf(),
    });
    Ok(report)
}

/// 설정 창을 열 때 레코드 값을 필드로 옮긴다. 레코드에 없는 키는 실패로 모은다.
pub fn populate(record: &SettingsRecord, key_map: &FieldKeyMap) -> (RawFormValues, Vec<SyncFailure>) {
    let mut values = RawFormValues::new();
    let mut failures = Vec::new();
    for (key, field) in key_map.pairs() {
        match record.get(key) {
            Some(value) => values.insert(field, json_to_field(value)),
            None => failures.push(SyncFailure {
                key: key.to_string(),
                field: field.to_string(),
            }),
        }
    }
    (values, failures)
}

/// 실행 파일 옆의 settings_file.json. 실행 파일 위치를 알 수 없으면 현재 디렉터리.
pub fn default_settings_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SETTINGS_FILE_NAME)
}

fn read_record(path: &Path) -> Result<SettingsRecord, SettingsError> {
    let content = fs::read_to_string(path)?;
    SettingsRecord::from_json(&content)
}

fn write_record(path: &Path, record: &SettingsRecord) -> Result<(), SettingsError> {
    let content = record.to_json()?;
    fs::write(path, content)?;
    Ok(())
}

fn field_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(s) => Value::String(s.clone()),
        FieldValue::Toggle(b) => Value::Bool(*b),
    }
}

fn json_to_field(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Text(String::new()),
        Value::String(s) => FieldValue::Text(s.clone()),
        Value::Bool(b) => FieldValue::Toggle(*b),
        other => FieldValue::Text(other.to_string()),
    }
}
