//! 메인 폼에 마지막으로 입력한 값을 실행 간에 보존한다 (form_entries.toml).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::form::{FieldValue, RawFormValues};
use crate::key_map::FieldKeyMap;

pub const ENTRIES_FILE_NAME: &str = "form_entries.toml";

/// 저장된 입력값 하나.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryValue {
    Flag(bool),
    Text(String),
}

/// 입력값 키 -> 값.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserEntries {
    values: BTreeMap<String, EntryValue>,
}

/// 입력값 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug)]
pub enum EntriesError {
    /// 파일 입출력 오류
    Io(std::io::Error),
    /// TOML 역직렬화 오류
    Deserialize(toml::de::Error),
    /// TOML 직렬화 오류
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for EntriesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntriesError::Io(e) => write!(f, "입력값 파일 입출력 오류: {e}"),
            EntriesError::Deserialize(e) => write!(f, "입력값 파일 파싱 오류: {e}"),
            EntriesError::Serialize(e) => write!(f, "입력값 파일 직렬화 오류: {e}"),
        }
    }
}

impl std::error::Error for EntriesError {}

impl From<std::io::Error> for EntriesError {
    fn from(value: std::io::Error) -> Self {
        EntriesError::Io(value)
    }
}

impl From<toml::de::Error> for EntriesError {
    fn from(value: toml::de::Error) -> Self {
        EntriesError::Deserialize(value)
    }
}

impl From<toml::ser::Error> for EntriesError {
    fn from(value: toml::ser::Error) -> Self {
        EntriesError::Serialize(value)
    }
}

/// 파일을 읽거나, 없으면 빈 입력값 파일을 만든다.
pub fn load_or_default(path: &Path) -> Result<UserEntries, EntriesError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let entries: UserEntries = toml::from_str(&content)?;
        Ok(entries)
    } else {
        let entries = UserEntries::default();
        entries.save(path)?;
        Ok(entries)
    }
}

/// settings_file.json과 같은 디렉터리의 form_entries.toml.
pub fn default_entries_path() -> PathBuf {
    crate::settings::default_settings_path().with_file_name(ENTRIES_FILE_NAME)
}

impl UserEntries {
    /// 폼의 현재 값을 대응표를 따라 모은다. 폼에 없는 필드는 건너뛴다.
    pub fn capture(form: &RawFormValues, key_map: &FieldKeyMap) -> Self {
        let values = key_map
            .pairs()
            .filter_map(|(key, field)| {
                let value = match form.get(field)? {
                    FieldValue::Text(s) => EntryValue::Text(s.clone()),
                    FieldValue::Toggle(b) => EntryValue::Flag(*b),
                };
                Some((key.to_string(), value))
            })
            .collect();
        Self { values }
    }

    /// 저장된 값을 폼 필드로 되돌린다.
    pub fn to_form(&self, key_map: &FieldKeyMap) -> RawFormValues {
        let mut form = RawFormValues::new();
        for (key, field) in key_map.pairs() {
            match self.values.get(key) {
                Some(EntryValue::Text(s)) => form.set_text(field, s.clone()),
                Some(EntryValue::Flag(b)) => form.set_toggle(field, *b),
                None => {}
            }
        }
        form
    }

    pub fn get(&self, key: &str) -> Option<&EntryValue> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 파일 전체를 덮어써서 저장한다.
    pub fn save(&self, path: &Path) -> Result<(), EntriesError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
