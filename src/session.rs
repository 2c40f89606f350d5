//! 한 번에 한 창만 활성인 상호작용 흐름을 순서대로 묶는다.
//!
//! 설정은 조립 요청 전에 모두 로드되고, 설정 창은 초안을 따로 들고 있다가
//! 저장할 때만 레코드와 파일에 반영한다.

use std::path::{Path, PathBuf};

use crate::assemble::{self, AssembleError, ParameterBundle};
use crate::calculation::{Calculation, CalculationError};
use crate::derived;
use crate::form::{self, fields, FieldValue, RawFormValues};
use crate::key_map::{entries_key_map, settings_key_map};
use crate::notify::{Notice, NotificationSink};
use crate::numeric;
use crate::settings::{self, SaveReport, SettingsError, SettingsRecord, SyncFailure};
use crate::user_entries::{EntriesError, UserEntries};
use crate::validate::{self, ValidationOutcome, Violation};
use crate::volatility::{self, VolatilityDisplay};

/// 계산 요청 실패.
#[derive(Debug)]
pub enum SessionError {
    /// 폼 조립 실패
    Assemble(AssembleError),
    /// 교차 필드 검증 실패
    Rejected(Violation),
    /// 외부 계산 실패
    Calculation(CalculationError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Assemble(e) => write!(f, "입력 오류: {e}"),
            SessionError::Rejected(v) => write!(f, "{v}"),
            SessionError::Calculation(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<AssembleError> for SessionError {
    fn from(value: AssembleError) -> Self {
        SessionError::Assemble(value)
    }
}

impl From<CalculationError> for SessionError {
    fn from(value: CalculationError) -> Self {
        SessionError::Calculation(value)
    }
}

/// 설정 창이 열려 있는 동안의 편집 값. 버리면 아무것도 바뀌지 않는다.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsDraft {
    pub values: RawFormValues,
    /// 창을 채울 때 레코드에 없던 키
    pub missing: Vec<SyncFailure>,
}

impl SettingsDraft {
    pub fn text(&self, field: &str) -> &str {
        self.values.text(field).unwrap_or_default()
    }

    pub fn set_text(&mut self, field: &str, text: impl Into<String>) {
        self.values.set_text(field, text);
    }
}

/// 파생 표시값. `None`이면 이전 표시를 유지한다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedDisplay {
    pub injection_energy_min: Option<String>,
    pub injection_energy_max: Option<String>,
    pub withdrawal_energy_min: Option<String>,
    pub withdrawal_energy_max: Option<String>,
    pub interest_rate_per_day: Option<String>,
}

/// 설정 레코드를 소유하는 단일 상호작용 세션.
pub struct Session<S: NotificationSink> {
    settings_path: PathBuf,
    settings: SettingsRecord,
    sink: S,
    volatility: Option<VolatilityDisplay>,
}

impl<S: NotificationSink> Session<S> {
    /// 설정을 로드(필요하면 기본값으로 복구)한 세션을 연다.
    pub fn start(settings_path: impl Into<PathBuf>, mut sink: S) -> Self {
        let settings_path = settings_path.into();
        let settings = settings::load(&settings_path, &SettingsRecord::defaults(), &mut sink);
        Self {
            settings_path,
            settings,
            sink,
            volatility: None,
        }
    }

    pub fn settings(&self) -> &SettingsRecord {
        &self.settings
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// 마지막으로 성공한 계산의 변동성 표시값.
    pub fn volatility(&self) -> Option<&VolatilityDisplay> {
        self.volatility.as_ref()
    }

    /// 설정 창용 초안을 만든다. 빠진 키는 경고로 남긴다.
    pub fn open_settings(&mut self) -> SettingsDraft {
        let (values, missing) = settings::populate(&self.settings, settings_key_map());
        for failure in &missing {
            self.sink.publish(Notice::SyncWarning {
                key: failure.key.clone(),
                field: failure.field.clone(),
            });
        }
        SettingsDraft { values, missing }
    }

    /// 초안을 레코드에 덮어쓰고 파일로 저장한다.
    pub fn commit_settings(&mut self, draft: &SettingsDraft) -> Result<SaveReport, SettingsError> {
        settings::save(
            &self.settings_path,
            &mut self.settings,
            Some(&draft.values),
            settings_key_map(),
            &mut self.sink,
        )
    }

    /// 필드별 키 입력 필터를 적용한다. 필터 대상이 아니면 그대로 돌려준다.
    pub fn filter_field(&self, field: &str, text: &str) -> String {
        let Some(charset) = form::charset_for(field) else {
            return text.to_string();
        };
        let filtered = numeric::filter_keystroke(text, charset);
        if filtered.len() != text.len() {
            let key = entries_key_map().key_for(field).unwrap_or(field);
            tracing::debug!(%key, "dropped a character the field does not accept");
        }
        filtered
    }

    /// 출력 필드로부터 에너지 표시값과 일 이율 표시값을 계산한다.
    pub fn derived_display(&self, form: &RawFormValues) -> DerivedDisplay {
        let energy = |field: &str| form.text(field).and_then(derived::power_to_energy);
        DerivedDisplay {
            injection_energy_min: energy(fields::INJECTION_RATE_MIN),
            injection_energy_max: energy(fields::INJECTION_RATE_MAX),
            withdrawal_energy_min: energy(fields::WITHDRAWAL_RATE_MIN),
            withdrawal_energy_max: energy(fields::WITHDRAWAL_RATE_MAX),
            interest_rate_per_day: derived::annualize_rate(
                form.text(fields::INTEREST_RATE).unwrap_or_default(),
            )
            .ok(),
        }
    }

    /// 메인 폼 값을 입력값 파일에 저장한다.
    pub fn save_entries(&mut self, form: &RawFormValues, path: &Path) -> Result<(), EntriesError> {
        UserEntries::capture(form, entries_key_map()).save(path)?;
        self.sink.publish(Notice::EntriesSaved {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    /// 조립과 검증만 한다. 검증 실패는 알림으로도 내보낸다.
    pub fn check(&mut self, form: &RawFormValues) -> Result<ParameterBundle, SessionError> {
        let bundle = assemble::assemble(form, &self.settings)?;
        if let ValidationOutcome::Invalid(violation) = validate::validate(&bundle) {
            self.sink.publish(Notice::ValidationFailed {
                message: violation.to_string(),
            });
            return Err(SessionError::Rejected(violation));
        }
        Ok(bundle)
    }

    /// 조립, 검증, 계산 순으로 진행한다. 어느 단계든 실패하면 묶음은 버려진다.
    ///
    /// 계산이 끝나면 입력 폴더의 변동성 파일을 읽어 표시값을 갱신한다. 파일이
    /// 없거나 깨져 있으면 경고만 남기고 이전 표시를 유지한다.
    pub fn request_calculation(
        &mut self,
        form: &RawFormValues,
        calc: &mut dyn Calculation,
    ) -> Result<ParameterBundle, SessionError> {
        let bundle = self.check(form)?;
        calc.run(&bundle)?;
        self.refresh_volatility(&bundle.import_path);
        Ok(bundle)
    }

    fn refresh_volatility(&mut self, import_dir: &Path) {
        let path = volatility::volatility_path(import_dir);
        match volatility::load(&path) {
            Ok(values) => self.volatility = Some(values.display()),
            Err(err) => self.sink.publish(Notice::VolatilityUnavailable {
                path,
                reason: err.to_string(),
            }),
        }
    }
}

/// 프로필 토글 한 쌍을 폼에 쓴다.
pub fn set_profile(form: &mut RawFormValues, profile: assemble::Profile) {
    let gas = profile == assemble::Profile::Gas;
    form.insert(fields::GAS, FieldValue::Toggle(gas));
    form.insert(fields::POWER, FieldValue::Toggle(!gas));
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::assemble::tests::{sample_form, sample_settings};
    use crate::calculation::LoggingCalculation;
    use crate::notify::NoticeLog;
    use crate::settings::SETTINGS_FILE_NAME;

    pub(crate) fn session_with_paths(dir: &Path) -> Session<NoticeLog> {
        let path = dir.join(SETTINGS_FILE_NAME);
        let mut session = Session::start(&path, NoticeLog::new());
        let mut draft = session.open_settings();
        for (key, field) in settings_key_map().pairs() {
            if let Some(text) = sample_settings().text(key) {
                draft.set_text(field, text);
            }
        }
        session.commit_settings(&draft).unwrap();
        session.sink_mut().drain();
        session
    }

    #[test]
    fn cancelled_draft_changes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session_with_paths(dir.path());
        let before = session.settings().clone();
        let on_disk = std::fs::read_to_string(session.settings_path()).unwrap();

        let mut draft = session.open_settings();
        draft.set_text(fields::PATH_GAS, "/elsewhere");
        drop(draft);

        assert_eq!(session.settings(), &before);
        assert_eq!(
            std::fs::read_to_string(session.settings_path()).unwrap(),
            on_disk
        );
    }

    #[test]
    fn accepted_bundle_reaches_calculation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session_with_paths(dir.path());
        let mut calc = LoggingCalculation::default();
        let bundle = session.request_calculation(&sample_form(), &mut calc).unwrap();
        assert_eq!(calc.runs(), 1);
        assert_eq!(bundle.import_path, PathBuf::from("/import/gas"));
    }

    #[test]
    fn rejected_bundle_is_reported_and_not_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session_with_paths(dir.path());
        let mut form = sample_form();
        form.set_text(fields::END_VOLUME_MAX, "600");
        let mut calc = LoggingCalculation::default();
        let err = session.request_calculation(&form, &mut calc).unwrap_err();
        assert!(matches!(err, SessionError::Rejected(_)));
        assert_eq!(calc.runs(), 0);
        assert!(matches!(
            session.sink().notices(),
            [Notice::ValidationFailed { .. }]
        ));

        // 입력을 고치면 다시 시도할 수 있다
        form.set_text(fields::END_VOLUME_MAX, "400");
        assert!(session.request_calculation(&form, &mut calc).is_ok());
    }

    #[test]
    fn check_does_not_touch_volatility() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = session_with_paths(dir.path());
        let bundle = session.check(&sample_form()).unwrap();
        assert_eq!(bundle.profile, assemble::Profile::Gas);
        assert!(session.sink().notices().is_empty());
        assert_eq!(session.volatility(), None);

        let mut form = sample_form();
        form.set_text(fields::INITIAL_VOLUME, "50");
        assert!(matches!(session.check(&form), Err(SessionError::Rejected(_))));
        assert!(matches!(
            session.sink().notices(),
            [Notice::ValidationFailed { .. }]
        ));
    }

    #[test]
    fn finished_run_shows_volatilities_from_import_folder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let import = tempfile::tempdir().expect("tempdir");
        let mut session = session_with_paths(dir.path());
        let mut draft = session.open_settings();
        draft.set_text(fields::PATH_GAS, import.path().display().to_string());
        session.commit_settings(&draft).unwrap();
        session.sink_mut().drain();

        let mut calc = LoggingCalculation::default();
        session.request_calculation(&sample_form(), &mut calc).unwrap();
        assert_eq!(session.volatility(), None);
        assert!(matches!(
            session.sink().notices(),
            [Notice::VolatilityUnavailable { .. }]
        ));

        std::fs::write(
            volatility::volatility_path(import.path()),
            r#"{"vola": 0.3, "jump_vola": 0.4567, "no_jumps_vola": 0.12}"#,
        )
        .unwrap();
        session.request_calculation(&sample_form(), &mut calc).unwrap();
        let shown = session.volatility().unwrap();
        assert_eq!(shown.year, "30%");
        assert_eq!(shown.spot_with_jumps, "45.67%");
        assert_eq!(shown.without_jumps, "12%");
    }

    #[test]
    fn keystrokes_are_filtered_per_field() {
        let dir = tempfile::tempdir().expect("tempdir");
        let session = session_with_paths(dir.path());
        assert_eq!(session.filter_field(fields::NUM_SCENARIOS, "10,"), "10");
        assert_eq!(session.filter_field(fields::VARIATION, "1,"), "1,");
        assert_eq!(session.filter_field(fields::START_DATE, "2024-"), "2024-");
    }

    #[test]
    fn derived_display_from_form() {
        let dir = tempfile::tempdir().expect("tempdir");
        let session = session_with_paths(dir.path());
        let mut form = sample_form();
        form.set_text(fields::INJECTION_RATE_MIN, "");
        let shown = session.derived_display(&form);
        assert_eq!(shown.withdrawal_energy_max.as_deref(), Some("60"));
        assert_eq!(shown.injection_energy_max.as_deref(), Some("36"));
        assert_eq!(shown.injection_energy_min, None);
        assert_eq!(shown.interest_rate_per_day.as_deref(), Some("0.01%"));
    }

    #[test]
    fn profile_toggles_stay_exclusive() {
        let mut form = sample_form();
        set_profile(&mut form, assemble::Profile::Power);
        assert!(form.toggle(fields::POWER));
        assert!(!form.toggle(fields::GAS));
    }
}
