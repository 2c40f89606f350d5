//! 입력 -> 조립 -> 검증 -> 계산 흐름 테스트.
use storage_lsm_toolbox::assemble::{assemble, Profile};
use storage_lsm_toolbox::calculation::LoggingCalculation;
use storage_lsm_toolbox::derived::{annualize_rate, power_to_energy};
use storage_lsm_toolbox::form::{fields, RawFormValues};
use storage_lsm_toolbox::notify::{Notice, NoticeLog};
use storage_lsm_toolbox::session::{set_profile, Session, SessionError};
use storage_lsm_toolbox::validate::{validate, Check, ValidationOutcome};

fn form(end_max: &str) -> RawFormValues {
    let mut form = RawFormValues::new();
    set_profile(&mut form, Profile::Power);
    for (field, text) in [
        (fields::INTEREST_RATE, "3.6"),
        (fields::NUM_SCENARIOS, "20"),
        (fields::INITIAL_VOLUME, "150"),
        (fields::START_VOLUME_MIN, "100"),
        (fields::START_VOLUME_MAX, "200"),
        (fields::TOTAL_VOLUME_MIN, "0"),
        (fields::TOTAL_VOLUME_MAX, "500"),
        (fields::END_VOLUME_MIN, "50"),
        (fields::END_VOLUME_MAX, end_max),
        (fields::INJECTION_RATE_MIN, "0"),
        (fields::INJECTION_RATE_MAX, "2,5"),
        (fields::WITHDRAWAL_RATE_MIN, "0"),
        (fields::WITHDRAWAL_RATE_MAX, "3"),
        (fields::INJECT_COSTS, "0,5"),
        (fields::EJECT_COSTS, "0,5"),
        (fields::VARIATION, "2"),
        (fields::DIRECTION, "DOWN"),
        (fields::STORAGE_VALUE, "No"),
    ] {
        form.set_text(field, text);
    }
    form
}

fn session(dir: &std::path::Path) -> Session<NoticeLog> {
    let mut session = Session::start(dir.join("settings_file.json"), NoticeLog::new());
    let mut draft = session.open_settings();
    draft.set_text(fields::PATH_POWER, "/power/in");
    draft.set_text(fields::EXPORT_PATH_POWER, "/power/out");
    session.commit_settings(&draft).expect("commit settings");
    session.sink_mut().drain();
    session
}

#[test]
fn derived_examples() {
    assert_eq!(power_to_energy("2,5").as_deref(), Some("60"));
    assert_eq!(annualize_rate("3.6").unwrap(), "0.01%");
}

#[test]
fn end_envelope_wider_than_total_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let session = session(dir.path());
    let bundle = assemble(&form("600"), session.settings()).expect("assemble");
    match validate(&bundle) {
        ValidationOutcome::Invalid(v) => assert_eq!(v.check, Check::EndMaxBelowTotalMax),
        ValidationOutcome::Valid => panic!("600 > 500 must fail"),
    }
    let bundle = assemble(&form("400"), session.settings()).expect("assemble");
    assert!(validate(&bundle).is_valid());
    assert_eq!((bundle.up, bundle.down), (0, -1));
    assert!(!bundle.storage_value_exists);
}

#[test]
fn session_runs_only_valid_bundles() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session(dir.path());
    let mut calc = LoggingCalculation::default();

    let err = session
        .request_calculation(&form("600"), &mut calc)
        .expect_err("should be rejected");
    assert!(matches!(err, SessionError::Rejected(_)));
    assert!(err.to_string().starts_with("Parameter Input Problem: Volume End (max) = 600"));
    assert!(matches!(
        session.sink().notices(),
        [Notice::ValidationFailed { .. }]
    ));

    let bundle = session
        .request_calculation(&form("400"), &mut calc)
        .expect("valid bundle");
    assert_eq!(calc.runs(), 1);
    assert_eq!(bundle.profile, Profile::Power);
    assert_eq!(bundle.export_path, std::path::PathBuf::from("/power/out"));
}

#[test]
fn unparsable_number_stops_before_validation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session(dir.path());
    let mut calc = LoggingCalculation::default();
    let mut bad = form("400");
    bad.set_text(fields::INITIAL_VOLUME, "1,5,0");
    let err = session.request_calculation(&bad, &mut calc).unwrap_err();
    assert!(matches!(err, SessionError::Assemble(_)));
    assert_eq!(calc.runs(), 0);
    assert!(session.sink().notices().is_empty());
}
