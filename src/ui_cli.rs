use std::path::Path;

use crate::app::AppError;
use crate::assemble::Profile;
use crate::calculation::Calculation;
use crate::derived;
use crate::form::fields;
use crate::key_map::{entries_key_map, settings_key_map};
use crate::notify::NotificationSink;
use crate::session::{set_profile, DerivedDisplay, Session};
use crate::user_entries::{self, EntryValue, UserEntries};

/// 저장된 입력값으로 조립/검증한다. `calc`가 있으면 계산까지 넘긴다.
pub fn handle_run<S: NotificationSink>(
    session: &mut Session<S>,
    entries_path: &Path,
    profile: Option<Profile>,
    calc: Option<&mut dyn Calculation>,
) -> Result<(), AppError> {
    let entries = user_entries::load_or_default(entries_path)?;
    let mut form = entries.to_form(entries_key_map());
    if let Some(profile) = profile {
        set_profile(&mut form, profile);
    }
    print_derived(&session.derived_display(&form));

    let Some(calc) = calc else {
        let bundle = session.check(&form)?;
        println!(
            "Parameters OK: {} profile, import {}, export {}",
            bundle.profile,
            bundle.import_path.display(),
            bundle.export_path.display()
        );
        return Ok(());
    };

    let bundle = session.request_calculation(&form, calc)?;
    if let Some(shown) = session.volatility() {
        println!("Year Volatility: {}", shown.year);
        println!("Spot Volatility w/ Jumps: {}", shown.spot_with_jumps);
        println!("Volatility w/o Jumps: {}", shown.without_jumps);
    }
    println!("Calculation finished ({} profile).", bundle.profile);
    Ok(())
}

/// 현재 설정을 키 순서대로 출력한다.
pub fn handle_settings_show<S: NotificationSink>(session: &Session<S>) {
    println!("Settings file: {}", session.settings_path().display());
    for key in session.settings().keys() {
        let value = session
            .settings()
            .get(key)
            .map(|v| v.to_string())
            .unwrap_or_default();
        let marker = if settings_key_map().field_for(key).is_some() {
            ""
        } else {
            "  (not editable)"
        };
        println!("  {key} = {value}{marker}");
    }
}

/// 설정 창에서 값 하나를 고치고 저장한 것과 같다.
pub fn handle_settings_set<S: NotificationSink>(
    session: &mut Session<S>,
    key: &str,
    value: &str,
) -> Result<(), AppError> {
    let field = settings_key_map()
        .field_for(key)
        .ok_or_else(|| AppError::UnknownSetting(key.to_string()))?;
    let mut draft = session.open_settings();
    draft.set_text(field, value);
    let report = session.commit_settings(&draft)?;
    println!(
        "Saved {} keys to {} ({} skipped)",
        report.updated.len(),
        session.settings_path().display(),
        report.failures.len()
    );
    Ok(())
}

/// 입력값 하나를 한 글자씩 입력한 것처럼 필터를 거쳐 저장한다.
pub fn handle_entry_set<S: NotificationSink>(
    session: &mut Session<S>,
    entries_path: &Path,
    key: &str,
    value: &str,
) -> Result<(), AppError> {
    let field = entries_key_map()
        .field_for(key)
        .ok_or_else(|| AppError::UnknownSetting(key.to_string()))?;
    let mut typed = String::new();
    for c in value.chars() {
        typed.push(c);
        typed = session.filter_field(field, &typed);
    }
    if typed != value {
        println!("Dropped characters not allowed in {key}: stored '{typed}'");
    }

    let entries = user_entries::load_or_default(entries_path)?;
    let mut form = entries.to_form(entries_key_map());
    if field == fields::GAS || field == fields::POWER {
        let on = typed == "true";
        let profile = if (field == fields::GAS) == on {
            Profile::Gas
        } else {
            Profile::Power
        };
        set_profile(&mut form, profile);
    } else {
        form.set_text(field, typed);
    }
    session.save_entries(&form, entries_path)?;
    Ok(())
}

/// 저장된 입력값을 출력한다.
pub fn handle_entries_show(entries_path: &Path) -> Result<(), AppError> {
    let entries: UserEntries = user_entries::load_or_default(entries_path)?;
    println!("Form entries: {}", entries_path.display());
    if entries.is_empty() {
        println!("  (nothing stored yet; use `entry <key> <value>`)");
        return Ok(());
    }
    for (key, _) in entries_key_map().pairs() {
        match entries.get(key) {
            Some(EntryValue::Text(s)) => println!("  {key} = {s}"),
            Some(EntryValue::Flag(b)) => println!("  {key} = {b}"),
            None => println!("  {key} ="),
        }
    }
    Ok(())
}

pub fn handle_energy(power: &str) {
    match derived::power_to_energy(power) {
        Some(energy) => println!("{energy} MWh"),
        None => println!("no value"),
    }
}

pub fn handle_annualize(rate: &str) -> Result<(), AppError> {
    println!("{}", derived::annualize_rate(rate)?);
    Ok(())
}

fn print_derived(shown: &DerivedDisplay) {
    let rows = [
        ("Einspeicherarbeit (min) [MWh]", &shown.injection_energy_min),
        ("Einspeicherarbeit (max) [MWh]", &shown.injection_energy_max),
        ("Ausspeicherarbeit (min) [MWh]", &shown.withdrawal_energy_min),
        ("Ausspeicherarbeit (max) [MWh]", &shown.withdrawal_energy_max),
        ("interest rate p.a.", &shown.interest_rate_per_day),
    ];
    for (label, value) in rows {
        println!("{label}: {}", value.as_deref().unwrap_or("-"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::tests::sample_form;
    use crate::calculation::LoggingCalculation;
    use crate::notify::{Notice, NoticeLog};
    use crate::session::tests::session_with_paths;
    use crate::session::SessionError;
    use crate::user_entries::ENTRIES_FILE_NAME;

    fn stored_profile(entries_path: &Path) -> Profile {
        let form = user_entries::load_or_default(entries_path)
            .unwrap()
            .to_form(entries_key_map());
        assert_ne!(form.toggle(fields::GAS), form.toggle(fields::POWER));
        if form.toggle(fields::GAS) {
            Profile::Gas
        } else {
            Profile::Power
        }
    }

    fn store_form(session: &mut Session<NoticeLog>, entries_path: &Path, end_max: &str) {
        let mut form = sample_form();
        form.set_text(fields::END_VOLUME_MAX, end_max);
        session.save_entries(&form, entries_path).unwrap();
        session.sink_mut().drain();
    }

    #[test]
    fn entry_is_typed_through_the_field_filter() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entries_path = dir.path().join(ENTRIES_FILE_NAME);
        let mut session = session_with_paths(dir.path());
        handle_entry_set(&mut session, &entries_path, "num_scenarios", "1a2").unwrap();
        handle_entry_set(&mut session, &entries_path, "interest_rate", "3,6%").unwrap();
        let entries = user_entries::load_or_default(&entries_path).unwrap();
        assert_eq!(
            entries.get("num_scenarios"),
            Some(&EntryValue::Text("12".into()))
        );
        assert_eq!(
            entries.get("interest_rate"),
            Some(&EntryValue::Text("3,6".into()))
        );
    }

    #[test]
    fn profile_entries_pick_the_matching_toggle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entries_path = dir.path().join(ENTRIES_FILE_NAME);
        let mut session = session_with_paths(dir.path());
        for (key, value, expected) in [
            ("power", "true", Profile::Power),
            ("gas", "false", Profile::Power),
            ("power", "false", Profile::Gas),
            ("gas", "true", Profile::Gas),
        ] {
            handle_entry_set(&mut session, &entries_path, key, value).unwrap();
            assert_eq!(stored_profile(&entries_path), expected, "{key} {value}");
        }
    }

    #[test]
    fn unknown_entry_key_is_refused() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entries_path = dir.path().join(ENTRIES_FILE_NAME);
        let mut session = session_with_paths(dir.path());
        let err = handle_entry_set(&mut session, &entries_path, "nope", "1").unwrap_err();
        assert!(matches!(err, AppError::UnknownSetting(key) if key == "nope"));
    }

    #[test]
    fn check_reports_violation_without_calculating() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entries_path = dir.path().join(ENTRIES_FILE_NAME);
        let mut session = session_with_paths(dir.path());
        store_form(&mut session, &entries_path, "600");

        let err = handle_run(&mut session, &entries_path, None, None).unwrap_err();
        assert!(matches!(err, AppError::Session(SessionError::Rejected(_))));
        assert!(matches!(
            session.sink().notices(),
            [Notice::ValidationFailed { .. }]
        ));

        let mut calc = LoggingCalculation::default();
        let err = handle_run(&mut session, &entries_path, None, Some(&mut calc)).unwrap_err();
        assert!(matches!(err, AppError::Session(SessionError::Rejected(_))));
        assert_eq!(calc.runs(), 0);
    }

    #[test]
    fn run_uses_profile_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entries_path = dir.path().join(ENTRIES_FILE_NAME);
        let mut session = session_with_paths(dir.path());
        store_form(&mut session, &entries_path, "400");

        handle_run(&mut session, &entries_path, Some(Profile::Power), None).unwrap();
        let mut calc = LoggingCalculation::default();
        handle_run(&mut session, &entries_path, Some(Profile::Power), Some(&mut calc)).unwrap();
        assert_eq!(calc.runs(), 1);
        assert_eq!(stored_profile(&entries_path), Profile::Gas);
    }
}
