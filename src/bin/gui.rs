#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! eframe/egui 기반 데스크톱 GUI 진입점.

use std::collections::BTreeMap;
use std::{fs, path::Path};

use eframe::{egui, App, Frame};
use image::GenericImageView;
use rfd::FileDialog;
use storage_lsm_toolbox::{
    app::AppPaths,
    assemble::Profile,
    calculation::LoggingCalculation,
    form::{fields, RawFormValues},
    key_map::{entries_key_map, settings_key_map},
    logging,
    notify::{Notice, NoticeLog},
    session::{self, DerivedDisplay, Session, SessionError, SettingsDraft},
    user_entries,
};

const DATA_FIELDS: &[(&str, &str)] = &[
    (fields::START_DATE, "Start Date"),
    (fields::END_DATE, "End Date"),
    (fields::NUM_SCENARIOS, "Number of Scenarios"),
];

const VOLUME_FIELDS: &[(&str, &str)] = &[
    (fields::TOTAL_VOLUME_MIN, "Total Volume (min) [MWh]"),
    (fields::TOTAL_VOLUME_MAX, "Total Volume (max) [MWh]"),
    (fields::START_VOLUME_MIN, "Volume Start (min) [MWh]"),
    (fields::START_VOLUME_MAX, "Volume Start (max) [MWh]"),
    (fields::END_VOLUME_MIN, "Volume End (min) [MWh]"),
    (fields::END_VOLUME_MAX, "Volume End (max) [MWh]"),
    (fields::INITIAL_VOLUME, "Initial Storage Volume [MWh]"),
];

const RATE_FIELDS: &[(&str, &str)] = &[
    (fields::INJECTION_RATE_MIN, "Einspeicherleistung (min) [MW]"),
    (fields::INJECTION_RATE_MAX, "Einspeicherleistung (max) [MW]"),
    (fields::WITHDRAWAL_RATE_MIN, "Ausspeicherleistung (min) [MW]"),
    (fields::WITHDRAWAL_RATE_MAX, "Ausspeicherleistung (max) [MW]"),
];

const COST_FIELDS: &[(&str, &str)] = &[
    (fields::INJECT_COSTS, "Inject Costs [€/MWh]"),
    (fields::EJECT_COSTS, "Eject Costs [€/MWh]"),
];

const YES_NO: &[&str] = &["Yes", "No"];
const DIRECTIONS: &[&str] = &["UP&DOWN", "UP", "DOWN"];

/// 드롭다운 필드: (필드, 라벨, 선택지, 기본값)
const DROPDOWNS: &[(&str, &str, &[&str], &str)] = &[
    (fields::STORAGE_VALUE, "Speicherwert Besteht?", YES_NO, "Yes"),
    (fields::RUN_DELTA, "Run Delta Calculation?", YES_NO, "No"),
    (fields::DIRECTION, "UP/DOWN MODE", DIRECTIONS, "UP&DOWN"),
    (fields::MEANS_ONLY, "Calculate Means Only?", YES_NO, "No"),
    (fields::SHOW_STATISTICS, "Show Statistics", YES_NO, "No"),
];

/// 설정 창에서 폴더 선택 버튼을 붙이는 키.
const FOLDER_KEYS: &[&str] = &["path_power", "path_gas", "export_path_power", "export_path_gas"];

fn main() -> Result<(), eframe::Error> {
    let paths = AppPaths::resolve(None, None);
    logging::init(Some(&paths.log), false);

    let mut viewport = egui::ViewportBuilder::default().with_inner_size(egui::vec2(1200.0, 760.0));
    if let Some(icon) = load_app_icon() {
        viewport = viewport.with_icon(icon);
    }
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "Simulation Tool",
        options,
        Box::new(move |_cc| Box::new(GuiApp::new(paths))),
    )
}

fn load_app_icon() -> Option<egui::IconData> {
    let search = ["logo.png", "assets/logo.png", "../logo.png"];
    let path = search.iter().find(|p| Path::new(*p).exists())?;
    let bytes = fs::read(path).ok()?;
    let img = image::load_from_memory(&bytes).ok()?;
    let (w, h) = img.dimensions();
    Some(egui::IconData {
        rgba: img.to_rgba8().into_raw(),
        width: w,
        height: h,
    })
}

/// 사용자에게 띄우는 알림 창.
struct Popup {
    title: String,
    body: String,
}

enum SettingsAction {
    None,
    Browse(&'static str),
    Save,
    Close,
}

struct GuiApp {
    session: Session<NoticeLog>,
    paths: AppPaths,
    calc: LoggingCalculation,
    profile: Profile,
    texts: BTreeMap<&'static str, String>,
    derived: DerivedDisplay,
    settings_draft: Option<SettingsDraft>,
    log_lines: Vec<String>,
    popup: Option<Popup>,
}

impl GuiApp {
    fn new(paths: AppPaths) -> Self {
        let session = Session::start(&paths.settings, NoticeLog::new());
        let entries = user_entries::load_or_default(&paths.entries).unwrap_or_else(|e| {
            tracing::warn!("{e}; starting with an empty form");
            Default::default()
        });
        if entries.is_empty() {
            tracing::info!(path = %paths.entries.display(), "no stored form entries");
        }
        let stored = entries.to_form(entries_key_map());

        let mut texts = BTreeMap::new();
        for (_, field) in entries_key_map().pairs() {
            if field == fields::GAS || field == fields::POWER {
                continue;
            }
            texts.insert(field, stored.text(field).unwrap_or_default().to_string());
        }
        for &(field, _, _, default) in DROPDOWNS {
            let text = texts.entry(field).or_default();
            if text.is_empty() {
                *text = default.to_string();
            }
        }
        let profile = if stored.toggle(fields::POWER) && !stored.toggle(fields::GAS) {
            Profile::Power
        } else {
            Profile::Gas
        };

        let mut app = Self {
            session,
            paths,
            calc: LoggingCalculation::default(),
            profile,
            texts,
            derived: DerivedDisplay::default(),
            settings_draft: None,
            log_lines: Vec::new(),
            popup: None,
        };
        app.refresh_derived();
        app.collect_notices();
        app
    }

    /// 현재 화면 값을 한 번의 이벤트 처리용 폼 값으로 만든다.
    fn form_values(&self) -> RawFormValues {
        let mut form = RawFormValues::new();
        for (field, text) in &self.texts {
            form.set_text(field, text.clone());
        }
        session::set_profile(&mut form, self.profile);
        form
    }

    /// 새 값이 있는 표시만 갱신한다.
    fn refresh_derived(&mut self) {
        let fresh = self.session.derived_display(&self.form_values());
        let keep = |old: &mut Option<String>, new: Option<String>| {
            if new.is_some() {
                *old = new;
            }
        };
        keep(&mut self.derived.injection_energy_min, fresh.injection_energy_min);
        keep(&mut self.derived.injection_energy_max, fresh.injection_energy_max);
        keep(&mut self.derived.withdrawal_energy_min, fresh.withdrawal_energy_min);
        keep(&mut self.derived.withdrawal_energy_max, fresh.withdrawal_energy_max);
        keep(&mut self.derived.interest_rate_per_day, fresh.interest_rate_per_day);
    }

    /// 세션 알림을 로그 패널로 옮기고, 사용자가 알아야 할 것은 창으로 띄운다.
    fn collect_notices(&mut self) {
        for notice in self.session.sink_mut().drain() {
            match &notice {
                Notice::ValidationFailed { message } => {
                    self.popup = Some(Popup {
                        title: "Invalid Parameters".into(),
                        body: message.clone(),
                    })
                }
                Notice::LoadFallback { .. } => {
                    self.popup = Some(Popup {
                        title: "Settings".into(),
                        body: notice.to_string(),
                    })
                }
                _ => {}
            }
            self.log_lines.push(notice.to_string());
        }
    }

    fn save_entries(&mut self) {
        let form = self.form_values();
        if let Err(e) = self.session.save_entries(&form, &self.paths.entries) {
            tracing::error!("{e}");
            self.log_lines.push(format!("Saving user settings failed: {e}"));
        }
    }

    fn start_calculation(&mut self) {
        let form = self.form_values();
        match self.session.request_calculation(&form, &mut self.calc) {
            Ok(_) => {}
            // 검증 실패는 알림으로 이미 보고됨
            Err(SessionError::Rejected(_)) => {}
            Err(e) => {
                tracing::error!("{e}");
                self.popup = Some(Popup {
                    title: "Error".into(),
                    body: format!("An error has occurred: {e}. Please check the log file for details."),
                });
                self.log_lines.push(e.to_string());
            }
        }
        self.log_lines.push("Calculation finished.".into());
    }

    fn text_rows(&mut self, ui: &mut egui::Ui, rows: &[(&'static str, &str)]) {
        let mut changed = false;
        for &(field, label) in rows {
            ui.label(label);
            let text = self.texts.entry(field).or_default();
            if ui
                .add(egui::TextEdit::singleline(text).desired_width(100.0))
                .changed()
            {
                *text = self.session.filter_field(field, text);
                changed = true;
            }
            ui.end_row();
        }
        if changed {
            self.refresh_derived();
        }
    }

    fn ui_inputs(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.radio_value(&mut self.profile, Profile::Gas, "Gas");
            ui.radio_value(&mut self.profile, Profile::Power, "Power");
        });
        egui::Grid::new("rate_grid").num_columns(2).show(ui, |ui| {
            self.text_rows(ui, &[(fields::INTEREST_RATE, "interest rate p.a. (in %)")]);
            ui.label("interest rate p.a.:");
            ui.label(self.derived.interest_rate_per_day.clone().unwrap_or_default());
            ui.end_row();
        });
        ui.group(|ui| {
            ui.label("Data Info");
            egui::Grid::new("data_grid")
                .num_columns(2)
                .show(ui, |ui| self.text_rows(ui, DATA_FIELDS));
        });
        ui.group(|ui| {
            ui.label("Volumes");
            egui::Grid::new("volume_grid")
                .num_columns(2)
                .show(ui, |ui| self.text_rows(ui, VOLUME_FIELDS));
        });
    }

    fn ui_rates(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label("Rates");
            egui::Grid::new("power_grid")
                .num_columns(2)
                .show(ui, |ui| self.text_rows(ui, RATE_FIELDS));
        });
        ui.group(|ui| {
            ui.label("Energy");
            egui::Grid::new("energy_grid").num_columns(2).show(ui, |ui| {
                let rows = [
                    ("Einspeicherarbeit (min) [MWh]", &self.derived.injection_energy_min),
                    ("Einspeicherarbeit (max) [MWh]", &self.derived.injection_energy_max),
                    ("Ausspeicherarbeit (min) [MWh]", &self.derived.withdrawal_energy_min),
                    ("Ausspeicherarbeit (max) [MWh]", &self.derived.withdrawal_energy_max),
                ];
                for (label, value) in rows {
                    ui.label(label);
                    ui.label(value.as_deref().unwrap_or_default());
                    ui.end_row();
                }
            });
        });
        ui.group(|ui| {
            ui.label("Volatility");
            egui::Grid::new("vola_grid").num_columns(2).show(ui, |ui| {
                let shown = self.session.volatility().cloned().unwrap_or_default();
                for (label, value) in [
                    ("Year Volatility:", shown.year),
                    ("Spot Volatility w/ Jumps:", shown.spot_with_jumps),
                    ("Volatility w/o Jumps:", shown.without_jumps),
                ] {
                    ui.label(label);
                    ui.label(value);
                    ui.end_row();
                }
            });
        });
        ui.group(|ui| {
            ui.label("Costs");
            egui::Grid::new("cost_grid")
                .num_columns(2)
                .show(ui, |ui| self.text_rows(ui, COST_FIELDS));
        });
    }

    fn ui_options(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label("Delta Calculation Parameters");
            egui::Grid::new("delta_grid").num_columns(2).show(ui, |ui| {
                self.text_rows(ui, &[(fields::VARIATION, "Price Variation [€/MWh]")]);
                for &(field, label, options, _) in DROPDOWNS {
                    ui.label(label);
                    let selected = self.texts.entry(field).or_default();
                    egui::ComboBox::from_id_source(field)
                        .selected_text(selected.clone())
                        .show_ui(ui, |ui| {
                            for &option in options {
                                ui.selectable_value(selected, option.to_string(), option);
                            }
                        });
                    ui.end_row();
                }
            });
        });
        ui.horizontal(|ui| {
            if ui.button("Start LSM").clicked() {
                self.refresh_derived();
                self.start_calculation();
            }
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
            if ui.button("Save").clicked() {
                self.refresh_derived();
                self.save_entries();
            }
            if ui.button("Settings").clicked() {
                self.settings_draft = Some(self.session.open_settings());
            }
        });
    }

    fn ui_settings_window(&mut self, ctx: &egui::Context) {
        let Some(draft) = self.settings_draft.as_mut() else {
            return;
        };
        let mut action = SettingsAction::None;
        egui::Window::new("Settings")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("settings_grid").num_columns(3).show(ui, |ui| {
                    for (key, field) in settings_key_map().pairs() {
                        ui.label(format!("{key}:"));
                        let mut text = draft.text(field).to_string();
                        if ui
                            .add(egui::TextEdit::singleline(&mut text).desired_width(320.0))
                            .changed()
                        {
                            draft.set_text(field, text);
                        }
                        if FOLDER_KEYS.contains(&key) && ui.button("Browse").clicked() {
                            action = SettingsAction::Browse(field);
                        }
                        ui.end_row();
                    }
                });
                ui.horizontal(|ui| {
                    if ui.button("Save Settings").clicked() {
                        action = SettingsAction::Save;
                    }
                    if ui.button("OK").clicked() {
                        action = SettingsAction::Close;
                    }
                });
            });

        match action {
            SettingsAction::None => {}
            SettingsAction::Browse(field) => {
                if let Some(folder) = FileDialog::new().pick_folder() {
                    draft.set_text(field, folder.display().to_string());
                }
            }
            SettingsAction::Save => {
                if let Some(draft) = self.settings_draft.take() {
                    if let Err(e) = self.session.commit_settings(&draft) {
                        tracing::error!("{e}");
                        self.popup = Some(Popup {
                            title: "Settings".into(),
                            body: format!("Saving global settings failed: {e}"),
                        });
                    }
                }
            }
            // 저장 없이 닫으면 초안만 버린다
            SettingsAction::Close => self.settings_draft = None,
        }
    }

    fn ui_popup(&mut self, ctx: &egui::Context) {
        let Some(popup) = &self.popup else {
            return;
        };
        let mut close = false;
        egui::Window::new(popup.title.as_str())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(popup.body.as_str());
                if ui.button("OK").clicked() {
                    close = true;
                }
            });
        if close {
            self.popup = None;
        }
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let modal_open = self.settings_draft.is_some() || self.popup.is_some();

        egui::TopBottomPanel::bottom("log_panel")
            .resizable(true)
            .default_height(140.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for line in &self.log_lines {
                            ui.monospace(line.as_str());
                        }
                    });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!modal_open, |ui| {
                ui.columns(3, |cols| {
                    self.ui_inputs(&mut cols[0]);
                    self.ui_rates(&mut cols[1]);
                    self.ui_options(&mut cols[2]);
                });
            });
        });

        self.ui_settings_window(ctx);
        self.collect_notices();
        self.ui_popup(ctx);
    }
}
