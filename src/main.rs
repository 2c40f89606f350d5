use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use storage_lsm_toolbox::app::{AppError, AppPaths};
use storage_lsm_toolbox::assemble::Profile;
use storage_lsm_toolbox::calculation::LoggingCalculation;
use storage_lsm_toolbox::notify::TracingSink;
use storage_lsm_toolbox::session::Session;
use storage_lsm_toolbox::{logging, ui_cli};

#[derive(Parser, Debug)]
#[command(name = "storage_lsm_cli")]
#[command(version)]
#[command(about = "Prepare and check storage valuation parameters without the GUI")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Path to settings_file.json (default: next to the executable)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Path to form_entries.toml (default: next to the executable)
    #[arg(long, global = true)]
    entries: Option<PathBuf>,

    /// Override the Gas/Power selection stored in the form entries
    #[arg(long, global = true, value_enum)]
    profile: Option<ProfileArg>,

    /// Debug-level logging unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble, validate and hand the parameters to the calculation
    Run,
    /// Assemble and validate only
    Check,
    /// Show the global settings
    Settings,
    /// Change one global setting (same as the Settings window)
    Set { key: String, value: String },
    /// Show the stored form entries
    Entries,
    /// Change one stored form entry, filtering characters as the form does
    Entry { key: String, value: String },
    /// Daily energy [MWh] for a power [MW]
    Energy { power: String },
    /// Per-day rate display for an annual rate in percent
    Annualize { rate: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Gas,
    Power,
}

impl From<ProfileArg> for Profile {
    fn from(value: ProfileArg) -> Self {
        match value {
            ProfileArg::Gas => Profile::Gas,
            ProfileArg::Power => Profile::Power,
        }
    }
}

/// CLI 진입점. 오류는 출력하고 종료 코드 1로 끝낸다.
fn main() {
    if let Err(err) = try_run(Args::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_run(args: Args) -> Result<(), AppError> {
    let paths = AppPaths::resolve(args.settings, args.entries);
    logging::init(Some(&paths.log), args.verbose);

    match &args.command {
        Commands::Energy { power } => {
            ui_cli::handle_energy(power);
            return Ok(());
        }
        Commands::Annualize { rate } => return ui_cli::handle_annualize(rate),
        Commands::Entries => return ui_cli::handle_entries_show(&paths.entries),
        _ => {}
    }

    let mut session = Session::start(&paths.settings, TracingSink);
    let profile = args.profile.map(Profile::from);
    match args.command {
        Commands::Run => {
            let mut calc = LoggingCalculation::default();
            ui_cli::handle_run(&mut session, &paths.entries, profile, Some(&mut calc))
        }
        Commands::Check => ui_cli::handle_run(&mut session, &paths.entries, profile, None),
        Commands::Settings => {
            ui_cli::handle_settings_show(&session);
            Ok(())
        }
        Commands::Set { key, value } => ui_cli::handle_settings_set(&mut session, &key, &value),
        Commands::Entry { key, value } => {
            ui_cli::handle_entry_set(&mut session, &paths.entries, &key, &value)
        }
        Commands::Energy { .. } | Commands::Annualize { .. } | Commands::Entries => Ok(()),
    }
}
