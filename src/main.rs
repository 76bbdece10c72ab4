//! CAMPUS - form interaction host
//!
//! Loads a page description, binds the form controller to it and shows it in
//! the terminal.
//!
//! ## Usage
//!
//! ```bash
//! # Open the built-in admission form
//! campus
//!
//! # Open a page file with custom form settings
//! campus --page pages/fees.yaml --config forms.yaml
//!
//! # Bootstrap headlessly and print what was wired up
//! campus --check --json
//!
//! # With verbose logging to a custom directory
//! campus -v --log-dir /path/to/logs/
//! ```

use std::io::Write;
use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;

use campus_config::FormsConfig;
use campus_core::{CampusError, LogGuard, LogOutput, init_logging};
use campus_dom::{Document, PageSpec};
use campus_forms::recording::{
    DatePickerLog, DialogLog, RecordingDatePicker, RecordingDialogs, RecordingTables,
    RecordingToaster, RecordingWidgets, TableLog, ToastLog, WidgetLog,
};
use campus_forms::{BootstrapReport, Capabilities, FormController};
use campus_tui::App;
use clap::Parser;
use tracing::{error, info};

/// CAMPUS form interaction host
///
/// Binds validation, alerts, field groups, and notifications to a page and
/// drives it from the keyboard.
#[derive(Parser, Debug)]
#[command(name = "campus")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Page description (YAML, or JSON by extension); defaults to the
    /// built-in admission form
    #[arg(long)]
    page: Option<PathBuf>,

    /// Form settings file (defaults to ~/.campus/forms.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bootstrap the page without a terminal and print the report
    #[arg(long)]
    check: bool,

    /// Print the --check report as JSON
    #[arg(long, requires = "check")]
    json: bool,

    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.campus/logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::from(1);
        }
    };

    let result = if cli.check {
        run_check(&cli)
    } else {
        install_panic_hook();
        info!("Starting campus");
        run_app(&cli)
    };

    match result {
        Ok(()) => {
            info!("campus exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "campus failed");
            eprintln!("Error: {e}");
            if let Some(hint) = e.guidance() {
                eprintln!("{hint}");
            }
            if e.is_config_error() && cli.config.is_none() {
                if let Some(path) = FormsConfig::default_path() {
                    eprintln!("Settings were read from {}", path.display());
                }
            }
            ExitCode::from(1)
        }
    }
}

/// Install a panic hook that restores the terminal before printing the panic message.
fn install_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

/// Restore terminal to its normal state.
fn restore_terminal() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    let _ = crossterm::terminal::disable_raw_mode();
    crossterm::execute!(
        stdout,
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    stdout.flush()
}

/// Set up logging based on CLI arguments.
///
/// The TUI owns stderr while it runs, so only `--check` logs to the console.
fn setup_logging(cli: &Cli) -> campus_core::Result<LogGuard> {
    let output = if cli.check {
        LogOutput::FileAndConsole
    } else {
        LogOutput::FileOnly
    };
    init_logging(cli.log_dir.clone(), cli.verbose > 0, output)
}

fn load_inputs(cli: &Cli) -> campus_core::Result<(PageSpec, FormsConfig)> {
    let config = FormsConfig::load_or_default(cli.config.as_deref())?;
    let page = match &cli.page {
        Some(path) => campus_tui::load_page(path)?,
        None => campus_tui::demo_page()?,
    };
    Ok((page, config))
}

fn run_app(cli: &Cli) -> campus_core::Result<()> {
    let (page, config) = load_inputs(cli)?;
    let mut app = App::new(page, config)?;
    app.run()
}

/// Bootstrap with recording capabilities and print what was wired up.
fn run_check(cli: &Cli) -> campus_core::Result<()> {
    let (page, config) = load_inputs(cli)?;
    let widgets = WidgetLog::default();
    let tables = TableLog::default();
    let dates = DatePickerLog::default();
    let capabilities = Capabilities::none()
        .with_widgets(RecordingWidgets::new(&widgets))
        .with_tables(RecordingTables::new(&tables))
        .with_date_picker(RecordingDatePicker::new(&dates))
        .with_toaster(RecordingToaster::new(&ToastLog::default()))
        .with_dialogs(RecordingDialogs::answering(false, &DialogLog::default()));

    let title = page.title.clone();
    let mut controller = FormController::new(Document::from_spec(&page.body), config, capabilities)?;
    let report = controller.on_page_load();
    info!(
        widgets = widgets.len(),
        tables = tables.len(),
        date_inputs = dates.len(),
        listeners = controller.listener_count(),
        "Page check complete"
    );

    if cli.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CampusError::internal(format!("serialize bootstrap report: {e}")))?;
        println!("{json}");
    } else {
        print_report(&title, &report);
    }
    Ok(())
}

fn print_report(title: &str, report: &BootstrapReport) {
    println!("{title}");
    println!("  tooltips           {}", report.tooltips);
    println!("  popovers           {}", report.popovers);
    println!("  sidebar toggle     {}", if report.sidebar_toggle { "bound" } else { "absent" });
    println!("  validated forms    {}", report.validated_forms);
    println!("  data tables        {}", report.tables);
    println!("  date inputs        {}", report.date_inputs);
    println!("  alerts scheduled   {}", report.alerts_scheduled);
    println!("  add controls       {}", report.add_controls);
}
