use clap::Parser;
use consent_form::app::App;
use consent_form::config::{Config, default_log_path, load_values};
use consent_form::core::value::FormValues;
use consent_form::error::RunError;
use consent_form::state::{FormController, SubmitBlocked};
use consent_form::submission::{SubmissionPipeline, SubmissionState, TransportConfig, writer_for};
use consent_form::terminal::Terminal;
use consent_form::validation::ValidationSchema;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Patient consent form that writes each submission to a SharePoint list.
#[derive(Parser, Debug)]
#[command(name = "consent-form", version, about)]
struct Cli {
    /// YAML file with list connection settings (CONSENT_* variables override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// YAML or JSON document of field values to prefill, keyed by field name
    #[arg(long)]
    values: Option<PathBuf>,

    /// Print the payload instead of writing it to the list
    #[arg(long)]
    dry_run: bool,

    /// Validate and submit the values file without opening the form
    #[arg(long)]
    batch: bool,

    /// Write logs to this file (interactive mode defaults to consent-form.log in the temp dir)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. `info` or `consent_form=debug`
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, RunError> {
    init_logging(cli)?;

    let config = Config::load(cli.config.as_deref())?;
    let transport = if cli.dry_run {
        TransportConfig::DryRun
    } else {
        config.transport()?
    };
    let values = match &cli.values {
        Some(path) => load_values(path)?,
        None => FormValues::new(),
    };

    let form = FormController::new(ValidationSchema::consent_form()).with_values(values);
    let pipeline = SubmissionPipeline::new(writer_for(&transport), config.payload_options());

    if cli.batch {
        Ok(submit_batch(form, pipeline))
    } else {
        run_interactive(form, pipeline)
    }
}

/// Logs go to `--log-file` when given. Otherwise batch mode logs to
/// stderr and the interactive form appends to the default log file, so
/// the screen is not torn.
fn init_logging(cli: &Cli) -> Result<(), RunError> {
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let path = match &cli.log_file {
        Some(path) => path.clone(),
        None if cli.batch => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
            return Ok(());
        }
        None => default_log_path(),
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| RunError::LogFile {
            path: path.display().to_string(),
            source,
        })?;
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

fn submit_batch(mut form: FormController, mut pipeline: SubmissionPipeline) -> ExitCode {
    let values = match form.begin_submit() {
        Ok(values) => values,
        Err(SubmitBlocked::Invalid(errors)) => {
            warn!(invalid = errors.len(), "values failed validation");
            for (field, message) in errors.iter() {
                eprintln!("{field}: {message}");
            }
            return ExitCode::from(2);
        }
        Err(SubmitBlocked::InFlight) => return ExitCode::FAILURE,
    };

    pipeline.submit(&values);
    let Some(outcome) = pipeline.wait() else {
        error!("submission finished without an outcome");
        return ExitCode::FAILURE;
    };
    form.finish_submit();

    match outcome.result {
        Ok(receipt) => {
            info!(status = receipt.status, "consent form submitted");
            println!("{}", receipt.body);
            ExitCode::SUCCESS
        }
        Err(err) => {
            if err.is_auth_rejection() {
                warn!("list endpoint rejected the configured credentials");
            }
            eprintln!("Submission failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_interactive(form: FormController, pipeline: SubmissionPipeline) -> Result<ExitCode, RunError> {
    let mut terminal = Terminal::new()?;
    let mut app = App::new(form, pipeline);
    app.run(&mut terminal)?;

    if app.submission_state().is_submitting() {
        eprintln!("Waiting for the submission to finish...");
        app.finish_in_flight();
    }

    let code = match app.submission_state() {
        SubmissionState::Succeeded => {
            println!("{}", SubmissionState::Succeeded.label());
            ExitCode::SUCCESS
        }
        SubmissionState::Failed(reason) => {
            eprintln!("Submission failed: {reason}");
            ExitCode::FAILURE
        }
        SubmissionState::Idle => ExitCode::SUCCESS,
        SubmissionState::Submitting => {
            error!("submission still in flight at exit");
            ExitCode::FAILURE
        }
    };
    Ok(code)
}
