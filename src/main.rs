use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use expense_tracker::cli::{handle_expense_command, user_error_message, ExpenseCommands};
use expense_tracker::config::{ExpensePaths, Settings};
use expense_tracker::logging::init_logging;
use expense_tracker::services::ExpenseService;
use expense_tracker::storage::{ExpenseStore, StorageFormat};

#[derive(Parser)]
#[command(
    name = "expense-tracker",
    version,
    about = "Expense Tracker CLI",
    long_about = "Record, list, summarize and export personal expenses \
                  stored in a local JSON file."
)]
struct Cli {
    /// Use this data file instead of the configured one (.json or .csv)
    #[arg(long, global = true, env = "EXPENSE_TRACKER_DATA_FILE")]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Expense(ExpenseCommands),

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = ExpensePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let logging = init_logging(&paths, &settings)?;
    let _log_scope = tracing::dispatcher::set_default(logging.dispatch());

    let data_file = cli
        .data_file
        .unwrap_or_else(|| paths.data_file(settings.storage_format));
    let format = StorageFormat::from_path(&data_file).unwrap_or(settings.storage_format);

    let repository =
        ExpenseStore::new(format.open(data_file.clone())).with_logger(logging.dispatch().clone());
    let service = ExpenseService::new(repository);

    match cli.command {
        Commands::Expense(cmd) => {
            tracing::debug!(?cmd, data_file = %data_file.display(), "Running command");

            if let Err(err) = handle_expense_command(&service, &settings, cmd) {
                match user_error_message(&err) {
                    Some(message) => {
                        tracing::info!("{}", err);
                        println!("{}", message);
                        return Ok(ExitCode::FAILURE);
                    }
                    None => {
                        tracing::error!("{}", err);
                        return Err(err.into());
                    }
                }
            }
        }
        Commands::Config => {
            println!("Expense Tracker Configuration");
            println!("=============================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Data file:      {}", data_file.display());
            match logging.log_file() {
                Some(log_file) => println!("Log file:       {}", log_file.display()),
                None => println!("Log file:       (disabled)"),
            }
            println!();
            println!("Settings:");
            println!("  Storage format:    {}", format);
            println!("  Console log level: {}", settings.console_log_level);
            println!("  File log level:    {}", settings.file_log_level);
            println!("  Date format:       {}", settings.date_format);
        }
    }

    Ok(ExitCode::SUCCESS)
}
