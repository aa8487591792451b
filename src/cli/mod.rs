pub mod dates;
pub mod record;
pub mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dates::DateStyle;
use record::{process_record_command, RecordCommand};
use report::{process_report_command, ReportCommand};
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    dashboard::Dashboard,
    storage::file_store::{FileDraftRepository, FileStore},
    utils::{
        clock::DefaultClock,
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Focusboard", version, long_about = None)]
#[command(about = "Track focused work and see how your weeks add up", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Print logs to the console")]
    log: bool,
    #[arg(long = "log-filter", global = true, help = "Level of logs written into the log file")]
    log_filter: Option<LevelFilter>,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, default_value = "default", help = "Whose data to use")]
    user: String,
    #[arg(long, global = true, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, global = true, help = "Print reports as JSON")]
    json: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(flatten)]
    Record(RecordCommand),
    #[command(flatten)]
    Report(ReportCommand),
}

/// Options shared by every command once arguments are parsed.
pub struct CliContext {
    pub date_style: DateStyle,
    pub json: bool,
}

pub type FileDashboard = Dashboard<FileStore, FileDraftRepository>;

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args.dir.map_or_else(create_application_default_path, Ok)?;
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        args.log_filter
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let user_dir = app_dir.join("users").join(&args.user);
    debug!("Using data of {} in {user_dir:?}", args.user);
    let dashboard = Dashboard::new(
        FileStore::new(user_dir.clone())?,
        FileDraftRepository::new(user_dir)?,
        Box::new(DefaultClock),
    );

    let context = CliContext {
        date_style: args.date_style,
        json: args.json,
    };

    match args.commands {
        Commands::Record(command) => process_record_command(&dashboard, &context, command).await,
        Commands::Report(command) => process_report_command(&dashboard, &context, command).await,
    }
}
