//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::ProgressBar;

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Submits ERA5 download and WPS conversion jobs to a batch scheduler
pub struct Cli {
    /// Configuration file (default: <config dir>/era5-jobs/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a job that downloads one month of ERA5 files from the RDA
    Submit(SubmitArgs),
    /// Submit a job that converts downloaded files to WPS intermediate format
    Convert(ConvertArgs),
    /// Download ERA5 files from the RDA (normally run inside a submitted job)
    Download(DownloadArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PeriodArgs {
    /// Year (e.g. 2014)
    #[arg(long)]
    pub year: i32,

    /// Month (1-12)
    #[arg(long)]
    pub month: u32,

    /// First day (default: 1)
    #[arg(long)]
    pub start_day: Option<u32>,

    /// Last day (default: last day of the month)
    #[arg(long)]
    pub end_day: Option<u32>,
}

#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub period: PeriodArgs,

    /// UTC hours, e.g. 0-23 or 0,6,12,18 (default: all)
    #[arg(long)]
    pub hours: Option<String>,

    /// Root of the output tree (default: paths.data_root)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Comma separated variables, e.g. Z,T,U,V (default: all)
    #[arg(long)]
    pub vars: Option<String>,

    /// Geographic subset as N,W,S,E, e.g. 40,-120,25,-105
    #[arg(long, allow_hyphen_values = true)]
    pub area: Option<String>,

    /// Job template (default: templates.download)
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Where generated job files are kept (default: <out-dir>/jobs)
    #[arg(long)]
    pub job_dir: Option<PathBuf>,

    /// Print the job file instead of submitting it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub period: PeriodArgs,

    /// UTC hours, e.g. 0-23 or 0,6,12,18 (default: all)
    #[arg(long)]
    pub hours: Option<String>,

    /// Root of the downloaded tree (default: paths.data_root)
    #[arg(long)]
    pub data_root: Option<PathBuf>,

    /// Output directory (default: <data-root>/YYYY/MM/intermediate)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Start only after this job has completed successfully
    #[arg(long, value_name = "JOBID")]
    pub after: Option<String>,

    /// Job template (default: templates.convert)
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Where generated job files are kept (default: <data-root>/jobs)
    #[arg(long)]
    pub job_dir: Option<PathBuf>,

    /// Print the job file instead of submitting it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// Year (e.g. 2014)
    #[arg(long)]
    pub year: i32,

    /// Month (1-12)
    #[arg(long)]
    pub month: u32,

    /// Single day to download
    #[arg(long, conflicts_with_all = ["start_day", "end_day"])]
    pub day: Option<u32>,

    /// First day (default: 1)
    #[arg(long)]
    pub start_day: Option<u32>,

    /// Last day (default: last day of the month)
    #[arg(long)]
    pub end_day: Option<u32>,

    /// Output directory
    #[arg(long, default_value = "./era5_rda_data")]
    pub out_dir: PathBuf,

    /// Comma separated variables, e.g. Z,T,U,V (default: all)
    #[arg(long)]
    pub vars: Option<String>,

    /// Skip pressure level downloads
    #[arg(long)]
    pub skip_pressure: bool,

    /// Skip single level downloads
    #[arg(long)]
    pub skip_single: bool,
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

pub fn banner(title: &str) {
    let rule = "=".repeat(80);
    println!("{}", rule);
    println!("{}", style(title).bold());
    println!("{}", rule);
}

pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

pub fn skipped(message: &str) {
    println!("  {} {}", style("[SKIP]").yellow(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", style("WARNING:").yellow().bold(), message);
}

pub fn failure(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

// -- Tests -------------------------------------------------------------------
