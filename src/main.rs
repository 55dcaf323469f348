mod calendar;
mod cli;
mod config;
mod credentials;
mod download;
mod error;
mod job;
mod logger;
mod rda;
mod scheduler;
mod template;

use std::process::ExitCode;

use anyhow::{Error, Result};
use clap::{error::ErrorKind, Parser};
use cli::{command, command::JobReport, failure, success, Cli, Commands};
use config::Config;
use error::Era5Error;
use scheduler::Slurm;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    logger::init(cli.verbose);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<(), Error> {
    let config = Config::load(cli.config.as_deref())?;
    let scheduler = Slurm::new(
        &config.scheduler.submit_command,
        &config.scheduler.extra_args,
    );

    match &cli.command {
        Commands::Submit(args) => print_report(command::submit(args, &config, &scheduler)?),
        Commands::Convert(args) => print_report(command::convert(args, &config, &scheduler)?),
        Commands::Download(args) => {
            command::download(args, &config).await?;
        }
    }

    Ok(())
}

fn print_report(report: JobReport) {
    match report {
        JobReport::Submitted { name, id, job_file } => {
            success(&format!("Submitted {} as job {}", name, id));
            if let Some(job_file) = job_file {
                println!("Job file: {}", job_file.display());
            }
            println!("{}", id);
        }
        JobReport::DryRun { name, rendered } => {
            println!("# {} (dry run, not submitted)", name);
            print!("{}", rendered);
        }
    }
}

fn report_error(e: &Error) {
    tracing::debug!("{:?}", e);
    failure(&e.to_string());

    if let Some(Era5Error::MissingCredentials { path }) = e.downcast_ref::<Era5Error>() {
        eprintln!("\n{}", credentials::remediation(path));
    }
}
