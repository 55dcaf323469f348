//! Submits a job that runs the external converter over a downloaded month.

use anyhow::Result;
use tracing::info;

use crate::{
    cli::{warning, ConvertArgs},
    config::Config,
    job::{ConvertJob, OutputTree},
    scheduler::{JobId, Scheduler},
    template::JobTemplate,
};

use super::{absolute, dry_run, parse_hours, submit_job, JobReport};

pub fn convert(args: &ConvertArgs, config: &Config, scheduler: &dyn Scheduler) -> Result<JobReport> {
    let days = args.period.day_range()?;
    let hours = parse_hours(args.hours.as_deref())?;

    let template_path = args
        .template
        .clone()
        .unwrap_or_else(|| config.templates.convert.clone());
    let template = JobTemplate::load(&template_path)?;

    let data_root = absolute(args.data_root.as_ref().unwrap_or(&config.paths.data_root))?;
    let tree = OutputTree::new(&data_root, days.year, days.month);
    let out_dir = match &args.out_dir {
        Some(out_dir) => absolute(out_dir)?,
        None => tree.intermediate(),
    };

    let job = ConvertJob {
        days,
        hours,
        input_dir: tree.month_dir(),
        out_dir,
    };

    let depends_on = args.after.as_ref().map(|id| JobId(id.trim().to_string()));
    if depends_on.is_none() && !job.input_dir.is_dir() {
        warning(&format!(
            "{} does not exist yet; submit the download first or pass --after",
            job.input_dir.display()
        ));
    }

    if args.dry_run {
        return dry_run(&job, &template);
    }

    std::fs::create_dir_all(&job.out_dir)?;
    info!("Conversion output will be written to {}", job.out_dir.display());

    let job_dir = absolute(&args.job_dir.clone().unwrap_or_else(|| config.job_dir(&data_root)))?;

    submit_job(&job, &template, &job_dir, scheduler, depends_on)
}

// -- Tests -------------------------------------------------------------------
