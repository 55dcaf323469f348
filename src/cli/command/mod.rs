pub mod convert;
pub mod download;
pub mod submit;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info};

pub use convert::convert;
pub use download::download;
pub use submit::submit;

use crate::{
    calendar::{DayRange, Hours},
    cli::{warning, PeriodArgs},
    job::JobSpec,
    scheduler::{JobId, Scheduler, Submission},
    template::{write_job_file, JobTemplate},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobReport {
    Submitted {
        name: String,
        id: JobId,
        job_file: Option<PathBuf>,
    },
    DryRun {
        name: String,
        rendered: String,
    },
}

impl PeriodArgs {
    pub fn day_range(&self) -> crate::error::Result<DayRange> {
        DayRange::resolve(self.year, self.month, self.start_day, self.end_day)
    }
}

pub fn parse_hours(hours: Option<&str>) -> crate::error::Result<Hours> {
    hours.map(Hours::parse).unwrap_or_else(|| Ok(Hours::all()))
}

/// Job scripts change directory before using their paths, so every path
/// handed to a job is made absolute against the submitting directory.
pub fn absolute(path: &Path) -> crate::error::Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}

/// Renders `job` into a per-invocation copy of the template and submits it.
///
/// The job file is created in `job_dir` and removed again if the scheduler
/// rejects it; on success it is kept as `<job_name>.<job_id>.sbatch`. Once the
/// job is queued a failure to rename the file is only a warning.
pub fn submit_job(
    job: &dyn JobSpec,
    template: &JobTemplate,
    job_dir: &Path,
    scheduler: &dyn Scheduler,
    depends_on: Option<JobId>,
) -> Result<JobReport> {
    let name = job.name();
    let rendered = template.render(job)?;
    let job_file = write_job_file(job_dir, &name, &rendered)?;

    let submission = Submission {
        job_file: job_file.path().to_path_buf(),
        env: job
            .variables()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        depends_on,
    };

    // On error `job_file` is dropped here, which deletes it.
    let id = scheduler.submit(&submission)?;

    let kept = job_dir.join(format!("{}.{}.sbatch", name, id));
    let job_file = match job_file.persist(&kept) {
        Ok(_) => {
            info!("Job file kept at {}", kept.display());
            Some(kept)
        }
        Err(e) => {
            warning(&format!(
                "job {} was submitted but its job file could not be saved as {}: {}",
                id,
                kept.display(),
                e.error
            ));
            e.file.keep().ok().map(|(_, path)| path)
        }
    };

    Ok(JobReport::Submitted { name, id, job_file })
}

pub fn dry_run(job: &dyn JobSpec, template: &JobTemplate) -> Result<JobReport> {
    let rendered = template.render(job)?;
    debug!("Rendered {} from {}", job.name(), template.path.display());

    Ok(JobReport::DryRun {
        name: job.name(),
        rendered,
    })
}

// -- Tests -------------------------------------------------------------------
