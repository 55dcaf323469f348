//! Batch scheduler submission.

use std::{fmt, path::PathBuf, process::Command};

use tracing::{debug, info};

use crate::error::{Era5Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub job_file: PathBuf,
    /// Job parameters, exported to the job's environment.
    pub env: Vec<(String, String)>,
    /// Hold the job until this one has completed successfully.
    pub depends_on: Option<JobId>,
}

pub trait Scheduler {
    fn submit(&self, submission: &Submission) -> Result<JobId>;
}

#[derive(Debug, Clone)]
/// Submits through `sbatch` (or a compatible command).
pub struct Slurm {
    pub command: String,
    pub extra_args: Vec<String>,
}

impl Slurm {
    pub fn new(command: &str, extra_args: &[String]) -> Self {
        Slurm {
            command: command.to_string(),
            extra_args: extra_args.to_vec(),
        }
    }

    pub fn args(&self, submission: &Submission) -> Vec<String> {
        let mut args = vec!["--export=ALL".to_string()];
        args.extend(self.extra_args.iter().cloned());
        if let Some(id) = &submission.depends_on {
            args.push(format!("--dependency=afterok:{}", id));
        }
        args.push(submission.job_file.display().to_string());

        args
    }
}

impl Scheduler for Slurm {
    fn submit(&self, submission: &Submission) -> Result<JobId> {
        let args = self.args(submission);
        debug!("Running {} {}", self.command, args.join(" "));

        let output = Command::new(&self.command)
            .args(&args)
            .envs(submission.env.iter().map(|(k, v)| (k, v)))
            .output()?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(Era5Error::SubmissionFailed {
                code,
                stderr: detail,
            });
        }

        let id = parse_job_id(&stdout)?;
        info!("Scheduler accepted job {}", id);

        Ok(id)
    }
}

/// Takes the trailing token of the submission output, e.g. `Submitted batch job 123456`
/// or the `123456;cluster` form printed by `sbatch --parsable`.
pub fn parse_job_id(stdout: &str) -> Result<JobId> {
    let token = stdout
        .split_whitespace()
        .last()
        .map(|t| t.split(';').next().unwrap_or(t))
        .unwrap_or("");

    if token.starts_with(|c: char| c.is_ascii_digit()) {
        Ok(JobId(token.to_string()))
    } else {
        Err(Era5Error::NoJobId(stdout.trim().to_string()))
    }
}

// -- Tests -------------------------------------------------------------------
