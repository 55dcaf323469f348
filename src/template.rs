//! Job templates and exact-match variable substitution.
//!
//! A template is an ordinary batch script containing assignment lines such as
//! `YEAR=XXXX`. Rendering rewrites each line that starts with exactly
//! `NAME=` to `NAME='value'`; nothing else in the file is touched apart from
//! the `#SBATCH --job-name=` directive. Values are single quoted so the shell
//! never expands them.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use crate::{
    error::{Era5Error, Result},
    job::JobSpec,
};

const JOB_NAME_DIRECTIVE: &str = "#SBATCH --job-name=";

#[derive(Debug, Clone)]
pub struct JobTemplate {
    pub path: PathBuf,
    contents: String,
}

impl JobTemplate {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Era5Error::MissingTemplate(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;

        Ok(JobTemplate {
            path: path.to_path_buf(),
            contents,
        })
    }

    pub fn render(&self, job: &dyn JobSpec) -> Result<String> {
        let variables = job.variables();
        let mut matched = vec![false; variables.len()];
        let mut rendered = String::with_capacity(self.contents.len());

        for line in self.contents.lines() {
            let trimmed = line.trim_start();
            let indent = &line[..line.len() - trimmed.len()];

            let assignment = variables
                .iter()
                .position(|(name, _)| is_assignment_of(trimmed, name));

            match assignment {
                Some(i) => {
                    let (name, value) = &variables[i];
                    matched[i] = true;
                    rendered.push_str(&format!("{}{}={}", indent, name, shell_quote(value)));
                }
                None if trimmed.starts_with(JOB_NAME_DIRECTIVE) => {
                    rendered.push_str(&format!("{}{}{}", indent, JOB_NAME_DIRECTIVE, job.name()));
                }
                None => rendered.push_str(line),
            }
            rendered.push('\n');
        }

        for name in job.required() {
            let found = variables
                .iter()
                .zip(&matched)
                .any(|((n, _), m)| n == name && *m);
            if !found {
                return Err(Era5Error::TemplateVariableMissing {
                    name: name.to_string(),
                    path: self.path.clone(),
                });
            }
        }

        Ok(rendered)
    }
}

fn is_assignment_of(line: &str, name: &str) -> bool {
    line.strip_prefix(name)
        .is_some_and(|rest| rest.starts_with('='))
}

/// Wraps `value` in single quotes, writing each embedded `'` as `'\''`.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Writes the rendered job to a temporary file in `dir`. The file is removed
/// when the handle is dropped unless it is persisted.
pub fn write_job_file(dir: &Path, job_name: &str, contents: &str) -> Result<NamedTempFile> {
    fs::create_dir_all(dir)?;

    let mut file = Builder::new()
        .prefix(&format!("{}.", job_name))
        .suffix(".sbatch")
        .tempfile_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    debug!("Wrote job file {}", file.path().display());

    Ok(file)
}

// -- Tests -------------------------------------------------------------------
