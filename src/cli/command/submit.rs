//! Submits a job that downloads one month of ERA5 files.

use anyhow::Result;
use tracing::info;

use crate::{
    cli::SubmitArgs,
    config::Config,
    credentials::Credentials,
    job::{Area, DownloadJob, OutputTree},
    rda::Selection,
    scheduler::Scheduler,
    template::JobTemplate,
};

use super::{absolute, dry_run, parse_hours, submit_job, JobReport};

/// Validates everything before touching the filesystem: the period and
/// options first, then the template, then the RDA credentials. Only then is
/// the output tree created and the job submitted.
pub fn submit(args: &SubmitArgs, config: &Config, scheduler: &dyn Scheduler) -> Result<JobReport> {
    let days = args.period.day_range()?;
    let hours = parse_hours(args.hours.as_deref())?;
    let vars = match &args.vars {
        Some(vars) => Selection::parse(vars)?,
        None => Selection::All,
    };
    let area = args.area.as_deref().map(Area::parse).transpose()?;

    let template_path = args
        .template
        .clone()
        .unwrap_or_else(|| config.templates.download.clone());
    let template = JobTemplate::load(&template_path)?;

    Credentials::locate(&config.credentials_path())?;

    let data_root = absolute(args.out_dir.as_ref().unwrap_or(&config.paths.data_root))?;
    let tree = OutputTree::new(&data_root, days.year, days.month);

    let job = DownloadJob {
        days,
        hours,
        out_dir: tree.month_dir(),
        vars,
        area,
    };

    if args.dry_run {
        for dir in tree.download_dirs() {
            info!("Would create {}", dir.display());
        }
        return dry_run(&job, &template);
    }

    tree.create_download_dirs()?;
    info!("Output tree ready at {}", tree.month_dir().display());

    let job_dir = absolute(&args.job_dir.clone().unwrap_or_else(|| config.job_dir(&data_root)))?;

    submit_job(&job, &template, &job_dir, scheduler, None)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::{
        cli::{command::test_support::*, PeriodArgs},
        error::Era5Error,
    };
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        config: Config,
    }

    impl Fixture {
        fn new(with_credentials: bool) -> Self {
            let dir = TempDir::new().unwrap();
            let mut config = Config::default();

            let template = dir.path().join("templates/download.sbatch");
            write(&template, DOWNLOAD_TEMPLATE);
            config.templates.download = template;

            let credentials = dir.path().join(".cdsapirc");
            if with_credentials {
                write(&credentials, "[RDA]\nemail: me@example.com\nkey: abc123\n");
            }
            config.credentials.path = Some(credentials);
            config.paths.data_root = dir.path().join("data");

            Fixture { dir, config }
        }

        fn data_root(&self) -> PathBuf {
            self.config.paths.data_root.clone()
        }
    }

    fn args(year: i32, month: u32) -> SubmitArgs {
        SubmitArgs {
            period: PeriodArgs {
                year,
                month,
                start_day: None,
                end_day: None,
            },
            hours: None,
            out_dir: None,
            vars: None,
            area: None,
            template: None,
            job_dir: None,
            dry_run: false,
        }
    }

    fn submitted_env(scheduler: &FakeScheduler, name: &str) -> String {
        scheduler.submissions.borrow()[0]
            .env
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .unwrap()
    }

    #[test]
    fn should_submit_with_leap_year_end_day() {
        let fixture = Fixture::new(true);
        let scheduler = FakeScheduler::default();

        let report = submit(&args(2016, 2), &fixture.config, &scheduler).unwrap();

        assert!(matches!(report, JobReport::Submitted { .. }));
        assert_eq!(submitted_env(&scheduler, "END_DAY"), "29");
        assert_eq!(submitted_env(&scheduler, "START_DAY"), "01");
        assert!(fixture.data_root().join("2016/02/pressure_levels").is_dir());
        assert!(fixture.data_root().join("2016/02/single_levels").is_dir());
        assert_eq!(files_in(&fixture.data_root().join("jobs")).len(), 1);
    }

    #[test]
    fn should_default_end_day_for_non_leap_and_short_months() {
        for (year, month, end) in [(2015, 2, "28"), (2014, 6, "30"), (2014, 12, "31")] {
            let fixture = Fixture::new(true);
            let scheduler = FakeScheduler::default();

            submit(&args(year, month), &fixture.config, &scheduler).unwrap();
            assert_eq!(submitted_env(&scheduler, "END_DAY"), end);
        }
    }

    #[test]
    fn should_reject_invalid_month_without_submitting() {
        for month in [0, 13] {
            let fixture = Fixture::new(true);
            let scheduler = FakeScheduler::default();

            let err = submit(&args(2014, month), &fixture.config, &scheduler).unwrap_err();

            assert!(matches!(
                err.downcast_ref::<Era5Error>(),
                Some(Era5Error::InvalidMonth(m)) if *m == month
            ));
            assert!(scheduler.submissions.borrow().is_empty());
            assert!(!fixture.data_root().exists());
        }
    }

    #[test]
    fn should_stop_before_creating_dirs_without_credentials() {
        let fixture = Fixture::new(false);
        let scheduler = FakeScheduler::default();

        let err = submit(&args(2014, 5), &fixture.config, &scheduler).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Era5Error>(),
            Some(Era5Error::MissingCredentials { .. })
        ));
        assert!(scheduler.submissions.borrow().is_empty());
        assert!(!fixture.data_root().exists());
    }

    #[test]
    fn should_fail_for_missing_template() {
        let fixture = Fixture::new(true);
        let scheduler = FakeScheduler::default();
        let mut args = args(2014, 5);
        args.template = Some(fixture.dir.path().join("nope.sbatch"));

        let err = submit(&args, &fixture.config, &scheduler).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Era5Error>(),
            Some(Era5Error::MissingTemplate(_))
        ));
        assert!(scheduler.submissions.borrow().is_empty());
    }

    #[test]
    fn should_clean_up_after_failed_submission() {
        let fixture = Fixture::new(true);
        let scheduler = FakeScheduler {
            reject: true,
            ..Default::default()
        };

        let err = submit(&args(2014, 5), &fixture.config, &scheduler).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Era5Error>(),
            Some(Era5Error::SubmissionFailed { .. })
        ));
        assert!(files_in(&fixture.data_root().join("jobs")).is_empty());
    }

    #[test]
    fn should_pass_options_through() {
        let fixture = Fixture::new(true);
        let scheduler = FakeScheduler::default();
        let mut args = args(2014, 5);
        args.period.start_day = Some(10);
        args.period.end_day = Some(12);
        args.hours = Some("0,6,12,18".to_string());
        args.vars = Some("z,t".to_string());
        args.area = Some("40,-120,25,-105".to_string());
        args.job_dir = Some(fixture.dir.path().join("my-jobs"));

        submit(&args, &fixture.config, &scheduler).unwrap();

        assert_eq!(submitted_env(&scheduler, "HOURS"), "00,06,12,18");
        assert_eq!(submitted_env(&scheduler, "VARS"), "Z,T");
        assert_eq!(submitted_env(&scheduler, "AREA"), "40,-120,25,-105");
        assert_eq!(
            Path::new(&submitted_env(&scheduler, "OUT_DIR")),
            fixture.data_root().join("2014/05")
        );
        assert_eq!(files_in(&fixture.dir.path().join("my-jobs")).len(), 1);
    }

    #[test]
    fn should_render_absolute_out_dir_for_relative_root() {
        let fixture = Fixture::new(true);
        let scheduler = FakeScheduler::default();
        let mut args = args(2014, 5);
        args.out_dir = Some(PathBuf::from("./era5_rda_data"));
        args.dry_run = true;

        let report = submit(&args, &fixture.config, &scheduler).unwrap();

        let rendered = match report {
            JobReport::DryRun { rendered, .. } => rendered,
            other => panic!("unexpected report: {:?}", other),
        };
        let out_dir = PathBuf::from(assignment(&rendered, "OUT_DIR"));
        assert!(out_dir.is_absolute());
        assert_eq!(out_dir, std::env::current_dir().unwrap().join("era5_rda_data/2014/05"));
        assert!(!Path::new("era5_rda_data/2014/05").exists());
    }

    #[test]
    fn should_not_create_anything_on_dry_run() {
        let fixture = Fixture::new(true);
        let scheduler = FakeScheduler::default();
        let mut args = args(2014, 5);
        args.dry_run = true;

        let report = submit(&args, &fixture.config, &scheduler).unwrap();

        assert!(matches!(report, JobReport::DryRun { .. }));
        assert!(scheduler.submissions.borrow().is_empty());
        assert!(!fixture.data_root().exists());
    }
}
