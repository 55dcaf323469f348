//! Downloads ERA5 NetCDF files from the NCAR RDA.
//!
//! Pressure-level files are fetched per day, single-level files per month.
//! Files already on disk are skipped, so an interrupted job can simply be
//! resubmitted.

use std::{
    fs,
    ops::AddAssign,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{bail, Result};
use tracing::{error, info};

use crate::{
    calendar::DayRange,
    cli::{banner, create_spinner, failure, skipped, success, DownloadArgs},
    config::Config,
    credentials::Credentials,
    download::{client, download_with_progress},
    rda::{self, RemoteFile, Selection},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl AddAssign for Summary {
    fn add_assign(&mut self, other: Self) {
        self.downloaded += other.downloaded;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

pub async fn download(args: &DownloadArgs, config: &Config) -> Result<Summary> {
    let credentials = Credentials::locate(&config.credentials_path())?;
    success(&format!("Found RDA credentials for {}", credentials.email));

    let days = match args.day {
        Some(day) => DayRange::resolve(args.year, args.month, Some(day), Some(day))?,
        None => DayRange::resolve(args.year, args.month, args.start_day, args.end_day)?,
    };
    let selection = match &args.vars {
        Some(vars) => Selection::parse(vars)?,
        None => Selection::All,
    };

    banner("ERA5 NCAR RDA Download Configuration");
    println!("Dataset:     {}", rda::DATASET);
    println!("Year:        {}", days.year);
    println!("Month:       {:02}", days.month);
    println!("Days:        {} to {} ({} days)", days.start, days.end, days.len());
    println!("Variables:   {}", selection);
    println!(
        "Levels:      {} pressure levels ({}-{} hPa), 00-23 UTC per file",
        rda::PRESSURE_LEVELS.len(),
        rda::PRESSURE_LEVELS[0],
        rda::PRESSURE_LEVELS[rda::PRESSURE_LEVELS.len() - 1]
    );
    println!("Output Dir:  {}", args.out_dir.display());

    let started = Instant::now();
    let http = client()?;
    let mut total = Summary::default();

    if !args.skip_pressure {
        let files: Vec<(String, RemoteFile)> = days
            .dates()
            .flat_map(|date| {
                selection.pressure_level().into_iter().map(move |v| {
                    let label = format!("[{}] {} - {}", v.name, v.description, date);
                    (label, v.daily_file(&config.rda.base_url, date))
                })
            })
            .collect();

        banner("Downloading Pressure Level Variables");
        let summary = fetch_all(
            &http,
            &credentials,
            &files,
            &args.out_dir.join("pressure_levels"),
        )
        .await?;
        print_summary("Pressure Levels", &summary);
        total += summary;
    }

    if !args.skip_single {
        let mut files = Vec::new();
        for v in selection.single_level() {
            let label = format!("[{}] {} - {}-{:02} (monthly)", v.name, v.description, days.year, days.month);
            files.push((label, v.monthly_file(&config.rda.base_url, days.year, days.month)?));
        }

        banner("Downloading Single Level Variables");
        let summary = fetch_all(
            &http,
            &credentials,
            &files,
            &args.out_dir.join("single_levels"),
        )
        .await?;
        print_summary("Single Levels", &summary);
        total += summary;
    }

    banner("DOWNLOAD COMPLETE");
    println!("Total downloaded: {}", total.downloaded);
    println!("Total skipped:    {}", total.skipped);
    println!("Total failed:     {}", total.failed);
    println!("Time elapsed:     {:.1?}", started.elapsed());

    if total.failed > 0 {
        bail!(
            "{} download(s) failed. Check your RDA credentials and network connection.",
            total.failed
        );
    }

    Ok(total)
}

async fn fetch_all(
    http: &reqwest::Client,
    credentials: &Credentials,
    files: &[(String, RemoteFile)],
    out_dir: &Path,
) -> Result<Summary> {
    fs::create_dir_all(out_dir)?;
    let mut summary = Summary::default();

    for (label, remote) in files {
        let target: PathBuf = out_dir.join(&remote.file_name);
        if target.exists() {
            skipped(&format!("{} (already exists)", remote.file_name));
            summary.skipped += 1;
            continue;
        }

        let bar = create_spinner(format!("{} -> {}", label, remote.file_name));
        match download_with_progress(http, &remote.url, credentials, &target, &bar).await {
            Ok(size) => {
                bar.finish_and_clear();
                success(&format!("{} ({} bytes)", remote.file_name, size));
                info!("Downloaded {}", remote.url);
                summary.downloaded += 1;
            }
            Err(e) => {
                bar.finish_and_clear();
                failure(&e.to_string());
                error!("{}", e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

fn print_summary(title: &str, summary: &Summary) {
    println!(
        "\n{} Summary: {} downloaded, {} skipped, {} failed",
        title, summary.downloaded, summary.skipped, summary.failed
    );
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cli::command::test_support::write, error::Era5Error};
    use httpmock::prelude::*;
    use tempfile::TempDir;

    fn setup(server: &MockServer) -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        let credentials = dir.path().join(".cdsapirc");
        write(&credentials, "[RDA]\nemail: me@example.com\nkey: abc123\n");
        config.credentials.path = Some(credentials);
        config.rda.base_url = server.base_url();

        (dir, config)
    }

    fn args(out_dir: &Path) -> DownloadArgs {
        DownloadArgs {
            year: 2014,
            month: 5,
            day: Some(1),
            start_day: None,
            end_day: None,
            out_dir: out_dir.to_path_buf(),
            vars: Some("T,2T".to_string()),
            skip_pressure: false,
            skip_single: false,
        }
    }

    #[tokio::test]
    async fn should_download_selected_variables() {
        let server = MockServer::start();
        let pressure = server.mock(|when, then| {
            when.method(GET)
                .path("/e5.oper.an.pl/201405/e5.oper.an.pl.128_130_t.ll025sc.2014050100_2014050123.nc");
            then.status(200).body(vec![1u8; 2048]);
        });
        let single = server.mock(|when, then| {
            when.method(GET)
                .path("/e5.oper.an.sfc/201405/e5.oper.an.sfc.128_167_2t.ll025sc.2014050100_2014053123.nc");
            then.status(200).body(vec![2u8; 2048]);
        });

        let (dir, config) = setup(&server);
        let out_dir = dir.path().join("out");

        let summary = download(&args(&out_dir), &config).await.unwrap();

        pressure.assert();
        single.assert();
        assert_eq!(
            summary,
            Summary {
                downloaded: 2,
                skipped: 0,
                failed: 0
            }
        );
        assert!(out_dir
            .join("pressure_levels/e5.oper.an.pl.128_130_t.ll025sc.2014050100_2014050123.nc")
            .exists());
    }

    #[tokio::test]
    async fn should_skip_existing_files() {
        let server = MockServer::start();
        let (dir, config) = setup(&server);
        let out_dir = dir.path().join("out");
        write(
            &out_dir.join("pressure_levels/e5.oper.an.pl.128_130_t.ll025sc.2014050100_2014050123.nc"),
            "existing",
        );
        let mut args = args(&out_dir);
        args.skip_single = true;

        let summary = download(&args, &config).await.unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.downloaded, 0);
    }

    #[tokio::test]
    async fn should_fail_when_any_download_fails() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(500);
        });
        let (dir, config) = setup(&server);
        let out_dir = dir.path().join("out");
        let mut args = args(&out_dir);
        args.skip_pressure = true;

        assert!(download(&args, &config).await.is_err());
        assert!(fs::read_dir(out_dir.join("single_levels")).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn should_require_credentials() {
        let server = MockServer::start();
        let (dir, mut config) = setup(&server);
        config.credentials.path = Some(dir.path().join("missing"));

        let err = download(&args(&dir.path().join("out")), &config).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Era5Error>(),
            Some(Era5Error::MissingCredentials { .. })
        ));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn should_add_summaries() {
        let mut total = Summary {
            downloaded: 1,
            skipped: 2,
            failed: 0,
        };
        total += Summary {
            downloaded: 3,
            skipped: 0,
            failed: 1,
        };

        assert_eq!(
            total,
            Summary {
                downloaded: 4,
                skipped: 2,
                failed: 1
            }
        );
    }
}
