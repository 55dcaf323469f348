//! Job parameters and the output directory tree.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::{
    calendar::{DayRange, Hours},
    error::{Era5Error, Result},
    rda::Selection,
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// `<root>/<YYYY>/<MM>` with one directory per product underneath.
pub struct OutputTree {
    pub root: PathBuf,
    pub year: i32,
    pub month: u32,
}

impl OutputTree {
    pub fn new(root: &Path, year: i32, month: u32) -> Self {
        OutputTree {
            root: root.to_path_buf(),
            year,
            month,
        }
    }

    pub fn month_dir(&self) -> PathBuf {
        self.root
            .join(format!("{:04}", self.year))
            .join(format!("{:02}", self.month))
    }

    pub fn pressure_levels(&self) -> PathBuf {
        self.month_dir().join("pressure_levels")
    }

    pub fn single_levels(&self) -> PathBuf {
        self.month_dir().join("single_levels")
    }

    pub fn intermediate(&self) -> PathBuf {
        self.month_dir().join("intermediate")
    }

    /// Directories the download job writes into.
    pub fn download_dirs(&self) -> Vec<PathBuf> {
        vec![self.month_dir(), self.pressure_levels(), self.single_levels()]
    }

    pub fn create_download_dirs(&self) -> Result<()> {
        for dir in self.download_dirs() {
            fs::create_dir_all(dir)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Geographic subset as north, west, south, east in degrees.
pub struct Area {
    pub north: f64,
    pub west: f64,
    pub south: f64,
    pub east: f64,
}

impl Area {
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Era5Error::InvalidArea(s.to_string());
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;

        let [north, west, south, east] = values[..] else {
            return Err(invalid());
        };

        let latitudes_ok = (-90.0..=90.0).contains(&north)
            && (-90.0..=90.0).contains(&south)
            && north >= south;
        let longitudes_ok = (-180.0..=360.0).contains(&west) && (-180.0..=360.0).contains(&east);
        if !latitudes_ok || !longitudes_ok {
            return Err(invalid());
        }

        Ok(Area {
            north,
            west,
            south,
            east,
        })
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.north, self.west, self.south, self.east)
    }
}

/// Something that can be rendered into a job template and submitted.
pub trait JobSpec {
    /// Scheduler job name, e.g. `era5_dl_201405`.
    fn name(&self) -> String;

    /// Template variables in substitution order.
    fn variables(&self) -> Vec<(&'static str, String)>;

    /// Variables every template for this job must declare.
    fn required(&self) -> &'static [&'static str];
}

#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub days: DayRange,
    pub hours: Hours,
    pub out_dir: PathBuf,
    pub vars: Selection,
    pub area: Option<Area>,
}

impl JobSpec for DownloadJob {
    fn name(&self) -> String {
        format!("era5_dl_{}{:02}", self.days.year, self.days.month)
    }

    fn variables(&self) -> Vec<(&'static str, String)> {
        let mut variables = calendar_variables(&self.days, &self.hours);
        variables.push(("OUT_DIR", self.out_dir.display().to_string()));
        variables.push(("VARS", self.vars.to_string()));
        if let Some(area) = &self.area {
            variables.push(("AREA", area.to_string()));
        }

        variables
    }

    fn required(&self) -> &'static [&'static str] {
        &[
            "YEAR",
            "MONTH",
            "START_DAY",
            "END_DAY",
            "HOURS",
            "OUT_DIR",
            "VARS",
        ]
    }
}

#[derive(Debug, Clone)]
pub struct ConvertJob {
    pub days: DayRange,
    pub hours: Hours,
    pub input_dir: PathBuf,
    pub out_dir: PathBuf,
}

impl JobSpec for ConvertJob {
    fn name(&self) -> String {
        format!("era5_int_{}{:02}", self.days.year, self.days.month)
    }

    fn variables(&self) -> Vec<(&'static str, String)> {
        let mut variables = calendar_variables(&self.days, &self.hours);
        variables.push(("INPUT_DIR", self.input_dir.display().to_string()));
        variables.push(("OUT_DIR", self.out_dir.display().to_string()));

        variables
    }

    fn required(&self) -> &'static [&'static str] {
        &[
            "YEAR",
            "MONTH",
            "START_DAY",
            "END_DAY",
            "HOURS",
            "INPUT_DIR",
            "OUT_DIR",
        ]
    }
}

fn calendar_variables(days: &DayRange, hours: &Hours) -> Vec<(&'static str, String)> {
    vec![
        ("YEAR", days.year.to_string()),
        ("MONTH", format!("{:02}", days.month)),
        ("START_DAY", format!("{:02}", days.start)),
        ("END_DAY", format!("{:02}", days.end)),
        ("HOURS", hours.to_string()),
    ]
}

// -- Tests -------------------------------------------------------------------
