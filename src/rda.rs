//! ERA5 variables on the NCAR RDA (ds633.0) and their file naming.
//!
//! Pressure-level files hold one day (00-23 UTC) of one variable:
//!
//! ```text
//! e5.oper.an.pl/201405/e5.oper.an.pl.128_130_t.ll025sc.2014050100_2014050123.nc
//! ```
//!
//! Single-level files hold a whole month of one variable:
//!
//! ```text
//! e5.oper.an.sfc/201405/e5.oper.an.sfc.128_034_sstk.ll025sc.2014050100_2014053123.nc
//! ```

use std::fmt;

use chrono::NaiveDate;

use crate::{
    calendar::days_in_month,
    error::{Era5Error, Result},
};

pub const DATASET: &str = "ds633.0";
pub const BASE_URL: &str = "https://tds.gdex.ucar.edu/thredds/fileServer/files/g/d633000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Pressure,
    Surface,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Pressure => "pl",
            Level::Surface => "sfc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// `uv` for wind components on the pressure levels, `sc` for scalars.
pub enum Grid {
    Uv,
    Sc,
}

impl Grid {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grid::Uv => "uv",
            Grid::Sc => "sc",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Variable {
    /// WPS name, e.g. `2T`
    pub name: &'static str,
    /// ECMWF parameter code
    pub code: u16,
    pub level: Level,
    pub grid: Grid,
    pub description: &'static str,
}

const fn var(
    name: &'static str,
    code: u16,
    level: Level,
    grid: Grid,
    description: &'static str,
) -> Variable {
    Variable {
        name,
        code,
        level,
        grid,
        description,
    }
}

pub static PRESSURE_LEVEL_VARS: [Variable; 5] = [
    var("Z", 129, Level::Pressure, Grid::Sc, "Geopotential"),
    var("Q", 133, Level::Pressure, Grid::Sc, "Specific humidity"),
    var("T", 130, Level::Pressure, Grid::Sc, "Temperature"),
    var("U", 131, Level::Pressure, Grid::Uv, "U component of wind"),
    var("V", 132, Level::Pressure, Grid::Uv, "V component of wind"),
];

pub static SINGLE_LEVEL_VARS: [Variable; 20] = [
    var("SP", 134, Level::Surface, Grid::Sc, "Surface pressure"),
    var("MSL", 151, Level::Surface, Grid::Sc, "Mean sea level pressure"),
    var("2T", 167, Level::Surface, Grid::Sc, "2m temperature"),
    var("2D", 168, Level::Surface, Grid::Sc, "2m dewpoint temperature"),
    var("10U", 165, Level::Surface, Grid::Sc, "10m U wind component"),
    var("10V", 166, Level::Surface, Grid::Sc, "10m V wind component"),
    var("SSTK", 34, Level::Surface, Grid::Sc, "Sea surface temperature"),
    var("SKT", 235, Level::Surface, Grid::Sc, "Skin temperature"),
    var("LSM", 172, Level::Surface, Grid::Sc, "Land-sea mask"),
    var("CI", 31, Level::Surface, Grid::Sc, "Sea ice cover"),
    var("SD", 141, Level::Surface, Grid::Sc, "Snow depth"),
    var("RSN", 33, Level::Surface, Grid::Sc, "Snow density"),
    var("SWVL1", 39, Level::Surface, Grid::Sc, "Volumetric soil water layer 1"),
    var("SWVL2", 40, Level::Surface, Grid::Sc, "Volumetric soil water layer 2"),
    var("SWVL3", 41, Level::Surface, Grid::Sc, "Volumetric soil water layer 3"),
    var("SWVL4", 42, Level::Surface, Grid::Sc, "Volumetric soil water layer 4"),
    var("STL1", 139, Level::Surface, Grid::Sc, "Soil temperature level 1"),
    var("STL2", 170, Level::Surface, Grid::Sc, "Soil temperature level 2"),
    var("STL3", 183, Level::Surface, Grid::Sc, "Soil temperature level 3"),
    var("STL4", 236, Level::Surface, Grid::Sc, "Soil temperature level 4"),
];

/// The 37 ERA5 pressure levels (hPa) held in each pressure-level file.
pub const PRESSURE_LEVELS: [u32; 37] = [
    1, 2, 3, 5, 7, 10, 20, 30, 50, 70, 100, 125, 150, 175, 200, 225, 250, 300, 350, 400, 450, 500,
    550, 600, 650, 700, 750, 775, 800, 825, 850, 875, 900, 925, 950, 975, 1000,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub url: String,
    pub file_name: String,
}

impl Variable {
    fn short_name(&self) -> String {
        self.name.to_lowercase()
    }

    fn file(&self, base_url: &str, year_month: &str, start: &str, end: &str) -> RemoteFile {
        let stream = format!("e5.oper.an.{}", self.level.as_str());
        let file_name = format!(
            "{}.128_{:03}_{}.ll025{}.{}00_{}23.nc",
            stream,
            self.code,
            self.short_name(),
            self.grid.as_str(),
            start,
            end
        );
        let url = format!(
            "{}/{}/{}/{}",
            base_url.trim_end_matches('/'),
            stream,
            year_month,
            file_name
        );

        RemoteFile { url, file_name }
    }

    /// The file holding all 24 hours of `date`.
    pub fn daily_file(&self, base_url: &str, date: NaiveDate) -> RemoteFile {
        let day = date.format("%Y%m%d").to_string();
        self.file(base_url, &day[..6], &day, &day)
    }

    /// The file holding every hour of the month.
    pub fn monthly_file(&self, base_url: &str, year: i32, month: u32) -> Result<RemoteFile> {
        let last_day = days_in_month(year, month)?;
        let year_month = format!("{}{:02}", year, month);
        let start = format!("{}01", year_month);
        let end = format!("{}{:02}", year_month, last_day);

        Ok(self.file(base_url, &year_month, &start, &end))
    }
}

pub fn find(name: &str) -> Option<&'static Variable> {
    let name = name.trim().to_uppercase();
    PRESSURE_LEVEL_VARS
        .iter()
        .chain(SINGLE_LEVEL_VARS.iter())
        .find(|v| v.name == name)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Which variables to fetch; `All` unless `--vars` narrows it.
pub enum Selection {
    #[default]
    All,
    Only(Vec<&'static str>),
}

impl Selection {
    /// Parses a comma separated list such as `Z,T,U,V`.
    pub fn parse(s: &str) -> Result<Self> {
        let mut names = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let variable = find(part).ok_or_else(|| Era5Error::UnknownVariable(part.to_string()))?;
            if !names.contains(&variable.name) {
                names.push(variable.name);
            }
        }

        if names.is_empty() {
            return Err(Era5Error::UnknownVariable(s.to_string()));
        }

        Ok(Selection::Only(names))
    }

    pub fn includes(&self, variable: &Variable) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(names) => names.contains(&variable.name),
        }
    }

    pub fn pressure_level(&self) -> Vec<&'static Variable> {
        PRESSURE_LEVEL_VARS.iter().filter(|v| self.includes(v)).collect()
    }

    pub fn single_level(&self) -> Vec<&'static Variable> {
        SINGLE_LEVEL_VARS.iter().filter(|v| self.includes(v)).collect()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "ALL"),
            Selection::Only(names) => write!(f, "{}", names.join(",")),
        }
    }
}

// -- Tests -------------------------------------------------------------------
