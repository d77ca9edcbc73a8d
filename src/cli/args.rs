use chrono::{Datelike, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::error::{GnomyError, Result};
use crate::models::Site;
use crate::utils::constants::HRRR_FIRST_YEAR;

#[derive(Parser)]
#[command(name = "gnomy")]
#[command(about = "Generate AMY weather files (EPW) from NOAA HRRR analyses")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Settings file path [default: gnomy.toml if present]")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch missing hours, then build and write the EPW file
    Generate {
        #[command(flatten)]
        site: SiteArgs,

        #[command(flatten)]
        range: RangeArgs,

        #[arg(
            short,
            long,
            help = "Output EPW file path [default: {site}-{year}.epw]"
        )]
        output_file: Option<PathBuf>,

        #[arg(long, help = "Cache directory [default: ./cache]")]
        cache_dir: Option<PathBuf>,

        #[arg(long, help = "Concurrent downloads [default: CPU count]")]
        max_workers: Option<usize>,

        #[arg(long, default_value = "false", help = "Build from cache only, no downloads")]
        offline: bool,

        #[arg(
            long,
            default_value = "false",
            help = "Fail on uncached hours instead of writing sentinel rows"
        )]
        strict: bool,

        #[arg(long, default_value = "false", help = "Remove the site cache after writing")]
        rm_cache: bool,
    },

    /// Download and cache HRRR point data without building an EPW file
    Fetch {
        #[command(flatten)]
        site: SiteArgs,

        #[command(flatten)]
        range: RangeArgs,

        #[arg(long, help = "Cache directory [default: ./cache]")]
        cache_dir: Option<PathBuf>,

        #[arg(long, help = "Concurrent downloads [default: CPU count]")]
        max_workers: Option<usize>,
    },

    /// Report cache coverage for a site and date range
    Status {
        #[command(flatten)]
        site: SiteArgs,

        #[command(flatten)]
        range: RangeArgs,

        #[arg(long, help = "Cache directory [default: ./cache]")]
        cache_dir: Option<PathBuf>,
    },

    /// Summarize an existing EPW file
    Inspect {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "5", help = "Data rows to print")]
        sample: usize,
    },
}

#[derive(Args)]
pub struct SiteArgs {
    #[arg(long, allow_hyphen_values = true, help = "Latitude, degrees north")]
    pub latitude: f64,

    #[arg(
        long,
        allow_hyphen_values = true,
        help = "Longitude, degrees east (0-360) or negative degrees west"
    )]
    pub longitude: f64,

    #[arg(long, help = "Site name [default: '{lat} N {lon} E']")]
    pub name: Option<String>,

    #[arg(long, help = "Elevation in meters, for the EPW header")]
    pub elevation: Option<f64>,
}

impl SiteArgs {
    pub fn to_site(&self) -> Result<Site> {
        Site::new(self.name.clone(), self.latitude, self.longitude, self.elevation)
    }
}

#[derive(Args)]
pub struct RangeArgs {
    #[arg(long, conflicts_with_all = ["start_date", "end_date"], help = "Calendar year (UTC)")]
    pub year: Option<i32>,

    #[arg(long, requires = "end_date", help = "First day, YYYY-MM-DD (UTC)")]
    pub start_date: Option<NaiveDate>,

    #[arg(long, requires = "start_date", help = "Last day, YYYY-MM-DD (UTC, inclusive)")]
    pub end_date: Option<NaiveDate>,
}

impl RangeArgs {
    pub fn resolve(&self) -> Result<(NaiveDate, NaiveDate)> {
        let (start, end) = match (self.year, self.start_date, self.end_date) {
            (Some(year), None, None) => {
                let start = NaiveDate::from_ymd_opt(year, 1, 1)
                    .ok_or_else(|| GnomyError::InvalidDateRange(format!("bad year {}", year)))?;
                let end = NaiveDate::from_ymd_opt(year, 12, 31)
                    .ok_or_else(|| GnomyError::InvalidDateRange(format!("bad year {}", year)))?;
                (start, end)
            }
            (None, Some(start), Some(end)) => (start, end),
            (None, None, None) => {
                return Err(GnomyError::InvalidDateRange(
                    "provide --year or --start-date/--end-date".to_string(),
                ));
            }
            _ => {
                return Err(GnomyError::InvalidDateRange(
                    "use either --year or --start-date/--end-date, not both".to_string(),
                ));
            }
        };

        if end < start {
            return Err(GnomyError::InvalidDateRange(format!(
                "end date {} precedes start date {}",
                end, start
            )));
        }
        if start.year() < HRRR_FIRST_YEAR {
            return Err(GnomyError::InvalidDateRange(format!(
                "HRRR archives begin in {}",
                HRRR_FIRST_YEAR
            )));
        }
        Ok((start, end))
    }
}
