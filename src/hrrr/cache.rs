use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GnomyError, Result};
use crate::models::{HourlyRecord, Site};
use crate::utils::constants::{CACHE_TIME_FORMAT, SITE_META_FILE};

/// Site-level context discovered during preprocessing and reused for every
/// hour of the build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteMeta {
    /// MODIS land-use category at the site's grid point
    pub vegetation_type: Option<u32>,
    pub albedo: Option<f64>,
}

/// Per-site directory of hourly point extractions, one CSV per hour named
/// `YYYYMMDDHHMM.csv`. Files are written once and never touched again, so
/// re-running a fetch only requests what is absent.
pub struct SiteCache {
    site_dir: PathBuf,
}

impl SiteCache {
    pub fn create(root: &Path, site: &Site) -> Result<Self> {
        let site_dir = root.join(site.cache_key());
        fs::create_dir_all(&site_dir)?;
        Ok(Self { site_dir })
    }

    pub fn path(&self) -> &Path {
        &self.site_dir
    }

    pub fn hour_path(&self, t: DateTime<Utc>) -> PathBuf {
        self.site_dir
            .join(format!("{}.csv", t.format(CACHE_TIME_FORMAT)))
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.hour_path(t).exists()
    }

    /// The subset of `hours` with no cache file yet.
    pub fn uncached_hours(&self, hours: &[DateTime<Utc>]) -> Vec<DateTime<Utc>> {
        hours.iter().copied().filter(|t| !self.contains(*t)).collect()
    }

    pub fn write_hour(&self, record: &HourlyRecord) -> Result<()> {
        let path = self.hour_path(record.valid_time);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.serialize(record)?;
        writer.flush()?;
        debug!("cached {}", path.display());
        Ok(())
    }

    pub fn read_hour(&self, t: DateTime<Utc>) -> Result<Option<HourlyRecord>> {
        let path = self.hour_path(t);
        if !path.exists() {
            return Ok(None);
        }
        let mut reader = csv::Reader::from_path(&path)?;
        match reader.deserialize().next() {
            Some(record) => Ok(Some(record?)),
            None => Err(GnomyError::Cache(format!(
                "empty cache file {}",
                path.display()
            ))),
        }
    }

    /// One slot per requested hour, None where the hour is uncached.
    pub fn read_range(&self, hours: &[DateTime<Utc>]) -> Result<Vec<Option<HourlyRecord>>> {
        hours.iter().map(|&t| self.read_hour(t)).collect()
    }

    pub fn write_metadata(&self, meta: &SiteMeta) -> Result<()> {
        let path = self.site_dir.join(SITE_META_FILE);
        let json = serde_json::to_string_pretty(meta)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn read_metadata(&self) -> Result<Option<SiteMeta>> {
        let path = self.site_dir.join(SITE_META_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Delete the whole site directory.
    pub fn purge(self) -> Result<()> {
        fs::remove_dir_all(&self.site_dir)?;
        Ok(())
    }
}
