use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::compute::albedo::albedo_for_vegetation_type;
use crate::error::Result;
use crate::grib::GribMessage;
use crate::hrrr::{
    HrrrClient, SiteCache, SiteMeta, ANALYSIS_VARIABLES, FORECAST_VARIABLES, VEGETATION_TYPE,
};
use crate::models::{HourlyRecord, Site};
use crate::utils::progress::ProgressReporter;

/// Downloads every uncached hour of a range into the site cache, with
/// bounded concurrency. Hours that fail are recorded, not fatal: the next
/// run will try them again.
pub struct Fetcher {
    client: HrrrClient,
    cache: SiteCache,
    site: Site,
    max_workers: usize,
}

#[derive(Debug, Clone)]
pub struct FetchSummary {
    pub requested: usize,
    pub cached: usize,
    pub downloaded: usize,
    pub failed: Vec<DateTime<Utc>>,
}

impl FetchSummary {
    pub fn summary(&self) -> String {
        format!(
            "{} hours requested: {} already cached, {} downloaded, {} failed",
            self.requested,
            self.cached,
            self.downloaded,
            self.failed.len()
        )
    }
}

impl Fetcher {
    pub fn new(client: HrrrClient, cache: SiteCache, site: Site) -> Self {
        Self {
            client,
            cache,
            site,
            max_workers: num_cpus::get(),
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn cache(&self) -> &SiteCache {
        &self.cache
    }

    /// Take the cache back out of the fetcher (for post-build removal).
    pub fn into_cache(self) -> SiteCache {
        self.cache
    }

    pub async fn fetch_range(
        &self,
        hours: &[DateTime<Utc>],
        progress: Option<&ProgressReporter>,
    ) -> Result<FetchSummary> {
        let missing = self.cache.uncached_hours(hours);
        let mut summary = FetchSummary {
            requested: hours.len(),
            cached: hours.len() - missing.len(),
            downloaded: 0,
            failed: Vec::new(),
        };
        debug!(
            "{} of {} hours need downloading",
            missing.len(),
            hours.len()
        );

        let mut results = stream::iter(
            missing
                .into_iter()
                .map(|hour| async move { (hour, self.fetch_hour(hour).await) }),
        )
        .buffer_unordered(self.max_workers);

        while let Some((hour, result)) = results.next().await {
            match result {
                Ok(record) => {
                    self.cache.write_hour(&record)?;
                    summary.downloaded += 1;
                }
                Err(err) => {
                    warn!("hour {} failed: {}", hour, err);
                    summary.failed.push(hour);
                }
            }
            if let Some(p) = progress {
                p.increment(1);
            }
        }

        summary.failed.sort();
        Ok(summary)
    }

    /// Extract every configured variable for one hour: instant fields from
    /// the f00 analysis at T, accumulations from the f01 forecast of T-1h.
    pub async fn fetch_hour(&self, hour: DateTime<Utc>) -> Result<HourlyRecord> {
        let mut record = HourlyRecord::new(hour);

        let inventory = self.client.fetch_inventory(hour, 0).await?;
        for (variable, entry) in inventory.select(ANALYSIS_VARIABLES) {
            let bytes = self.client.fetch_message(hour, 0, entry).await?;
            let message = GribMessage::parse(&bytes)?;
            if let Some(value) = message.value_near(self.site.latitude, self.site.longitude)? {
                record.set(variable.short_name, value);
            }
            if variable.short_name == "u10" {
                record.wind_rot = Some(if message.grid.winds_grid_relative {
                    message.grid.wind_rotation(self.site.longitude)
                } else {
                    0.0
                });
            }
        }

        let previous_cycle = hour - Duration::hours(1);
        let inventory = self.client.fetch_inventory(previous_cycle, 1).await?;
        for (variable, entry) in inventory.select(FORECAST_VARIABLES) {
            let bytes = self.client.fetch_message(previous_cycle, 1, entry).await?;
            let message = GribMessage::parse(&bytes)?;
            if let Some(value) = message.value_near(self.site.latitude, self.site.longitude)? {
                record.set(variable.short_name, value);
            }
        }

        Ok(record)
    }

    /// Look up the site's land-use category (and thus albedo) once, caching
    /// the result next to the hourly files.
    pub async fn ensure_site_metadata(&self, sample_hour: DateTime<Utc>) -> Result<SiteMeta> {
        if let Some(meta) = self.cache.read_metadata()? {
            return Ok(meta);
        }

        let inventory = self.client.fetch_inventory(sample_hour, 0).await?;
        let meta = match inventory.find(VEGETATION_TYPE.search) {
            Some(entry) => {
                let bytes = self.client.fetch_message(sample_hour, 0, entry).await?;
                let message = GribMessage::parse(&bytes)?;
                let vegetation_type = message
                    .value_near(self.site.latitude, self.site.longitude)?
                    .map(|v| v.round() as u32);
                SiteMeta {
                    vegetation_type,
                    albedo: vegetation_type.and_then(albedo_for_vegetation_type),
                }
            }
            None => {
                warn!("no vegetation type field in inventory; albedo will be missing");
                SiteMeta {
                    vegetation_type: None,
                    albedo: None,
                }
            }
        };

        self.cache.write_metadata(&meta)?;
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fully_cached_range_makes_no_requests() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(Some("Cached".to_string()), 30.0, -98.0, None).unwrap();
        let cache = SiteCache::create(dir.path(), &site).unwrap();

        let hours: Vec<_> = (0..3)
            .map(|h| Utc.with_ymd_and_hms(2022, 1, 1, h, 0, 0).unwrap())
            .collect();
        for &t in &hours {
            cache.write_hour(&HourlyRecord::new(t)).unwrap();
        }

        // unroutable base URL: any request would error out
        let client = HrrrClient::new("http://127.0.0.1:1").unwrap();
        let fetcher = Fetcher::new(client, cache, site).with_max_workers(2);

        let summary = fetcher.fetch_range(&hours, None).await.unwrap();
        assert_eq!(summary.requested, 3);
        assert_eq!(summary.cached, 3);
        assert_eq!(summary.downloaded, 0);
        assert!(summary.failed.is_empty());
    }

    #[test]
    fn test_summary_wording() {
        let summary = FetchSummary {
            requested: 10,
            cached: 4,
            downloaded: 5,
            failed: vec![Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()],
        };
        assert_eq!(
            summary.summary(),
            "10 hours requested: 4 already cached, 5 downloaded, 1 failed"
        );
    }
}
