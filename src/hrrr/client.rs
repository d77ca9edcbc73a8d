use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Timelike, Utc};
use tracing::{debug, warn};

use crate::error::{GnomyError, Result};
use crate::hrrr::inventory::{Inventory, InventoryEntry};
use crate::utils::constants::HTTP_TIMEOUT_SECS;

/// Anonymous HTTP client for the public HRRR archive on S3.
///
/// Whole files are never downloaded: the `.idx` sidecar locates each field
/// and the message bytes are pulled with a ranged GET, the same subsetting
/// trick the archive was published to support.
#[derive(Clone)]
pub struct HrrrClient {
    client: reqwest::Client,
    base_url: String,
}

impl HrrrClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// URL of the SFC product file for a cycle and forecast hour.
    pub fn grib_url(&self, cycle: DateTime<Utc>, forecast_hour: u8) -> String {
        format!(
            "{}/hrrr.{}/conus/hrrr.t{:02}z.wrfsfcf{:02}.grib2",
            self.base_url,
            cycle.format("%Y%m%d"),
            cycle.hour(),
            forecast_hour
        )
    }

    pub fn index_url(&self, cycle: DateTime<Utc>, forecast_hour: u8) -> String {
        format!("{}.idx", self.grib_url(cycle, forecast_hour))
    }

    pub async fn fetch_inventory(
        &self,
        cycle: DateTime<Utc>,
        forecast_hour: u8,
    ) -> Result<Inventory> {
        let url = self.index_url(cycle, forecast_hour);
        debug!("fetching index {}", url);
        let body = self.get_with_retry(&url, None).await?;
        let text = String::from_utf8(body)
            .map_err(|_| GnomyError::Inventory(format!("non-UTF8 index at {}", url)))?;
        Inventory::parse(&text)
    }

    /// Download the bytes of a single GRIB message.
    pub async fn fetch_message(
        &self,
        cycle: DateTime<Utc>,
        forecast_hour: u8,
        entry: &InventoryEntry,
    ) -> Result<Vec<u8>> {
        let url = self.grib_url(cycle, forecast_hour);
        debug!("fetching {} {}", url, entry.range_header());
        self.get_with_retry(&url, Some(entry.range_header())).await
    }

    async fn get_with_retry(&self, url: &str, range: Option<String>) -> Result<Vec<u8>> {
        (|| async { self.get_once(url, range.as_deref()).await })
            .retry(ExponentialBuilder::default())
            .when(is_transient)
            .notify(|err: &GnomyError, after: Duration| {
                warn!("retrying {} after {:?}: {}", url, after, err);
            })
            .await
    }

    async fn get_once(&self, url: &str, range: Option<&str>) -> Result<Vec<u8>> {
        let mut request = self.client.get(url);
        if let Some(range) = range {
            request = request.header(reqwest::header::RANGE, range);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GnomyError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Connection problems and server-side errors are worth retrying; a 404 for
/// a cycle that was never archived is not.
fn is_transient(err: &GnomyError) -> bool {
    match err {
        GnomyError::Http(_) => true,
        GnomyError::UpstreamStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cycle() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 1, 1, 6, 0, 0).unwrap()
    }

    #[test]
    fn test_url_layout() {
        let client = HrrrClient::new("https://example.com/").unwrap();
        assert_eq!(
            client.grib_url(cycle(), 0),
            "https://example.com/hrrr.20220101/conus/hrrr.t06z.wrfsfcf00.grib2"
        );
        assert_eq!(
            client.index_url(cycle(), 1),
            "https://example.com/hrrr.20220101/conus/hrrr.t06z.wrfsfcf01.grib2.idx"
        );
    }

    #[tokio::test]
    async fn test_fetch_inventory() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/hrrr.20220101/conus/hrrr.t06z.wrfsfcf00.grib2.idx")
            .with_body("1:0:d=2022010106:TMP:2 m above ground:anl:\n2:100:d=2022010106:DPT:2 m above ground:anl:\n")
            .create_async()
            .await;

        let client = HrrrClient::new(server.url()).unwrap();
        let inventory = client.fetch_inventory(cycle(), 0).await.unwrap();
        assert_eq!(inventory.len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_message_sends_range_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/hrrr.20220101/conus/hrrr.t06z.wrfsfcf00.grib2")
            .match_header("range", "bytes=0-99")
            .with_status(206)
            .with_body(vec![1u8, 2, 3])
            .create_async()
            .await;

        let client = HrrrClient::new(server.url()).unwrap();
        let inventory = Inventory::parse(
            "1:0:d=2022010106:TMP:2 m above ground:anl:\n2:100:d=2022010106:DPT:2 m above ground:anl:\n",
        )
        .unwrap();
        let entry = inventory.find(":TMP:").unwrap();

        let bytes = client.fetch_message(cycle(), 0, entry).await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_cycle_is_not_retried_forever() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/hrrr.20220101/conus/hrrr.t06z.wrfsfcf00.grib2.idx")
            .with_status(404)
            .create_async()
            .await;

        let client = HrrrClient::new(server.url()).unwrap();
        let err = client.fetch_inventory(cycle(), 0).await.unwrap_err();
        assert!(matches!(
            err,
            GnomyError::UpstreamStatus { status: 404, .. }
        ));
    }
}
