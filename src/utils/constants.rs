/// First year with archived HRRR analyses (https://rapidrefresh.noaa.gov/hrrr/)
pub const HRRR_FIRST_YEAR: i32 = 2014;

/// HRRR CONUS domain bounds, latitude in degrees north,
/// longitude in degrees east of the prime meridian (0-360)
pub const HRRR_MIN_LAT: f64 = 21.14;
pub const HRRR_MAX_LAT: f64 = 52.6;
pub const HRRR_MIN_LON_E: f64 = 225.9;
pub const HRRR_MAX_LON_E: f64 = 299.0;

/// Public HRRR archive bucket
pub const DEFAULT_BASE_URL: &str = "https://noaa-hrrr-bdp-pds.s3.amazonaws.com";

/// Cache layout
pub const CACHE_TIME_FORMAT: &str = "%Y%m%d%H%M";
pub const SITE_META_FILE: &str = "site.json";
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// HTTP defaults
pub const HTTP_TIMEOUT_SECS: u64 = 60;

/// Label written into the EPW data source/uncertainty flags column
pub const DATA_SOURCE_FLAG: &str = "NOAA HRRR";
